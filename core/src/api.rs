use std::fmt::Debug;

/// SigningCredential is the trait implemented by credentials that signers accept.
///
/// Credentials are resolved from static configuration for every call, so there is
/// no expiry here: a credential is either complete or it is not.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential carries everything a signer needs.
    fn is_valid(&self) -> bool;
}
