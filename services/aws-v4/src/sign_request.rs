use std::time::Duration;

use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use objsign_core::time::{now, DateTime};
use objsign_core::{Error, Result, SigningCredential, SigningMethod, SigningRequest};

use crate::canonical::{encode_query, CanonicalRequest, PayloadHash};
use crate::constants::*;
use crate::key::{calculate_signature, generate_signing_key, SigningContext};
use crate::Credential;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer is pure computation: it never sends anything and keeps no state
/// between calls, every call takes its own timestamp.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Presign the request: the signature goes in the query and stays valid for `expires_in`.
    ///
    /// Only `host` is signed and the payload is `UNSIGNED-PAYLOAD`.
    pub fn sign_query(&self, req: &mut Parts, cred: &Credential, expires_in: Duration) -> Result<()> {
        self.sign(
            req,
            cred,
            SigningMethod::Query(expires_in),
            PayloadHash::Unsigned,
        )
    }

    /// Sign the request with an `Authorization` header over the exact `body`.
    pub fn sign_header(&self, req: &mut Parts, cred: &Credential, body: &[u8]) -> Result<()> {
        self.sign(req, cred, SigningMethod::Header, PayloadHash::of(body))
    }

    fn sign(
        &self,
        req: &mut Parts,
        cred: &Credential,
        method: SigningMethod,
        payload_hash: PayloadHash,
    ) -> Result<()> {
        if !cred.is_valid() {
            return Err(Error::config_invalid(
                "access key id and secret access key are required for signing",
            ));
        }

        let now = self.time.unwrap_or_else(now);
        let ctx = SigningContext::new(now, &self.region, &self.service);
        let mut signed_req = SigningRequest::build(req)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, cred, method, &ctx)?;
        canonicalize_query(&mut signed_req, cred, method, &ctx);

        // build canonical request and string to sign.
        let creq = match method {
            SigningMethod::Query(_) => CanonicalRequest::from_signing_request(
                &signed_req,
                |k| k == header::HOST.as_str(),
                payload_hash,
            )?,
            SigningMethod::Header => {
                CanonicalRequest::from_signing_request(&signed_req, is_signed_header, payload_hash)?
            }
        };
        debug!("calculated canonical request: {creq}");

        let string_to_sign = ctx.string_to_sign(&creq.hashed());
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(
            &cred.secret_access_key,
            &ctx.date_stamp,
            &self.region,
            &self.service,
        );
        let signature = calculate_signature(&signing_key, &string_to_sign);

        match method {
            SigningMethod::Query(_) => {
                // The url carries the same encoded, sorted pairs that were signed.
                signed_req.query = encode_query(&signed_req.query);
                signed_req.query_push(X_AMZ_SIGNATURE_QUERY, signature);
            }
            SigningMethod::Header => {
                let mut authorization = HeaderValue::from_str(&format!(
                    "{AWS4_HMAC_SHA256} Credential={}/{}, SignedHeaders={}, Signature={}",
                    cred.access_key_id, ctx.scope, creq.signed_headers, signature
                ))?;
                authorization.set_sensitive(true);

                signed_req
                    .headers
                    .insert(header::AUTHORIZATION, authorization);
            }
        }

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// Headers that take part in header signing.
fn is_signed_header(name: &str) -> bool {
    name == header::HOST.as_str()
        || name == header::CONTENT_TYPE.as_str()
        || name.starts_with("x-amz-")
}

fn canonicalize_header(
    req: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    ctx: &SigningContext,
) -> Result<()> {
    // Header names and values need to be normalized according to Step 4 of https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html
    for (_, value) in req.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)
    }

    // Insert HOST header if not present.
    if req.headers.get(header::HOST).is_none() {
        req.headers
            .insert(header::HOST, req.authority.as_str().parse()?);
    }

    if method == SigningMethod::Header {
        // The date must match the scope of this very signature.
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::try_from(ctx.amz_date.as_str())?);

        // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to valid leaking.
            value.set_sensitive(true);

            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
    }

    Ok(())
}

fn canonicalize_query(
    req: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    ctx: &SigningContext,
) {
    let SigningMethod::Query(expire) = method else {
        return;
    };

    req.query_push(X_AMZ_ALGORITHM_QUERY, AWS4_HMAC_SHA256);
    req.query_push(
        X_AMZ_CREDENTIAL_QUERY,
        format!("{}/{}", cred.access_key_id, ctx.scope),
    );
    req.query_push(X_AMZ_DATE_QUERY, ctx.amz_date.as_str());
    req.query_push(X_AMZ_EXPIRES_QUERY, expire.as_secs().to_string());
    req.query_push(X_AMZ_SIGNED_HEADERS_QUERY, header::HOST.as_str());

    if let Some(token) = &cred.session_token {
        req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token.as_str());
    }
}
