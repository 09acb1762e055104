use std::sync::Arc;

use log::{debug, warn};

use crate::{Config, Credential};

/// Credential and region resolved for a managed API call.
#[derive(Debug, Clone)]
pub struct ResolvedService {
    /// Credential to sign with.
    pub credential: Credential,
    /// Region to sign for.
    pub region: String,
}

/// Credential, region and physical bucket resolved for an object storage call.
#[derive(Debug, Clone)]
pub struct ResolvedBucket {
    /// Credential to sign with.
    pub credential: Credential,
    /// Region to sign for, after the copy region override.
    pub region: String,
    /// Physical bucket name, after alias mapping.
    pub bucket: String,
}

/// CredentialResolver turns a [`Config`] into what a single call needs.
///
/// Resolution happens for every call and never fails loudly: incomplete
/// configuration is logged and reported as `None`.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    config: Arc<Config>,
}

impl CredentialResolver {
    /// Create a resolver over the given config.
    pub fn new(config: impl Into<Arc<Config>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// The config this resolver reads from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Map a logical bucket name to its physical name.
    ///
    /// Names without an alias are returned verbatim.
    pub fn bucket_name<'a>(&'a self, logical: &'a str) -> &'a str {
        self.config
            .bucket_aliases
            .get(logical)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .unwrap_or(logical)
    }

    /// Resolve credential and region for a managed API.
    pub fn resolve_service(&self) -> Option<ResolvedService> {
        let credential = self.credential()?;
        let Some(region) = non_empty(&self.config.region) else {
            warn!("region is not configured");
            return None;
        };

        Some(ResolvedService {
            credential,
            region: region.to_string(),
        })
    }

    /// Resolve credential, region and physical bucket for a logical bucket.
    ///
    /// The configured copy region replaces the default region when the bucket
    /// resolves to the same physical bucket as the configured copy bucket.
    pub fn resolve_bucket(&self, logical: &str) -> Option<ResolvedBucket> {
        let bucket = self.bucket_name(logical.trim());
        if bucket.is_empty() {
            warn!("bucket name is empty");
            return None;
        }

        let credential = self.credential()?;

        let copy_region = non_empty(&self.config.copy_bucket)
            .filter(|copy_bucket| self.bucket_name(copy_bucket) == bucket)
            .and_then(|_| non_empty(&self.config.copy_region));
        if let Some(region) = copy_region {
            debug!("bucket {bucket} is the copy bucket, signing with region {region}");
        }

        let Some(region) = copy_region.or_else(|| non_empty(&self.config.region)) else {
            warn!("region is not configured for bucket {bucket}");
            return None;
        };

        Some(ResolvedBucket {
            credential,
            region: region.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn credential(&self) -> Option<Credential> {
        let Some(access_key_id) = non_empty(&self.config.access_key_id) else {
            warn!("access key id is not configured");
            return None;
        };
        let Some(secret_access_key) = non_empty(&self.config.secret_access_key) else {
            warn!("secret access key is not configured");
            return None;
        };

        Some(Credential {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: non_empty(&self.config.session_token).map(str::to_string),
        })
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
