use std::sync::Arc;
use std::time::Duration;

use http::{Method, Request, Uri};
use log::{debug, warn};
use objsign_core::time::DateTime;
use objsign_core::{Error, Result};
use percent_encoding::utf8_percent_encode;

use crate::constants::*;
use crate::{Config, CredentialResolver, RequestSigner};

/// PresignRequest describes one presigned url to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    /// HTTP method, one of `GET`, `PUT` or `DELETE`.
    pub method: Method,
    /// Logical bucket name, mapped through the configured aliases.
    pub bucket: String,
    /// Object key, a leading `/` is ignored.
    pub key: String,
    /// Lifetime of the url, clamped to `[1s, 7 days]`.
    pub expires: Duration,
}

impl PresignRequest {
    /// Create a new presign request.
    pub fn new(
        method: Method,
        bucket: impl Into<String>,
        key: impl Into<String>,
        expires: Duration,
    ) -> Self {
        Self {
            method,
            bucket: bucket.into(),
            key: key.into(),
            expires,
        }
    }
}

/// PresignedUrlService issues presigned S3 urls for `GET`, `PUT` and `DELETE`.
///
/// Urls look like `https://{bucket}.s3.{region}.amazonaws.com/{key}?X-Amz-...`.
/// When an endpoint override is configured, `GET` urls are not signed at all
/// and point to `{endpoint}/{bucket}/{key}`, while `PUT` and `DELETE` are still
/// signed against `{bucket}.{endpoint host}`, keeping any path of the endpoint.
///
/// Every failure is logged and reported as `None`.
#[derive(Debug, Clone)]
pub struct PresignedUrlService {
    resolver: CredentialResolver,

    time: Option<DateTime>,
}

impl PresignedUrlService {
    /// Create a new service over the given config.
    pub fn new(config: impl Into<Arc<Config>>) -> Self {
        Self::from_resolver(CredentialResolver::new(config))
    }

    /// Create a new service over an existing resolver.
    pub fn from_resolver(resolver: CredentialResolver) -> Self {
        Self {
            resolver,
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

    /// The resolver used by this service.
    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Default lifetime of presigned urls.
    pub fn default_expires(&self) -> Duration {
        self.resolver.config().presign_expires()
    }

    /// Presign a `GET` url.
    pub fn presign_get(&self, bucket: &str, key: &str, expires: Duration) -> Option<String> {
        self.presign(&PresignRequest::new(Method::GET, bucket, key, expires))
    }

    /// Presign a `PUT` url.
    pub fn presign_put(&self, bucket: &str, key: &str, expires: Duration) -> Option<String> {
        self.presign(&PresignRequest::new(Method::PUT, bucket, key, expires))
    }

    /// Presign a `DELETE` url.
    pub fn presign_delete(&self, bucket: &str, key: &str, expires: Duration) -> Option<String> {
        self.presign(&PresignRequest::new(Method::DELETE, bucket, key, expires))
    }

    /// Presign the given request.
    pub fn presign(&self, req: &PresignRequest) -> Option<String> {
        match self.try_presign(req) {
            Ok(url) => url,
            Err(err) => {
                warn!(
                    "presign {} {}/{} failed: {err}",
                    req.method, req.bucket, req.key
                );
                None
            }
        }
    }

    fn try_presign(&self, req: &PresignRequest) -> Result<Option<String>> {
        if !matches!(req.method, Method::GET | Method::PUT | Method::DELETE) {
            return Err(Error::request_invalid(format!(
                "method {} can't be presigned",
                req.method
            )));
        }

        let key = req.key.trim_start_matches('/');
        if key.is_empty() {
            return Err(Error::request_invalid("object key is empty"));
        }
        let key = utf8_percent_encode(key, &AWS_URI_ENCODE_SET).to_string();

        let endpoint = self.resolver.config().endpoint.as_deref().map(str::trim);
        let endpoint = endpoint.filter(|v| !v.is_empty()).map(endpoint_base);

        // Reads through an endpoint override are served without signing.
        if let (Some(base), &Method::GET) = (&endpoint, &req.method) {
            let bucket = self.resolver.bucket_name(req.bucket.trim());
            if bucket.is_empty() {
                return Err(Error::config_invalid("bucket name is empty"));
            }

            let url = format!("{base}/{bucket}/{key}");
            debug!("issued unsigned url for {bucket}/{key} through endpoint override");
            return Ok(Some(url));
        }

        let Some(resolved) = self.resolver.resolve_bucket(&req.bucket) else {
            return Ok(None);
        };

        let url = match &endpoint {
            Some(base) => {
                let uri: Uri = base.parse()?;
                let authority = uri.authority().ok_or_else(|| {
                    Error::config_invalid(format!("endpoint {base} has no host"))
                })?;
                let prefix = uri.path().trim_end_matches('/');
                format!(
                    "{}://{}.{authority}{prefix}/{key}",
                    uri.scheme_str().unwrap_or("https"),
                    resolved.bucket
                )
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                resolved.bucket, resolved.region
            ),
        };

        let expires = req
            .expires
            .clamp(Duration::from_secs(1), MAX_PRESIGN_EXPIRES);

        let mut signer = RequestSigner::new(S3_SERVICE, &resolved.region);
        if let Some(time) = self.time {
            signer = signer.with_time(time);
        }

        let (mut parts, _) = Request::builder()
            .method(req.method.clone())
            .uri(url)
            .body(())?
            .into_parts();
        signer.sign_query(&mut parts, &resolved.credential, expires)?;

        debug!(
            "presigned {} url for {}/{key} in region {}, expires in {}s",
            req.method,
            resolved.bucket,
            resolved.region,
            expires.as_secs()
        );
        Ok(Some(parts.uri.to_string()))
    }
}

/// Turn a configured endpoint into a base url without trailing `/`.
fn endpoint_base(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}
