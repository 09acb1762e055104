//! Header signed clients for the managed AWS APIs.

use std::sync::Arc;

use bytes::Bytes;
use http::Request;
use log::{debug, warn};
use objsign_core::time::DateTime;
use objsign_core::utils::truncate_body;
use objsign_core::Context;

use crate::constants::LOG_BODY_LIMIT;
use crate::{Config, CredentialResolver, RequestSigner, ResolvedService};

mod rekognition;
pub use rekognition::{CompareFacesClient, CompareFacesOutput, FaceMatch, S3ObjectRef};

mod ses;
pub use ses::{EmailMessage, SendEmailClient, SendEmailOutput};

/// A successful (2xx) response of a managed API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

/// A failed managed API call.
///
/// `status` is `0` when no response was received, either because the service
/// is not configured or because the transport failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status, `0` if no response was received.
    pub status: u16,
    /// Raw response body, empty if no response was received.
    pub body: Bytes,
    /// Human readable reason.
    pub message: String,
}

impl ApiError {
    /// An error for a call that never reached the network.
    pub fn without_response(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: Bytes::new(),
            message: message.into(),
        }
    }
}

/// Result of a managed API call.
pub type ApiResult = std::result::Result<ApiResponse, ApiError>;

/// Shared plumbing of the managed API clients.
#[derive(Debug, Clone)]
struct ApiClient {
    ctx: Context,
    resolver: CredentialResolver,
    service: &'static str,
    unconfigured: &'static str,

    time: Option<DateTime>,
}

impl ApiClient {
    fn new(
        ctx: Context,
        config: impl Into<Arc<Config>>,
        service: &'static str,
        unconfigured: &'static str,
    ) -> Self {
        Self {
            ctx,
            resolver: CredentialResolver::new(config),
            service,
            unconfigured,
            time: None,
        }
    }

    fn resolve(&self) -> Result<ResolvedService, ApiError> {
        self.resolver.resolve_service().ok_or_else(|| {
            warn!("{} is not configured", self.service);
            ApiError::without_response(self.unconfigured)
        })
    }

    /// Header sign `req` and send it.
    async fn send(&self, resolved: &ResolvedService, req: Request<Bytes>) -> ApiResult {
        let mut signer = RequestSigner::new(self.service, &resolved.region);
        if let Some(time) = self.time {
            signer = signer.with_time(time);
        }

        let (mut parts, body) = req.into_parts();
        if let Err(err) = signer.sign_header(&mut parts, &resolved.credential, &body) {
            warn!("sign {} request failed: {err}", self.service);
            return Err(ApiError::without_response(err.to_string()));
        }
        let req = Request::from_parts(parts, body);

        debug!("sending {} request to {}", self.service, req.uri());
        let resp = match self
            .ctx
            .http_send(req, self.resolver.config().timeout())
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                warn!("{} request failed: {err}", self.service);
                return Err(ApiError::without_response(err.to_string()));
            }
        };

        let status = resp.status();
        let body = resp.into_body();
        if !status.is_success() {
            warn!(
                "{} responded with status {status}: {}",
                self.service,
                truncate_body(&body, LOG_BODY_LIMIT)
            );
            return Err(ApiError {
                status: status.as_u16(),
                body,
                message: format!("{} responded with status {status}", self.service),
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}
