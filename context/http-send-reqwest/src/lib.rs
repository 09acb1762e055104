//! Reqwest-based HTTP executor for objsign.
//!
//! `ReqwestHttpSend` implements the `HttpSend` trait from `objsign_core`. Every
//! request is sent once: redirects are not followed and nothing is retried.
//!
//! ```no_run
//! use objsign_core::Context;
//! use objsign_http_send_reqwest::ReqwestHttpSend;
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use objsign_core::{Error, HttpSend, Result};
use reqwest::redirect::Policy;
use reqwest::{Client, Request};

/// HttpSend over a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    ///
    /// The client should be built with `redirect(Policy::none())`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(
        &self,
        req: http::Request<Bytes>,
        timeout: Duration,
    ) -> Result<http::Response<Bytes>> {
        let mut req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        *req.timeout_mut() = Some(timeout);

        let resp = self.client.execute(req).await.map_err(map_reqwest_error)?;

        let mut builder = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(resp.headers().clone());
        }
        let body = resp.bytes().await.map_err(map_reqwest_error)?;

        Ok(builder.body(body)?)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::unexpected("http request timed out").with_source(e)
    } else {
        Error::unexpected(format!("failed to send http request: {e}")).with_source(e)
    }
}
