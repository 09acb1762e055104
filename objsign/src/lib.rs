//! Presigned object storage urls and SigV4 signed AWS API calls.
//!
//! `objsign` bundles [`objsign_core`] with the AWS SigV4 service crate and the
//! default runtime adapters:
//!
//! - `default-context`: [`default_context`] over tokio file reads, a reqwest
//!   HTTP executor and the OS environment.
//! - `aws`: the [`aws`] module.
//!
//! Both features are enabled by default.
//!
//! ```no_run
//! # #[cfg(all(feature = "aws", feature = "default-context"))]
//! # async fn example() {
//! use std::time::Duration;
//!
//! let presigner = objsign::aws::default_presigner();
//! let url = presigner.presign_put("docs", "folder/file.pdf", Duration::from_secs(900));
//!
//! let transfer = objsign::aws::default_transfer();
//! let _ = transfer
//!     .copy_and_cleanup("docs", "folder/file.pdf", "staging", "folder/file.pdf")
//!     .await;
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use objsign_core::*;

#[cfg(feature = "aws")]
pub mod aws;

/// Create a context with the default runtime adapters:
///
/// - [`objsign_file_read_tokio::TokioFileRead`] to read files,
/// - [`objsign_http_send_reqwest::ReqwestHttpSend`] to send requests,
/// - [`OsEnv`] to read environment values.
#[cfg(feature = "default-context")]
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(objsign_file_read_tokio::TokioFileRead)
        .with_http_send(objsign_http_send_reqwest::ReqwestHttpSend::default())
        .with_env(OsEnv)
}
