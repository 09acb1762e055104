//! Core components for signing object storage and AWS API requests.
//!
//! This crate provides the foundational types and traits for the objsign workspace.
//! Service crates build on top of it, runtime adapters plug into its seams.
//!
//! ## Overview
//!
//! The crate is built around a few key concepts:
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending, and environment access
//! - **SigningRequest**: A decomposed view of `http::request::Parts` that signers mutate and apply back
//! - **SigningCredential**: A credential that can tell whether it is complete enough to sign with
//!
//! ## Example
//!
//! ```no_run
//! use objsign_core::{Context, HttpSend, Result};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct MyClient;
//!
//! #[async_trait]
//! impl HttpSend for MyClient {
//!     async fn http_send(
//!         &self,
//!         _req: http::Request<Bytes>,
//!         _timeout: Duration,
//!     ) -> Result<http::Response<Bytes>> {
//!         Ok(http::Response::new(Bytes::new()))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_http_send(MyClient);
//!
//! let req = http::Request::builder()
//!     .method("GET")
//!     .uri("https://example.com")
//!     .body(Bytes::new())?;
//! let resp = ctx.http_send(req, Duration::from_secs(10)).await?;
//! assert_eq!(resp.status(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For asynchronous file reading
//! - [`HttpSend`]: For sending HTTP requests with a per call timeout
//! - [`Env`]: For environment variable access
//! - [`SigningCredential`]: For validating credentials
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting used by signers
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, FileRead, HttpSend, OsEnv, StaticEnv};
pub use context::{NoopEnv, NoopFileRead, NoopHttpSend};

mod api;
pub use api::SigningCredential;
mod request;
pub use request::{SigningMethod, SigningRequest};
