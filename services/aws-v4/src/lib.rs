//! AWS SigV4 signing for S3 presigned urls, Rekognition and SES.
//!
//! This crate implements [AWS Signature Version 4](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_aws-signing.html)
//! once and reuses it for three call shapes:
//!
//! - query signed (presigned) urls for `GET`, `PUT` and `DELETE` on S3,
//! - header signed JSON calls (Rekognition `CompareFaces`),
//! - header signed form calls (SES `SendEmail`).
//!
//! Credentials are static configuration and resolved for every call, nothing
//! is cached and nothing is refreshed.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use objsign_aws_v4::{Config, PresignedUrlService};
//! use objsign_core::{Context, OsEnv};
//!
//! let ctx = Context::new().with_env(OsEnv);
//! let config = Config::new()
//!     .with_bucket_alias("inquilinos", "as-inquilinos-prod")
//!     .from_env(&ctx);
//!
//! let presigner = PresignedUrlService::new(config);
//! let url = presigner.presign_get("inquilinos", "contratos/1.pdf", Duration::from_secs(900));
//! println!("{url:?}");
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod resolve;
pub use resolve::{CredentialResolver, ResolvedBucket, ResolvedService};

mod canonical;
pub use canonical::{
    canonical_headers, canonical_query, canonical_uri, encode_query, CanonicalRequest, PayloadHash,
};

mod key;
pub use key::{calculate_signature, generate_signing_key, SigningContext};

mod sign_request;
pub use sign_request::RequestSigner;

mod presign;
pub use presign::{PresignRequest, PresignedUrlService};

mod api;
pub use api::{ApiError, ApiResponse, ApiResult};
pub use api::{CompareFacesClient, CompareFacesOutput, FaceMatch, S3ObjectRef};
pub use api::{EmailMessage, SendEmailClient, SendEmailOutput};

mod transfer;
pub use transfer::{ObjectTransfer, TransferError, TransferOutcome, TransferResult, TransferStage};
