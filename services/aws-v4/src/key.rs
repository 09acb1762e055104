//! Signing key derivation and signature calculation.

use objsign_core::hash::{hex_hmac_sha256, hmac_sha256};
use objsign_core::time::{format_date, format_iso8601, DateTime};

use crate::constants::{AWS4_HMAC_SHA256, AWS4_REQUEST};

/// SigningContext binds one signature to a time, region and service.
///
/// It is derived from the signing time of every request and never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// `20130524T000000Z`
    pub amz_date: String,
    /// `20130524`
    pub date_stamp: String,
    /// `20130524/us-east-1/s3/aws4_request`
    pub scope: String,
}

impl SigningContext {
    /// Build the context for a request signed at `time`.
    pub fn new(time: DateTime, region: &str, service: &str) -> Self {
        let date_stamp = format_date(time);
        let scope = format!("{date_stamp}/{region}/{service}/{AWS4_REQUEST}");

        Self {
            amz_date: format_iso8601(time),
            date_stamp,
            scope,
        }
    }

    /// Build the string to sign from a hashed canonical request.
    ///
    /// ```text
    /// AWS4-HMAC-SHA256
    /// 20130524T000000Z
    /// 20130524/us-east-1/s3/aws4_request
    /// <hashed_canonical_request>
    /// ```
    pub fn string_to_sign(&self, hashed_canonical_request: &str) -> String {
        format!(
            "{AWS4_HMAC_SHA256}\n{}\n{}\n{hashed_canonical_request}",
            self.amz_date, self.scope
        )
    }
}

/// Derive the SigV4 signing key.
///
/// Every step feeds raw HMAC bytes into the next one, nothing is hex encoded here.
pub fn generate_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}

/// Hex encoded signature of `string_to_sign`.
pub fn calculate_signature(signing_key: &[u8], string_to_sign: &str) -> String {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}
