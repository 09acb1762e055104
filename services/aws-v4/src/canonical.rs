//! Canonical request construction for SigV4.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use std::fmt::{Display, Formatter};

use http::{HeaderMap, Method};
use objsign_core::hash::hex_sha256;
use objsign_core::{Result, SigningRequest};
use percent_encoding::utf8_percent_encode;

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, UNSIGNED_PAYLOAD};

/// How the payload takes part in the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadHash {
    /// `UNSIGNED-PAYLOAD`, used by presigned urls where the body is unknown.
    Unsigned,
    /// Hex encoded SHA256 of the exact body bytes.
    Sha256(String),
}

impl PayloadHash {
    /// Hash the given body.
    pub fn of(body: &[u8]) -> Self {
        PayloadHash::Sha256(hex_sha256(body))
    }

    /// The value written in the canonical request.
    pub fn as_str(&self) -> &str {
        match self {
            PayloadHash::Unsigned => UNSIGNED_PAYLOAD,
            PayloadHash::Sha256(v) => v,
        }
    }
}

/// CanonicalRequest is the string that SigV4 hashes and signs.
///
/// ```text
/// METHOD
/// CanonicalURI
/// CanonicalQueryString
/// CanonicalHeaders
///
/// SignedHeaders
/// PayloadHash
/// ```
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    /// Upper-case HTTP method.
    pub method: Method,
    /// Percent encoded path, `/` kept.
    pub uri: String,
    /// Percent encoded, sorted `k=v` pairs joined by `&`.
    pub query: String,
    /// Lower-cased header names with trimmed values, sorted by name.
    pub headers: Vec<(String, String)>,
    /// Header names joined by `;`.
    pub signed_headers: String,
    /// Payload hash.
    pub payload_hash: PayloadHash,
}

impl CanonicalRequest {
    /// Build the canonical request of a signing request.
    ///
    /// Only headers accepted by `signed` take part. The query of `req` must hold
    /// decoded pairs and must not contain the signature itself.
    pub fn from_signing_request(
        req: &SigningRequest,
        signed: impl Fn(&str) -> bool,
        payload_hash: PayloadHash,
    ) -> Result<Self> {
        let headers = canonical_headers(&req.headers, signed)?;
        let signed_headers = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        Ok(CanonicalRequest {
            method: req.method.clone(),
            uri: canonical_uri(&req.path_percent_decoded()?),
            query: canonical_query(&req.query),
            headers,
            signed_headers,
            payload_hash,
        })
    }

    /// Hex encoded SHA256 of the canonical request, as used in the string to sign.
    pub fn hashed(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (k, v) in &self.headers {
            writeln!(f, "{k}:{v}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash.as_str())
    }
}

/// Encode a decoded path, every reserved character but `/` is escaped.
///
/// ```
/// use objsign_aws_v4::canonical_uri;
///
/// assert_eq!(canonical_uri("/a/b c.png"), "/a/b%20c.png");
/// ```
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    utf8_percent_encode(path, &AWS_URI_ENCODE_SET).to_string()
}

/// Encode every decoded query pair and sort them by name, then by value.
pub fn encode_query(query: &[(String, String)]) -> Vec<(String, String)> {
    let mut encoded = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    encoded.sort();
    encoded
}

/// Build the canonical query string from decoded query pairs.
pub fn canonical_query(query: &[(String, String)]) -> String {
    encode_query(query)
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Collect the headers accepted by `signed`, lower-cased, trimmed and sorted.
///
/// Repeated headers are joined by `,` in their original order.
pub fn canonical_headers(
    headers: &HeaderMap,
    signed: impl Fn(&str) -> bool,
) -> Result<Vec<(String, String)>> {
    let mut names = headers
        .keys()
        .map(|k| k.as_str())
        .filter(|k| signed(k))
        .collect::<Vec<_>>();
    names.sort_unstable();

    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut values = Vec::new();
        for v in headers.get_all(name) {
            values.push(v.to_str()?.trim());
        }
        out.push((name.to_string(), values.join(",")));
    }
    Ok(out)
}
