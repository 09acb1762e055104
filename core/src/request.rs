use std::borrow::Cow;
use std::mem;
use std::str::FromStr;
use std::time::Duration;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as it appears in the uri (still percent encoded).
    pub path: String,
    /// HTTP query parameters, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Query pairs are written verbatim, callers must have encoded them already.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + self.query.len() * 2);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get the path percent decoded.
    pub fn path_percent_decoded(&self) -> Result<Cow<'_, str>> {
        Ok(percent_encoding::percent_decode_str(&self.path).decode_utf8()?)
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Normalize header value by trimming surrounding spaces.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();

        let starting_index = bs.iter().position(|b| *b != b' ').unwrap_or(0);
        let ending_offset = bs.iter().rev().position(|b| *b != b' ').unwrap_or(0);
        let ending_index = bs.len() - ending_offset;

        // This can't fail because we started with a valid HeaderValue and then only trimmed spaces
        let sensitive = v.is_sensitive();
        *v = HeaderValue::from_bytes(&bs[starting_index..ending_index])
            .expect("invalid header value");
        v.set_sensitive(sensitive);
    }
}

/// SigningMethod is the method that used in signing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query, the signature is valid for the given duration.
    Query(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header("x-amz-meta-name", "  spaced  ")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let mut p = parts("https://bucket.s3.eu-west-1.amazonaws.com/a/b%20c.png?versionId=1");
        let mut req = SigningRequest::build(&mut p)?;

        assert_eq!(req.authority.as_str(), "bucket.s3.eu-west-1.amazonaws.com");
        assert_eq!(req.path, "/a/b%20c.png");
        assert_eq!(req.path_percent_decoded()?, "/a/b c.png");
        assert_eq!(req.query, vec![("versionId".to_string(), "1".to_string())]);

        req.query_push("X-Amz-Expires", "900");
        req.apply(&mut p)?;

        assert_eq!(
            p.uri.to_string(),
            "https://bucket.s3.eu-west-1.amazonaws.com/a/b%20c.png?versionId=1&X-Amz-Expires=900"
        );
        assert_eq!(p.headers["x-amz-meta-name"], "  spaced  ");
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut p = parts("/relative");
        let err = SigningRequest::build(&mut p).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_header_value_normalize() -> Result<()> {
        let mut p = parts("https://example.com/");
        p.headers
            .insert("content-type", HeaderValue::from_static("text/plain"));
        let mut req = SigningRequest::build(&mut p)?;

        for (_, v) in req.headers.iter_mut() {
            SigningRequest::header_value_normalize(v);
        }
        assert_eq!(req.headers["x-amz-meta-name"], "spaced");
        assert_eq!(req.headers["content-type"], "text/plain");
        Ok(())
    }
}
