use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, Request};
use objsign_core::time::DateTime;
use objsign_core::{Context, Error, Result};
use serde::Deserialize;
use serde_json::json;

use super::{ApiClient, ApiError, ApiResponse, ApiResult};
use crate::constants::*;
use crate::Config;

/// An object stored in S3, as referenced by Rekognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ObjectRef {
    /// Logical bucket name, mapped through the configured aliases.
    pub bucket: String,
    /// Object key.
    pub name: String,
}

impl S3ObjectRef {
    /// Create a new object reference.
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }
}

/// CompareFacesClient calls Rekognition `CompareFaces` on two stored images.
#[derive(Debug, Clone)]
pub struct CompareFacesClient {
    inner: ApiClient,
}

impl CompareFacesClient {
    /// Create a new client.
    pub fn new(ctx: Context, config: impl Into<Arc<Config>>) -> Self {
        Self {
            inner: ApiClient::new(
                ctx,
                config,
                REKOGNITION_SERVICE,
                REKOGNITION_UNCONFIGURED,
            ),
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.inner.time = Some(time);
        self
    }

    /// Compare the face in `source` with the faces in `target`.
    ///
    /// Nothing is sent if the client is not fully configured.
    pub async fn compare_faces(
        &self,
        source: &S3ObjectRef,
        target: &S3ObjectRef,
        similarity_threshold: f32,
    ) -> ApiResult {
        let resolved = self.inner.resolve()?;

        let req = self
            .build_request(&resolved.region, source, target, similarity_threshold)
            .map_err(|err| ApiError::without_response(err.to_string()))?;

        self.inner.send(&resolved, req).await
    }

    fn build_request(
        &self,
        region: &str,
        source: &S3ObjectRef,
        target: &S3ObjectRef,
        similarity_threshold: f32,
    ) -> Result<Request<Bytes>> {
        let resolver = &self.inner.resolver;
        let body = json!({
            "SourceImage": {
                "S3Object": {
                    "Bucket": resolver.bucket_name(&source.bucket),
                    "Name": source.name,
                }
            },
            "TargetImage": {
                "S3Object": {
                    "Bucket": resolver.bucket_name(&target.bucket),
                    "Name": target.name,
                }
            },
            "SimilarityThreshold": similarity_threshold,
        });
        let body = serde_json::to_vec(&body).map_err(|e| {
            Error::unexpected("failed to serialize CompareFaces request").with_source(e)
        })?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("https://rekognition.{region}.amazonaws.com/"))
            .header(X_AMZ_TARGET, REKOGNITION_COMPARE_FACES_TARGET)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_AMZ_JSON)
            .body(Bytes::from(body))?;
        Ok(req)
    }
}

/// A matched face in a `CompareFaces` response.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FaceMatch {
    /// Similarity between `0` and `100`.
    pub similarity: f32,
}

/// Decoded `CompareFaces` response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompareFacesOutput {
    /// Faces in the target image matching the source face.
    pub face_matches: Vec<FaceMatch>,
    /// Number of faces in the target image that didn't match.
    pub unmatched_faces: usize,
}

impl CompareFacesOutput {
    /// Decode a successful `CompareFaces` response.
    pub fn from_response(resp: &ApiResponse) -> Result<Self> {
        let out: CompareFacesResponse = serde_json::from_slice(&resp.body).map_err(|e| {
            Error::unexpected("failed to parse CompareFaces response")
                .with_source(e)
        })?;

        Ok(Self {
            face_matches: out.face_matches,
            unmatched_faces: out.unmatched_faces.len(),
        })
    }

    /// The highest similarity among matched faces.
    pub fn best_similarity(&self) -> Option<f32> {
        self.face_matches
            .iter()
            .map(|m| m.similarity)
            .reduce(f32::max)
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CompareFacesResponse {
    face_matches: Vec<FaceMatch>,
    unmatched_faces: Vec<serde_json::Value>,
}
