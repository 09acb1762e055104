use std::fmt::{Display, Formatter};

use bytes::Bytes;
use http::{header, Method, Request};
use log::{debug, warn};
use objsign_core::utils::truncate_body;
use objsign_core::Context;

use crate::constants::{CONTENT_TYPE_OCTET_STREAM, LOG_BODY_LIMIT};
use crate::PresignedUrlService;

/// The stage a transfer failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStage {
    /// A presigned url could not be issued.
    PresignFailed,
    /// Fetching the source object failed.
    SourceFetchFailed,
    /// Writing the destination object failed.
    DestPutFailed,
    /// Deleting the destination object failed.
    DestDeleteFailed,
    /// Reading the local file failed.
    FileReadFailed,
    /// Uploading the local file failed.
    UploadFailed,
}

impl TransferStage {
    /// The tag of this stage, like `dest_put_failed`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStage::PresignFailed => "presign_failed",
            TransferStage::SourceFetchFailed => "source_fetch_failed",
            TransferStage::DestPutFailed => "dest_put_failed",
            TransferStage::DestDeleteFailed => "dest_delete_failed",
            TransferStage::FileReadFailed => "file_read_failed",
            TransferStage::UploadFailed => "upload_failed",
        }
    }
}

impl Display for TransferStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed transfer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} (status {status})")]
pub struct TransferError {
    /// Stage the transfer stopped at.
    pub stage: TransferStage,
    /// HTTP status of the failed call, `0` if no response was received.
    pub status: u16,
    /// Body of the failed response.
    pub body: Bytes,
}

impl TransferError {
    fn new(stage: TransferStage) -> Self {
        Self {
            stage,
            status: 0,
            body: Bytes::new(),
        }
    }
}

/// A finished transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// HTTP status of the last write.
    pub status: u16,
    /// Bytes written, `0` for deletes.
    pub bytes: usize,
}

/// Result of a transfer.
pub type TransferResult = std::result::Result<TransferOutcome, TransferError>;

/// ObjectTransfer moves objects through presigned urls.
///
/// Every operation is a short linear pipeline without retries: the first
/// failing stage ends it and is reported in [`TransferError::stage`].
#[derive(Debug, Clone)]
pub struct ObjectTransfer {
    ctx: Context,
    presigner: PresignedUrlService,
}

impl ObjectTransfer {
    /// Create a new transfer over the given context and presigner.
    pub fn new(ctx: Context, presigner: PresignedUrlService) -> Self {
        Self { ctx, presigner }
    }

    /// The presigner used by this transfer.
    pub fn presigner(&self) -> &PresignedUrlService {
        &self.presigner
    }

    /// Copy `src_bucket/src_key` to `dst_bucket/dst_key`.
    pub async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> TransferResult {
        let expires = self.presigner.default_expires();
        let source = self.presigner.presign_get(src_bucket, src_key, expires);
        let dest = self.presigner.presign_put(dst_bucket, dst_key, expires);
        let (Some(source), Some(dest)) = (source, dest) else {
            warn!("copy {src_bucket}/{src_key} to {dst_bucket}/{dst_key}: presign failed");
            return Err(TransferError::new(TransferStage::PresignFailed));
        };

        let (_, content) = self
            .execute(
                Method::GET,
                &source,
                Bytes::new(),
                None,
                TransferStage::SourceFetchFailed,
            )
            .await?;

        let bytes = content.len();
        let (status, _) = self
            .execute(
                Method::PUT,
                &dest,
                content,
                Some(CONTENT_TYPE_OCTET_STREAM),
                TransferStage::DestPutFailed,
            )
            .await?;

        debug!("copied {src_bucket}/{src_key} to {dst_bucket}/{dst_key}, {bytes} bytes");
        Ok(TransferOutcome { status, bytes })
    }

    /// Delete `bucket/key`.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> TransferResult {
        let Some(url) =
            self.presigner
                .presign_delete(bucket, key, self.presigner.default_expires())
        else {
            warn!("delete {bucket}/{key}: presign failed");
            return Err(TransferError::new(TransferStage::PresignFailed));
        };

        let (status, _) = self
            .execute(
                Method::DELETE,
                &url,
                Bytes::new(),
                None,
                TransferStage::DestDeleteFailed,
            )
            .await?;

        debug!("deleted {bucket}/{key}");
        Ok(TransferOutcome { status, bytes: 0 })
    }

    /// Copy an object, then delete the destination copy.
    ///
    /// The delete only runs after a successful copy.
    pub async fn copy_and_cleanup(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> TransferResult {
        let outcome = self
            .copy_object(src_bucket, src_key, dst_bucket, dst_key)
            .await?;
        self.delete_object(dst_bucket, dst_key).await?;

        Ok(outcome)
    }

    /// Upload the local file at `path` to `bucket/key`.
    pub async fn upload_from_path(
        &self,
        path: &str,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> TransferResult {
        let Some(url) = self
            .presigner
            .presign_put(bucket, key, self.presigner.default_expires())
        else {
            warn!("upload {path} to {bucket}/{key}: presign failed");
            return Err(TransferError::new(TransferStage::PresignFailed));
        };

        let content = match self.ctx.file_read(path).await {
            Ok(content) => Bytes::from(content),
            Err(err) => {
                warn!("upload {path} to {bucket}/{key}: read file failed: {err}");
                return Err(TransferError::new(TransferStage::FileReadFailed));
            }
        };

        let bytes = content.len();
        let (status, _) = self
            .execute(
                Method::PUT,
                &url,
                content,
                Some(content_type),
                TransferStage::UploadFailed,
            )
            .await?;

        debug!("uploaded {path} to {bucket}/{key}, {bytes} bytes");
        Ok(TransferOutcome { status, bytes })
    }

    /// Send one request, any failure is tagged with `stage`.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Bytes,
        content_type: Option<&str>,
        stage: TransferStage,
    ) -> std::result::Result<(u16, Bytes), TransferError> {
        let mut req = Request::builder().method(method.clone()).uri(url);
        if method == Method::PUT {
            req = req.header(header::CONTENT_LENGTH, body.len());
        }
        if let Some(content_type) = content_type {
            req = req.header(header::CONTENT_TYPE, content_type);
        }
        let req = req.body(body).map_err(|err| {
            warn!("{stage}: build {method} request failed: {err}");
            TransferError::new(stage)
        })?;

        let timeout = self.presigner.resolver().config().timeout();
        let resp = self.ctx.http_send(req, timeout).await.map_err(|err| {
            warn!("{stage}: {method} request failed: {err}");
            TransferError::new(stage)
        })?;

        let status = resp.status();
        let body = resp.into_body();
        if !status.is_success() {
            warn!(
                "{stage}: {method} responded with status {status}: {}",
                truncate_body(&body, LOG_BODY_LIMIT)
            );
            return Err(TransferError {
                stage,
                status: status.as_u16(),
                body,
            });
        }

        Ok((status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(TransferStage::PresignFailed, "presign_failed")]
    #[test_case(TransferStage::SourceFetchFailed, "source_fetch_failed")]
    #[test_case(TransferStage::DestPutFailed, "dest_put_failed")]
    #[test_case(TransferStage::DestDeleteFailed, "dest_delete_failed")]
    #[test_case(TransferStage::FileReadFailed, "file_read_failed")]
    #[test_case(TransferStage::UploadFailed, "upload_failed")]
    fn test_stage_tag(stage: TransferStage, expected: &str) {
        assert_eq!(stage.to_string(), expected);
    }

    #[tokio::test]
    async fn test_unconfigured_transfer_fails_at_presign() {
        let transfer = ObjectTransfer::new(
            Context::new(),
            PresignedUrlService::new(crate::Config::new()),
        );

        let err = transfer
            .copy_and_cleanup("docs", "a.pdf", "staging", "a.pdf")
            .await
            .unwrap_err();
        assert_eq!(err, TransferError::new(TransferStage::PresignFailed));

        let err = transfer.delete_object("docs", "a.pdf").await.unwrap_err();
        assert_eq!(err.stage, TransferStage::PresignFailed);

        let err = transfer
            .upload_from_path("/tmp/a.pdf", "docs", "a.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(err.stage, TransferStage::PresignFailed);
    }
}
