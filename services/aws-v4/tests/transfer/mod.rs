use std::io::Write;

use anyhow::Result;
use http::{header, Method};
use objsign_aws_v4::{ObjectTransfer, PresignedUrlService, TransferOutcome, TransferStage};
use objsign_core::Context;
use objsign_file_read_tokio::TokioFileRead;
use pretty_assertions::assert_eq;

use super::{init_test, test_config, test_time, MockHttpSend};

fn transfer(http: &MockHttpSend) -> ObjectTransfer {
    init_test();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(http.clone());
    let presigner = PresignedUrlService::new(
        test_config()
            .with_bucket_alias("staging", "acme-staging")
            .with_copy_bucket("staging", "us-east-1"),
    )
    .with_time(test_time());

    ObjectTransfer::new(ctx, presigner)
}

#[tokio::test]
async fn test_copy_and_cleanup() -> Result<()> {
    let http = MockHttpSend::new()
        .respond(Method::GET, 200, "%PDF-1.4 contrato")
        .respond(Method::PUT, 200, "")
        .respond(Method::DELETE, 204, "");

    let outcome = transfer(&http)
        .copy_and_cleanup("docs", "contratos/1.pdf", "staging", "tmp/1.pdf")
        .await?;
    assert_eq!(
        outcome,
        TransferOutcome {
            status: 200,
            bytes: 17
        }
    );

    let requests = http.requests();
    assert_eq!(
        requests.iter().map(|r| r.method.clone()).collect::<Vec<_>>(),
        vec![Method::GET, Method::PUT, Method::DELETE]
    );

    let (get, put, delete) = (&requests[0], &requests[1], &requests[2]);
    assert_eq!(
        get.uri.host(),
        Some("docs.s3.sa-east-1.amazonaws.com")
    );
    assert_eq!(get.uri.path(), "/contratos/1.pdf");

    // The copy destination goes through the alias and the copy region.
    assert_eq!(put.uri.host(), Some("acme-staging.s3.us-east-1.amazonaws.com"));
    assert_eq!(put.body, "%PDF-1.4 contrato");
    assert_eq!(put.headers[header::CONTENT_LENGTH], "17");
    assert_eq!(put.headers[header::CONTENT_TYPE], "application/octet-stream");

    // Cleanup removes the destination, not the source.
    assert_eq!(delete.uri.host(), Some("acme-staging.s3.us-east-1.amazonaws.com"));
    assert_eq!(delete.uri.path(), "/tmp/1.pdf");

    for r in &requests {
        assert!(r.uri.query().unwrap().contains("X-Amz-Signature="));
        assert_eq!(r.timeout.as_secs(), 5);
    }
    Ok(())
}

#[tokio::test]
async fn test_copy_and_cleanup_stops_when_put_fails() {
    let http = MockHttpSend::new()
        .respond(Method::GET, 200, "content")
        .respond(Method::PUT, 403, "<Error><Code>AccessDenied</Code></Error>")
        .respond(Method::DELETE, 204, "");

    let err = transfer(&http)
        .copy_and_cleanup("docs", "a.pdf", "staging", "a.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.stage, TransferStage::DestPutFailed);
    assert_eq!(err.status, 403);
    assert_eq!(err.body, "<Error><Code>AccessDenied</Code></Error>");
    assert_eq!(err.to_string(), "dest_put_failed (status 403)");

    assert_eq!(http.calls(&Method::GET), 1);
    assert_eq!(http.calls(&Method::PUT), 1);
    assert_eq!(http.calls(&Method::DELETE), 0);
}

#[tokio::test]
async fn test_copy_object_source_fetch_failed() {
    let http = MockHttpSend::new()
        .respond(Method::GET, 404, "<Error><Code>NoSuchKey</Code></Error>")
        .respond(Method::PUT, 200, "");

    let err = transfer(&http)
        .copy_object("docs", "missing.pdf", "staging", "missing.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.stage, TransferStage::SourceFetchFailed);
    assert_eq!(err.status, 404);
    assert_eq!(http.calls(&Method::PUT), 0);
}

#[tokio::test]
async fn test_copy_object_transport_failure() {
    // No canned GET response: the mock refuses the connection.
    let http = MockHttpSend::new().respond(Method::PUT, 200, "");

    let err = transfer(&http)
        .copy_object("docs", "a.pdf", "staging", "a.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.stage, TransferStage::SourceFetchFailed);
    assert_eq!(err.status, 0);
    assert!(err.body.is_empty());
}

#[tokio::test]
async fn test_delete_object_failed() {
    let http = MockHttpSend::new().respond(Method::DELETE, 500, "internal error");

    let err = transfer(&http)
        .delete_object("staging", "a.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.stage, TransferStage::DestDeleteFailed);
    assert_eq!(err.status, 500);
}

#[tokio::test]
async fn test_upload_from_path() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"\x89PNG\r\n\x1a\nfoto")?;
    let path = file.path().to_string_lossy().to_string();

    let http = MockHttpSend::new().respond(Method::PUT, 200, "");

    let outcome = transfer(&http)
        .upload_from_path(&path, "docs", "fotos/a b.png", "image/png")
        .await?;
    assert_eq!(outcome.bytes, 12);

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].uri.path(), "/fotos/a%20b.png");
    assert_eq!(requests[0].headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(requests[0].headers[header::CONTENT_LENGTH], "12");
    assert_eq!(requests[0].body, &b"\x89PNG\r\n\x1a\nfoto"[..]);
    Ok(())
}

#[tokio::test]
async fn test_upload_from_missing_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing.png");

    let http = MockHttpSend::new().respond(Method::PUT, 200, "");

    let err = transfer(&http)
        .upload_from_path(&path.to_string_lossy(), "docs", "a.png", "image/png")
        .await
        .unwrap_err();

    assert_eq!(err.stage, TransferStage::FileReadFailed);
    assert!(http.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_upload_failed() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"content")?;

    let http = MockHttpSend::new().respond(Method::PUT, 400, "<Error/>");

    let err = transfer(&http)
        .upload_from_path(
            &file.path().to_string_lossy(),
            "docs",
            "a.txt",
            "text/plain",
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage, TransferStage::UploadFailed);
    assert_eq!(err.status, 400);
    Ok(())
}
