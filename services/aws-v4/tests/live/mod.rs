//! Tests against a real S3 bucket.
//!
//! Enabled with `OBJSIGN_AWS_V4_TEST=on`, the bucket and credential come from
//! `OBJSIGN_AWS_V4_*` env values (a `.env` file is loaded if present).

use std::env;
use std::time::Duration;

use anyhow::Result;
use http::StatusCode;
use log::{debug, warn};
use objsign_aws_v4::{Config, ObjectTransfer, PresignedUrlService};
use objsign_core::Context;
use objsign_file_read_tokio::TokioFileRead;
use objsign_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;

fn init_live_test() -> Option<(Context, Config, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("OBJSIGN_AWS_V4_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let config = Config::new()
        .with_access_key_id(
            env::var("OBJSIGN_AWS_V4_ACCESS_KEY").expect("env OBJSIGN_AWS_V4_ACCESS_KEY must set"),
        )
        .with_secret_access_key(
            env::var("OBJSIGN_AWS_V4_SECRET_KEY").expect("env OBJSIGN_AWS_V4_SECRET_KEY must set"),
        )
        .with_region(env::var("OBJSIGN_AWS_V4_REGION").expect("env OBJSIGN_AWS_V4_REGION must set"));
    let config = match env::var("OBJSIGN_AWS_V4_SESSION_TOKEN") {
        Ok(token) => config.with_session_token(token),
        Err(_) => config,
    };
    let bucket = env::var("OBJSIGN_AWS_V4_BUCKET").expect("env OBJSIGN_AWS_V4_BUCKET must set");

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default());

    Some((ctx, config, bucket))
}

#[tokio::test]
async fn test_presigned_get_not_found() -> Result<()> {
    let Some((_, config, bucket)) = init_live_test() else {
        warn!("OBJSIGN_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let url = PresignedUrlService::new(config)
        .presign_get(&bucket, "not_exist_file", Duration::from_secs(3600))
        .expect("presign must succeed");
    debug!("presigned url: {url}");

    let resp = Client::new().get(url).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_upload_copy_and_cleanup() -> Result<()> {
    let Some((ctx, config, bucket)) = init_live_test() else {
        warn!("OBJSIGN_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("upload.txt");
    tokio::fs::write(&path, b"objsign live test").await?;

    let transfer = ObjectTransfer::new(ctx, PresignedUrlService::new(config));
    let src = "objsign/live/source.txt";
    let dst = "objsign/live/copy.txt";

    let outcome = transfer
        .upload_from_path(&path.to_string_lossy(), &bucket, src, "text/plain")
        .await?;
    assert_eq!(outcome.bytes, 17);

    transfer.copy_and_cleanup(&bucket, src, &bucket, dst).await?;
    transfer.delete_object(&bucket, src).await?;
    Ok(())
}
