use std::env;

use anyhow::Result;
use objsign::aws::default_presigner;

/// Print presigned urls for an object.
///
/// ```shell
/// AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... AWS_REGION=sa-east-1 \
///   cargo run --example presign -- docs folder/file.pdf
/// ```
fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let bucket = args.next().unwrap_or_else(|| "docs".to_string());
    let key = args.next().unwrap_or_else(|| "folder/file.pdf".to_string());

    let presigner = default_presigner();
    let expires = presigner.default_expires();

    for (method, url) in [
        ("GET", presigner.presign_get(&bucket, &key, expires)),
        ("PUT", presigner.presign_put(&bucket, &key, expires)),
        ("DELETE", presigner.presign_delete(&bucket, &key, expires)),
    ] {
        match url {
            Some(url) => println!("{method}: {url}"),
            None => eprintln!("{method}: not configured, see the logs"),
        }
    }

    Ok(())
}
