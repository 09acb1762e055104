use anyhow::Result;
use http::{header, Method};
use objsign_aws_v4::{
    CompareFacesClient, CompareFacesOutput, EmailMessage, S3ObjectRef, SendEmailClient,
    SendEmailOutput,
};
use objsign_core::Context;
use pretty_assertions::assert_eq;

use super::{init_test, test_config, test_time, MockHttpSend};

fn context(http: &MockHttpSend) -> Context {
    init_test();
    Context::new().with_http_send(http.clone())
}

#[tokio::test]
async fn test_compare_faces_unconfigured() {
    let http = MockHttpSend::new().respond(Method::POST, 200, "{}");

    let mut config = test_config();
    config.secret_access_key = None;
    let client = CompareFacesClient::new(context(&http), config);

    let err = client
        .compare_faces(
            &S3ObjectRef::new("selfies", "a.jpg"),
            &S3ObjectRef::new("documents", "b.jpg"),
            80.0,
        )
        .await
        .unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(err.message, "Configuración AWS Rekognition incompleta");
    assert!(err.body.is_empty());
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_compare_faces_signing_failure() {
    let http = MockHttpSend::new().respond(Method::POST, 200, "{}");
    let client = CompareFacesClient::new(
        context(&http),
        test_config().with_session_token("broken\ntoken"),
    );

    let err = client
        .compare_faces(
            &S3ObjectRef::new("selfies", "a.jpg"),
            &S3ObjectRef::new("documents", "b.jpg"),
            80.0,
        )
        .await
        .unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(err.message, "failed to parse header value");
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_compare_faces() -> Result<()> {
    let http = MockHttpSend::new().respond(
        Method::POST,
        200,
        r#"{"FaceMatches":[{"Similarity":99.5}],"UnmatchedFaces":[]}"#,
    );
    let client = CompareFacesClient::new(
        context(&http),
        test_config()
            .with_region("us-east-1")
            .with_session_token("session-token"),
    )
    .with_time(test_time());

    let resp = client
        .compare_faces(
            &S3ObjectRef::new("selfies", "a.jpg"),
            &S3ObjectRef::new("documents", "b.jpg"),
            80.0,
        )
        .await?;
    assert_eq!(resp.status, 200);
    assert_eq!(
        CompareFacesOutput::from_response(&resp)?.best_similarity(),
        Some(99.5)
    );

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(
        req.uri.to_string(),
        "https://rekognition.us-east-1.amazonaws.com/"
    );
    assert_eq!(req.headers["x-amz-target"], "RekognitionService.CompareFaces");
    assert_eq!(req.headers["x-amz-date"], "20240301T120000Z");
    assert_eq!(req.headers["x-amz-security-token"], "session-token");

    let authorization = req.headers[header::AUTHORIZATION].to_str()?;
    assert!(authorization.starts_with(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240301/us-east-1/rekognition/aws4_request, \
         SignedHeaders=content-type;host;x-amz-date;x-amz-security-token;x-amz-target, \
         Signature="
    ));
    Ok(())
}

#[tokio::test]
async fn test_compare_faces_non_success_status() {
    let http = MockHttpSend::new().respond(
        Method::POST,
        400,
        r#"{"__type":"InvalidS3ObjectException","Message":"Unable to get object metadata from S3."}"#,
    );
    let client = CompareFacesClient::new(context(&http), test_config());

    let err = client
        .compare_faces(
            &S3ObjectRef::new("selfies", "missing.jpg"),
            &S3ObjectRef::new("documents", "b.jpg"),
            80.0,
        )
        .await
        .unwrap_err();

    assert_eq!(err.status, 400);
    assert!(err.body.starts_with(b"{\"__type\":\"InvalidS3ObjectException\""));
    assert_eq!(http.calls(&Method::POST), 1);
}

#[tokio::test]
async fn test_send_email_unconfigured() {
    let http = MockHttpSend::new().respond(Method::POST, 200, "");

    let mut config = test_config();
    config.region = None;
    let client = SendEmailClient::new(context(&http), config);

    let err = client
        .send_email(&EmailMessage::new("a@acme.test", "b@acme.test", "Hola").with_text("Hola"))
        .await
        .unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(err.message, "Configuración AWS SES incompleta");
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_send_email() -> Result<()> {
    let http = MockHttpSend::new().respond(
        Method::POST,
        200,
        r#"<SendEmailResponse xmlns="http://ses.amazonaws.com/doc/2010-12-01/">
  <SendEmailResult><MessageId>0100018e-abcd</MessageId></SendEmailResult>
  <ResponseMetadata><RequestId>5b2f8f9c-1234</RequestId></ResponseMetadata>
</SendEmailResponse>"#,
    );
    let client = SendEmailClient::new(context(&http), test_config()).with_time(test_time());

    let message = EmailMessage::new("no-reply@acme.test", "ana@acme.test", "Contrato listo")
        .with_html("<p>Hola</p>")
        .with_text("Hola");
    let resp = client.send_email(&message).await?;
    assert_eq!(
        SendEmailOutput::from_response(&resp)?.message_id,
        "0100018e-abcd"
    );

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.uri.to_string(), "https://email.sa-east-1.amazonaws.com/");
    assert!(req.headers.get("x-amz-target").is_none());
    assert_eq!(req.body, message.to_form()?);

    let authorization = req.headers[header::AUTHORIZATION].to_str()?;
    assert!(authorization.contains("/20240301/sa-east-1/ses/aws4_request, "));
    assert!(authorization.contains("SignedHeaders=content-type;host;x-amz-date, "));
    Ok(())
}

#[tokio::test]
async fn test_send_email_transport_failure() {
    // No canned response: the mock refuses the connection.
    let http = MockHttpSend::new();
    let client = SendEmailClient::new(context(&http), test_config());

    let err = client
        .send_email(&EmailMessage::new("a@acme.test", "b@acme.test", "Hola").with_text("Hola"))
        .await
        .unwrap_err();

    assert_eq!(err.status, 0);
    assert!(err.message.contains("connection refused"));
    assert_eq!(http.calls(&Method::POST), 1);
}
