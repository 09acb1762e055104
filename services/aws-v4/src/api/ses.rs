use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, Request};
use objsign_core::time::DateTime;
use objsign_core::{Context, Error, Result};
use quick_xml::de;
use serde::Deserialize;

use super::{ApiClient, ApiError, ApiResponse, ApiResult};
use crate::constants::*;
use crate::Config;

/// An email sent through SES `SendEmail`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// Sender address.
    pub source: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Reply-To addresses.
    pub reply_to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: Option<String>,
    /// Plain text body.
    pub text: Option<String>,
}

impl EmailMessage {
    /// Create a new message without body.
    pub fn new(source: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            to: vec![to.into()],
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Add a recipient.
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Add a Reply-To address.
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to.push(reply_to.into());
        self
    }

    /// Set the HTML body.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the plain text body.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Encode as a `SendEmail` form body.
    pub fn to_form(&self) -> Result<String> {
        if self.source.is_empty() {
            return Err(Error::request_invalid("email source is empty"));
        }
        if self.to.is_empty() {
            return Err(Error::request_invalid("email has no recipient"));
        }
        if self.html.is_none() && self.text.is_none() {
            return Err(Error::request_invalid("email has no body"));
        }

        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("Action", "SendEmail")
            .append_pair("Version", SES_API_VERSION)
            .append_pair("Source", &self.source);
        for (i, to) in self.to.iter().enumerate() {
            form.append_pair(&format!("Destination.ToAddresses.member.{}", i + 1), to);
        }
        for (i, reply_to) in self.reply_to.iter().enumerate() {
            form.append_pair(&format!("ReplyToAddresses.member.{}", i + 1), reply_to);
        }
        form.append_pair("Message.Subject.Data", &self.subject)
            .append_pair("Message.Subject.Charset", "UTF-8");
        if let Some(html) = &self.html {
            form.append_pair("Message.Body.Html.Data", html)
                .append_pair("Message.Body.Html.Charset", "UTF-8");
        }
        if let Some(text) = &self.text {
            form.append_pair("Message.Body.Text.Data", text)
                .append_pair("Message.Body.Text.Charset", "UTF-8");
        }

        Ok(form.finish())
    }
}

/// SendEmailClient calls SES `SendEmail`.
#[derive(Debug, Clone)]
pub struct SendEmailClient {
    inner: ApiClient,
}

impl SendEmailClient {
    /// Create a new client.
    pub fn new(ctx: Context, config: impl Into<Arc<Config>>) -> Self {
        Self {
            inner: ApiClient::new(ctx, config, SES_SERVICE, SES_UNCONFIGURED),
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

    /// Send the given message.
    ///
    /// Nothing is sent if the client is not fully configured.
    pub async fn send_email(&self, message: &EmailMessage) -> ApiResult {
        let resolved = self.inner.resolve()?;

        let req = build_request(&resolved.region, message)
            .map_err(|err| ApiError::without_response(err.to_string()))?;

        self.inner.send(&resolved, req).await
    }
}

fn build_request(region: &str, message: &EmailMessage) -> Result<Request<Bytes>> {
    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("https://email.{region}.amazonaws.com/"))
        .header(header::CONTENT_TYPE, CONTENT_TYPE_FORM)
        .body(Bytes::from(message.to_form()?))?;
    Ok(req)
}

/// Decoded `SendEmail` response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendEmailOutput {
    /// Id SES assigned to the message.
    pub message_id: String,
    /// Id of the request, useful when talking to AWS support.
    pub request_id: Option<String>,
}

impl SendEmailOutput {
    /// Decode a successful `SendEmail` response.
    pub fn from_response(resp: &ApiResponse) -> Result<Self> {
        let body = std::str::from_utf8(&resp.body)?;
        let out: SendEmailResponse = de::from_str(body).map_err(|e| {
            Error::unexpected("failed to parse SendEmail response").with_source(e)
        })?;

        if out.result.message_id.is_empty() {
            return Err(Error::unexpected("SendEmail response has no MessageId"));
        }

        Ok(Self {
            message_id: out.result.message_id,
            request_id: Some(out.response_metadata.request_id).filter(|v| !v.is_empty()),
        })
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SendEmailResponse {
    #[serde(rename = "SendEmailResult")]
    result: SendEmailResult,
    response_metadata: ResponseMetadata,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SendEmailResult {
    message_id: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResponseMetadata {
    request_id: String,
}
