//! Reqwest-backed mailer for JSON mail APIs.
//!
//! Sends `POST {endpoint}` with a bearer API key and a body of
//! `{"from", "to": [..], "subject", "text"}`, the shape accepted by common
//! transactional mail providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{MailMessage, Mailer, MailerError};
use crate::outbound::http_support::{body_preview, client};

/// Connection settings for [`HttpMailer`].
#[derive(Clone)]
pub struct HttpMailerConfig {
    /// Full URL of the send endpoint.
    pub endpoint: Url,
    /// API key sent as a bearer token.
    pub api_key: Zeroizing<String>,
    /// Sender address, e.g. `Pitchside <no-reply@pitchside.ng>`.
    pub from: String,
    /// Request timeout.
    pub timeout: Duration,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Delivers mail through an HTTP API.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    from: String,
}

impl HttpMailer {
    /// Build the mailer and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: HttpMailerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client(config.timeout)?,
            endpoint: config.endpoint,
            api_key: config.api_key,
            from: config.from,
        })
    }

    fn request<'a>(&'a self, message: &'a MailMessage) -> SendRequest<'a> {
        SendRequest {
            from: self.from.as_str(),
            to: [message.to.as_str()],
            subject: message.subject.as_str(),
            text: message.text.as_str(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&self.request(message))
            .send()
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %message.to, "mail accepted by provider");
            return Ok(());
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MailerError {
    let preview = body_preview(body);
    if status.is_server_error() {
        MailerError::transport(format!("status {}: {preview}", status.as_u16()))
    } else {
        MailerError::rejected(status.as_u16(), preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mailer() -> HttpMailer {
        HttpMailer::new(HttpMailerConfig {
            endpoint: Url::parse("https://mail.invalid/emails").expect("url"),
            api_key: Zeroizing::new("key".to_owned()),
            from: "Pitchside <no-reply@pitchside.ng>".into(),
            timeout: Duration::from_secs(5),
        })
        .expect("client")
    }

    #[rstest]
    fn request_body_addresses_one_recipient() {
        let mailer = mailer();
        let message = MailMessage {
            to: "fan@example.ng".into(),
            subject: "Reset your password".into(),
            text: "Follow the link".into(),
        };
        let body = serde_json::to_value(mailer.request(&message)).expect("serialise");
        assert_eq!(
            body,
            serde_json::json!({
                "from": "Pitchside <no-reply@pitchside.ng>",
                "to": ["fan@example.ng"],
                "subject": "Reset your password",
                "text": "Follow the link",
            })
        );
    }

    #[rstest]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, true)]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn client_errors_are_rejections(#[case] status: StatusCode, #[case] rejected: bool) {
        let err = map_status_error(status, b"{\"message\":\"nope\"}");
        assert_eq!(matches!(err, MailerError::Rejected { .. }), rejected);
    }
}
