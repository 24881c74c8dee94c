//! Transactional mail adapters.
//!
//! [`HttpMailer`] posts messages to a JSON mail API; [`LogMailer`] only logs
//! them and is used when no API key is configured.

mod http_mailer;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{MailMessage, Mailer, MailerError};

pub use http_mailer::{HttpMailer, HttpMailerConfig};

/// Mailer that records each message in the log instead of sending it.
///
/// The body is not logged; it carries reset tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        info!(to = %message.to, subject = %message.subject, "mail delivery disabled; message dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let message = MailMessage {
            to: "fan@example.ng".into(),
            subject: "Reset your password".into(),
            text: "secret link".into(),
        };
        assert_eq!(LogMailer.send(&message).await, Ok(()));
    }
}
