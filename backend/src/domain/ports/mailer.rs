//! Port for outbound transactional e-mail.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by mail adapters.
    pub enum MailerError {
        /// The mail provider could not be reached.
        Transport { message: String } => "mail transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } => "mail rejected ({status}): {message}",
    }
}

/// Plain-text message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Port for delivering transactional e-mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `message`.
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError>;
}
