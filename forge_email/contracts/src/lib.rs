use std::{future::Future, time::Duration};

use forge_models::email_address::EmailAddressWithName;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Make exactly one attempt to hand `email` to the mail transport.
    fn send(&self, email: Email) -> impl Future<Output = Result<(), EmailSendError>> + Send;

    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: EmailBody,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    Html(String),
    /// Both views of the same content, the client picks one.
    Alternative { text: String, html: String },
}

#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("The mail server rejected the message: {0}")]
    Rejected(String),
    #[error("The mail server did not respond within {0:?}")]
    Timeout(Duration),
    #[error("Failed to deliver the message: {0:#}")]
    Transport(#[source] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Result<(), EmailSendError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_ping(mut self, result: anyhow::Result<()>) -> Self {
        self.expect_ping()
            .once()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}
