//! Outgoing mail

use crate::Result;
use serde::{Deserialize, Serialize};

/// One email, sent to every address in `to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    /// Plain-text body
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
}

/// Mail transport
pub trait Mailer {
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Writes mail to the log instead of delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        log::info!(
            "Mail from {} to {}: {}",
            message.from,
            message.to.join(", "),
            message.subject
        );
        log::debug!("{}", message.body);
        Ok(())
    }
}

impl<M: Mailer + ?Sized> Mailer for &M {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        (**self).send(message)
    }
}
