//! Email and push providers that only log what they would have sent.

use crate::domain::errors::DomainError;
use crate::domain::notification::{EmailMessage, PushMessage};
use crate::domain::ports::{EmailSender, PushSender};

pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        log::info!("Email to {}: {}", message.to, message.subject);
        log::debug!("Email body:\n{}", message.text);
        Ok(())
    }
}

pub struct LogPushSender;

impl PushSender for LogPushSender {
    fn send(&self, recipient: &str, message: &PushMessage) -> Result<(), DomainError> {
        log::info!(
            "Push to user {} [{}]: {} - {} ({})",
            recipient,
            message.tag,
            message.title,
            message.body,
            message.click_target
        );
        Ok(())
    }
}
