use super::models::Notification;
use super::templates::{render, RenderedEmail};
use crate::document::Document;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to deliver notification to {recipient}: {reason}")]
    Delivery { recipient: String, reason: String },
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound notification channel.
///
/// Delivery is best-effort: callers log failures and never roll back the operation that
/// produced the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError>;

    /// Called after a document has been stored and is waiting for moderation.
    /// Administrators are not emailed about new uploads, so nothing happens by default.
    async fn document_submitted(&self, _document: &Document) {}
}

/// Writes rendered emails to the log instead of sending them.
pub struct LogNotifier {
    sender_name: String,
}

impl LogNotifier {
    pub fn new(sender_name: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        let email = render(notification, &self.sender_name);
        info!(
            "Email to {}: \"{}\"\n{}",
            recipient, email.subject, email.body
        );
        Ok(())
    }
}

/// Keeps every notification in memory, optionally refusing to deliver.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    failing: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later `notify` call fails with a delivery error and records nothing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::Delivery {
                recipient: recipient.to_string(),
                reason: "notifier is switched off".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), notification.clone()));
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts rendered emails as JSON to an HTTP mail relay.
pub struct MailRelayNotifier {
    client: reqwest::Client,
    relay_url: String,
    from_address: String,
    sender_name: String,
}

impl MailRelayNotifier {
    pub fn new(
        relay_url: String,
        from_address: String,
        sender_name: String,
        timeout_sec: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create mail relay HTTP client")?;
        Ok(Self {
            client,
            relay_url,
            from_address,
            sender_name,
        })
    }

    async fn send(&self, recipient: &str, email: &RenderedEmail) -> Result<(), NotificationError> {
        let message = RelayMessage {
            from: &self.from_address,
            to: recipient,
            subject: &email.subject,
            body: &email.body,
        };
        let response = self
            .client
            .post(&self.relay_url)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::Delivery {
                recipient: recipient.to_string(),
                reason: format!("mail relay answered with status {}", response.status()),
            });
        }
        debug!("Relayed \"{}\" to {}", email.subject, recipient);
        Ok(())
    }
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        let email = render(notification, &self.sender_name);
        self.send(recipient, &email).await
    }
}
