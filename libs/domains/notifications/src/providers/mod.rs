//! Delivery transports.
//!
//! `EmailProvider` sends a rendered email to one address; `PushProvider`
//! delivers one payload to one browser subscription.

mod smtp;
mod webpush;

pub use smtp::{SmtpConfig, SmtpProvider};
pub use webpush::{DisabledPushProvider, PushConfig, WebPushProvider};

use crate::error::NotificationResult;
use crate::localization::PushText;
use crate::models::PushSubscription;
use async_trait::async_trait;
use serde::Serialize;

/// Icon shown next to every push notification.
pub const PUSH_ICON: &str = "/web-app-manifest-192x192.png";

/// Seconds a push service may hold an undelivered message.
pub const PUSH_TTL_SECS: u32 = 30;

/// Represents a sent email with provider-specific message ID.
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Provider-specific message ID for tracking.
    pub message_id: Option<String>,
    /// Whether the email was accepted for delivery.
    pub accepted: bool,
}

/// Email content ready for sending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailContent {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> NotificationResult<()>;
}

/// JSON body delivered to the service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub url: String,
}

impl PushPayload {
    pub fn new(text: PushText, url: impl Into<String>) -> Self {
        Self {
            title: text.title,
            body: text.message,
            icon: PUSH_ICON.to_string(),
            url: url.into(),
        }
    }
}

/// Result of a single push attempt that reached the push service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDelivery {
    Delivered,
    /// The endpoint no longer exists (HTTP 404/410) and should be forgotten.
    Gone,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> NotificationResult<PushDelivery>;

    fn name(&self) -> &'static str;
}
