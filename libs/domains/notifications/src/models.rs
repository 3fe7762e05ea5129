//! Data models for the notifications domain.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::NotificationError;

/// Free-form string payload attached to a notification.
pub type Metadata = HashMap<String, String>;

// ============================================================================
// Notification
// ============================================================================

/// Closed set of notification types accepted by the relay.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewComment,
    NewLike,
    NewRecipe,
    NotificationsActivated,
    ForgotPassword,
    MentionInComment,
    NewBlog,
    NewEvent,
    EventEndingSoon,
    NewQuest,
    QuestFulfilled,
}

/// Processing state of a notification.
///
/// Queue entries are only ever `pending` or `processing`; the terminal states
/// appear on dispatch reports once an entry has left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// The unit of work held by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: Metadata,
}

impl Notification {
    /// Non-empty metadata value for `key`.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Copy addressed to a single broadcast recipient, with its own identity.
    pub fn for_recipient(&self, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type: self.notification_type,
            status: NotificationStatus::Processing,
            recipient: Some(email.to_string()),
            metadata: self.metadata.clone(),
        }
    }
}

/// Validated input for `NotificationQueue::enqueue`. Carries no id or status;
/// both are assigned by the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub recipient: Option<String>,
    pub metadata: Metadata,
}

impl NewNotification {
    pub fn new(notification_type: NotificationType) -> Self {
        Self {
            notification_type,
            recipient: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// HTTP payloads
// ============================================================================

/// Body of `POST /notifications`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNotification {
    /// Wire name of the notification type, e.g. `NEW_LIKE`
    #[serde(rename = "type", default)]
    #[validate(length(min = 1, message = "Notification type is required"))]
    pub notification_type: String,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl TryFrom<CreateNotification> for NewNotification {
    type Error = NotificationError;

    fn try_from(body: CreateNotification) -> Result<Self, Self::Error> {
        let raw = body.notification_type.trim();
        let notification_type = NotificationType::from_str(raw)
            .map_err(|_| NotificationError::InvalidType(raw.to_string()))?;

        Ok(Self {
            notification_type,
            recipient: body
                .recipient
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            metadata: body.metadata.unwrap_or_default(),
        })
    }
}

/// Body of `GET /queue`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueSnapshot {
    pub count: usize,
    pub notifications: Vec<Notification>,
}

// ============================================================================
// Directory records
// ============================================================================

/// A directory user, read-only from the relay's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub email_notifications: bool,
    pub language: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            email_notifications: false,
            language: None,
        }
    }

    pub fn opted_in(mut self) -> Self {
        self.email_notifications = true;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// A browser push endpoint registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: String,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}
