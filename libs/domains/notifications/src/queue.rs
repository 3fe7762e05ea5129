//! In-memory FIFO of pending notifications.
//!
//! The head entry stays in the queue while it is being dispatched so that
//! `GET /queue` reports it as `processing`. It is removed once dispatch
//! finishes, whatever the outcome.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::debug;
use uuid::Uuid;

use crate::models::{NewNotification, Notification, NotificationStatus, QueueSnapshot};

#[derive(Debug, Default)]
pub struct NotificationQueue {
    entries: Mutex<VecDeque<Notification>>,
    wake: Notify,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and wake the dispatcher.
    ///
    /// The queue assigns a fresh id and forces the status to `pending`.
    pub async fn enqueue(&self, request: NewNotification) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            notification_type: request.notification_type,
            status: NotificationStatus::Pending,
            recipient: request.recipient,
            metadata: request.metadata,
        };

        let depth = {
            let mut entries = self.entries.lock().await;
            entries.push_back(notification.clone());
            entries.len()
        };

        // A stored permit coalesces wakes that arrive while the dispatcher is busy.
        self.wake.notify_one();

        debug!(
            notification_id = %notification.id,
            notification_type = %notification.notification_type,
            depth,
            "Notification enqueued"
        );

        notification
    }

    /// Point-in-time copy of the queue contents, head first.
    pub async fn status(&self) -> QueueSnapshot {
        let entries = self.entries.lock().await;
        QueueSnapshot {
            count: entries.len(),
            notifications: entries.iter().cloned().collect(),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Mark the head as `processing` and hand back a copy of it.
    pub(crate) async fn begin_head(&self) -> Option<Notification> {
        let mut entries = self.entries.lock().await;
        let head = entries.front_mut()?;
        head.status = NotificationStatus::Processing;
        Some(head.clone())
    }

    /// Remove the head if it is still the entry with `id`.
    pub(crate) async fn complete_head(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.front() {
            Some(head) if head.id == id => {
                entries.pop_front();
                true
            }
            _ => false,
        }
    }

    /// Park until an enqueue signals or `timeout` elapses.
    pub(crate) async fn wait_for_work(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.wake.notified()).await;
    }
}
