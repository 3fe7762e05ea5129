//! Read access to users and their push subscriptions.

mod mongo;

pub use mongo::MongoUserDirectory;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::NotificationResult;
use crate::models::{PushSubscription, User};

/// Lookups the dispatcher needs to resolve recipients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> NotificationResult<Option<User>>;

    async fn find_by_id(&self, id: &str) -> NotificationResult<Option<User>>;

    /// Every user with email notifications enabled.
    async fn opted_in_users(&self) -> NotificationResult<Vec<User>>;

    /// Opted-in users among `ids`, minus the one whose email is `exclude_email`.
    async fn mentioned_users(&self, ids: &[String], exclude_email: &str) -> NotificationResult<Vec<User>>;

    async fn subscriptions_for_users(&self, user_ids: &[String]) -> NotificationResult<Vec<PushSubscription>>;

    async fn all_subscriptions(&self) -> NotificationResult<Vec<PushSubscription>>;

    /// Forget a subscription. Returns whether it existed.
    async fn delete_subscription(&self, id: &str) -> NotificationResult<bool>;

    async fn health_check(&self) -> NotificationResult<()>;
}

/// Directory held in process memory. Used in tests and when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<Vec<User>>>,
    subscriptions: Arc<RwLock<Vec<PushSubscription>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users.into_iter().collect())),
            subscriptions: Arc::default(),
        }
    }

    pub async fn add_user(&self, user: User) {
        self.users.write().await.push(user);
    }

    pub async fn add_subscription(&self, subscription: PushSubscription) {
        self.subscriptions.write().await.push(subscription);
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> NotificationResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> NotificationResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn opted_in_users(&self) -> NotificationResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.email_notifications).cloned().collect())
    }

    async fn mentioned_users(&self, ids: &[String], exclude_email: &str) -> NotificationResult<Vec<User>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| wanted.contains(u.id.as_str()))
            .filter(|u| u.email_notifications && u.email != exclude_email)
            .cloned()
            .collect())
    }

    async fn subscriptions_for_users(&self, user_ids: &[String]) -> NotificationResult<Vec<PushSubscription>> {
        let wanted: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .iter()
            .filter(|s| wanted.contains(s.user_id.as_str()))
            .cloned()
            .collect())
    }

    async fn all_subscriptions(&self) -> NotificationResult<Vec<PushSubscription>> {
        Ok(self.subscriptions.read().await.clone())
    }

    async fn delete_subscription(&self, id: &str) -> NotificationResult<bool> {
        let mut subscriptions = self.subscriptions.write().await;
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        Ok(subscriptions.len() != before)
    }

    async fn health_check(&self) -> NotificationResult<()> {
        Ok(())
    }
}
