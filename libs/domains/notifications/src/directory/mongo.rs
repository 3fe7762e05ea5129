//! MongoDB-backed user directory.

use async_trait::async_trait;
use database::mongodb::{check_health, Client, Collection};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::Deserialize;
use tracing::{debug, warn};

use super::UserDirectory;
use crate::error::NotificationResult;
use crate::models::{PushSubscription, User};

const USER_COLLECTION: &str = "User";
const SUBSCRIPTION_COLLECTION: &str = "PushSubscription";

#[derive(Debug, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "emailNotifications", default)]
    email_notifications: bool,
    #[serde(default)]
    language: Option<String>,
}

impl UserDocument {
    /// Accounts without an email address cannot be notified and are skipped.
    fn into_user(self) -> Option<User> {
        let email = self.email.filter(|e| !e.is_empty())?;
        Some(User {
            id: self.id.to_hex(),
            email,
            email_notifications: self.email_notifications,
            language: self.language,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SubscriptionDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "userId")]
    user_id: ObjectId,
    endpoint: String,
    p256dh: String,
    auth: String,
}

impl From<SubscriptionDocument> for PushSubscription {
    fn from(doc: SubscriptionDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            user_id: doc.user_id.to_hex(),
            endpoint: doc.endpoint,
            p256dh: doc.p256dh,
            auth: doc.auth,
        }
    }
}

/// Parse hex ids, dropping (and logging) any that are malformed.
fn object_ids(ids: &[String]) -> Vec<ObjectId> {
    ids.iter()
        .filter_map(|id| match ObjectId::parse_str(id) {
            Ok(oid) => Some(oid),
            Err(e) => {
                warn!(user_id = %id, error = %e, "Skipping malformed user id");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MongoUserDirectory {
    client: Client,
    users: Collection<UserDocument>,
    subscriptions: Collection<SubscriptionDocument>,
}

impl MongoUserDirectory {
    pub fn new(client: Client, database: &str) -> Self {
        let db = client.database(database);
        Self {
            users: db.collection(USER_COLLECTION),
            subscriptions: db.collection(SUBSCRIPTION_COLLECTION),
            client,
        }
    }

    async fn find_users(&self, filter: Document) -> NotificationResult<Vec<User>> {
        let docs: Vec<UserDocument> = self.users.find(filter).await?.try_collect().await?;
        Ok(docs.into_iter().filter_map(UserDocument::into_user).collect())
    }

    async fn find_subscriptions(&self, filter: Document) -> NotificationResult<Vec<PushSubscription>> {
        let docs: Vec<SubscriptionDocument> = self.subscriptions.find(filter).await?.try_collect().await?;
        Ok(docs.into_iter().map(PushSubscription::from).collect())
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn find_by_email(&self, email: &str) -> NotificationResult<Option<User>> {
        let doc = self.users.find_one(doc! { "email": email }).await?;
        Ok(doc.and_then(UserDocument::into_user))
    }

    async fn find_by_id(&self, id: &str) -> NotificationResult<Option<User>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            debug!(user_id = %id, "Lookup with malformed user id");
            return Ok(None);
        };
        let doc = self.users.find_one(doc! { "_id": oid }).await?;
        Ok(doc.and_then(UserDocument::into_user))
    }

    async fn opted_in_users(&self) -> NotificationResult<Vec<User>> {
        self.find_users(doc! { "emailNotifications": true }).await
    }

    async fn mentioned_users(&self, ids: &[String], exclude_email: &str) -> NotificationResult<Vec<User>> {
        let oids = object_ids(ids);
        if oids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_users(doc! {
            "_id": { "$in": oids },
            "emailNotifications": true,
            "email": { "$ne": exclude_email },
        })
        .await
    }

    async fn subscriptions_for_users(&self, user_ids: &[String]) -> NotificationResult<Vec<PushSubscription>> {
        let oids = object_ids(user_ids);
        if oids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_subscriptions(doc! { "userId": { "$in": oids } }).await
    }

    async fn all_subscriptions(&self) -> NotificationResult<Vec<PushSubscription>> {
        self.find_subscriptions(doc! {}).await
    }

    async fn delete_subscription(&self, id: &str) -> NotificationResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.subscriptions.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> NotificationResult<()> {
        check_health(&self.client).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_object_ids_skips_malformed() {
        let valid = ObjectId::new().to_hex();
        let ids = vec![valid.clone(), "not-an-id".to_string(), String::new()];
        let parsed = object_ids(&ids);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].to_hex(), valid);
    }

    #[test]
    fn test_user_document_mapping() {
        let oid = ObjectId::new();
        let raw = doc! {
            "_id": oid,
            "email": "ana@x.com",
            "emailNotifications": true,
            "language": "ca",
            "name": "Ana",
        };
        let user = bson::from_document::<UserDocument>(raw).unwrap().into_user().unwrap();
        assert_eq!(user.id, oid.to_hex());
        assert!(user.email_notifications);
        assert_eq!(user.language.as_deref(), Some("ca"));
    }

    #[test]
    fn test_user_without_email_is_skipped() {
        let raw = doc! { "_id": ObjectId::new(), "emailNotifications": true };
        let parsed = bson::from_document::<UserDocument>(raw).unwrap();
        assert!(parsed.into_user().is_none());
    }

    #[test]
    fn test_subscription_document_mapping() {
        let user = ObjectId::new();
        let raw = doc! {
            "_id": ObjectId::new(),
            "userId": user,
            "endpoint": "https://push.example.com/1",
            "p256dh": "key",
            "auth": "secret",
        };
        let sub: PushSubscription = bson::from_document::<SubscriptionDocument>(raw).unwrap().into();
        assert_eq!(sub.user_id, user.to_hex());
        assert_eq!(sub.endpoint, "https://push.example.com/1");
    }
}
