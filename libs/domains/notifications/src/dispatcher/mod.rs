//! The single consumer of the notification queue.
//!
//! The loop parks until an enqueue wakes it or the poll interval elapses,
//! then drains the queue head by head. Each head is routed by type, its
//! emails are sent synchronously, and push deliveries are handed to the
//! background fan-out.

mod config;
mod fanout;

pub use config::DispatcherConfig;
pub use fanout::{FanoutSummary, PushContent, PushFanout};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::error::{NotificationError, NotificationResult};
use crate::localization::{push_text, resolve_language, Language};
use crate::models::{Notification, NotificationStatus, NotificationType, PushSubscription, User};
use crate::providers::{EmailContent, EmailProvider, PushPayload, PushProvider};
use crate::queue::NotificationQueue;
use crate::routing::{parse_mentions, Route};
use crate::templates::EmailRenderer;

/// Outcome of processing one queue head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub notification_id: Uuid,
    pub notification_type: NotificationType,
    /// `Completed` or `Failed`.
    pub status: NotificationStatus,
    pub emails_sent: usize,
    pub emails_failed: usize,
    /// Push deliveries handed to the background fan-out.
    pub push_queued: usize,
    pub error: Option<String>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> bool {
        self.status == NotificationStatus::Completed
    }
}

#[derive(Debug, Default)]
struct Delivery {
    success: bool,
    emails_sent: usize,
    emails_failed: usize,
    push_queued: usize,
    error: Option<String>,
}

impl Delivery {
    fn failed(error: &NotificationError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

pub struct Dispatcher {
    queue: Arc<NotificationQueue>,
    directory: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailProvider>,
    renderer: Arc<EmailRenderer>,
    push: PushFanout,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<NotificationQueue>,
        directory: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailProvider>,
        push: Arc<dyn PushProvider>,
        renderer: Arc<EmailRenderer>,
        config: DispatcherConfig,
    ) -> Self {
        let push = PushFanout::new(
            push,
            directory.clone(),
            config.push_max_concurrency,
            config.lookup_timeout,
            config.push_timeout,
        );

        Self {
            queue,
            directory,
            email,
            renderer,
            push,
            config,
        }
    }

    pub fn queue(&self) -> &Arc<NotificationQueue> {
        &self.queue
    }

    pub fn push(&self) -> &PushFanout {
        &self.push
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    /// A notification already being processed runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval = ?self.config.poll_interval,
            email_provider = self.email.name(),
            "Notification dispatcher started"
        );

        loop {
            if stopping(&shutdown) {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = self.queue.wait_for_work(self.config.poll_interval) => {}
            }

            while !stopping(&shutdown) {
                if self.process_next().await.is_none() {
                    break;
                }
            }
        }

        info!("Notification dispatcher stopped");
    }

    /// Process the queue head, if any, and remove it afterwards.
    pub async fn process_next(&self) -> Option<DispatchReport> {
        let notification = self.queue.begin_head().await?;
        let started = Instant::now();

        info!(
            notification_id = %notification.id,
            notification_type = %notification.notification_type,
            recipient = notification.recipient.as_deref().unwrap_or("-"),
            "Processing notification"
        );

        let delivery = self.dispatch(&notification).await;
        self.queue.complete_head(notification.id).await;

        let report = DispatchReport {
            notification_id: notification.id,
            notification_type: notification.notification_type,
            status: if delivery.success {
                NotificationStatus::Completed
            } else {
                NotificationStatus::Failed
            },
            emails_sent: delivery.emails_sent,
            emails_failed: delivery.emails_failed,
            push_queued: delivery.push_queued,
            error: delivery.error,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if report.succeeded() {
            info!(
                notification_id = %report.notification_id,
                notification_type = %report.notification_type,
                emails_sent = report.emails_sent,
                emails_failed = report.emails_failed,
                push_queued = report.push_queued,
                elapsed_ms,
                "Notification processed"
            );
        } else {
            warn!(
                notification_id = %report.notification_id,
                notification_type = %report.notification_type,
                emails_sent = report.emails_sent,
                emails_failed = report.emails_failed,
                push_queued = report.push_queued,
                error = report.error.as_deref().unwrap_or("no recipients reached"),
                elapsed_ms,
                "Notification failed"
            );
        }

        Some(report)
    }

    async fn dispatch(&self, notification: &Notification) -> Delivery {
        match notification.notification_type.route() {
            Route::Transactional => self.transactional(notification).await,
            Route::PreferenceGated => self.preference_gated(notification).await,
            Route::Broadcast => self.broadcast(notification).await,
            Route::Mention => self.mention(notification).await,
            Route::Undeliverable => {
                warn!(
                    notification_id = %notification.id,
                    notification_type = %notification.notification_type,
                    "No delivery route for notification type"
                );
                Delivery::failed(&NotificationError::InvalidType(
                    notification.notification_type.to_string(),
                ))
            }
        }
    }

    async fn transactional(&self, notification: &Notification) -> Delivery {
        let Some(recipient) = notification.recipient.as_deref() else {
            return Delivery::failed(&NotificationError::InvalidRequest("recipient is required".into()));
        };

        let language = match self
            .bounded("find_by_email", self.config.lookup_timeout, self.directory.find_by_email(recipient))
            .await
        {
            Ok(Some(user)) => resolve_language(&user),
            Ok(None) => Language::default(),
            Err(e) => {
                debug!(recipient, error = %e, "Language lookup failed, using default");
                Language::default()
            }
        };

        match self.send_email(notification, recipient, language).await {
            Ok(()) => Delivery {
                success: true,
                emails_sent: 1,
                ..Delivery::default()
            },
            Err(e) => Delivery {
                emails_failed: 1,
                ..Delivery::failed(&e)
            },
        }
    }

    async fn preference_gated(&self, notification: &Notification) -> Delivery {
        let Some(recipient) = notification.recipient.as_deref() else {
            return Delivery::failed(&NotificationError::InvalidRequest("recipient is required".into()));
        };

        let user = match self
            .bounded("find_by_email", self.config.lookup_timeout, self.directory.find_by_email(recipient))
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => return Delivery::failed(&NotificationError::UserNotFound(recipient.to_string())),
            Err(e) => return Delivery::failed(&e),
        };

        let language = resolve_language(&user);
        let mut delivery = Delivery {
            success: true,
            ..Delivery::default()
        };

        if user.email_notifications {
            match self.send_email(notification, recipient, language).await {
                Ok(()) => delivery.emails_sent = 1,
                Err(e) => {
                    warn!(notification_id = %notification.id, recipient, error = %e, "Email delivery failed");
                    delivery = Delivery {
                        emails_failed: 1,
                        ..Delivery::failed(&e)
                    };
                }
            }
        } else {
            debug!(recipient, "Email notifications disabled for user");
        }

        let subscriptions = self
            .bounded(
                "subscriptions_for_users",
                self.config.lookup_timeout,
                self.directory.subscriptions_for_users(std::slice::from_ref(&user.id)),
            )
            .await;

        match subscriptions {
            Ok(subscriptions) => {
                let payload = PushPayload::new(
                    push_text(notification.notification_type, language, &notification.metadata),
                    notification.notification_type.push_path(&notification.metadata),
                );
                delivery.push_queued = self.push.spawn(
                    notification.notification_type.as_ref(),
                    subscriptions,
                    PushContent::Fixed(payload),
                );
            }
            Err(e) => warn!(user_id = %user.id, error = %e, "Could not load push subscriptions"),
        }

        delivery
    }

    async fn broadcast(&self, notification: &Notification) -> Delivery {
        let mut delivery = match self
            .bounded("opted_in_users", self.config.bulk_timeout, self.directory.opted_in_users())
            .await
        {
            Ok(users) => self.email_each(notification, &users).await,
            Err(e) => Delivery::failed(&e),
        };

        match self
            .bounded("all_subscriptions", self.config.bulk_timeout, self.directory.all_subscriptions())
            .await
        {
            Ok(subscriptions) => delivery.push_queued = self.spawn_localized(notification, subscriptions),
            Err(e) => warn!(error = %e, "Could not load push subscriptions"),
        }

        delivery
    }

    async fn mention(&self, notification: &Notification) -> Delivery {
        let ids = parse_mentions(notification.meta("mentionedUsers"));
        if ids.is_empty() {
            debug!(notification_id = %notification.id, "No mentioned users");
            return Delivery::default();
        }

        let exclude = notification.recipient.as_deref().unwrap_or_default();
        let mut delivery = match self
            .bounded(
                "mentioned_users",
                self.config.bulk_timeout,
                self.directory.mentioned_users(&ids, exclude),
            )
            .await
        {
            Ok(users) => self.email_each(notification, &users).await,
            Err(e) => Delivery::failed(&e),
        };

        match self
            .bounded(
                "subscriptions_for_users",
                self.config.bulk_timeout,
                self.directory.subscriptions_for_users(&ids),
            )
            .await
        {
            Ok(subscriptions) => delivery.push_queued = self.spawn_localized(notification, subscriptions),
            Err(e) => warn!(error = %e, "Could not load push subscriptions"),
        }

        delivery
    }

    /// Email each user in turn, pausing between attempts. Succeeds if at
    /// least one email went out.
    async fn email_each(&self, notification: &Notification, users: &[User]) -> Delivery {
        let mut delivery = Delivery::default();

        for (index, user) in users.iter().enumerate() {
            let copy = notification.for_recipient(&user.email);
            match self.send_email(&copy, &user.email, resolve_language(user)).await {
                Ok(()) => delivery.emails_sent += 1,
                Err(e) => {
                    warn!(
                        notification_id = %notification.id,
                        recipient = %user.email,
                        error = %e,
                        "Email delivery failed"
                    );
                    delivery.emails_failed += 1;
                }
            }

            if index + 1 < users.len() && !self.config.send_delay.is_zero() {
                tokio::time::sleep(self.config.send_delay).await;
            }
        }

        delivery.success = delivery.emails_sent > 0;
        delivery
    }

    fn spawn_localized(&self, notification: &Notification, subscriptions: Vec<PushSubscription>) -> usize {
        self.push.spawn(
            notification.notification_type.as_ref(),
            subscriptions,
            PushContent::PerRecipient {
                kind: notification.notification_type,
                metadata: notification.metadata.clone(),
                url: notification.notification_type.push_path(&notification.metadata),
            },
        )
    }

    async fn send_email(&self, notification: &Notification, to: &str, language: Language) -> NotificationResult<()> {
        let rendered = self
            .renderer
            .render(notification.notification_type, &notification.metadata, language)?;

        let content = EmailContent {
            to_email: to.to_string(),
            subject: rendered.subject,
            html_body: rendered.html,
            text_body: rendered.text,
        };

        let sent = self.email.send(&content).await?;
        if sent.accepted {
            Ok(())
        } else {
            Err(NotificationError::ProviderError(format!("{} rejected the message", self.email.name())))
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        limit: Duration,
        call: impl Future<Output = NotificationResult<T>>,
    ) -> NotificationResult<T> {
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| NotificationError::Timeout {
                operation,
                elapsed: limit,
            })?
    }
}

fn stopping(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryUserDirectory, MockUserDirectory};
    use crate::models::NewNotification;
    use crate::providers::{MockEmailProvider, MockPushProvider, PushDelivery, SentEmail};
    use std::sync::Mutex;

    fn sent() -> NotificationResult<SentEmail> {
        Ok(SentEmail {
            message_id: None,
            accepted: true,
        })
    }

    fn subscription(id: &str, user_id: &str) -> PushSubscription {
        PushSubscription {
            id: id.into(),
            user_id: user_id.into(),
            endpoint: format!("https://push.example.com/{id}"),
            p256dh: "p256dh".into(),
            auth: "auth".into(),
        }
    }

    fn quiet_push() -> MockPushProvider {
        let mut push = MockPushProvider::new();
        push.expect_name().return_const("mock");
        push.expect_send().returning(|_, _| Ok(PushDelivery::Delivered));
        push
    }

    fn dispatcher(
        directory: Arc<dyn UserDirectory>,
        email: MockEmailProvider,
        push: MockPushProvider,
    ) -> Dispatcher {
        Dispatcher::new(
            Arc::new(NotificationQueue::new()),
            directory,
            Arc::new(email),
            Arc::new(push),
            Arc::new(EmailRenderer::new("https://jorbites.com").unwrap()),
            DispatcherConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_forgot_password_ignores_preferences_and_skips_push() {
        let directory = InMemoryUserDirectory::with_users([User::new("u1", "a@x.com").with_language("en")]);
        directory.add_subscription(subscription("s1", "u1")).await;

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email
            .expect_send()
            .withf(|c| c.to_email == "a@x.com" && c.subject == "Password Reset Request - Jorbites")
            .times(1)
            .returning(|_| sent());

        let mut push = MockPushProvider::new();
        push.expect_send().never();

        let dispatcher = dispatcher(Arc::new(directory), email, push);
        dispatcher
            .queue()
            .enqueue(
                NewNotification::new(NotificationType::ForgotPassword)
                    .with_recipient("a@x.com")
                    .with_meta("resetUrl", "https://jorbites.com/reset?token=t"),
            )
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert!(report.succeeded());
        assert_eq!(report.emails_sent, 1);
        assert_eq!(report.push_queued, 0);
        assert!(dispatcher.queue().is_empty().await);
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_user_uses_spanish() {
        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email
            .expect_send()
            .withf(|c| c.subject.starts_with("Solicitud de Restablecimiento"))
            .times(1)
            .returning(|_| sent());

        let dispatcher = dispatcher(Arc::new(InMemoryUserDirectory::new()), email, MockPushProvider::new());
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::ForgotPassword).with_recipient("new@x.com"))
            .await;

        assert!(dispatcher.process_next().await.unwrap().succeeded());
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_before_any_email() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_by_email()
            .returning(|_| Err(NotificationError::DatabaseError("connection reset".into())));
        directory.expect_subscriptions_for_users().never();

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().never();

        let dispatcher = dispatcher(Arc::new(directory), email, MockPushProvider::new());
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::NewComment).with_recipient("a@x.com"))
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert_eq!(report.status, NotificationStatus::Failed);
        assert_eq!(report.emails_sent + report.emails_failed, 0);
        assert!(report.error.unwrap().contains("connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_is_reported() {
        struct Stalled;

        #[async_trait::async_trait]
        impl UserDirectory for Stalled {
            async fn find_by_email(&self, _: &str) -> NotificationResult<Option<User>> {
                std::future::pending().await
            }
            async fn find_by_id(&self, _: &str) -> NotificationResult<Option<User>> {
                Ok(None)
            }
            async fn opted_in_users(&self) -> NotificationResult<Vec<User>> {
                Ok(Vec::new())
            }
            async fn mentioned_users(&self, _: &[String], _: &str) -> NotificationResult<Vec<User>> {
                Ok(Vec::new())
            }
            async fn subscriptions_for_users(&self, _: &[String]) -> NotificationResult<Vec<PushSubscription>> {
                Ok(Vec::new())
            }
            async fn all_subscriptions(&self) -> NotificationResult<Vec<PushSubscription>> {
                Ok(Vec::new())
            }
            async fn delete_subscription(&self, _: &str) -> NotificationResult<bool> {
                Ok(false)
            }
            async fn health_check(&self) -> NotificationResult<()> {
                Ok(())
            }
        }

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().never();

        let dispatcher = dispatcher(Arc::new(Stalled), email, MockPushProvider::new());
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::NewLike).with_recipient("a@x.com"))
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert!(!report.succeeded());
        assert_eq!(report.error.as_deref(), Some("find_by_email timed out after 10s"));
    }

    #[tokio::test]
    async fn test_preference_gated_opted_out_still_pushes() {
        let directory = InMemoryUserDirectory::with_users([User::new("u1", "a@x.com")]);
        directory.add_subscription(subscription("s1", "u1")).await;
        directory.add_subscription(subscription("s2", "u1")).await;
        directory.add_subscription(subscription("s3", "u9")).await;

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().never();

        let urls = Arc::new(Mutex::new(Vec::new()));
        let seen = urls.clone();
        let mut push = MockPushProvider::new();
        push.expect_name().return_const("mock");
        push.expect_send().times(2).returning(move |_, payload| {
            seen.lock().unwrap().push(payload.url.clone());
            Ok(PushDelivery::Delivered)
        });

        let dispatcher = dispatcher(Arc::new(directory), email, push);
        dispatcher
            .queue()
            .enqueue(
                NewNotification::new(NotificationType::NewLike)
                    .with_recipient("a@x.com")
                    .with_meta("recipeId", "r1")
                    .with_meta("likedBy", "Ana"),
            )
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert!(report.succeeded());
        assert_eq!(report.emails_sent, 0);
        assert_eq!(report.push_queued, 2);

        assert!(dispatcher.push().wait_idle(Duration::from_secs(5)).await);
        assert_eq!(*urls.lock().unwrap(), vec!["/recipes/r1", "/recipes/r1"]);
    }

    #[tokio::test]
    async fn test_preference_gated_email_failure_still_pushes() {
        let directory = InMemoryUserDirectory::with_users([User::new("u1", "a@x.com").opted_in()]);
        directory.add_subscription(subscription("s1", "u1")).await;
        directory.add_subscription(subscription("s2", "u1")).await;

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email
            .expect_send()
            .times(1)
            .returning(|_| Err(NotificationError::ProviderError("550 mailbox unavailable".into())));

        let mut push = MockPushProvider::new();
        push.expect_name().return_const("mock");
        push.expect_send().times(2).returning(|_, _| Ok(PushDelivery::Delivered));

        let dispatcher = dispatcher(Arc::new(directory), email, push);
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::NotificationsActivated).with_recipient("a@x.com"))
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert_eq!(report.status, NotificationStatus::Failed);
        assert_eq!(report.emails_failed, 1);
        assert_eq!(report.push_queued, 2);

        assert!(dispatcher.push().wait_idle(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_quest_types_are_not_delivered() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_by_email().never();
        directory.expect_opted_in_users().never();
        directory.expect_subscriptions_for_users().never();
        directory.expect_all_subscriptions().never();

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().never();

        let mut push = MockPushProvider::new();
        push.expect_send().never();

        let dispatcher = dispatcher(Arc::new(directory), email, push);
        for kind in [NotificationType::NewQuest, NotificationType::QuestFulfilled] {
            dispatcher
                .queue()
                .enqueue(
                    NewNotification::new(kind)
                        .with_recipient("a@x.com")
                        .with_meta("questId", "q1"),
                )
                .await;
        }

        for kind in [NotificationType::NewQuest, NotificationType::QuestFulfilled] {
            let report = dispatcher.process_next().await.unwrap();
            assert_eq!(report.notification_type, kind);
            assert_eq!(report.status, NotificationStatus::Failed);
            assert_eq!((report.emails_sent, report.emails_failed, report.push_queued), (0, 0, 0));
            assert_eq!(
                report.error,
                Some(format!("Unknown notification type: {kind}"))
            );
        }
        assert!(dispatcher.queue().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_partial_failure_still_succeeds() {
        let directory = InMemoryUserDirectory::with_users([
            User::new("u1", "one@x.com").opted_in(),
            User::new("u2", "two@x.com").opted_in().with_language("en"),
            User::new("u3", "three@x.com").opted_in().with_language("ca"),
            User::new("u4", "off@x.com"),
        ]);

        let order = Arc::new(Mutex::new(Vec::new()));
        let seen = order.clone();
        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().times(3).returning(move |content| {
            seen.lock().unwrap().push((content.to_email.clone(), content.subject.clone()));
            if content.to_email == "two@x.com" {
                Err(NotificationError::ProviderError("timeout".into()))
            } else {
                sent()
            }
        });

        let dispatcher = dispatcher(Arc::new(directory), email, quiet_push());
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::NewRecipe).with_meta("recipeId", "r9"))
            .await;

        let started = Instant::now();
        let report = dispatcher.process_next().await.unwrap();

        assert!(report.succeeded());
        assert_eq!((report.emails_sent, report.emails_failed), (2, 1));
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_millis(300));

        let order = order.lock().unwrap().clone();
        assert_eq!(
            order,
            vec![
                ("one@x.com".to_string(), "Nueva Receta Disponible - Jorbites".to_string()),
                ("two@x.com".to_string(), "New Recipe Available - Jorbites".to_string()),
                ("three@x.com".to_string(), "Nova Recepta Disponible - Jorbites".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_broadcast_with_no_opted_in_users_fails() {
        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().never();

        let dispatcher = dispatcher(Arc::new(InMemoryUserDirectory::new()), email, quiet_push());
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::NewBlog).with_meta("blog_id", "b1"))
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert_eq!(report.status, NotificationStatus::Failed);
        assert_eq!(report.emails_sent, 0);
    }

    #[tokio::test]
    async fn test_empty_mention_list_short_circuits() {
        let mut directory = MockUserDirectory::new();
        directory.expect_mentioned_users().never();
        directory.expect_subscriptions_for_users().never();

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().never();

        let mut push = MockPushProvider::new();
        push.expect_send().never();

        let dispatcher = dispatcher(Arc::new(directory), email, push);
        dispatcher
            .queue()
            .enqueue(
                NewNotification::new(NotificationType::MentionInComment)
                    .with_recipient("author@x.com")
                    .with_meta("mentionedUsers", " , "),
            )
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert_eq!(report.status, NotificationStatus::Failed);
        assert_eq!(report.emails_sent + report.emails_failed + report.push_queued, 0);
    }

    #[tokio::test]
    async fn test_mention_emails_opted_in_users_and_pushes_to_mentioned() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_mentioned_users()
            .withf(|ids, exclude| ids.len() == 2 && ids[0] == "u1" && ids[1] == "u2" && exclude == "author@x.com")
            .times(1)
            .returning(|_, _| Ok(vec![User::new("u1", "one@x.com").opted_in()]));
        directory
            .expect_subscriptions_for_users()
            .withf(|ids| ids.len() == 2)
            .times(1)
            .returning(|_| Ok(vec![subscription("s2", "u2")]));
        directory
            .expect_find_by_id()
            .returning(|id| Ok(Some(User::new(id, "two@x.com").with_language("en"))));

        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email
            .expect_send()
            .withf(|c| c.to_email == "one@x.com")
            .times(1)
            .returning(|_| sent());

        let titles = Arc::new(Mutex::new(Vec::new()));
        let seen = titles.clone();
        let mut push = MockPushProvider::new();
        push.expect_name().return_const("mock");
        push.expect_send().times(1).returning(move |_, payload| {
            seen.lock().unwrap().push(payload.title.clone());
            Ok(PushDelivery::Delivered)
        });

        let dispatcher = dispatcher(Arc::new(directory), email, push);
        dispatcher
            .queue()
            .enqueue(
                NewNotification::new(NotificationType::MentionInComment)
                    .with_recipient("author@x.com")
                    .with_meta("mentionedUsers", "u1, u2")
                    .with_meta("recipeId", "r1"),
            )
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert!(report.succeeded());
        assert_eq!(report.emails_sent, 1);
        assert_eq!(report.push_queued, 1);

        assert!(dispatcher.push().wait_idle(Duration::from_secs(5)).await);
        assert_eq!(*titles.lock().unwrap(), vec!["You were mentioned!"]);
    }

    #[tokio::test]
    async fn test_process_next_on_empty_queue() {
        let dispatcher = dispatcher(
            Arc::new(InMemoryUserDirectory::new()),
            MockEmailProvider::new(),
            MockPushProvider::new(),
        );
        assert!(dispatcher.process_next().await.is_none());
    }

    #[tokio::test]
    async fn test_unaccepted_email_counts_as_failure() {
        let mut email = MockEmailProvider::new();
        email.expect_name().return_const("mock");
        email.expect_send().returning(|_| {
            Ok(SentEmail {
                message_id: None,
                accepted: false,
            })
        });

        let dispatcher = dispatcher(Arc::new(InMemoryUserDirectory::new()), email, MockPushProvider::new());
        dispatcher
            .queue()
            .enqueue(NewNotification::new(NotificationType::ForgotPassword).with_recipient("a@x.com"))
            .await;

        let report = dispatcher.process_next().await.unwrap();
        assert!(!report.succeeded());
        assert_eq!(report.emails_failed, 1);
    }
}
