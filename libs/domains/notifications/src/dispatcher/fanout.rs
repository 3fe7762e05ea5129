//! Background push delivery.
//!
//! Each fan-out runs as one tracked task that spawns a delivery per
//! subscription. A shared semaphore caps in-flight requests across all
//! fan-outs; the tracker lets shutdown wait for stragglers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::directory::UserDirectory;
use crate::localization::{push_text, resolve_language, Language};
use crate::models::{Metadata, NotificationType, PushSubscription};
use crate::providers::{PushDelivery, PushPayload, PushProvider};

/// What to send to each subscription of a fan-out.
#[derive(Debug, Clone)]
pub enum PushContent {
    /// One payload for every subscription.
    Fixed(PushPayload),
    /// Text rendered per subscription in its owner's language.
    PerRecipient {
        kind: NotificationType,
        metadata: Metadata,
        url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Pruned,
    Failed,
}

/// Tally of one fan-out, logged when its last delivery finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutSummary {
    pub delivered: usize,
    pub pruned: usize,
    pub failed: usize,
}

impl FanoutSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Delivered => self.delivered += 1,
            Outcome::Pruned => self.pruned += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

#[derive(Clone)]
pub struct PushFanout {
    provider: Arc<dyn PushProvider>,
    directory: Arc<dyn UserDirectory>,
    limiter: Arc<Semaphore>,
    tracker: TaskTracker,
    lookup_timeout: Duration,
    push_timeout: Duration,
}

impl PushFanout {
    pub fn new(
        provider: Arc<dyn PushProvider>,
        directory: Arc<dyn UserDirectory>,
        max_concurrency: usize,
        lookup_timeout: Duration,
        push_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            directory,
            limiter: Arc::new(Semaphore::new(max_concurrency.max(1))),
            tracker: TaskTracker::new(),
            lookup_timeout,
            push_timeout,
        }
    }

    /// Start delivering `content` to `subscriptions` in the background.
    /// Returns the number of deliveries queued.
    pub fn spawn(&self, label: &str, subscriptions: Vec<PushSubscription>, content: PushContent) -> usize {
        let count = subscriptions.len();
        if count == 0 {
            debug!(fanout = %label, "No push subscriptions to notify");
            return 0;
        }

        let this = self.clone();
        let label = label.to_string();
        let content = Arc::new(content);

        self.tracker.spawn(async move {
            let mut deliveries = JoinSet::new();

            for subscription in subscriptions {
                let Ok(permit) = this.limiter.clone().acquire_owned().await else {
                    break;
                };
                let worker = this.clone();
                let content = content.clone();
                deliveries.spawn(async move {
                    let _permit = permit;
                    worker.deliver(&subscription, &content).await
                });
            }

            let mut summary = FanoutSummary::default();
            while let Some(joined) = deliveries.join_next().await {
                summary.record(joined.unwrap_or(Outcome::Failed));
            }

            info!(
                fanout = %label,
                delivered = summary.delivered,
                pruned = summary.pruned,
                failed = summary.failed,
                "Push fan-out finished"
            );
            summary
        });

        count
    }

    /// Number of fan-outs still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait up to `timeout` for running fan-outs. Returns false on timeout.
    /// New fan-outs may still be spawned afterwards.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let finished = tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok();
        self.tracker.reopen();
        if !finished {
            warn!(in_flight = self.tracker.len(), "Push deliveries still running after {:?}", timeout);
        }
        finished
    }

    async fn deliver(&self, subscription: &PushSubscription, content: &PushContent) -> Outcome {
        let payload = match content {
            PushContent::Fixed(payload) => payload.clone(),
            PushContent::PerRecipient { kind, metadata, url } => {
                let language = self.language_of(&subscription.user_id).await;
                PushPayload::new(push_text(*kind, language, metadata), url.clone())
            }
        };

        let result = tokio::time::timeout(self.push_timeout, self.provider.send(subscription, &payload)).await;

        match result {
            Ok(Ok(PushDelivery::Delivered)) => Outcome::Delivered,
            Ok(Ok(PushDelivery::Gone)) => {
                info!(subscription_id = %subscription.id, "Push endpoint gone, removing subscription");
                if let Err(e) = self.directory.delete_subscription(&subscription.id).await {
                    warn!(subscription_id = %subscription.id, error = %e, "Failed to remove stale subscription");
                }
                Outcome::Pruned
            }
            Ok(Err(e)) => {
                warn!(
                    subscription_id = %subscription.id,
                    provider = self.provider.name(),
                    error = %e,
                    "Push delivery failed"
                );
                Outcome::Failed
            }
            Err(_) => {
                warn!(subscription_id = %subscription.id, "Push delivery timed out after {:?}", self.push_timeout);
                Outcome::Failed
            }
        }
    }

    /// Language of the subscription owner, or the base language when unknown.
    async fn language_of(&self, user_id: &str) -> Language {
        match tokio::time::timeout(self.lookup_timeout, self.directory.find_by_id(user_id)).await {
            Ok(Ok(Some(user))) => resolve_language(&user),
            Ok(Ok(None)) => Language::default(),
            Ok(Err(e)) => {
                debug!(user_id = %user_id, error = %e, "Language lookup failed");
                Language::default()
            }
            Err(_) => {
                debug!(user_id = %user_id, "Language lookup timed out");
                Language::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryUserDirectory, MockUserDirectory};
    use crate::error::NotificationError;
    use crate::localization::PushText;
    use crate::models::User;
    use crate::providers::MockPushProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn subscription(id: &str, user_id: &str) -> PushSubscription {
        PushSubscription {
            id: id.into(),
            user_id: user_id.into(),
            endpoint: format!("https://push.example.com/{id}"),
            p256dh: "p256dh".into(),
            auth: "auth".into(),
        }
    }

    fn fixed() -> PushContent {
        PushContent::Fixed(PushPayload::new(PushText::placeholder(Language::Es), "/"))
    }

    fn fanout(provider: MockPushProvider, directory: Arc<dyn UserDirectory>, limit: usize) -> PushFanout {
        PushFanout::new(
            Arc::new(provider),
            directory,
            limit,
            Duration::from_secs(1),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_gone_endpoint_is_pruned() {
        let mut provider = MockPushProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_send()
            .returning(|sub, _| match sub.id.as_str() {
                "stale" => Ok(PushDelivery::Gone),
                _ => Ok(PushDelivery::Delivered),
            });

        let directory = InMemoryUserDirectory::new();
        directory.add_subscription(subscription("stale", "u1")).await;
        directory.add_subscription(subscription("live", "u1")).await;

        let fanout = fanout(provider, Arc::new(directory.clone()), 4);
        let subs = directory.all_subscriptions().await.unwrap();
        assert_eq!(fanout.spawn("test", subs, fixed()), 2);
        assert!(fanout.wait_idle(Duration::from_secs(5)).await);

        let remaining = directory.all_subscriptions().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "live");
    }

    #[tokio::test]
    async fn test_failures_do_not_prune() {
        let mut provider = MockPushProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_send()
            .times(1)
            .returning(|_, _| Err(NotificationError::PushError("503".into())));

        let mut directory = MockUserDirectory::new();
        directory.expect_delete_subscription().never();

        let fanout = fanout(provider, Arc::new(directory), 4);
        fanout.spawn("test", vec![subscription("s1", "u1")], fixed());
        assert!(fanout.wait_idle(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_per_recipient_text_uses_owner_language() {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let seen = bodies.clone();

        let mut provider = MockPushProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_send().returning(move |sub, payload| {
            seen.lock().unwrap().push((sub.user_id.clone(), payload.title.clone()));
            Ok(PushDelivery::Delivered)
        });

        let directory = InMemoryUserDirectory::with_users([
            User::new("u1", "a@x.com").with_language("en"),
            User::new("u2", "b@x.com").with_language("ca"),
        ]);

        let fanout = fanout(provider, Arc::new(directory), 4);
        fanout.spawn(
            "test",
            vec![subscription("s1", "u1"), subscription("s2", "u2"), subscription("s3", "ghost")],
            PushContent::PerRecipient {
                kind: NotificationType::NewQuest,
                metadata: Metadata::new(),
                url: "/quests/q1".into(),
            },
        );
        assert!(fanout.wait_idle(Duration::from_secs(5)).await);

        let mut seen = bodies.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("ghost".to_string(), "¡Nueva Quest!".to_string()),
                ("u1".to_string(), "New Quest!".to_string()),
                ("u2".to_string(), "Nova Quest!".to_string()),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        struct SlowProvider {
            active: Arc<AtomicUsize>,
            peak: Arc<AtomicUsize>,
        }

        #[async_trait::async_trait]
        impl PushProvider for SlowProvider {
            async fn send(&self, _: &PushSubscription, _: &PushPayload) -> crate::NotificationResult<PushDelivery> {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.active.fetch_sub(1, Ordering::SeqCst);
                Ok(PushDelivery::Delivered)
            }

            fn name(&self) -> &'static str {
                "slow"
            }
        }

        let fanout = PushFanout::new(
            Arc::new(SlowProvider {
                active: active.clone(),
                peak: peak.clone(),
            }),
            Arc::new(InMemoryUserDirectory::new()),
            3,
            Duration::from_secs(1),
            Duration::from_secs(5),
        );

        let subs: Vec<_> = (0..12).map(|i| subscription(&format!("s{i}"), "u1")).collect();
        fanout.spawn("test", subs, fixed());
        assert!(fanout.wait_idle(Duration::from_secs(10)).await);

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(active.load(Ordering::SeqCst), 0);
        assert_eq!(fanout.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_empty_fanout_spawns_nothing() {
        let provider = MockPushProvider::new();
        let fanout = fanout(provider, Arc::new(InMemoryUserDirectory::new()), 4);
        assert_eq!(fanout.spawn("test", Vec::new(), fixed()), 0);
        assert_eq!(fanout.in_flight(), 0);
    }
}
