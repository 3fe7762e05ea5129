//! Process-wide entry point: owns the queue and the dispatcher task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::models::{NewNotification, Notification, QueueSnapshot};
use crate::queue::NotificationQueue;

pub struct NotificationRelay {
    queue: Arc<NotificationQueue>,
    dispatcher: Arc<Dispatcher>,
    started: AtomicBool,
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationRelay {
    pub fn new(dispatcher: Dispatcher) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            queue: dispatcher.queue().clone(),
            dispatcher: Arc::new(dispatcher),
            started: AtomicBool::new(false),
            shutdown,
            worker: Mutex::new(None),
        }
    }

    /// Spawn the dispatch loop. Later calls are no-ops.
    pub async fn start(&self) {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Notification relay already started");
            return;
        }

        let dispatcher = self.dispatcher.clone();
        let shutdown = self.shutdown.subscribe();
        let handle = tokio::spawn(async move { dispatcher.run(shutdown).await });
        *self.worker.lock().await = Some(handle);

        info!("Notification relay started");
    }

    pub async fn enqueue(&self, request: NewNotification) -> Notification {
        self.queue.enqueue(request).await
    }

    pub async fn status(&self) -> QueueSnapshot {
        self.queue.status().await
    }

    /// Stop the dispatch loop after its current notification, then give
    /// background push deliveries up to `timeout` to finish.
    pub async fn shutdown(&self, timeout: Duration) {
        self.shutdown.send_replace(true);

        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Dispatcher task ended abnormally");
            }
        }

        let pending = self.queue.len().await;
        if pending > 0 {
            warn!(pending, "Notifications left undelivered at shutdown");
        }

        if self.dispatcher.push().wait_idle(timeout).await {
            info!("Notification relay stopped");
        } else {
            warn!("Notification relay stopped with push deliveries outstanding");
        }
    }
}
