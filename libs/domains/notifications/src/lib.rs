//! Notifications Domain
//!
//! Accepts notification requests over HTTP, holds them in an in-memory FIFO,
//! and delivers each one by email and Web Push from a single background
//! dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   API Handler   │  ← POST /notifications, GET /queue
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │NotificationRelay│  ← start / enqueue / status / shutdown
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │      Queue      │  ← FIFO + wake signal
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐      ┌────────────────┐
//! │   Dispatcher    │─────►│ User Directory │  ← MongoDB or in-memory
//! └───┬─────────┬───┘      └────────────────┘
//!     │         │
//! ┌───▼───┐ ┌───▼──────────┐
//! │ SMTP  │ │ Push fan-out │  ← bounded, background
//! └───────┘ └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{Dispatcher, NotificationRelay, NotificationQueue};
//!
//! let dispatcher = Dispatcher::new(queue, directory, email, push, renderer, config);
//! let relay = Arc::new(NotificationRelay::new(dispatcher));
//! relay.start().await;
//! let app = domain_notifications::handlers::router(relay.clone());
//! ```

pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod localization;
pub mod models;
pub mod providers;
pub mod queue;
pub mod relay;
pub mod routing;
pub mod templates;

// Re-export commonly used types
pub use directory::{InMemoryUserDirectory, MongoUserDirectory, UserDirectory};
pub use dispatcher::{DispatchReport, Dispatcher, DispatcherConfig};
pub use error::{NotificationError, NotificationResult};
pub use handlers::ApiDoc;
pub use localization::Language;
pub use models::{
    CreateNotification, NewNotification, Notification, NotificationStatus, NotificationType, PushSubscription,
    QueueSnapshot, User,
};
pub use providers::{
    DisabledPushProvider, EmailProvider, PushConfig, PushProvider, SmtpConfig, SmtpProvider, WebPushProvider,
};
pub use queue::NotificationQueue;
pub use relay::NotificationRelay;
pub use routing::Route;
pub use templates::EmailRenderer;
