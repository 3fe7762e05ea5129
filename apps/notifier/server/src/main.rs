use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use domain_notifications::{
    ApiDoc, DisabledPushProvider, Dispatcher, EmailProvider, EmailRenderer, InMemoryUserDirectory,
    MongoUserDirectory, NotificationQueue, NotificationRelay, PushProvider, SmtpProvider,
    UserDirectory, WebPushProvider, handlers,
};
use eyre::WrapErr;
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod config;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env().wrap_err("Failed to load configuration")?;

    init_tracing(&config.environment);
    config.warn_ignored_vars();

    let directory: Arc<dyn UserDirectory> = match &config.mongodb {
        Some(mongodb) => {
            let client = database::mongodb::connect_from_config_with_retry(mongodb, RetryConfig::default())
                .await
                .wrap_err("MongoDB connection failed")?;
            info!(database = %mongodb.database(), "Using MongoDB user directory");
            Arc::new(MongoUserDirectory::new(client, mongodb.database()))
        }
        None => {
            warn!("No MongoDB configured, using an empty in-memory user directory");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    let email: Arc<dyn EmailProvider> = Arc::new(
        SmtpProvider::new(config.smtp.clone()).wrap_err("Failed to build SMTP transport")?,
    );
    if !config.smtp.has_credentials() {
        warn!("SMTP_USER/SMTP_PASSWORD not set, every email send will fail");
    }

    let push: Arc<dyn PushProvider> = match &config.push {
        Some(push) => Arc::new(WebPushProvider::new(push).wrap_err("Failed to configure Web Push")?),
        None => {
            warn!("VAPID keys not configured, push notifications disabled");
            Arc::new(DisabledPushProvider)
        }
    };

    let renderer =
        Arc::new(EmailRenderer::new(config.site_url.clone()).wrap_err("Failed to load email templates")?);

    let dispatcher = Dispatcher::new(
        Arc::new(NotificationQueue::new()),
        directory.clone(),
        email.clone(),
        push,
        renderer,
        config.dispatcher.clone(),
    );
    let relay = Arc::new(NotificationRelay::new(dispatcher));
    relay.start().await;

    let state = AppState { directory, email };

    // /ready and /health go through create_router so they share tracing and the 404 fallback
    let routes = handlers::router(relay.clone())
        .merge(api::ready_router(state))
        .merge(health_router(config.app));
    let app = create_router::<ApiDoc>(routes).wrap_err("Failed to build router")?;

    info!(
        environment = ?config.environment,
        site_url = %config.site_url,
        "Starting notifier"
    );

    // Pushes get whatever the shutdown budget leaves after the dispatcher stops
    let drain_timeout = config.server.shutdown_timeout;
    create_production_app(app, &config.server, async move {
        info!("Shutting down: stopping notification dispatcher");
        relay.shutdown(drain_timeout).await;
    })
    .await
    .wrap_err("Server error")?;

    info!("Notifier shutdown complete");
    Ok(())
}
