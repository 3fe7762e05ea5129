use core_config::{env_parse, ConfigError, FromEnv};
use std::time::Duration;

/// Timing and concurrency knobs for the dispatch loop.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound on how long the loop parks without a wake signal.
    pub poll_interval: Duration,
    /// Pause between consecutive emails of one broadcast or mention fan-out.
    pub send_delay: Duration,
    /// Budget for single-user lookups.
    pub lookup_timeout: Duration,
    /// Budget for bulk user and subscription queries.
    pub bulk_timeout: Duration,
    /// Budget for one push request.
    pub push_timeout: Duration,
    pub push_max_concurrency: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            send_delay: Duration::from_millis(100),
            lookup_timeout: Duration::from_secs(10),
            bulk_timeout: Duration::from_secs(30),
            push_timeout: Duration::from_secs(30),
            push_max_concurrency: 32,
        }
    }
}

impl FromEnv for DispatcherConfig {
    /// - DISPATCH_POLL_INTERVAL_SECS: defaults to 5, minimum 1
    /// - DISPATCH_SEND_DELAY_MS: defaults to 100
    /// - DISPATCH_LOOKUP_TIMEOUT_SECS: defaults to 10
    /// - DISPATCH_BULK_TIMEOUT_SECS: defaults to 30
    /// - PUSH_TIMEOUT_SECS: defaults to 30
    /// - PUSH_MAX_CONCURRENCY: defaults to 32, minimum 1
    fn from_env() -> Result<Self, ConfigError> {
        let poll_secs: u64 = env_parse("DISPATCH_POLL_INTERVAL_SECS", "5")?;
        let max_concurrency: usize = env_parse("PUSH_MAX_CONCURRENCY", "32")?;

        Ok(Self {
            poll_interval: Duration::from_secs(poll_secs.max(1)),
            send_delay: Duration::from_millis(env_parse("DISPATCH_SEND_DELAY_MS", "100")?),
            lookup_timeout: Duration::from_secs(env_parse("DISPATCH_LOOKUP_TIMEOUT_SECS", "10")?),
            bulk_timeout: Duration::from_secs(env_parse("DISPATCH_BULK_TIMEOUT_SECS", "30")?),
            push_timeout: Duration::from_secs(env_parse("PUSH_TIMEOUT_SECS", "30")?),
            push_max_concurrency: max_concurrency.max(1),
        })
    }
}
