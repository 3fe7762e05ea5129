use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_first, env_or_default, server::ServerConfig};
use domain_notifications::{DispatcherConfig, PushConfig, SmtpConfig};
use tracing::warn;

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Variables accepted by earlier deployments that this server does not act on.
const IGNORED_VARS: &[&str] = &["RETRY_ATTEMPTS", "RETRY_DELAY", "WORKER_COUNT"];

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub smtp: SmtpConfig,
    /// `None` when the VAPID keys are not configured.
    pub push: Option<PushConfig>,
    pub dispatcher: DispatcherConfig,
    /// `None` runs against an empty in-memory directory.
    pub mongodb: Option<MongoConfig>,
    pub site_url: String,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let smtp = SmtpConfig::from_env()?;
        let dispatcher = DispatcherConfig::from_env()?;

        let push = match PushConfig::from_env() {
            Ok(push) => Some(push),
            Err(ConfigError::MissingEnvVar(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let mongodb = match env_first(&["MONGODB_URL", "MONGO_URI"]) {
            Some(_) => Some(MongoConfig::from_env()?),
            None => None,
        };

        let site_url = env_or_default("SITE_URL", "https://jorbites.com")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            app: app_info!(),
            server,
            smtp,
            push,
            dispatcher,
            mongodb,
            site_url,
            environment,
        })
    }

    /// Warn about retry and worker settings that have no effect here.
    pub fn warn_ignored_vars(&self) {
        for var in IGNORED_VARS {
            if std::env::var_os(var).is_some() {
                warn!(
                    variable = var,
                    "Ignoring setting: delivery is single-attempt with one dispatcher"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_env(overrides: &[(&'static str, &'static str)], f: impl FnOnce()) {
        let mut vars: Vec<(&str, Option<&str>)> = [
            "MONGODB_URL",
            "MONGO_URI",
            "VAPID_SUBJECT",
            "VAPID_PUBLIC_KEY",
            "VAPID_PRIVATE_KEY",
            "SITE_URL",
            "PORT",
        ]
        .into_iter()
        .map(|key| (key, None))
        .collect();
        for (key, value) in overrides {
            vars.retain(|(k, _)| k != key);
            vars.push((*key, Some(*value)));
        }
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_defaults_run_without_database_or_push() {
        with_env(&[], || {
            let config = Config::from_env().unwrap();
            assert!(config.mongodb.is_none());
            assert!(config.push.is_none());
            assert_eq!(config.site_url, "https://jorbites.com");
            assert_eq!(config.server.port, 8080);
        });
    }

    #[test]
    fn test_mongo_enabled_by_legacy_uri() {
        with_env(
            &[
                ("MONGO_URI", "mongodb://db:27017"),
                ("SITE_URL", "https://staging.jorbites.com/"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.unwrap().url, "mongodb://db:27017");
                assert_eq!(config.site_url, "https://staging.jorbites.com");
            },
        );
    }

    #[test]
    fn test_push_config_when_keys_present() {
        with_env(
            &[
                ("VAPID_SUBJECT", "mailto:admin@jorbites.com"),
                ("VAPID_PUBLIC_KEY", "public"),
                ("VAPID_PRIVATE_KEY", "private"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.push.unwrap().subject, "mailto:admin@jorbites.com");
            },
        );
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        with_env(&[("PORT", "not-a-port")], || {
            assert!(Config::from_env().is_err());
        });
    }
}
