//! SMTP email provider implementation using lettre.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{env_or_default, env_parse, ConfigError, FromEnv};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error, info};

/// Port for implicit TLS. Every other port negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Login user, also used as the sender address.
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_name: String,
    /// Disable for local capture servers such as Mailpit.
    pub use_tls: bool,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            from_name: "Jorbites".to_string(),
            use_tls: true,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Whether both login and password are present.
    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl FromEnv for SmtpConfig {
    /// - SMTP_HOST: defaults to smtp.gmail.com
    /// - SMTP_PORT: defaults to 587
    /// - SMTP_USER / SMTP_PASSWORD: unset means sending is refused
    /// - SMTP_FROM_NAME: defaults to Jorbites
    /// - SMTP_USE_TLS: defaults to true
    fn from_env() -> Result<Self, ConfigError> {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: env_or_default("SMTP_HOST", "smtp.gmail.com"),
            port: env_parse("SMTP_PORT", "587")?,
            username: non_empty("SMTP_USER"),
            password: non_empty("SMTP_PASSWORD"),
            from_name: env_or_default("SMTP_FROM_NAME", "Jorbites"),
            use_tls: env_parse("SMTP_USE_TLS", "true")?,
        })
    }
}

/// Email provider backed by an SMTP relay.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { transport, config })
    }

    fn build_transport(config: &SmtpConfig) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if !config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        } else if config.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| NotificationError::ProviderError(format!("Failed to create SMTP relay: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| NotificationError::ProviderError(format!("Failed to create SMTP relay: {}", e)))?
        };
        let mut builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn build_message(&self, email: &EmailContent) -> NotificationResult<Message> {
        let sender = self.config.username.as_deref().unwrap_or_default();
        let from: Mailbox = format!("{} <{}>", self.config.from_name, sender)
            .parse()
            .map_err(|e| NotificationError::ProviderError(format!("Invalid from address: {}", e)))?;

        let to: Mailbox = email
            .to_email
            .parse()
            .map_err(|e| NotificationError::ProviderError(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::ProviderError(format!("Failed to build email message: {}", e)))
    }

    /// Refuse obviously undeliverable requests before opening a connection.
    fn preflight(&self, email: &EmailContent) -> NotificationResult<()> {
        if email.to_email.trim().is_empty() {
            return Err(NotificationError::ProviderError("recipient address is empty".into()));
        }
        if !self.config.has_credentials() {
            return Err(NotificationError::ConfigError(
                "SMTP_USER and SMTP_PASSWORD must be set to send email".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        self.preflight(email)?;

        debug!(
            to = %email.to_email,
            subject = %email.subject,
            host = %self.config.host,
            port = self.config.port,
            "Sending email via SMTP"
        );

        let message = self.build_message(email)?;

        let response = self.transport.send(message).await.map_err(|e| {
            error!(to = %email.to_email, error = %e, "Failed to send email via SMTP");
            NotificationError::ProviderError(format!("SMTP send failed: {}", e))
        })?;

        let message_id = response.message().next().map(|s| s.to_string());

        info!(to = %email.to_email, message_id = ?message_id, "Email sent via SMTP");

        Ok(SentEmail {
            message_id,
            accepted: response.is_positive(),
        })
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }

    async fn health_check(&self) -> NotificationResult<()> {
        if !self.config.has_credentials() {
            return Err(NotificationError::ConfigError("SMTP credentials are not configured".into()));
        }
        self.transport
            .test_connection()
            .await
            .map_err(|e| NotificationError::ProviderError(format!("SMTP health check failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> EmailContent {
        EmailContent {
            to_email: to.to_string(),
            subject: "Nuevo Like en tu Receta - Jorbites".to_string(),
            html_body: "<p>hola</p>".to_string(),
            text_body: "hola".to_string(),
        }
    }

    #[test]
    fn test_smtp_config_from_env_defaults() {
        temp_env::with_vars_unset(
            [
                "SMTP_HOST",
                "SMTP_PORT",
                "SMTP_USER",
                "SMTP_PASSWORD",
                "SMTP_FROM_NAME",
                "SMTP_USE_TLS",
            ],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.host, "smtp.gmail.com");
                assert_eq!(config.port, 587);
                assert_eq!(config.from_name, "Jorbites");
                assert!(config.use_tls);
                assert!(!config.has_credentials());
            },
        );
    }

    #[test]
    fn test_smtp_config_from_env_rejects_bad_port() {
        temp_env::with_var("SMTP_PORT", Some("not-a-port"), || {
            assert!(matches!(
                SmtpConfig::from_env(),
                Err(ConfigError::ParseError { key, .. }) if key == "SMTP_PORT"
            ));
        });
    }

    #[tokio::test]
    async fn test_send_without_credentials_fails_fast() {
        let provider = SmtpProvider::new(SmtpConfig::new("localhost", 1025).with_tls(false)).unwrap();
        let err = provider.send(&email("a@x.com")).await.unwrap_err();
        assert!(matches!(err, NotificationError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_send_to_empty_recipient_fails_fast() {
        let config = SmtpConfig::new("localhost", 1025)
            .with_tls(false)
            .with_credentials("relay@jorbites.com", "secret");
        let provider = SmtpProvider::new(config).unwrap();

        let err = provider.send(&email("  ")).await.unwrap_err();
        assert!(matches!(err, NotificationError::ProviderError(_)));
    }

    #[test]
    fn test_message_uses_configured_sender() {
        let config = SmtpConfig::new("localhost", 1025)
            .with_tls(false)
            .with_credentials("relay@jorbites.com", "secret");
        let provider = SmtpProvider::new(config).unwrap();

        let message = provider.build_message(&email("chef@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: Jorbites <relay@jorbites.com>"));
        assert!(raw.contains("To: chef@example.com"));
    }
}
