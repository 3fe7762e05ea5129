//! Web Push provider signed with VAPID.

use super::{PushDelivery, PushPayload, PushProvider, PUSH_TTL_SECS};
use crate::error::{NotificationError, NotificationResult};
use crate::models::PushSubscription;
use async_trait::async_trait;
use core_config::{env_required, ConfigError, FromEnv};
use tracing::debug;
use web_push::{
    ContentEncoding, HyperWebPushClient, PartialVapidSignatureBuilder, SubscriptionInfo,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

/// VAPID credentials for signing push requests.
#[derive(Clone)]
pub struct PushConfig {
    /// `mailto:` or `https:` contact placed in the `sub` claim.
    pub subject: String,
    pub public_key: String,
    pub private_key: String,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("subject", &self.subject)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl FromEnv for PushConfig {
    /// - VAPID_SUBJECT: required
    /// - VAPID_PUBLIC_KEY: required
    /// - VAPID_PRIVATE_KEY: required, URL-safe base64
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            subject: env_required("VAPID_SUBJECT")?,
            public_key: env_required("VAPID_PUBLIC_KEY")?,
            private_key: env_required("VAPID_PRIVATE_KEY")?,
        })
    }
}

pub struct WebPushProvider {
    client: HyperWebPushClient,
    signer: PartialVapidSignatureBuilder,
    subject: String,
}

impl WebPushProvider {
    pub fn new(config: &PushConfig) -> NotificationResult<Self> {
        let signer = VapidSignatureBuilder::from_base64_no_sub(&config.private_key)
            .map_err(|e| NotificationError::ConfigError(format!("Invalid VAPID private key: {}", e)))?;

        Ok(Self {
            client: HyperWebPushClient::new(),
            signer,
            subject: config.subject.clone(),
        })
    }
}

/// The push service reported that the endpoint is gone (404/410).
fn is_gone(err: &WebPushError) -> bool {
    matches!(
        err,
        WebPushError::EndpointNotValid { .. } | WebPushError::EndpointNotFound { .. }
    )
}

#[async_trait]
impl PushProvider for WebPushProvider {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> NotificationResult<PushDelivery> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.p256dh.clone(),
            subscription.auth.clone(),
        );

        let mut signature = self.signer.clone().add_sub_info(&info);
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature.build()?;

        let body = serde_json::to_vec(payload)?;
        let mut message = WebPushMessageBuilder::new(&info);
        message.set_ttl(PUSH_TTL_SECS);
        message.set_payload(ContentEncoding::Aes128Gcm, &body);
        message.set_vapid_signature(signature);
        let message = message.build()?;

        match self.client.send(message).await {
            Ok(()) => {
                debug!(subscription_id = %subscription.id, "Push delivered");
                Ok(PushDelivery::Delivered)
            }
            Err(err) if is_gone(&err) => Ok(PushDelivery::Gone),
            Err(err) => Err(err.into()),
        }
    }

    fn name(&self) -> &'static str {
        "WebPush"
    }
}

/// Stand-in used when VAPID keys are not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledPushProvider;

#[async_trait]
impl PushProvider for DisabledPushProvider {
    async fn send(
        &self,
        _subscription: &PushSubscription,
        _payload: &PushPayload,
    ) -> NotificationResult<PushDelivery> {
        Err(NotificationError::PushError("push delivery is not configured".into()))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::{Language, PushText};

    fn subscription() -> PushSubscription {
        PushSubscription {
            id: "s1".into(),
            user_id: "u1".into(),
            endpoint: "https://push.example.com/abc".into(),
            p256dh: "key".into(),
            auth: "auth".into(),
        }
    }

    #[test]
    fn test_push_config_requires_all_keys() {
        temp_env::with_vars(
            [
                ("VAPID_SUBJECT", Some("mailto:admin@jorbites.com")),
                ("VAPID_PUBLIC_KEY", Some("public")),
                ("VAPID_PRIVATE_KEY", None),
            ],
            || {
                assert!(matches!(
                    PushConfig::from_env(),
                    Err(ConfigError::MissingEnvVar(key)) if key == "VAPID_PRIVATE_KEY"
                ));
            },
        );
    }

    #[test]
    fn test_push_config_debug_hides_private_key() {
        let config = PushConfig {
            subject: "mailto:admin@jorbites.com".into(),
            public_key: "public".into(),
            private_key: "very-secret".into(),
        };
        assert!(!format!("{:?}", config).contains("very-secret"));
    }

    #[test]
    fn test_invalid_private_key_is_a_config_error() {
        let config = PushConfig {
            subject: "mailto:admin@jorbites.com".into(),
            public_key: "public".into(),
            private_key: "not base64 at all!".into(),
        };
        assert!(matches!(
            WebPushProvider::new(&config),
            Err(NotificationError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_provider_always_fails() {
        let payload = PushPayload::new(PushText::placeholder(Language::Es), "/");
        let result = DisabledPushProvider.send(&subscription(), &payload).await;
        assert!(matches!(result, Err(NotificationError::PushError(_))));
    }
}
