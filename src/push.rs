use crate::adapters::WebPushSender;
use crate::config;
use crate::ports::SubscriptionStore;

mod classify;
mod engine;
mod scheduler;
#[cfg(test)]
pub(crate) mod testing;
pub(crate) mod vapid;

use std::sync::Arc;

pub use engine::{DeliveryEngine, DeliveryError};
pub use scheduler::TriggerScheduler;
pub use vapid::{VapidConfigStatus, VapidCredentials, generate_vapid_credentials, load_vapid_config};

/// Builds the delivery engine from the VAPID settings. Returns `None`, after
/// logging why, when delivery cannot be enabled.
pub fn build_engine(
    config: &config::AppConfig,
    store: Arc<dyn SubscriptionStore>,
) -> Option<DeliveryEngine> {
    let vapid = match load_vapid_config(config) {
        VapidConfigStatus::Ready(vapid) => vapid,
        VapidConfigStatus::Incomplete => {
            tracing::warn!("push notifications disabled: incomplete VAPID configuration");
            return None;
        }
        VapidConfigStatus::Missing => {
            tracing::info!("push notifications disabled: no VAPID configuration");
            return None;
        }
    };

    if let Err(err) = vapid::check_key_pair(&vapid) {
        tracing::warn!(error = %err, "push notifications disabled: unusable VAPID keys");
        return None;
    }

    let sender = match WebPushSender::new(vapid) {
        Ok(sender) => sender,
        Err(err) => {
            tracing::error!(error = %err, "push notifications disabled: failed to init web-push");
            return None;
        }
    };

    Some(DeliveryEngine::new(Arc::new(sender), store, config.delivery))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::push::testing::seeded_store;

    #[tokio::test]
    async fn build_engine__should_stay_disabled_without_vapid_config() {
        let store = seeded_store(&[]).await;

        let engine = build_engine(&config::AppConfig::default(), store);

        assert!(engine.is_none());
    }

    #[tokio::test]
    async fn build_engine__should_stay_disabled_with_mismatched_keys() {
        // Given
        let credentials = generate_vapid_credentials().expect("credentials");
        let other = generate_vapid_credentials().expect("credentials");
        let config = config::AppConfig {
            vapid_private_key: Some(credentials.private_key),
            vapid_public_key: Some(other.public_key),
            vapid_subject: Some("mailto:ops@example.com".to_string()),
            ..Default::default()
        };
        let store = seeded_store(&[]).await;

        // When
        let engine = build_engine(&config, store);

        // Then
        assert!(engine.is_none());
    }
}
