use crate::auth::{AuthError, TriggerAuth};
use crate::config::AppConfig;
use crate::ports::SubscriptionStore;
use crate::push::DeliveryEngine;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn SubscriptionStore>,
    /// `None` while VAPID credentials are missing or unusable.
    pub engine: Option<Arc<DeliveryEngine>>,
    pub(crate) trigger_auth: Option<TriggerAuth>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn SubscriptionStore>,
        engine: Option<DeliveryEngine>,
    ) -> Result<Self, AuthError> {
        let trigger_auth = TriggerAuth::from_secret(config.trigger_secret.as_deref())?;
        Ok(Self {
            config,
            store,
            engine: engine.map(Arc::new),
            trigger_auth,
        })
    }
}
