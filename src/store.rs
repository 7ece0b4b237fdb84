use crate::types::push::{NewSubscription, Subscription};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

mod file;
mod memory;

pub use file::FileSubscriptionStore;
pub use memory::MemorySubscriptionStore;

/// Subscriptions keyed by endpoint. Both store backends keep one of these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SubscriptionTable {
    #[serde(default)]
    subscriptions: Vec<Subscription>,
}

impl SubscriptionTable {
    pub(crate) fn list_newest_first(&self) -> Vec<Subscription> {
        let mut subscriptions = self.subscriptions.clone();
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        subscriptions
    }

    pub(crate) fn upsert(&mut self, new: NewSubscription, now: OffsetDateTime) -> Subscription {
        if let Some(existing) = self
            .subscriptions
            .iter_mut()
            .find(|subscription| subscription.endpoint == new.endpoint)
        {
            existing.keys = new.keys;
            existing.user_agent = new.user_agent;
            existing.updated_at = now;
            return existing.clone();
        }

        let subscription = Subscription {
            id: uuid::Uuid::new_v4().to_string(),
            endpoint: new.endpoint,
            keys: new.keys,
            user_agent: new.user_agent,
            created_at: now,
            updated_at: now,
        };
        self.subscriptions.push(subscription.clone());
        subscription
    }

    pub(crate) fn remove(&mut self, endpoint: &str) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|subscription| subscription.endpoint != endpoint);
        before - self.subscriptions.len()
    }
}
