use crate::adapters::TokioTimeProvider;
use crate::ports::{StoreFuture, SubscriptionStore, TimeProvider};
use crate::store::SubscriptionTable;
use crate::types::push::{NewSubscription, Subscription};

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemorySubscriptionStore<T = TokioTimeProvider> {
    table: Arc<Mutex<SubscriptionTable>>,
    time: T,
}

impl<T: TimeProvider> MemorySubscriptionStore<T> {
    pub fn new(time: T) -> Self {
        Self {
            table: Arc::new(Mutex::new(SubscriptionTable::default())),
            time,
        }
    }
}

impl<T: TimeProvider> SubscriptionStore for MemorySubscriptionStore<T> {
    fn list_all(&self) -> StoreFuture<'_, Vec<Subscription>> {
        let subscriptions = self
            .table
            .lock()
            .expect("subscription table lock")
            .list_newest_first();
        Box::pin(async move { Ok(subscriptions) })
    }

    fn upsert(&self, subscription: NewSubscription) -> StoreFuture<'_, Subscription> {
        let now = self.time.now();
        let stored = self
            .table
            .lock()
            .expect("subscription table lock")
            .upsert(subscription, now);
        Box::pin(async move { Ok(stored) })
    }

    fn delete_by_endpoint<'a>(&'a self, endpoint: &'a str) -> StoreFuture<'a, usize> {
        let removed = self
            .table
            .lock()
            .expect("subscription table lock")
            .remove(endpoint);
        Box::pin(async move { Ok(removed) })
    }
}
