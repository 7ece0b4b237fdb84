use std::pin::Pin;

use crate::types::push::{NewSubscription, Subscription};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("subscription store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode subscription store: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("failed to encode subscription store: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Keyed record store for subscriptions. `endpoint` is the key.
pub trait SubscriptionStore: Send + Sync + 'static {
    /// Snapshot of every subscription, newest first.
    fn list_all(&self) -> StoreFuture<'_, Vec<Subscription>>;

    fn upsert(&self, subscription: NewSubscription) -> StoreFuture<'_, Subscription>;

    /// Returns how many records were removed; zero when the endpoint is unknown.
    fn delete_by_endpoint<'a>(&'a self, endpoint: &'a str) -> StoreFuture<'a, usize>;
}
