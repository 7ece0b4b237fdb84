use crate::adapters::TokioTimeProvider;
use crate::ports::{PushSender, SendError, SendFuture, StoreError, StoreFuture, SubscriptionStore};
use crate::store::MemorySubscriptionStore;
use crate::types::push::{NewSubscription, Subscription, SubscriptionKeys};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone)]
pub(crate) enum Script {
    Reject(u16),
    Fail(&'static str),
    Delay(Duration),
    Hang,
    Panic,
}

/// Push sender whose behavior is scripted per endpoint. Unscripted endpoints succeed.
#[derive(Clone, Default)]
pub(crate) struct ScriptedSender {
    scripts: Arc<HashMap<String, Script>>,
    sent: Arc<Mutex<Vec<(String, String)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedSender {
    pub(crate) fn with_script(mut self, endpoint: &str, script: Script) -> Self {
        Arc::make_mut(&mut self.scripts).insert(endpoint.to_string(), script);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.sent.lock().expect("sent lock").len()
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl PushSender for ScriptedSender {
    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> SendFuture<'a> {
        self.sent
            .lock()
            .expect("sent lock")
            .push((subscription.endpoint.clone(), message.to_string()));
        let script = self.scripts.get(&subscription.endpoint).cloned();
        Box::pin(async move {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            let _guard = InFlight(Arc::clone(&self.in_flight));

            match script {
                None => Ok(()),
                Some(Script::Reject(status)) => Err(SendError::Rejected {
                    status,
                    message: format!("scripted status {status}"),
                }),
                Some(Script::Fail(message)) => Err(SendError::Transport(message.to_string())),
                Some(Script::Delay(delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
                Some(Script::Hang) => std::future::pending().await,
                Some(Script::Panic) => panic!("scripted sender panic"),
            }
        })
    }
}

/// Store that cannot be reached at all.
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

fn unreachable_store() -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "store unreachable",
    ))
}

impl SubscriptionStore for FailingStore {
    fn list_all(&self) -> StoreFuture<'_, Vec<Subscription>> {
        Box::pin(async { Err(unreachable_store()) })
    }

    fn upsert(&self, _subscription: NewSubscription) -> StoreFuture<'_, Subscription> {
        Box::pin(async { Err(unreachable_store()) })
    }

    fn delete_by_endpoint<'a>(&'a self, _endpoint: &'a str) -> StoreFuture<'a, usize> {
        Box::pin(async { Err(unreachable_store()) })
    }
}

pub(crate) fn subscription(endpoint: &str) -> Subscription {
    let now = OffsetDateTime::parse("2025-01-12T09:30:00Z", &Rfc3339).expect("parse now");
    Subscription {
        id: format!("id-{endpoint}"),
        endpoint: endpoint.to_string(),
        keys: SubscriptionKeys {
            p256dh: "p256".to_string(),
            auth: "auth".to_string(),
        },
        user_agent: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) async fn seeded_store(endpoints: &[&str]) -> Arc<dyn SubscriptionStore> {
    let store = MemorySubscriptionStore::new(TokioTimeProvider);
    for endpoint in endpoints {
        store
            .upsert(NewSubscription {
                endpoint: endpoint.to_string(),
                keys: SubscriptionKeys {
                    p256dh: "p256".to_string(),
                    auth: "auth".to_string(),
                },
                user_agent: Some("test-agent".to_string()),
            })
            .await
            .expect("seed subscription");
    }
    Arc::new(store)
}
