use crate::adapters::TokioTimeProvider;
use crate::ports::{StoreError, StoreFuture, SubscriptionStore, TimeProvider};
use crate::store::SubscriptionTable;
use crate::types::push::{NewSubscription, Subscription};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Subscription table persisted as a TOML document. The whole document is
/// rewritten after every mutation, through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileSubscriptionStore<T = TokioTimeProvider> {
    path: PathBuf,
    table: Arc<Mutex<SubscriptionTable>>,
    time: T,
}

impl<T: TimeProvider> FileSubscriptionStore<T> {
    pub async fn open(path: impl Into<PathBuf>, time: T) -> Result<Self, StoreError> {
        let path = path.into();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => toml::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                SubscriptionTable::default()
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(path = %path.display(), "opened subscription store");
        Ok(Self {
            path,
            table: Arc::new(Mutex::new(table)),
            time,
        })
    }
}

async fn persist(path: &Path, table: &SubscriptionTable) -> Result<(), StoreError> {
    let contents = toml::to_string(table)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

impl<T: TimeProvider> SubscriptionStore for FileSubscriptionStore<T> {
    fn list_all(&self) -> StoreFuture<'_, Vec<Subscription>> {
        Box::pin(async move { Ok(self.table.lock().await.list_newest_first()) })
    }

    fn upsert(&self, subscription: NewSubscription) -> StoreFuture<'_, Subscription> {
        Box::pin(async move {
            let mut table = self.table.lock().await;
            let mut updated = table.clone();
            let stored = updated.upsert(subscription, self.time.now());
            persist(&self.path, &updated).await?;
            *table = updated;
            Ok(stored)
        })
    }

    fn delete_by_endpoint<'a>(&'a self, endpoint: &'a str) -> StoreFuture<'a, usize> {
        Box::pin(async move {
            let mut table = self.table.lock().await;
            let mut updated = table.clone();
            let removed = updated.remove(endpoint);
            if removed == 0 {
                return Ok(0);
            }
            persist(&self.path, &updated).await?;
            *table = updated;
            Ok(removed)
        })
    }
}
