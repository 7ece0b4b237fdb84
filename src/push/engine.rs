use crate::config::DeliveryLimits;
use crate::ports::{PushSender, StoreError, SubscriptionStore};
use crate::push::classify::{AttemptError, classify};
use crate::types::delivery::{DeliveryOutcome, DeliveryReport, DeliverySummary};
use crate::types::notification::{NotificationPayload, PayloadError};
use crate::types::push::Subscription;

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("no subscriptions to deliver to")]
    NoRecipients,
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("delivery round aborted: {0}")]
    RoundAborted(String),
}

/// Fans one payload out to a set of subscriptions and prunes the endpoints
/// the push services report as gone.
///
/// Attempts run as separate tasks, gated by a semaphore that is shared by every
/// round of the same engine, so overlapping rounds respect one in-flight cap.
#[derive(Clone)]
pub struct DeliveryEngine {
    sender: Arc<dyn PushSender>,
    store: Arc<dyn SubscriptionStore>,
    limits: DeliveryLimits,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for DeliveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryEngine")
            .field("limits", &self.limits)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

type Attempt = Result<(), AttemptError>;

impl DeliveryEngine {
    pub fn new(
        sender: Arc<dyn PushSender>,
        store: Arc<dyn SubscriptionStore>,
        limits: DeliveryLimits,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(limits.concurrency.max(1)));
        Self {
            sender,
            store,
            limits,
            permits,
        }
    }

    pub fn limits(&self) -> DeliveryLimits {
        self.limits
    }

    /// Validates the payload, snapshots the store and delivers to everything in it.
    #[tracing::instrument(level = "info", skip_all, name = "delivery_round")]
    pub async fn run_round(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DeliverySummary, DeliveryError> {
        payload.validate()?;
        let subscriptions = self.store.list_all().await?;
        self.deliver(payload, &subscriptions).await
    }

    /// Delivers to `subscriptions` and prunes the endpoints reported gone.
    ///
    /// The round runs on its own task: once started it sends, classifies and
    /// prunes to completion even if the caller stops waiting for it.
    pub async fn deliver(
        &self,
        payload: &NotificationPayload,
        subscriptions: &[Subscription],
    ) -> Result<DeliverySummary, DeliveryError> {
        payload.validate()?;
        if subscriptions.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }
        let message: Arc<str> = Arc::from(payload.to_wire_json()?);

        let engine = self.clone();
        let subscriptions = subscriptions.to_vec();
        tokio::spawn(
            async move { engine.complete_round(subscriptions, message).await }
                .instrument(tracing::Span::current()),
        )
        .await
        .map_err(|err| DeliveryError::RoundAborted(err.to_string()))
    }

    async fn complete_round(
        &self,
        subscriptions: Vec<Subscription>,
        message: Arc<str>,
    ) -> DeliverySummary {
        tracing::info!(recipients = subscriptions.len(), "dispatching push notifications");
        let attempts = self.dispatch(&subscriptions, message).await;

        let mut reports: Vec<DeliveryReport> = subscriptions
            .iter()
            .zip(attempts)
            .map(|(subscription, attempt)| classify(&subscription.endpoint, attempt))
            .collect();
        for report in reports
            .iter()
            .filter(|report| report.outcome == DeliveryOutcome::TransientFailure)
        {
            tracing::warn!(
                endpoint = %report.endpoint,
                error = report.error.as_deref().unwrap_or_default(),
                "push delivery failed"
            );
        }
        self.prune(&mut reports).await;

        let summary = DeliverySummary::from_reports(reports);
        tracing::info!(
            total = summary.stats.total,
            successful = summary.stats.successful,
            failed = summary.stats.failed,
            removed = summary.stats.removed,
            "delivery round finished"
        );
        summary
    }

    /// One task per subscription, each waiting for a permit before it sends.
    /// Results come back in input order.
    async fn dispatch(&self, subscriptions: &[Subscription], message: Arc<str>) -> Vec<Attempt> {
        let handles: Vec<JoinHandle<Attempt>> = subscriptions
            .iter()
            .map(|subscription| {
                let span = tracing::debug_span!("push_attempt", endpoint = %subscription.endpoint);
                let permits = Arc::clone(&self.permits);
                let sender = Arc::clone(&self.sender);
                let subscription = subscription.clone();
                let message = Arc::clone(&message);
                let send_timeout = self.limits.send_timeout;
                tokio::spawn(
                    async move {
                        let _permit = permits
                            .acquire_owned()
                            .await
                            .map_err(|err| AttemptError::Aborted(err.to_string()))?;
                        let attempt =
                            tokio::time::timeout(send_timeout, sender.send(&subscription, &message))
                                .await;
                        match attempt {
                            Ok(Ok(())) => {
                                tracing::debug!("push notification sent");
                                Ok(())
                            }
                            Ok(Err(err)) => {
                                tracing::debug!(error = %err, "push service rejected notification");
                                Err(AttemptError::Send(err))
                            }
                            Err(_) => Err(AttemptError::TimedOut(send_timeout)),
                        }
                    }
                    .instrument(span),
                )
            })
            .collect();

        futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(attempt) => attempt,
                Err(err) if err.is_panic() => {
                    Err(AttemptError::Aborted("delivery task panicked".to_string()))
                }
                Err(err) => Err(AttemptError::Aborted(err.to_string())),
            })
            .collect()
    }

    /// Deletes subscriptions classified as permanently failed. Runs after every
    /// attempt has been classified; a failed delete leaves `removed` unset.
    async fn prune(&self, reports: &mut [DeliveryReport]) {
        for report in reports
            .iter_mut()
            .filter(|report| report.outcome == DeliveryOutcome::PermanentFailure)
        {
            match self.store.delete_by_endpoint(&report.endpoint).await {
                Ok(count) => {
                    tracing::info!(endpoint = %report.endpoint, count, "removed expired subscription");
                    report.removed = true;
                }
                Err(err) => {
                    tracing::error!(
                        endpoint = %report.endpoint,
                        error = %err,
                        "failed to remove expired subscription"
                    );
                    let detail = match report.error.take() {
                        Some(previous) => format!("{previous}; removal failed: {err}"),
                        None => format!("removal failed: {err}"),
                    };
                    report.error = Some(detail);
                }
            }
        }
    }
}
