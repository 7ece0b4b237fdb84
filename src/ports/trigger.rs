use std::pin::Pin;

use crate::types::delivery::DeliveryStats;
use crate::types::notification::NotificationPayload;

pub type TriggerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<DeliveryStats, TriggerError>> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("trigger endpoint responded with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("trigger request failed: {0}")]
    Request(String),
}

/// Starts one delivery round somewhere and reports its stats.
pub trait RoundTrigger: Send + Sync + 'static {
    fn fire<'a>(&'a self, payload: &'a NotificationPayload) -> TriggerFuture<'a>;
}
