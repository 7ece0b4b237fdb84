use crate::types::notification::NotificationPayload;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 64;
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TRIGGER_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen: SocketAddr,
    pub vapid_private_key: Option<String>,
    pub vapid_public_key: Option<String>,
    pub vapid_subject: Option<String>,
    /// Bearer secret required by the send trigger, when set.
    pub trigger_secret: Option<String>,
    /// In-memory store when absent.
    pub subscriptions_file: Option<PathBuf>,
    pub delivery: DeliveryLimits,
}

/// Per-engine caps on fan-out: in-flight attempts and time allowed per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryLimits {
    pub concurrency: usize,
    pub send_timeout: Duration,
}

impl Default for DeliveryLimits {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

/// Settings for the `schedule` runner, which fires rounds through a running server.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Base URL of the server; rounds are posted to `<target>/push/send`.
    pub target: String,
    pub trigger_secret: Option<String>,
    pub interval: Duration,
    /// Upper bound on one trigger request, round included.
    pub request_timeout: Duration,
    /// Runs until interrupted when `None`.
    pub max_rounds: Option<u64>,
    pub payload: NotificationPayload,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            vapid_private_key: None,
            vapid_public_key: None,
            vapid_subject: None,
            trigger_secret: None,
            subscriptions_file: None,
            delivery: DeliveryLimits::default(),
        }
    }
}
