use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    Delivered,
    /// The push service discarded the endpoint; the subscription gets pruned.
    PermanentFailure,
    TransientFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    #[serde(rename = "subscriptionEndpoint")]
    pub endpoint: String,
    #[serde(rename = "status")]
    pub outcome: DeliveryOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

impl DeliveryReport {
    pub fn is_delivered(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub removed: usize,
}

/// Outcome of one delivery round; `results` follows the input subscription order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySummary {
    pub stats: DeliveryStats,
    pub results: Vec<DeliveryReport>,
}

impl DeliverySummary {
    pub fn from_reports(results: Vec<DeliveryReport>) -> Self {
        let successful = results.iter().filter(|report| report.is_delivered()).count();
        let removed = results.iter().filter(|report| report.removed).count();
        let stats = DeliveryStats {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            removed,
        };
        Self { stats, results }
    }
}
