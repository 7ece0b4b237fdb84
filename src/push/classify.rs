use crate::ports::SendError;
use crate::types::delivery::{DeliveryOutcome, DeliveryReport};

use std::time::Duration;

/// Statuses with which push services declare an endpoint gone for good.
const PERMANENT_STATUSES: [u16; 2] = [404, 410];

/// How a single delivery attempt settled, before classification.
#[derive(Debug)]
pub(crate) enum AttemptError {
    Send(SendError),
    TimedOut(Duration),
    Aborted(String),
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Send(err) => write!(f, "{err}"),
            AttemptError::TimedOut(limit) => {
                write!(f, "push attempt timed out after {}ms", limit.as_millis())
            }
            AttemptError::Aborted(reason) => write!(f, "push attempt aborted: {reason}"),
        }
    }
}

pub(crate) fn classify(endpoint: &str, attempt: Result<(), AttemptError>) -> DeliveryReport {
    let (outcome, error) = match attempt {
        Ok(()) => (DeliveryOutcome::Delivered, None),
        Err(AttemptError::Send(err))
            if err
                .status()
                .is_some_and(|status| PERMANENT_STATUSES.contains(&status)) =>
        {
            (DeliveryOutcome::PermanentFailure, Some(err.to_string()))
        }
        Err(err) => (DeliveryOutcome::TransientFailure, Some(err.to_string())),
    };
    DeliveryReport {
        endpoint: endpoint.to_string(),
        outcome,
        error,
        removed: false,
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://push.example/abc";

    fn rejected(status: u16) -> Result<(), AttemptError> {
        Err(AttemptError::Send(SendError::Rejected {
            status,
            message: "nope".to_string(),
        }))
    }

    #[test]
    fn classify__should_mark_success_delivered() {
        let report = classify(ENDPOINT, Ok(()));

        assert_eq!(report.outcome, DeliveryOutcome::Delivered);
        assert_eq!(report.endpoint, ENDPOINT);
        assert!(report.error.is_none());
    }

    #[test]
    fn classify__should_mark_gone_and_not_found_permanent() {
        for status in [404, 410] {
            let report = classify(ENDPOINT, rejected(status));

            assert_eq!(report.outcome, DeliveryOutcome::PermanentFailure, "{status}");
            assert!(!report.removed);
        }
    }

    #[test]
    fn classify__should_mark_other_statuses_transient() {
        for status in [400, 401, 413, 429, 500, 503] {
            let report = classify(ENDPOINT, rejected(status));

            assert_eq!(report.outcome, DeliveryOutcome::TransientFailure, "{status}");
            assert!(report.error.is_some());
        }
    }

    #[test]
    fn classify__should_mark_transport_timeout_and_abort_transient() {
        let attempts = [
            AttemptError::Send(SendError::Transport("connection reset".to_string())),
            AttemptError::TimedOut(Duration::from_millis(250)),
            AttemptError::Aborted("task panicked".to_string()),
        ];

        for attempt in attempts {
            let report = classify(ENDPOINT, Err(attempt));

            assert_eq!(report.outcome, DeliveryOutcome::TransientFailure);
        }
    }

    #[test]
    fn classify__should_keep_timeout_detail() {
        let report = classify(
            ENDPOINT,
            Err(AttemptError::TimedOut(Duration::from_millis(250))),
        );

        assert_eq!(
            report.error.as_deref(),
            Some("push attempt timed out after 250ms")
        );
    }
}
