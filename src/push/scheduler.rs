use crate::ports;
use crate::types::notification::NotificationPayload;

use std::time::Duration;

/// Fires one delivery round per interval through a [`ports::RoundTrigger`].
#[derive(Debug, Clone)]
pub struct TriggerScheduler<T, R> {
    time: T,
    trigger: R,
    interval: Duration,
    max_rounds: Option<u64>,
}

impl<T, R> TriggerScheduler<T, R>
where
    T: ports::TimeProvider,
    R: ports::RoundTrigger,
{
    pub fn new(time: T, trigger: R, interval: Duration) -> Self {
        Self {
            time,
            trigger,
            interval,
            max_rounds: None,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: Option<u64>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Runs until `max_rounds` rounds have fired, or forever. A failed round is
    /// logged and the next one fires on schedule. Returns the rounds fired.
    pub async fn run(&self, payload: &NotificationPayload) -> u64 {
        let mut fired = 0u64;
        while self.max_rounds.is_none_or(|max| fired < max) {
            self.time.sleep(self.interval).await;
            fired += 1;
            let started_at = self.time.now();
            match self.trigger.fire(payload).await {
                Ok(stats) => {
                    tracing::info!(
                        round = fired,
                        %started_at,
                        successful = stats.successful,
                        failed = stats.failed,
                        removed = stats.removed,
                        "scheduled round delivered"
                    );
                    if stats.failed > 0 {
                        tracing::warn!(round = fired, failed = stats.failed, "notifications failed");
                    }
                }
                Err(err) => {
                    tracing::error!(round = fired, error = %err, "scheduled round failed");
                }
            }
        }
        fired
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::ports::{TriggerError, TriggerFuture};
    use crate::types::delivery::DeliveryStats;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;
    use tokio::sync::oneshot;

    #[derive(Clone)]
    struct TestTime {
        now: OffsetDateTime,
        sleeps: Arc<Mutex<Vec<oneshot::Sender<()>>>>,
        durations: Arc<Mutex<Vec<Duration>>>,
    }

    impl TestTime {
        fn new(now: OffsetDateTime) -> Self {
            Self {
                now,
                sleeps: Arc::new(Mutex::new(Vec::new())),
                durations: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sleep_durations(&self) -> Vec<Duration> {
            self.durations.lock().expect("durations lock").clone()
        }

        fn trigger_all(&self) {
            let mut sends = self.sleeps.lock().expect("sleeps lock");
            for sender in sends.drain(..) {
                let _ = sender.send(());
            }
        }

        async fn wait_for_sleeps(&self, count: usize) {
            for _ in 0..100 {
                if self.sleep_durations().len() >= count {
                    return;
                }
                tokio::task::yield_now().await;
            }
            panic!("scheduler never reached sleep #{count}");
        }
    }

    struct ManualSleep {
        receiver: oneshot::Receiver<()>,
    }

    impl Future for ManualSleep {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            match Pin::new(&mut self.receiver).poll(cx) {
                Poll::Ready(_) => Poll::Ready(()),
                Poll::Pending => Poll::Pending,
            }
        }
    }

    impl ports::TimeProvider for TestTime {
        type Sleep<'a>
            = ManualSleep
        where
            Self: 'a;

        fn now(&self) -> OffsetDateTime {
            self.now
        }

        fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
            let (sender, receiver) = oneshot::channel();
            self.durations
                .lock()
                .expect("durations lock")
                .push(duration);
            self.sleeps.lock().expect("sleeps lock").push(sender);
            ManualSleep { receiver }
        }
    }

    #[derive(Clone, Default)]
    struct TestTrigger {
        fired: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ports::RoundTrigger for TestTrigger {
        fn fire<'a>(&'a self, payload: &'a NotificationPayload) -> TriggerFuture<'a> {
            self.fired
                .lock()
                .expect("fired lock")
                .push(payload.title.clone());
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    return Err(TriggerError::Rejected {
                        status: 404,
                        message: "No subscriptions found".to_string(),
                    });
                }
                Ok(DeliveryStats {
                    total: 1,
                    successful: 1,
                    failed: 0,
                    removed: 0,
                })
            })
        }
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::parse("2025-01-12T09:30:00Z", &Rfc3339).expect("parse now")
    }

    #[tokio::test]
    async fn scheduler__should_wait_for_interval_before_each_round() {
        // Given
        let time = TestTime::new(now());
        let trigger = TestTrigger::default();
        let scheduler = TriggerScheduler::new(time.clone(), trigger.clone(), Duration::from_secs(10))
            .with_max_rounds(Some(2));
        let payload = NotificationPayload::new("Test Notification", "This is a test notification");

        // When
        let handle = tokio::spawn(async move { scheduler.run(&payload).await });
        time.wait_for_sleeps(1).await;

        // Then
        assert!(trigger.fired.lock().expect("fired lock").is_empty());

        time.trigger_all();
        time.wait_for_sleeps(2).await;
        assert_eq!(trigger.fired.lock().expect("fired lock").len(), 1);

        time.trigger_all();
        let fired = handle.await.expect("join scheduler");
        assert_eq!(fired, 2);
        assert_eq!(
            time.sleep_durations(),
            vec![Duration::from_secs(10), Duration::from_secs(10)]
        );
        assert_eq!(
            *trigger.fired.lock().expect("fired lock"),
            vec!["Test Notification".to_string(), "Test Notification".to_string()]
        );
    }

    #[tokio::test]
    async fn scheduler__should_keep_firing_after_failed_round() {
        // Given
        let time = TestTime::new(now());
        let trigger = TestTrigger {
            fail: true,
            ..Default::default()
        };
        let scheduler = TriggerScheduler::new(time.clone(), trigger.clone(), Duration::from_secs(1))
            .with_max_rounds(Some(2));
        let payload = NotificationPayload::new("Hello", "World");

        // When
        let handle = tokio::spawn(async move { scheduler.run(&payload).await });
        time.wait_for_sleeps(1).await;
        time.trigger_all();
        time.wait_for_sleeps(2).await;
        time.trigger_all();

        // Then
        assert_eq!(handle.await.expect("join scheduler"), 2);
        assert_eq!(trigger.fired.lock().expect("fired lock").len(), 2);
    }

    #[tokio::test]
    async fn scheduler__should_not_fire_when_max_rounds_is_zero() {
        let time = TestTime::new(now());
        let trigger = TestTrigger::default();
        let scheduler = TriggerScheduler::new(time.clone(), trigger.clone(), Duration::from_secs(1))
            .with_max_rounds(Some(0));

        let fired = scheduler.run(&NotificationPayload::new("Hello", "World")).await;

        assert_eq!(fired, 0);
        assert!(time.sleep_durations().is_empty());
    }
}
