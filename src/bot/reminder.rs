//! One-shot delayed notifications.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

/// Schedules one-shot reminder timers.
///
/// Each job is a spawned task that sleeps for the delay and then runs the
/// notify future exactly once. Jobs are not tracked and expose no
/// cancellation; pending timers die with the process.
pub struct ReminderScheduler;

impl ReminderScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Schedule `notify` to run once after `delay`.
    ///
    /// A zero delay creates no job. Returns whether a job was created. The
    /// timer runs on its own task; the caller never blocks on it.
    pub fn schedule<F>(&self, delay: Duration, notify: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if delay.is_zero() {
            debug!("Zero-length delay, no reminder created");
            return false;
        }

        tokio::spawn(async move {
            sleep(delay).await;
            notify.await;
        });
        true
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_zero_delay_never_fires() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let scheduler = ReminderScheduler::new();
        let created = scheduler.schedule(Duration::ZERO, async move {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!created);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fires_exactly_once_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let scheduler = ReminderScheduler::new();
        let created = scheduler.schedule(Duration::from_millis(60), async move {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(created);

        // Not before the delay elapses
        sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // Fires after
        sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // Never a second time
        sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_jobs_are_independent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = ReminderScheduler::new();

        for _ in 0..3 {
            let counter_clone = counter.clone();
            scheduler.schedule(Duration::from_millis(30), async move {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            });
        }

        sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_caller_does_not_block() {
        let scheduler = ReminderScheduler::new();
        let start = std::time::Instant::now();
        scheduler.schedule(Duration::from_millis(200), async {});
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
