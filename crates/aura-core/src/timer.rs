use std::time::Duration;

use tokio::task::JoinHandle;

/// A scheduled callback that is cancelled when dropped.
///
/// Owners keep the guard for as long as the timer should live; dropping it
/// (or calling [`TimerGuard::cancel`]) aborts the underlying task so no
/// callback fires after its view is gone.
#[derive(Debug)]
pub struct TimerGuard {
    handle: Option<JoinHandle<()>>,
}

impl TimerGuard {
    /// Run `fire` once after `delay`
    pub fn once<F>(delay: Duration, fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire();
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Run `fire` every `period`, first after one full period. Stops when
    /// `fire` returns `false`.
    pub fn every<F>(period: Duration, mut fire: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                if !fire() {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("cancelling timer");
            handle.abort();
        }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_once_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let _guard = TimerGuard::once(Duration::from_secs(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_guard_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let guard = TimerGuard::once(Duration::from_secs(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(guard);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_repeats_until_cancelled() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let guard = TimerGuard::every(Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);

        guard.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_stops_when_callback_declines() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let guard = TimerGuard::every(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst) < 1
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(guard.is_finished());
    }
}
