//! Fixed-cadence refresh loop with explicit stop.
//!
//! A [`RefreshDriver`] runs on the caller's task. Each tick's callback runs
//! to completion before the next tick is awaited, so a session window only
//! ever has one writer. Stopping through a [`StopHandle`] wakes a pending
//! tick immediately and drops any in-flight callback future.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

use crate::DEFAULT_REFRESH_INTERVAL;

/// Shortest accepted refresh interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a [`RefreshDriver`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Stops the driver. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`Self::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Ticks at a fixed interval until stopped.
#[derive(Debug)]
pub struct RefreshDriver {
    period: Duration,
    interval: Option<Interval>,
    stop: StopHandle,
    stopped: watch::Receiver<bool>,
}

impl Default for RefreshDriver {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl RefreshDriver {
    /// Creates a driver ticking every `period` (at least [`MIN_INTERVAL`]).
    /// The first tick fires immediately.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let (tx, stopped) = watch::channel(false);
        Self {
            period: period.max(MIN_INTERVAL),
            interval: None,
            stop: StopHandle { tx: Arc::new(tx) },
            stopped,
        }
    }

    /// Tick period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns a handle that stops this driver.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Waits for the next tick. Resolves `true` on each interval and `false`
    /// once stopped.
    pub async fn tick(&mut self) -> bool {
        if self.stop.is_stopped() {
            return false;
        }

        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        tokio::select! {
            biased;
            _ = self.stopped.wait_for(|stopped| *stopped) => false,
            _ = interval.tick() => !self.stop.is_stopped(),
        }
    }

    /// Invokes `on_tick` once per tick until the driver is stopped or the
    /// callback breaks. Returns the number of completed callbacks.
    ///
    /// Stopping while a callback is pending drops that callback's future.
    pub async fn run<F, Fut>(&mut self, mut on_tick: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ControlFlow<()>>,
    {
        let mut completed = 0;

        while self.tick().await {
            let flow = tokio::select! {
                biased;
                _ = self.stopped.wait_for(|stopped| *stopped) => {
                    log::debug!("Refresh stopped during tick {}", completed + 1);
                    break;
                }
                flow = on_tick() => flow,
            };

            completed += 1;
            if flow.is_break() {
                break;
            }
        }

        log::debug!("Refresh driver finished after {completed} tick(s)");
        completed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_stopped() {
        let mut driver = RefreshDriver::new(Duration::from_secs(2));
        let stop = driver.stop_handle();

        assert!(driver.tick().await);
        assert!(driver.tick().await);
        stop.stop();
        assert!(!driver.tick().await);
        assert!(!driver.tick().await);
        assert!(stop.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_wakes_pending_tick() {
        let mut driver = RefreshDriver::new(Duration::from_secs(3600));
        let stop = driver.stop_handle();
        assert!(driver.tick().await);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            stop.stop();
        });

        let start = tokio::time::Instant::now();
        assert!(!driver.tick().await);
        assert!(start.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_break() {
        let mut driver = RefreshDriver::new(Duration::from_secs(2));
        let calls = AtomicUsize::new(0);

        let completed = driver
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n >= 5 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                }
            })
            .await;

        assert_eq!(completed, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_from_handle() {
        let mut driver = RefreshDriver::new(Duration::from_secs(2));
        let stop = driver.stop_handle();
        let calls = AtomicUsize::new(0);

        let completed = driver
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 3 {
                    stop.stop();
                }
                async { ControlFlow::Continue(()) }
            })
            .await;

        assert_eq!(completed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_drops_in_flight_callback() {
        let mut driver = RefreshDriver::new(Duration::from_secs(2));
        let stop = driver.stop_handle();
        let finished = AtomicUsize::new(0);
        let finished_ref = &finished;

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            stop.stop();
        });

        let completed = driver
            .run(move || async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                finished_ref.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            })
            .await;

        assert_eq!(completed, 0);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn period_has_floor() {
        assert_eq!(RefreshDriver::new(Duration::ZERO).period(), MIN_INTERVAL);
        assert_eq!(RefreshDriver::default().period(), Duration::from_secs(2));
    }
}
