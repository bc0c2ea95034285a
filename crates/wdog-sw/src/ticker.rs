//! Periodic heartbeat source.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use portable_atomic::{AtomicBool, AtomicU64, Ordering};
use wdog::{WatchdogError, WatchdogResult};

use crate::config::{MAX_HZ, MIN_HZ};
use crate::registry::HeartbeatRegistry;
use crate::software::PokeOutcome;

/// Background thread poking a [`HeartbeatRegistry`] `hz` times per second.
///
/// Stops when [`Ticker::stop`] is called or the ticker is dropped.
#[derive(Debug)]
pub struct Ticker {
    hz: u32,
    stop: Arc<AtomicBool>,
    sent: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if `hz` is out of range, or `InvalidState` if the
    /// thread cannot be spawned.
    pub fn spawn(registry: Arc<HeartbeatRegistry>, hz: u32) -> WatchdogResult<Self> {
        if !(MIN_HZ..=MAX_HZ).contains(&hz) {
            return Err(WatchdogError::invalid(format!(
                "ticker rate must be between {MIN_HZ} and {MAX_HZ} Hz, got {hz}"
            )));
        }

        let stop = Arc::new(AtomicBool::new(false));
        let sent = Arc::new(AtomicU64::new(0));
        let period = Duration::from_secs(1) / hz;

        let handle = thread::Builder::new()
            .name("wdog-ticker".to_owned())
            .spawn({
                let stop = Arc::clone(&stop);
                let sent = Arc::clone(&sent);
                move || run(&registry, period, &stop, &sent)
            })
            .map_err(|e| WatchdogError::invalid_state(format!("cannot spawn ticker: {e}")))?;

        tracing::debug!(hz, "Heartbeat ticker started");
        Ok(Self {
            hz,
            stop,
            sent,
            handle: Some(handle),
        })
    }

    /// Configured rate.
    #[must_use]
    pub fn hz(&self) -> u32 {
        self.hz
    }

    /// Ticks delivered so far.
    #[must_use]
    pub fn ticks_sent(&self) -> u64 {
        self.sent.load(Ordering::Acquire)
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Heartbeat ticker thread panicked");
            }
            tracing::debug!(ticks = self.ticks_sent(), "Heartbeat ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(registry: &HeartbeatRegistry, period: Duration, stop: &AtomicBool, sent: &AtomicU64) {
    let mut next = Instant::now();
    while !stop.load(Ordering::Acquire) {
        if let PokeOutcome::Fired(action) = registry.poke(1) {
            tracing::warn!(%action, "Heartbeat ticker observed watchdog expiry");
        }
        sent.fetch_add(1, Ordering::AcqRel);

        let now = Instant::now();
        next = next.checked_add(period).unwrap_or(now);
        if next > now {
            thread::sleep(next.saturating_duration_since(now));
        } else {
            next = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_rate() {
        let registry = Arc::new(HeartbeatRegistry::new());
        assert!(matches!(
            Ticker::spawn(Arc::clone(&registry), 0),
            Err(WatchdogError::Invalid(_))
        ));
        assert!(matches!(
            Ticker::spawn(registry, 20_000),
            Err(WatchdogError::Invalid(_))
        ));
    }

    #[test]
    fn test_ticks_until_stopped() -> WatchdogResult<()> {
        let registry = Arc::new(HeartbeatRegistry::new());
        let ticker = Ticker::spawn(registry, 1000)?;
        let deadline = Instant::now() + Duration::from_secs(5);
        while ticker.ticks_sent() < 5 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(ticker.ticks_sent() >= 5);
        ticker.stop();
        Ok(())
    }
}
