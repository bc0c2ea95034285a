//! The active-software-watchdog slot.
//!
//! Heartbeat producers only see a [`HeartbeatRegistry`]; at most one
//! [`SoftwareWatchdog`] can be registered in it at a time. The registry keeps
//! a weak reference, so a dropped watchdog stops consuming heartbeats without
//! being unregistered explicitly.

use std::sync::Weak;

use parking_lot::Mutex;
use wdog::{WatchdogError, WatchdogResult};

use crate::software::{Core, PokeOutcome, SoftwareWatchdog};

/// Single slot routing heartbeats to the active software watchdog.
#[derive(Debug, Default)]
pub struct HeartbeatRegistry {
    slot: Mutex<Option<Weak<Core>>>,
}

impl HeartbeatRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `watchdog` the heartbeat consumer.
    ///
    /// Registering the already active watchdog again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if another live watchdog is registered.
    pub fn register(&self, watchdog: &SoftwareWatchdog) -> WatchdogResult<()> {
        let mut slot = self.slot.lock();
        if let Some(active) = slot.as_ref().and_then(Weak::upgrade) {
            if watchdog.same_core(&active) {
                return Ok(());
            }
            return Err(WatchdogError::invalid_state(
                "a software watchdog is already registered",
            ));
        }
        *slot = Some(watchdog.downgrade());
        tracing::info!("Software watchdog registered for heartbeats");
        Ok(())
    }

    /// Clear the slot, returning whether a live watchdog was registered.
    pub fn unregister(&self) -> bool {
        let previous = self.slot.lock().take();
        let was_live = previous.is_some_and(|weak| weak.strong_count() > 0);
        if was_live {
            tracing::info!("Software watchdog unregistered");
        }
        was_live
    }

    /// Whether a live watchdog is registered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Deliver `ticks` heartbeat ticks to the registered watchdog.
    ///
    /// The slot lock is released before the ticks are counted, so an expiry
    /// handler runs without any registry lock held.
    pub fn poke(&self, ticks: u64) -> PokeOutcome {
        let active = self.slot.lock().as_ref().and_then(Weak::upgrade);
        match active {
            Some(core) => core.poke(ticks),
            None => PokeOutcome::Idle,
        }
    }
}
