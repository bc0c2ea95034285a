//! Tick-counting software watchdog backend.
//!
//! The backend keeps an atomic tick counter. A heartbeat producer adds to it
//! through [`SoftwareWatchdog::poke`] (usually via a
//! [`HeartbeatRegistry`](crate::HeartbeatRegistry)); the poke whose addition
//! crosses the configured threshold fires the configured action. Rearming
//! resets the counter to zero.

use core::time::Duration;
use std::sync::{Arc, Weak};

use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use wdog::{Action, ActionSet, Backend, WatchdogCapabilities, WatchdogError, WatchdogResult};

use crate::config::SoftwareWatchdogConfig;
use crate::fire::{FireHandler, PanicFireHandler};

const FIRE_REASON: &str = "watchdog timeout";

/// Result of delivering a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PokeOutcome {
    /// No enabled watchdog consumed the ticks.
    Idle,
    /// Ticks were counted without reaching the timeout.
    Counted,
    /// This poke crossed the timeout and fired the action.
    Fired(Action),
}

#[derive(Debug)]
pub(crate) struct Core {
    enabled: AtomicBool,
    ticks: AtomicU64,
    timeout_ticks: AtomicU64,
    action: AtomicU32,
    fired: AtomicU64,
    handler: Arc<dyn FireHandler>,
}

impl Core {
    pub(crate) fn poke(&self, ticks: u64) -> PokeOutcome {
        if !self.enabled.load(Ordering::Acquire) {
            return PokeOutcome::Idle;
        }

        let timeout = self.timeout_ticks.load(Ordering::Acquire);
        let before = self.ticks.fetch_add(ticks, Ordering::AcqRel);
        let after = before.saturating_add(ticks);
        if timeout == 0 || before >= timeout || after < timeout {
            return PokeOutcome::Counted;
        }

        match Action::from_bit(self.action.load(Ordering::Acquire)) {
            Some(action) => {
                self.fire(action, after);
                PokeOutcome::Fired(action)
            }
            None => PokeOutcome::Counted,
        }
    }

    fn fire(&self, action: Action, ticks: u64) {
        self.fired.fetch_add(1, Ordering::AcqRel);
        tracing::error!(%action, ticks, "Software watchdog expired");
        match action {
            Action::Debugger => {
                self.handler.enter_debugger(FIRE_REASON);
                self.ticks.store(0, Ordering::Release);
            }
            _ => self.handler.fatal(FIRE_REASON),
        }
    }
}

/// Software watchdog backend.
///
/// Cloning is not supported; the heartbeat path reaches the backend through a
/// [`HeartbeatRegistry`](crate::HeartbeatRegistry) that holds a weak
/// reference, so dropping the backend silently detaches it from the
/// heartbeat.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use wdog::prelude::*;
/// use wdog_sw::prelude::*;
///
/// let handler = Arc::new(RecordingFireHandler::new());
/// let config = SoftwareWatchdogConfig::new(100)?;
/// let watchdog = SoftwareWatchdog::with_handler(config, handler.clone())?;
/// let registry = HeartbeatRegistry::new();
/// registry.register(&watchdog)?;
///
/// let controller = WatchdogController::attach(watchdog);
/// controller.set_timeout(Duration::from_secs(1))?;
/// controller.set_action(Action::Panic)?;
/// controller.enable()?;
///
/// assert_eq!(registry.poke(99), PokeOutcome::Counted);
/// assert_eq!(registry.poke(1), PokeOutcome::Fired(Action::Panic));
/// assert_eq!(handler.fatal_count(), 1);
/// # Ok::<(), WatchdogError>(())
/// ```
#[derive(Debug)]
pub struct SoftwareWatchdog {
    config: SoftwareWatchdogConfig,
    capabilities: WatchdogCapabilities,
    core: Arc<Core>,
}

impl SoftwareWatchdog {
    /// Create a software watchdog that panics on fatal expiry.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the configuration is invalid.
    pub fn new(config: SoftwareWatchdogConfig) -> WatchdogResult<Self> {
        Self::with_handler(config, Arc::new(PanicFireHandler))
    }

    /// Create a software watchdog with a custom expiry handler.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the configuration is invalid.
    pub fn with_handler(
        config: SoftwareWatchdogConfig,
        handler: Arc<dyn FireHandler>,
    ) -> WatchdogResult<Self> {
        config.validate()?;

        let mut actions = ActionSet::from(Action::Panic);
        if config.debugger {
            actions.insert(Action::Debugger);
        }
        let capabilities =
            WatchdogCapabilities::new(config.tick(), config.ticks_per_day(), actions)?;

        Ok(Self {
            config,
            capabilities,
            core: Arc::new(Core {
                enabled: AtomicBool::new(false),
                ticks: AtomicU64::new(0),
                timeout_ticks: AtomicU64::new(0),
                action: AtomicU32::new(0),
                fired: AtomicU64::new(0),
                handler,
            }),
        })
    }

    /// Configuration this watchdog was built with.
    #[must_use]
    pub fn config(&self) -> &SoftwareWatchdogConfig {
        &self.config
    }

    /// Deliver `ticks` heartbeat ticks directly.
    pub fn poke(&self, ticks: u64) -> PokeOutcome {
        self.core.poke(ticks)
    }

    /// Whether the watchdog is armed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.core.enabled.load(Ordering::Acquire)
    }

    /// Ticks accumulated since the last rearm.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.core.ticks.load(Ordering::Acquire)
    }

    /// Configured threshold in ticks, zero if never configured.
    #[must_use]
    pub fn timeout_ticks(&self) -> u64 {
        self.core.timeout_ticks.load(Ordering::Acquire)
    }

    /// Number of times the watchdog fired.
    #[must_use]
    pub fn fire_count(&self) -> u64 {
        self.core.fired.load(Ordering::Acquire)
    }

    pub(crate) fn downgrade(&self) -> Weak<Core> {
        Arc::downgrade(&self.core)
    }

    pub(crate) fn same_core(&self, other: &Arc<Core>) -> bool {
        Arc::ptr_eq(&self.core, other)
    }
}

impl Backend for SoftwareWatchdog {
    fn name(&self) -> &str {
        "software watchdog"
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        if self.timeout_ticks() == 0 {
            return Err(WatchdogError::invalid_state(
                "software watchdog was never configured",
            ));
        }
        // A poke that raced the last disable may have left ticks behind.
        self.core.ticks.store(0, Ordering::Release);
        self.core.enabled.store(true, Ordering::Release);
        Ok(())
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        if !self.core.enabled.swap(false, Ordering::AcqRel) {
            return Err(WatchdogError::invalid_state(
                "software watchdog is not enabled",
            ));
        }
        self.core.ticks.store(0, Ordering::Release);
        Ok(())
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        if !self.capabilities.supports(action) {
            return Err(WatchdogError::unsupported(format!(
                "software watchdog cannot {action}"
            )));
        }
        let ticks = self.capabilities.steps_in(timeout);
        if ticks == 0 {
            return Err(WatchdogError::unsupported(format!(
                "timeout {timeout:?} is shorter than one tick"
            )));
        }

        self.core.action.store(action.bit(), Ordering::Release);
        self.core.timeout_ticks.store(ticks, Ordering::Release);
        tracing::debug!(timeout_ticks = ticks, %action, "Software watchdog configured");
        Ok(())
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        self.core.ticks.store(0, Ordering::Release);
        Ok(())
    }
}
