//! Backend interface implemented by each watchdog chip driver.

use core::time::Duration;

use crate::action::Action;
use crate::capabilities::WatchdogCapabilities;
use crate::error::WatchdogResult;

/// Register-level watchdog primitives for one hardware unit.
///
/// A backend is owned by exactly one [`WatchdogController`](crate::WatchdogController)
/// and only the controller calls it. The controller serializes every call, so
/// methods take `&mut self` and need no internal locking.
///
/// # Contract
///
/// - `configure` is called with the controller's stored pair immediately
///   before every `enable`; the timeout is a whole number of steps within
///   [`WatchdogCapabilities::max_timeout`].
/// - `enable` fails with `InvalidState` if the hardware was never configured.
/// - `disable` fails with `InvalidState` if the hardware was never armed.
/// - `configure` may fail with `InvalidState` if armed and with
///   `Unsupported` for actions outside the capability set.
/// - `rearm` must not fail merely because the watchdog is disabled.
pub trait Backend: Send {
    /// Short human-readable description of the hardware.
    fn name(&self) -> &str {
        "watchdog"
    }

    /// Granularity, range and action set of this unit.
    fn capabilities(&self) -> &WatchdogCapabilities;

    /// Arm the hardware with the last configured timeout and action.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the hardware was never configured.
    fn enable(&mut self) -> WatchdogResult<()>;

    /// Disarm the hardware and reset its counter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the hardware was never armed.
    fn disable(&mut self) -> WatchdogResult<()>;

    /// Program timeout and action.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` if `action` is not implemented, or
    /// `InvalidState` if the backend refuses reconfiguration while armed.
    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()>;

    /// Reset the countdown without touching the configuration.
    ///
    /// # Errors
    ///
    /// Backend-specific; must not fail only because the watchdog is disabled.
    fn rearm(&mut self) -> WatchdogResult<()>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        (**self).capabilities()
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        (**self).enable()
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        (**self).disable()
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        (**self).configure(timeout, action)
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        (**self).rearm()
    }
}
