//! Watchdog controller state machine.
//!
//! The controller owns one [`Backend`], the stored [`WatchdogConfig`] and the
//! `running`/`immutable` flags. It validates every request against the
//! backend's [`WatchdogCapabilities`] before touching the hardware.
//!
//! ```text
//! Unconfigured ──set_timeout + set_action──► Configured ──enable()──► Running
//!                                                ▲                      │
//!                                                └──────disable()───────┘
//!                                                  (refused if immutable)
//! ```

use core::time::Duration;

use parking_lot::Mutex;

use crate::action::Action;
use crate::backend::Backend;
use crate::capabilities::WatchdogCapabilities;
use crate::config::WatchdogConfig;
use crate::error::{WatchdogError, WatchdogResult};
use crate::state::{ControllerFlags, Latch, Phase};

struct Inner<B> {
    backend: B,
    config: WatchdogConfig,
    running: bool,
    immutable: Latch,
}

impl<B> Inner<B> {
    fn flags(&self) -> ControllerFlags {
        ControllerFlags {
            running: self.running,
            immutable: self.immutable.is_set(),
        }
    }

    fn ensure_mutable(&self, what: &str) -> WatchdogResult<()> {
        if self.immutable.is_set() {
            return Err(WatchdogError::permission_denied(format!(
                "cannot change {what}: watchdog is immutable"
            )));
        }
        Ok(())
    }
}

/// Device-class-independent watchdog controller.
///
/// All operations take `&self` and serialize on an internal mutex that
/// covers the stored configuration, the flags and the backend call, so a
/// controller can be shared between concurrent callers behind an `Arc`.
///
/// Changing the stored timeout or action is gated only by the immutable
/// flag, not by the running flag: the new values reach the hardware on the
/// next [`enable`](Self::enable).
///
/// # Example
///
/// ```rust
/// use core::time::Duration;
/// use wdog::prelude::*;
/// # use wdog::WatchdogResult;
/// # struct Chip(WatchdogCapabilities);
/// # impl Backend for Chip {
/// #     fn capabilities(&self) -> &WatchdogCapabilities { &self.0 }
/// #     fn enable(&mut self) -> WatchdogResult<()> { Ok(()) }
/// #     fn disable(&mut self) -> WatchdogResult<()> { Ok(()) }
/// #     fn configure(&mut self, _: Duration, _: Action) -> WatchdogResult<()> { Ok(()) }
/// #     fn rearm(&mut self) -> WatchdogResult<()> { Ok(()) }
/// # }
/// let caps = WatchdogCapabilities::new(Duration::from_secs(1), 60, Action::Reset.into())?;
/// let controller = WatchdogController::attach(Chip(caps));
///
/// controller.set_timeout(Duration::from_secs(45))?;
/// controller.set_action(Action::Reset)?;
/// controller.enable()?;
/// assert!(controller.query_state().running);
///
/// controller.rearm()?;
/// controller.disable()?;
/// assert!(!controller.query_state().running);
/// # Ok::<(), wdog::WatchdogError>(())
/// ```
pub struct WatchdogController<B: Backend> {
    name: String,
    capabilities: WatchdogCapabilities,
    inner: Mutex<Inner<B>>,
}

impl<B: Backend> WatchdogController<B> {
    /// Bind a controller to `backend` with a cleared configuration.
    pub fn attach(backend: B) -> Self {
        let capabilities = *backend.capabilities();
        let name = backend.name().to_owned();

        tracing::info!(
            backend = %name,
            actions = %capabilities.supported_actions(),
            max_timeout_s = capabilities.max_timeout().as_secs(),
            "Watchdog attached"
        );

        Self {
            name,
            capabilities,
            inner: Mutex::new(Inner {
                backend,
                config: WatchdogConfig::new(),
                running: false,
                immutable: Latch::new(),
            }),
        }
    }

    /// Backend description captured at attach time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend capabilities captured at attach time.
    #[must_use]
    pub fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    /// Copy of the stored configuration.
    #[must_use]
    pub fn config(&self) -> WatchdogConfig {
        self.inner.lock().config
    }

    /// Current state flags. Side-effect free.
    #[must_use]
    pub fn query_state(&self) -> ControllerFlags {
        self.inner.lock().flags()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        let inner = self.inner.lock();
        if inner.running {
            Phase::Running
        } else if inner.config.is_valid() {
            Phase::Configured
        } else {
            Phase::Unconfigured
        }
    }

    /// Store a new timeout, rounded down to a whole number of steps.
    ///
    /// Returns the value actually stored.
    ///
    /// # Errors
    ///
    /// - `Invalid` if `timeout` is zero.
    /// - `Unsupported` if `timeout` exceeds the backend's maximum or is
    ///   shorter than one step.
    /// - `PermissionDenied` if the controller is immutable.
    pub fn set_timeout(&self, timeout: Duration) -> WatchdogResult<Duration> {
        if timeout.is_zero() {
            return Err(WatchdogError::invalid("timeout must be greater than 0"));
        }

        let max = self.capabilities.max_timeout();
        if timeout > max {
            return Err(WatchdogError::unsupported(format!(
                "timeout {timeout:?} exceeds maximum {max:?}"
            )));
        }

        let floored = self.capabilities.floor_to_step(timeout);
        if floored.is_zero() {
            return Err(WatchdogError::unsupported(format!(
                "timeout {timeout:?} is shorter than one step ({:?})",
                self.capabilities.step()
            )));
        }

        let mut inner = self.inner.lock();
        inner.ensure_mutable("timeout")?;
        inner.config.timeout = Some(floored);

        tracing::debug!(
            backend = %self.name,
            requested = ?timeout,
            stored = ?floored,
            running = inner.running,
            "Watchdog timeout stored"
        );
        Ok(floored)
    }

    /// Store a new expiry action.
    ///
    /// # Errors
    ///
    /// - `Unsupported` if the backend does not implement `action`.
    /// - `PermissionDenied` if the controller is immutable.
    pub fn set_action(&self, action: Action) -> WatchdogResult<()> {
        if !self.capabilities.supports(action) {
            return Err(WatchdogError::unsupported(format!(
                "action '{action}' not in {}",
                self.capabilities.supported_actions()
            )));
        }

        let mut inner = self.inner.lock();
        inner.ensure_mutable("action")?;
        inner.config.action = Some(action);

        tracing::debug!(
            backend = %self.name,
            %action,
            running = inner.running,
            "Watchdog action stored"
        );
        Ok(())
    }

    /// Program the stored configuration into the backend and arm it.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if already running or the configuration is
    ///   incomplete.
    /// - Any error from the backend's `configure` or `enable`; the
    ///   controller is left not running.
    pub fn enable(&self) -> WatchdogResult<()> {
        let mut inner = self.inner.lock();
        if inner.running {
            return Err(WatchdogError::invalid_state("watchdog is already running"));
        }
        let Some((timeout, action)) = inner.config.pair() else {
            return Err(WatchdogError::invalid_state(
                "timeout and action must be configured before enabling",
            ));
        };

        if let Err(e) = inner.backend.configure(timeout, action) {
            tracing::warn!(backend = %self.name, error = %e, "Backend refused configuration");
            return Err(e);
        }
        if let Err(e) = inner.backend.enable() {
            tracing::warn!(backend = %self.name, error = %e, "Backend refused to arm");
            return Err(e);
        }
        inner.running = true;

        tracing::info!(
            backend = %self.name,
            ?timeout,
            %action,
            "Watchdog enabled"
        );
        Ok(())
    }

    /// Disarm the backend.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if not running.
    /// - `PermissionDenied` if the controller is immutable.
    /// - Any error from the backend's `disable`; the controller stays running.
    pub fn disable(&self) -> WatchdogResult<()> {
        let mut inner = self.inner.lock();
        if !inner.running {
            return Err(WatchdogError::invalid_state("watchdog is not running"));
        }
        if inner.immutable.is_set() {
            return Err(WatchdogError::permission_denied(
                "cannot disable: watchdog is immutable",
            ));
        }

        if let Err(e) = inner.backend.disable() {
            tracing::warn!(backend = %self.name, error = %e, "Backend refused to disarm");
            return Err(e);
        }
        inner.running = false;

        tracing::info!(backend = %self.name, "Watchdog disabled");
        Ok(())
    }

    /// Reset the backend's countdown.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if not running.
    /// - Any error from the backend's `rearm`.
    pub fn rearm(&self) -> WatchdogResult<()> {
        let mut inner = self.inner.lock();
        if !inner.running {
            return Err(WatchdogError::invalid_state("watchdog is not running"));
        }
        inner.backend.rearm()?;
        tracing::trace!(backend = %self.name, "Watchdog rearmed");
        Ok(())
    }

    /// Set or query-clear the immutable flag.
    ///
    /// Setting is idempotent. Clearing succeeds only as a no-op on a flag
    /// that was never set.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when asked to clear a set flag.
    pub fn set_immutable(&self, immutable: bool) -> WatchdogResult<()> {
        let mut inner = self.inner.lock();
        if immutable {
            if inner.immutable.set() {
                tracing::info!(
                    backend = %self.name,
                    running = inner.running,
                    "Watchdog locked immutable"
                );
            }
            Ok(())
        } else if inner.immutable.is_set() {
            Err(WatchdogError::permission_denied(
                "immutable flag cannot be cleared",
            ))
        } else {
            Ok(())
        }
    }

    /// Check the immutable flag.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.inner.lock().immutable.is_set()
    }

    /// Run `f` against the backend while holding the controller lock.
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.inner.lock().backend)
    }

    /// Run `f` against the backend mutably while holding the controller lock.
    ///
    /// Intended for driving simulated hardware; going around the controller's
    /// setters here bypasses its validation.
    pub fn with_backend_mut<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.inner.lock().backend)
    }

    /// Tear the controller down and hand the backend back.
    ///
    /// A running watchdog is disarmed on a best-effort basis; failures are
    /// logged. An immutable running watchdog is left armed.
    pub fn detach(self) -> B {
        let mut inner = self.inner.into_inner();
        if inner.running {
            if inner.immutable.is_set() {
                tracing::warn!(
                    backend = %self.name,
                    "Detaching immutable watchdog; hardware stays armed"
                );
            } else if let Err(e) = inner.backend.disable() {
                tracing::warn!(
                    backend = %self.name,
                    error = %e,
                    "Failed to disarm watchdog on detach"
                );
            }
        }
        tracing::info!(backend = %self.name, "Watchdog detached");
        inner.backend
    }
}

impl<B: Backend> core::fmt::Debug for WatchdogController<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("WatchdogController")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("config", &inner.config)
            .field("flags", &inner.flags())
            .finish_non_exhaustive()
    }
}
