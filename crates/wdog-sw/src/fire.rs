//! What happens when the software watchdog expires.

use core::fmt;
use std::backtrace::Backtrace;

use parking_lot::Mutex;
use portable_atomic::{AtomicU64, Ordering};

/// Expiry handler of a [`SoftwareWatchdog`](crate::SoftwareWatchdog).
///
/// Invoked from whichever thread delivered the expiring heartbeat, with no
/// lock held.
pub trait FireHandler: Send + Sync + fmt::Debug {
    /// Trap into the debugger. The watchdog rearms itself once this returns.
    fn enter_debugger(&self, reason: &str);

    /// Bring the system down. Production implementations do not return.
    fn fatal(&self, reason: &str);
}

/// Handler used outside tests: logs a backtrace on debugger entry and panics
/// on fatal expiry.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicFireHandler;

impl FireHandler for PanicFireHandler {
    fn enter_debugger(&self, reason: &str) {
        let backtrace = Backtrace::force_capture();
        tracing::error!(reason, %backtrace, "Software watchdog entering debugger");
    }

    #[expect(
        clippy::panic,
        reason = "an expired software watchdog configured to panic must stop the process"
    )]
    fn fatal(&self, reason: &str) {
        tracing::error!(reason, "Software watchdog expired");
        panic!("{reason}");
    }
}

/// Fire event captured by [`RecordingFireHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireKind {
    /// [`FireHandler::enter_debugger`]
    Debugger,
    /// [`FireHandler::fatal`]
    Fatal,
}

/// Handler that counts and logs expiries instead of acting on them.
#[derive(Debug, Default)]
pub struct RecordingFireHandler {
    debugger: AtomicU64,
    fatal: AtomicU64,
    events: Mutex<Vec<(FireKind, String)>>,
}

impl RecordingFireHandler {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of debugger entries.
    #[must_use]
    pub fn debugger_count(&self) -> u64 {
        self.debugger.load(Ordering::Acquire)
    }

    /// Number of fatal expiries.
    #[must_use]
    pub fn fatal_count(&self) -> u64 {
        self.fatal.load(Ordering::Acquire)
    }

    /// Recorded events in order.
    #[must_use]
    pub fn events(&self) -> Vec<(FireKind, String)> {
        self.events.lock().clone()
    }
}

impl FireHandler for RecordingFireHandler {
    fn enter_debugger(&self, reason: &str) {
        tracing::warn!(reason, "Software watchdog fired: debugger (recorded)");
        self.debugger.fetch_add(1, Ordering::AcqRel);
        self.events
            .lock()
            .push((FireKind::Debugger, reason.to_owned()));
    }

    fn fatal(&self, reason: &str) {
        tracing::warn!(reason, "Software watchdog fired: panic (recorded)");
        self.fatal.fetch_add(1, Ordering::AcqRel);
        self.events.lock().push((FireKind::Fatal, reason.to_owned()));
    }
}
