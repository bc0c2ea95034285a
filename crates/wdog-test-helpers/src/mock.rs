//! Recording, scriptable watchdog backend.
//!
//! [`MockBackend`] follows the [`Backend`] contract (no enable before
//! configure, no disable before enable) and records every call into a
//! [`Journal`] that stays readable after the backend has been moved into a
//! controller. Failures are injected per operation with
//! [`Journal::fail_next`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use wdog::{Action, Backend, WatchdogCapabilities, WatchdogError, WatchdogResult};

/// Backend operation, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `Backend::configure`
    Configure,
    /// `Backend::enable`
    Enable,
    /// `Backend::disable`
    Disable,
    /// `Backend::rearm`
    Rearm,
}

/// One recorded backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    /// `configure(timeout, action)`
    Configure(Duration, Action),
    /// `enable()`
    Enable,
    /// `disable()`
    Disable,
    /// `rearm()`
    Rearm,
}

impl BackendCall {
    /// Operation this call belongs to.
    pub fn op(&self) -> Op {
        match self {
            Self::Configure(..) => Op::Configure,
            Self::Enable => Op::Enable,
            Self::Disable => Op::Disable,
            Self::Rearm => Op::Rearm,
        }
    }
}

#[derive(Debug, Default)]
struct JournalState {
    calls: Vec<BackendCall>,
    failures: VecDeque<(Op, WatchdogError)>,
    configured: Option<(Duration, Action)>,
    armed: bool,
}

/// Shared view of a [`MockBackend`]'s history and hardware state.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    state: Arc<Mutex<JournalState>>,
}

impl Journal {
    /// Every call so far, including refused ones.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls of the given kind.
    pub fn count(&self, op: Op) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Last successfully programmed pair.
    pub fn configured(&self) -> Option<(Duration, Action)> {
        self.state.lock().configured
    }

    /// Whether the simulated hardware is armed.
    pub fn is_armed(&self) -> bool {
        self.state.lock().armed
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: Op, error: WatchdogError) {
        self.state.lock().failures.push_back((op, error));
    }
}

/// Recording [`Backend`].
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    capabilities: WatchdogCapabilities,
    refuse_configure_while_armed: bool,
    journal: Journal,
}

impl MockBackend {
    /// Create a mock with the given capabilities.
    pub fn new(capabilities: WatchdogCapabilities) -> Self {
        Self {
            name: "mock watchdog".to_owned(),
            capabilities,
            refuse_configure_while_armed: false,
            journal: Journal::default(),
        }
    }

    /// Set the reported backend name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Refuse `configure` with `InvalidState` while armed.
    #[must_use]
    pub fn refusing_configure_while_armed(mut self) -> Self {
        self.refuse_configure_while_armed = true;
        self
    }

    /// Handle to this backend's journal.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

}

impl JournalState {
    fn record(&mut self, call: BackendCall) -> WatchdogResult<()> {
        self.calls.push(call);
        let op = call.op();
        match self.failures.iter().position(|(o, _)| *o == op) {
            Some(i) => match self.failures.remove(i) {
                Some((_, e)) => Err(e),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        let mut state = self.journal.state.lock();
        state.record(BackendCall::Enable)?;
        if state.configured.is_none() {
            return Err(WatchdogError::invalid_state("mock: enable before configure"));
        }
        state.armed = true;
        Ok(())
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        let mut state = self.journal.state.lock();
        state.record(BackendCall::Disable)?;
        if !state.armed {
            return Err(WatchdogError::invalid_state("mock: disable while disarmed"));
        }
        state.armed = false;
        Ok(())
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        let mut state = self.journal.state.lock();
        state.record(BackendCall::Configure(timeout, action))?;
        if !self.capabilities.supports(action) {
            return Err(WatchdogError::unsupported(format!("mock: action {action}")));
        }
        if self.refuse_configure_while_armed && state.armed {
            return Err(WatchdogError::invalid_state("mock: configure while armed"));
        }
        state.configured = Some((timeout, action));
        Ok(())
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        self.journal.state.lock().record(BackendCall::Rearm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::must;

    #[test]
    fn test_contract_ordering() {
        let mut backend = MockBackend::new(fixtures::reset_only());
        let journal = backend.journal();

        assert!(backend.enable().is_err());
        assert!(backend.disable().is_err());
        must(backend.configure(Duration::from_secs(5), Action::Reset));
        must(backend.enable());
        assert!(journal.is_armed());
        must(backend.disable());
        assert!(!journal.is_armed());
        assert_eq!(journal.count(Op::Enable), 2);
        assert_eq!(
            journal.configured(),
            Some((Duration::from_secs(5), Action::Reset))
        );
    }

    #[test]
    fn test_scripted_failure_fires_once() {
        let mut backend = MockBackend::new(fixtures::reset_only());
        let journal = backend.journal();
        journal.fail_next(Op::Rearm, WatchdogError::invalid_state("stuck"));

        assert!(backend.rearm().is_err());
        assert!(backend.rearm().is_ok());
        assert_eq!(journal.calls(), vec![BackendCall::Rearm, BackendCall::Rearm]);
    }

    #[test]
    fn test_refuses_configure_while_armed() {
        let mut backend = MockBackend::new(fixtures::reset_only()).refusing_configure_while_armed();
        must(backend.configure(Duration::from_secs(5), Action::Reset));
        must(backend.enable());
        let result = backend.configure(Duration::from_secs(6), Action::Reset);
        assert!(matches!(result, Err(WatchdogError::InvalidState(_))));
    }
}
