//! Elapsed-time bookkeeping shared by the chip models.

use core::time::Duration;

use wdog::Action;

/// A countdown that fires once per expiry while running.
#[derive(Debug, Clone, Default)]
pub(crate) struct Countdown {
    period: Duration,
    elapsed: Duration,
    running: bool,
}

impl Countdown {
    pub(crate) fn load(&mut self, period: Duration) {
        self.period = period;
        self.elapsed = Duration::ZERO;
    }

    pub(crate) fn start(&mut self) {
        self.running = true;
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub(crate) fn reload(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    pub(crate) fn remaining(&self) -> Option<Duration> {
        self.running
            .then(|| self.period.saturating_sub(self.elapsed))
    }

    /// Advance by `by`; returns `true` on the advance that reaches the period.
    /// A fired countdown stays expired until reloaded.
    pub(crate) fn advance(&mut self, by: Duration) -> bool {
        if !self.running || self.period.is_zero() || self.elapsed >= self.period {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(by);
        self.elapsed >= self.period
    }
}

/// Journal of actions a chip model took.
#[derive(Debug, Clone, Default)]
pub(crate) struct FireLog {
    fired: Vec<Action>,
}

impl FireLog {
    pub(crate) fn record(&mut self, chip: &'static str, action: Action) {
        tracing::warn!(chip, %action, "Simulated watchdog expired");
        self.fired.push(action);
    }

    pub(crate) fn fired(&self) -> &[Action] {
        &self.fired
    }
}
