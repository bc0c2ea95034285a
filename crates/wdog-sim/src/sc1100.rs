//! National SC1100 X-Bus watchdog.
//!
//! The 32 kHz clock runs through an 8192 prescaler (256 ms per step). The
//! timeout register both holds the reload value and starts the timer:
//! writing the configured count arms it, writing zero stops it, and
//! rearming rewrites the count.

use core::time::Duration;

use wdog::{Action, ActionSet, Backend, WatchdogCapabilities, WatchdogError, WatchdogResult};

use crate::chip::{ChipModel, SimulatedChip};
use crate::countdown::{Countdown, FireLog};

const NAME: &str = "National SC1100";

/// Duration of one counter step.
pub const STEP: Duration = Duration::from_millis(256);
/// Number of programmable steps.
pub const STEP_COUNT: u64 = 16_384;

/// Simulated SC1100 watchdog.
#[derive(Debug)]
pub struct Sc1100 {
    capabilities: WatchdogCapabilities,
    reload: u16,
    timeout_register: u16,
    action: Option<Action>,
    countdown: Countdown,
    log: FireLog,
}

impl Sc1100 {
    /// Create a chip in its power-on state.
    ///
    /// # Errors
    ///
    /// Propagates capability construction failures.
    pub fn new() -> WatchdogResult<Self> {
        Ok(Self {
            capabilities: WatchdogCapabilities::new(
                STEP,
                STEP_COUNT,
                ActionSet::from(Action::Reset),
            )?,
            reload: 0,
            timeout_register: 0,
            action: None,
            countdown: Countdown::default(),
            log: FireLog::default(),
        })
    }

    /// Value last written to the timeout register.
    #[must_use]
    pub fn timeout_register(&self) -> u16 {
        self.timeout_register
    }

    fn write_timeout_register(&mut self, value: u16) {
        self.timeout_register = value;
        if value == 0 {
            self.countdown.stop();
        } else {
            self.countdown
                .load(self.capabilities.timeout_for_steps(u64::from(value)));
            self.countdown.start();
        }
    }
}

impl Backend for Sc1100 {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        if self.reload == 0 {
            return Err(WatchdogError::invalid_state("SC1100 timer was never configured"));
        }
        self.write_timeout_register(self.reload);
        Ok(())
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        if self.timeout_register == 0 {
            return Err(WatchdogError::invalid_state("SC1100 timer is not running"));
        }
        self.write_timeout_register(0);
        Ok(())
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        if !self.capabilities.supports(action) {
            return Err(WatchdogError::unsupported(format!("SC1100 cannot {action}")));
        }
        let steps = self.capabilities.steps_in(timeout);
        self.reload = u16::try_from(steps)
            .ok()
            .filter(|&r| r > 0)
            .ok_or_else(|| WatchdogError::unsupported(format!("{steps} steps out of range")))?;
        self.action = Some(action);
        Ok(())
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        if self.timeout_register != 0 {
            self.write_timeout_register(self.reload);
        }
        Ok(())
    }
}

impl SimulatedChip for Sc1100 {
    fn model(&self) -> ChipModel {
        ChipModel::Sc1100
    }

    fn advance(&mut self, elapsed: Duration) -> Option<Action> {
        if !self.countdown.advance(elapsed) {
            return None;
        }
        let action = self.action?;
        self.log.record(NAME, action);
        Some(action)
    }

    fn fired(&self) -> &[Action] {
        self.log.fired()
    }

    fn is_armed(&self) -> bool {
        self.countdown.is_running()
    }

    fn remaining(&self) -> Option<Duration> {
        self.countdown.remaining()
    }
}
