//! AMD CS5536 MFGPT0 watchdog.
//!
//! The counter runs from the 32 kHz clock through a 16384 prescaler, so one
//! step is 512 ms. The setup word is write-once: the first `configure` locks
//! the clock selection and it can never be changed again, and `enable`
//! refuses to start a counter that was never set up.

use core::time::Duration;

use wdog::{Action, ActionSet, Backend, WatchdogCapabilities, WatchdogError, WatchdogResult};

use crate::chip::{ChipModel, SimulatedChip};
use crate::countdown::{Countdown, FireLog};

const NAME: &str = "AMD CS5536 MFGPT0";

/// Duration of one counter step.
pub const STEP: Duration = Duration::from_millis(512);
/// Number of programmable steps.
pub const STEP_COUNT: u64 = 32_000;

/// Simulated CS5536 MFGPT0.
#[derive(Debug)]
pub struct Cs5536 {
    capabilities: WatchdogCapabilities,
    setup_locked: bool,
    comparator: u16,
    action: Option<Action>,
    countdown: Countdown,
    log: FireLog,
}

impl Cs5536 {
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
                ActionSet::of(&[Action::Nmi, Action::Reset]),
            )?,
            setup_locked: false,
            comparator: 0,
            action: None,
            countdown: Countdown::default(),
            log: FireLog::default(),
        })
    }

    /// Whether the write-once setup word has been written.
    #[must_use]
    pub fn is_setup_locked(&self) -> bool {
        self.setup_locked
    }

    /// Compare value in steps.
    #[must_use]
    pub fn comparator(&self) -> u16 {
        self.comparator
    }
}

impl Backend for Cs5536 {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        if !self.setup_locked {
            return Err(WatchdogError::invalid_state("MFGPT0 counter was never set up"));
        }
        self.countdown.start();
        Ok(())
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        if !self.countdown.is_running() {
            return Err(WatchdogError::invalid_state("MFGPT0 counter is not running"));
        }
        self.countdown.stop();
        Ok(())
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        if !self.capabilities.supports(action) {
            return Err(WatchdogError::unsupported(format!(
                "MFGPT0 cannot {action}"
            )));
        }
        let steps = self.capabilities.steps_in(timeout);
        let comparator = u16::try_from(steps)
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| WatchdogError::unsupported(format!("{steps} steps out of range")))?;

        if !self.setup_locked {
            self.setup_locked = true;
            tracing::debug!("MFGPT0 setup word written");
        }
        self.comparator = comparator;
        self.action = Some(action);
        self.countdown
            .load(self.capabilities.timeout_for_steps(u64::from(comparator)));
        Ok(())
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        self.countdown.reload();
        Ok(())
    }
}

impl SimulatedChip for Cs5536 {
    fn model(&self) -> ChipModel {
        ChipModel::Cs5536
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_requires_setup() -> WatchdogResult<()> {
        let mut chip = Cs5536::new()?;
        assert!(matches!(chip.enable(), Err(WatchdogError::InvalidState(_))));
        chip.configure(Duration::from_secs(10), Action::Reset)?;
        assert!(chip.is_setup_locked());
        assert_eq!(chip.comparator(), 19);
        chip.enable()?;
        assert!(chip.is_armed());
        Ok(())
    }

    #[test]
    fn test_setup_stays_locked_after_disable() -> WatchdogResult<()> {
        let mut chip = Cs5536::new()?;
        chip.configure(Duration::from_secs(2), Action::Nmi)?;
        chip.enable()?;
        chip.disable()?;
        assert!(chip.is_setup_locked());
        chip.enable()?;
        Ok(())
    }

    #[test]
    fn test_nmi_fires_after_comparator() -> WatchdogResult<()> {
        let mut chip = Cs5536::new()?;
        chip.configure(Duration::from_millis(1024), Action::Nmi)?;
        chip.enable()?;
        assert_eq!(chip.advance(Duration::from_millis(1000)), None);
        assert_eq!(chip.advance(Duration::from_millis(24)), Some(Action::Nmi));
        assert_eq!(chip.fired(), &[Action::Nmi]);
        Ok(())
    }

    #[test]
    fn test_rearm_resets_counter_even_when_stopped() -> WatchdogResult<()> {
        let mut chip = Cs5536::new()?;
        assert!(chip.rearm().is_ok());
        chip.configure(Duration::from_millis(1024), Action::Reset)?;
        chip.enable()?;
        chip.advance(Duration::from_millis(1000));
        chip.rearm()?;
        assert_eq!(chip.advance(Duration::from_millis(1000)), None);
        Ok(())
    }
}
