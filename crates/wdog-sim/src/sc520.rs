//! AMD Elan SC520 watchdog.
//!
//! The timer only supports discrete timeouts of `2^exp / 33.333 MHz` with
//! `exp` in `25..=30` (about 1 s to 32 s). A requested timeout is programmed
//! as the shortest of those that is at least as long as the request,
//! capped at the longest. The control register cannot be written while the
//! timer is enabled, so `configure` is refused while armed.

use core::time::Duration;
use std::ops::RangeInclusive;

use wdog::{Action, ActionSet, Backend, WatchdogCapabilities, WatchdogError, WatchdogResult};

use crate::chip::{ChipModel, SimulatedChip};
use crate::countdown::{Countdown, FireLog};

const NAME: &str = "AMD Elan SC520";

/// Watchdog crystal frequency in Hz.
pub const XTAL_HZ: u64 = 33_333_333;
/// Usable timeout exponents.
pub const EXPONENTS: RangeInclusive<u32> = 25..=30;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Timeout programmed by exponent `exp`.
#[must_use]
pub fn exponent_duration(exp: u32) -> Duration {
    let nanos = (1u128 << exp.min(63)).saturating_mul(NANOS_PER_SEC) / u128::from(XTAL_HZ);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Exponent selected for `timeout`.
#[must_use]
pub fn select_exponent(timeout: Duration) -> u32 {
    EXPONENTS
        .clone()
        .find(|&exp| exponent_duration(exp) >= timeout)
        .unwrap_or(*EXPONENTS.end())
}

/// Simulated Elan SC520 watchdog.
#[derive(Debug)]
pub struct Sc520 {
    capabilities: WatchdogCapabilities,
    exponent: Option<u32>,
    action: Option<Action>,
    countdown: Countdown,
    log: FireLog,
}

impl Sc520 {
    /// Create a chip in its power-on state.
    ///
    /// # Errors
    ///
    /// Propagates capability construction failures.
    pub fn new() -> WatchdogResult<Self> {
        Ok(Self {
            capabilities: WatchdogCapabilities::new(
                Duration::from_secs(1),
                32,
                ActionSet::from(Action::Reset),
            )?,
            exponent: None,
            action: None,
            countdown: Countdown::default(),
            log: FireLog::default(),
        })
    }

    /// Programmed exponent, if configured.
    #[must_use]
    pub fn exponent(&self) -> Option<u32> {
        self.exponent
    }

    /// Timeout the hardware actually counts, if configured.
    #[must_use]
    pub fn programmed_timeout(&self) -> Option<Duration> {
        self.exponent.map(exponent_duration)
    }
}

impl Backend for Sc520 {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        if self.countdown.is_running() {
            return Err(WatchdogError::invalid_state("SC520 timer already enabled"));
        }
        if self.exponent.is_none() {
            return Err(WatchdogError::invalid_state("SC520 timer was never configured"));
        }
        self.countdown.start();
        Ok(())
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        if !self.countdown.is_running() {
            return Err(WatchdogError::invalid_state("SC520 timer is not enabled"));
        }
        self.countdown.stop();
        Ok(())
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        if self.countdown.is_running() {
            return Err(WatchdogError::invalid_state(
                "SC520 timer must be stopped before configuration",
            ));
        }
        if !self.capabilities.supports(action) {
            return Err(WatchdogError::unsupported(format!("SC520 cannot {action}")));
        }

        let exp = select_exponent(timeout);
        let programmed = exponent_duration(exp);
        tracing::debug!(requested = ?timeout, exp, ?programmed, "SC520 timeout selected");

        self.exponent = Some(exp);
        self.action = Some(action);
        self.countdown.load(programmed);
        Ok(())
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        self.countdown.reload();
        Ok(())
    }
}

impl SimulatedChip for Sc520 {
    fn model(&self) -> ChipModel {
        ChipModel::Sc520
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
