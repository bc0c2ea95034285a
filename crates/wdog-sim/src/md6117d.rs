//! DMP Vortex86 md6117d watchdog.
//!
//! A 24-bit counter clocked at 32.768 kHz that can route its expiry to one
//! of ten ISA interrupt lines, the NMI or the reset line. Every register
//! access is bracketed by an unlock/lock sequence.

use core::time::Duration;

use wdog::{
    Action, ActionSet, Backend, IrqLine, WatchdogCapabilities, WatchdogError, WatchdogResult,
};

use crate::chip::{ChipModel, SimulatedChip};
use crate::countdown::{Countdown, FireLog};

const NAME: &str = "DMP md6117d";

/// Duration of one counter tick, `1 / 32768` s rounded down.
pub const STEP: Duration = Duration::from_nanos(30_517);
/// Counter width in bits.
pub const COUNTER_WIDTH: u32 = 24;
/// Interrupt lines the expiry can be routed to.
pub const IRQ_LINES: [u8; 10] = [3, 4, 5, 6, 7, 9, 10, 12, 14, 15];

/// Routing selector written to the action field for `action`.
#[must_use]
pub fn route_selector(action: Action) -> Option<u8> {
    let selector = match action {
        Action::Irq(line) => match line.get() {
            3 => 0x1,
            4 => 0x2,
            5 => 0x3,
            6 => 0x4,
            7 => 0x5,
            9 => 0x6,
            10 => 0x7,
            12 => 0x9,
            14 => 0xa,
            15 => 0xb,
            _ => return None,
        },
        Action::Nmi => 0xc,
        Action::Reset => 0xd,
        Action::Debugger | Action::Panic => return None,
    };
    Some(selector)
}

/// Simulated md6117d watchdog.
#[derive(Debug)]
pub struct Md6117d {
    capabilities: WatchdogCapabilities,
    counter: u32,
    selector: u8,
    action: Option<Action>,
    lock_cycles: u64,
    countdown: Countdown,
    log: FireLog,
}

impl Md6117d {
    /// Create a chip in its power-on state.
    ///
    /// # Errors
    ///
    /// Propagates capability construction failures.
    pub fn new() -> WatchdogResult<Self> {
        let mut actions = ActionSet::of(&[Action::Nmi, Action::Reset]);
        actions.extend(IRQ_LINES.into_iter().filter_map(IrqLine::new).map(Action::Irq));

        Ok(Self {
            capabilities: WatchdogCapabilities::new(STEP, 1 << COUNTER_WIDTH, actions)?,
            counter: 0,
            selector: 0,
            action: None,
            lock_cycles: 0,
            countdown: Countdown::default(),
            log: FireLog::default(),
        })
    }

    /// Programmed counter value in ticks.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Programmed routing selector.
    #[must_use]
    pub fn selector(&self) -> u8 {
        self.selector
    }

    /// Number of unlock/lock sequences performed.
    #[must_use]
    pub fn lock_cycles(&self) -> u64 {
        self.lock_cycles
    }

    fn unlocked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let result = f(self);
        self.lock_cycles = self.lock_cycles.saturating_add(1);
        result
    }
}

impl Backend for Md6117d {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> &WatchdogCapabilities {
        &self.capabilities
    }

    fn enable(&mut self) -> WatchdogResult<()> {
        if self.action.is_none() {
            return Err(WatchdogError::invalid_state("md6117d was never configured"));
        }
        self.unlocked(|chip| chip.countdown.start());
        Ok(())
    }

    fn disable(&mut self) -> WatchdogResult<()> {
        if !self.countdown.is_running() {
            return Err(WatchdogError::invalid_state("md6117d is not enabled"));
        }
        self.unlocked(|chip| chip.countdown.stop());
        Ok(())
    }

    fn configure(&mut self, timeout: Duration, action: Action) -> WatchdogResult<()> {
        let selector = route_selector(action)
            .filter(|_| self.capabilities.supports(action))
            .ok_or_else(|| WatchdogError::unsupported(format!("md6117d cannot {action}")))?;

        let ticks = self.capabilities.steps_in(timeout);
        let counter = u32::try_from(ticks)
            .ok()
            .filter(|&c| c > 0 && u64::from(c) <= self.capabilities.step_count())
            .ok_or_else(|| WatchdogError::unsupported(format!("{ticks} ticks out of range")))?;

        self.unlocked(|chip| {
            chip.selector = selector;
            chip.counter = counter;
            chip.action = Some(action);
            chip.countdown
                .load(chip.capabilities.timeout_for_steps(u64::from(counter)));
        });
        tracing::debug!(counter, selector, %action, "md6117d configured");
        Ok(())
    }

    fn rearm(&mut self) -> WatchdogResult<()> {
        self.unlocked(|chip| chip.countdown.reload());
        Ok(())
    }
}

impl SimulatedChip for Md6117d {
    fn model(&self) -> ChipModel {
        ChipModel::Md6117d
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
