//! Backend capability descriptor.

use core::time::Duration;

use crate::action::{Action, ActionSet};
use crate::error::{WatchdogError, WatchdogResult};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Immutable description of what a watchdog backend can do.
///
/// Timeouts are programmed as a whole number of `step`s, up to `step_count`
/// of them. `step_count` is 64-bit and every product is computed in 128-bit
/// nanoseconds, so tick-granular software timers with day-long ranges do not
/// overflow.
///
/// # Example
///
/// ```rust
/// use core::time::Duration;
/// use wdog::{Action, ActionSet, WatchdogCapabilities};
///
/// let caps = WatchdogCapabilities::new(
///     Duration::from_millis(500),
///     65_535,
///     ActionSet::of(&[Action::Nmi, Action::Reset]),
/// )?;
/// assert_eq!(caps.min_timeout(), Duration::from_millis(500));
/// assert_eq!(caps.max_timeout(), Duration::from_millis(32_767_500));
/// # Ok::<(), wdog::WatchdogError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogCapabilities {
    step: Duration,
    step_count: u64,
    supported_actions: ActionSet,
}

impl WatchdogCapabilities {
    /// Create a capability descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::Invalid`] if `step` is zero, `step_count` is
    /// zero or `supported_actions` is empty.
    pub fn new(
        step: Duration,
        step_count: u64,
        supported_actions: ActionSet,
    ) -> WatchdogResult<Self> {
        if step.is_zero() {
            return Err(WatchdogError::invalid("step must be greater than 0"));
        }
        if step_count == 0 {
            return Err(WatchdogError::invalid("step_count must be greater than 0"));
        }
        if supported_actions.is_empty() {
            return Err(WatchdogError::invalid(
                "supported_actions must not be empty",
            ));
        }
        Ok(Self {
            step,
            step_count,
            supported_actions,
        })
    }

    /// Smallest programmable timeout unit.
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Maximum number of steps the hardware can count.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Actions the backend implements.
    #[must_use]
    pub fn supported_actions(&self) -> ActionSet {
        self.supported_actions
    }

    /// Check whether `action` is implemented.
    #[must_use]
    pub fn supports(&self, action: Action) -> bool {
        self.supported_actions.contains(action)
    }

    /// Shortest programmable timeout, one step.
    #[must_use]
    pub fn min_timeout(&self) -> Duration {
        self.step
    }

    /// Longest programmable timeout, `step * step_count`.
    #[must_use]
    pub fn max_timeout(&self) -> Duration {
        self.timeout_for_steps(self.step_count)
    }

    /// Number of whole steps in `timeout`, saturating at `u64::MAX`.
    #[must_use]
    pub fn steps_in(&self, timeout: Duration) -> u64 {
        let steps = timeout.as_nanos() / self.step.as_nanos();
        u64::try_from(steps).unwrap_or(u64::MAX)
    }

    /// Duration of `steps` steps, saturating at [`Duration::MAX`].
    #[must_use]
    pub fn timeout_for_steps(&self, steps: u64) -> Duration {
        duration_from_nanos(self.step.as_nanos().saturating_mul(u128::from(steps)))
    }

    /// Round `timeout` down to a whole number of steps.
    #[must_use]
    pub fn floor_to_step(&self, timeout: Duration) -> Duration {
        self.timeout_for_steps(self.steps_in(timeout))
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    let secs = nanos / NANOS_PER_SEC;
    let subsec = nanos % NANOS_PER_SEC;
    match (u64::try_from(secs), u32::try_from(subsec)) {
        (Ok(secs), Ok(subsec)) => Duration::new(secs, subsec),
        _ => Duration::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset_only() -> ActionSet {
        ActionSet::from(Action::Reset)
    }

    #[test]
    fn test_rejects_degenerate_descriptors() {
        let result = WatchdogCapabilities::new(Duration::ZERO, 60, reset_only());
        assert!(matches!(result, Err(WatchdogError::Invalid(_))));

        let result = WatchdogCapabilities::new(Duration::from_secs(1), 0, reset_only());
        assert!(matches!(result, Err(WatchdogError::Invalid(_))));

        let result = WatchdogCapabilities::new(Duration::from_secs(1), 60, ActionSet::empty());
        assert!(matches!(result, Err(WatchdogError::Invalid(_))));
    }

    #[test]
    fn test_min_max_timeout() -> WatchdogResult<()> {
        let caps = WatchdogCapabilities::new(Duration::from_secs(1), 60, reset_only())?;
        assert_eq!(caps.min_timeout(), Duration::from_secs(1));
        assert_eq!(caps.max_timeout(), Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn test_max_timeout_does_not_overflow() -> WatchdogResult<()> {
        let caps = WatchdogCapabilities::new(Duration::from_secs(u64::MAX / 2), u64::MAX, reset_only())?;
        assert_eq!(caps.max_timeout(), Duration::MAX);

        // One day of 1ms ticks, as the software watchdog declares at hz=1000.
        let caps = WatchdogCapabilities::new(Duration::from_millis(1), 86_400 * 1000, reset_only())?;
        assert_eq!(caps.max_timeout(), Duration::from_secs(86_400));
        Ok(())
    }

    #[test]
    fn test_sub_second_step() -> WatchdogResult<()> {
        // 8192-prefixed 32kHz clock: 256ms per step.
        let caps = WatchdogCapabilities::new(Duration::from_millis(256), 16_384, reset_only())?;
        assert_eq!(caps.max_timeout(), Duration::from_millis(4_194_304));
        assert_eq!(caps.steps_in(Duration::from_secs(1)), 3);
        assert_eq!(caps.floor_to_step(Duration::from_secs(1)), Duration::from_millis(768));
        assert_eq!(caps.floor_to_step(Duration::from_millis(100)), Duration::ZERO);
        Ok(())
    }
}
