//! Property tests for the heartbeat threshold.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use wdog::prelude::*;
use wdog_sw::prelude::*;

fn fail(e: WatchdogError) -> TestCaseError {
    TestCaseError::fail(e.to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// However the ticks are split, the fatal path runs exactly once when
    /// their sum reaches the timeout, and never before.
    #[test]
    fn prop_fatal_fires_once(
        timeout_ms in 1u64..=2_000,
        pokes in prop::collection::vec(1u64..=500, 1..64),
    ) {
        let handler = Arc::new(RecordingFireHandler::new());
        let config = SoftwareWatchdogConfig::new(1000).map_err(fail)?;
        let watchdog = SoftwareWatchdog::with_handler(config, handler.clone()).map_err(fail)?;
        let controller = WatchdogController::attach(watchdog);
        controller.set_timeout(Duration::from_millis(timeout_ms)).map_err(fail)?;
        controller.set_action(Action::Panic).map_err(fail)?;
        controller.enable().map_err(fail)?;

        let mut total: u64 = 0;
        let mut fired = 0u64;
        for ticks in &pokes {
            let outcome = controller.with_backend(|w| w.poke(*ticks));
            let before = total;
            total = total.saturating_add(*ticks);
            let crosses = before < timeout_ms && total >= timeout_ms;
            prop_assert_eq!(matches!(outcome, PokeOutcome::Fired(Action::Panic)), crosses);
            if crosses {
                fired = fired.saturating_add(1);
            }
        }
        prop_assert_eq!(handler.fatal_count(), fired);
        prop_assert!(fired <= 1);
    }

    /// A debugger expiry rearms, so it fires once per full timeout of ticks.
    #[test]
    fn prop_debugger_fires_per_period(
        timeout_ms in 1u64..=200,
        periods in 1u64..=20,
    ) {
        let handler = Arc::new(RecordingFireHandler::new());
        let config = SoftwareWatchdogConfig::builder()
            .hz(1000)
            .debugger(true)
            .build()
            .map_err(fail)?;
        let watchdog = SoftwareWatchdog::with_handler(config, handler.clone()).map_err(fail)?;
        let controller = WatchdogController::attach(watchdog);
        controller.set_timeout(Duration::from_millis(timeout_ms)).map_err(fail)?;
        controller.set_action(Action::Debugger).map_err(fail)?;
        controller.enable().map_err(fail)?;

        for _ in 0..periods.saturating_mul(timeout_ms) {
            controller.with_backend(|w| w.poke(1));
        }
        prop_assert_eq!(handler.debugger_count(), periods);
        prop_assert_eq!(handler.fatal_count(), 0);
    }
}
