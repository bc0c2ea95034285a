//! BDD tests for the controller lifecycle.
//!
//! Feature: watchdog_controller.feature

#![cfg(test)]

use std::time::Duration;

use wdog::prelude::*;
use wdog_test_helpers::prelude::*;

fn attach_reset_only() -> (WatchdogController<MockBackend>, Journal) {
    let backend = MockBackend::new(fixtures::reset_only());
    let journal = backend.journal();
    (WatchdogController::attach(backend), journal)
}

mod watchdog_controller_scenarios {
    use super::*;

    /// Scenario: Configure, arm, rearm and disarm a reset-only backend
    #[test]
    fn scenario_full_lifecycle() -> TestResult {
        let (controller, journal) = attach_reset_only();
        assert_eq!(controller.phase(), Phase::Unconfigured);

        let stored = controller.set_timeout(Duration::from_secs(45))?;
        assert_eq!(stored, Duration::from_secs(45));
        controller.set_action(Action::Reset)?;
        assert_eq!(controller.phase(), Phase::Configured);

        controller.enable()?;
        assert!(controller.query_state().running);
        assert!(journal.is_armed());

        controller.rearm()?;
        controller.disable()?;
        assert!(!controller.query_state().running);
        assert!(!journal.is_armed());

        assert_eq!(
            journal.calls(),
            vec![
                BackendCall::Configure(Duration::from_secs(45), Action::Reset),
                BackendCall::Enable,
                BackendCall::Rearm,
                BackendCall::Disable,
            ]
        );
        Ok(())
    }

    /// Scenario: A timeout beyond the maximum is refused and the old one kept
    #[test]
    fn scenario_timeout_beyond_maximum() -> TestResult {
        let (controller, _) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(45))?;

        must_fail(
            controller.set_timeout(Duration::from_secs(120)),
            ErrorKind::Unsupported,
        );
        assert_eq!(controller.config().timeout, Some(Duration::from_secs(45)));
        Ok(())
    }

    /// Scenario: A fresh controller refusing a too-long timeout stays unset
    #[test]
    fn scenario_timeout_beyond_maximum_fresh() {
        let (controller, _) = attach_reset_only();
        must_fail(
            controller.set_timeout(Duration::from_secs(120)),
            ErrorKind::Unsupported,
        );
        assert_eq!(controller.config().timeout, None);
    }

    /// Scenario: An action outside the capability set is refused
    #[test]
    fn scenario_unsupported_action() {
        let (controller, _) = attach_reset_only();
        must_fail(controller.set_action(Action::Nmi), ErrorKind::Unsupported);
        assert_eq!(controller.config().action, None);
    }

    /// Scenario: Immutable watchdog cannot be disabled or unlocked
    #[test]
    fn scenario_immutable_blocks_disable() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(30))?;
        controller.set_action(Action::Reset)?;
        controller.enable()?;

        controller.set_immutable(true)?;
        must_fail(controller.disable(), ErrorKind::PermissionDenied);
        must_fail(controller.set_immutable(false), ErrorKind::PermissionDenied);

        let state = controller.query_state();
        assert!(state.running && state.immutable);
        assert_eq!(journal.count(Op::Disable), 0);
        controller.rearm()?;
        Ok(())
    }

    /// Scenario: Enabling twice fails the second time
    #[test]
    fn scenario_double_enable() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        controller.enable()?;

        must_fail(controller.enable(), ErrorKind::InvalidState);
        assert!(controller.query_state().running);
        assert_eq!(journal.count(Op::Enable), 1);
        Ok(())
    }

    /// Scenario: Clearing an immutable flag that was never set is a no-op
    #[test]
    fn scenario_clear_unset_immutable() -> TestResult {
        let (controller, _) = attach_reset_only();
        controller.set_immutable(false)?;
        assert!(!controller.is_immutable());
        Ok(())
    }

    /// Scenario: Reconfiguring while running reaches hardware on next enable
    #[test]
    fn scenario_reconfigure_while_running() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        controller.enable()?;

        controller.set_timeout(Duration::from_secs(20))?;
        assert_eq!(
            journal.configured(),
            Some((Duration::from_secs(10), Action::Reset))
        );

        controller.disable()?;
        controller.enable()?;
        assert_eq!(
            journal.configured(),
            Some((Duration::from_secs(20), Action::Reset))
        );
        Ok(())
    }

    /// Scenario: A backend refusing reconfiguration while armed
    #[test]
    fn scenario_backend_refuses_configure_while_armed() -> TestResult {
        let backend = MockBackend::new(fixtures::reset_only()).refusing_configure_while_armed();
        let journal = backend.journal();
        let controller = WatchdogController::attach(backend);
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        controller.enable()?;
        controller.disable()?;
        controller.enable()?;
        assert_eq!(journal.count(Op::Configure), 2);
        Ok(())
    }

    /// Scenario: Backend failure while arming leaves the controller stopped
    #[test]
    fn scenario_backend_arm_failure() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        journal.fail_next(Op::Enable, WatchdogError::invalid_state("hardware busy"));

        must_fail(controller.enable(), ErrorKind::InvalidState);
        assert_eq!(controller.phase(), Phase::Configured);

        controller.enable()?;
        assert_eq!(controller.phase(), Phase::Running);
        Ok(())
    }

    /// Scenario: Detach hands back a disarmed backend
    #[test]
    fn scenario_detach_disarms() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        controller.enable()?;

        let backend = controller.detach();
        assert!(!journal.is_armed());
        assert_eq!(backend.name(), "mock watchdog");
        Ok(())
    }

    /// Scenario: Detach failure is swallowed
    #[test]
    fn scenario_detach_failure_is_logged_only() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        controller.enable()?;
        journal.fail_next(Op::Disable, WatchdogError::invalid_state("stuck"));

        let _backend = controller.detach();
        assert!(journal.is_armed());
        assert_eq!(journal.count(Op::Disable), 1);
        Ok(())
    }
}

mod shared_controller {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// Scenario: Concurrent enables on a shared controller arm exactly once
    #[test]
    fn scenario_concurrent_enable_single_winner() -> TestResult {
        let (controller, journal) = attach_reset_only();
        controller.set_timeout(Duration::from_secs(10))?;
        controller.set_action(Action::Reset)?;
        let controller = Arc::new(controller);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let controller = Arc::clone(&controller);
                thread::spawn(move || controller.enable().is_ok())
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.join().map_err(|e| format!("enable thread panicked: {e:?}"))? {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(journal.count(Op::Enable), 1);
        Ok(())
    }
}
