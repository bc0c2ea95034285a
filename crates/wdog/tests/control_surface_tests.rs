//! Control surface tests: node table, parsing and gating.

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use wdog::prelude::*;
use wdog_test_helpers::prelude::*;
use wdog_test_helpers::{assert_kind, assert_reads};

fn surface(caps: WatchdogCapabilities) -> (ControlSurface<MockBackend>, Journal) {
    let backend = MockBackend::new(caps);
    let journal = backend.journal();
    let controller = Arc::new(WatchdogController::attach(backend));
    (ControlSurface::new(controller, 0), journal)
}

#[test]
fn test_capability_nodes() {
    let (surface, _) = surface(fixtures::reset_only());
    assert_reads!(surface, "capabilities.actions", "4<reset>");
    assert_reads!(surface, "capabilities.min_timeout", "1");
    assert_reads!(surface, "capabilities.max_timeout", "60");
    assert_reads!(surface, "state", "0");
    assert_reads!(surface, "config.action", "<none>");
    assert_reads!(surface, "config.timeout", "0");
    assert_reads!(surface, "immutable", "0");
}

#[test]
fn test_software_capabilities_render_like_the_kernel() {
    let (surface, _) = surface(fixtures::software(1000));
    assert_reads!(surface, "capabilities.actions", "c0000000<debugger,panic>");
    assert_reads!(surface, "capabilities.max_timeout", "86400");
}

#[test]
fn test_lifecycle_through_surface() -> TestResult {
    let (surface, journal) = surface(fixtures::reset_only());
    surface.write("config.timeout", "45")?;
    surface.write("config.action", "reset")?;
    assert_reads!(surface, "config.timeout", "45");
    assert_reads!(surface, "config.action", "4<reset>");

    surface.write("dev.watchdog.0.enable", "1")?;
    assert_reads!(surface, "state", "1<running>");
    surface.write("rearm", "1")?;
    surface.write("immutable", "1")?;
    assert_reads!(surface, "state", "3<running,immutable>");
    assert_reads!(surface, "immutable", "1");

    assert_kind!(surface.write("disable", "1"), PermissionDenied);
    assert_kind!(surface.write("immutable", "0"), PermissionDenied);
    assert_kind!(surface.write("config.timeout", "30"), PermissionDenied);
    assert_eq!(journal.count(Op::Rearm), 1);
    Ok(())
}

#[test]
fn test_timeout_is_floored_to_step() -> TestResult {
    let (surface, _) = surface(fixtures::sc1100());
    surface.write("config.timeout", "1")?;
    assert_reads!(surface, "config.timeout", "0.768");
    surface.write("config.timeout", "0.3")?;
    assert_reads!(surface, "config.timeout", "0.256");
    assert_kind!(surface.write("config.timeout", "0.1"), Unsupported);
    Ok(())
}

#[test]
fn test_malformed_writes_are_invalid() {
    let (surface, _) = surface(fixtures::reset_only());
    assert_kind!(surface.write("config.timeout", "abc"), Invalid);
    assert_kind!(surface.write("config.timeout", "-5"), Invalid);
    assert_kind!(surface.write("config.timeout", "0"), Invalid);
    assert_kind!(surface.write("config.action", "explode"), Invalid);
    assert_kind!(surface.write("config.action", "irq16"), Invalid);
    assert_kind!(surface.write("enable", "2"), Invalid);
    assert_kind!(surface.write("enable", "+1"), Invalid);
    assert_kind!(surface.write("enable", "01"), Invalid);
    assert_kind!(surface.write("rearm", "yes"), Invalid);
    assert_kind!(surface.write("immutable", "2"), Invalid);
}

#[test]
fn test_access_modes_are_enforced() {
    let (surface, _) = surface(fixtures::reset_only());
    assert_kind!(surface.read("enable"), Invalid);
    assert_kind!(surface.read("disable"), Invalid);
    assert_kind!(surface.read("rearm"), Invalid);
    assert_kind!(surface.write("state", "1"), Invalid);
    assert_kind!(surface.write("capabilities.max_timeout", "100"), Invalid);
    assert_kind!(surface.read("capabilities.bogus"), Invalid);
    assert_kind!(surface.read("dev.watchdog.1.state"), Invalid);
}

#[test]
fn test_state_errors_pass_through() {
    let (surface, _) = surface(fixtures::reset_only());
    assert_kind!(surface.write("enable", "1"), InvalidState);
    assert_kind!(surface.write("disable", "1"), InvalidState);
    assert_kind!(surface.write("rearm", "1"), InvalidState);
    assert_kind!(surface.write("config.action", "nmi"), Unsupported);
    assert_kind!(surface.write("config.timeout", "61"), Unsupported);
}

#[test]
fn test_irq_actions_render_by_line() -> TestResult {
    let (surface, _) = surface(fixtures::md6117d());
    surface.write("config.action", "irq7")?;
    assert_reads!(surface, "config.action", "8000<irq7>");
    assert_kind!(surface.write("config.action", "irq8"), Unsupported);
    Ok(())
}

#[test]
fn test_listing_and_snapshot() -> TestResult {
    let (surface, _) = surface(fixtures::reset_only());
    let nodes: Vec<_> = surface.list().collect();
    assert_eq!(nodes.len(), Property::ALL.len());
    assert!(nodes.iter().all(|n| n.name.starts_with("dev.watchdog.0.")));
    assert!(
        nodes
            .iter()
            .any(|n| n.name == "dev.watchdog.0.rearm" && n.access == Access::WriteOnly)
    );

    let snapshot = surface.snapshot()?;
    assert_eq!(snapshot.len(), 7);
    assert!(
        snapshot
            .iter()
            .any(|(name, value)| name == "dev.watchdog.0.capabilities.max_timeout" && value == "60")
    );
    Ok(())
}

#[test]
fn test_custom_namespace() -> TestResult {
    let controller = Arc::new(WatchdogController::attach(MockBackend::new(
        fixtures::reset_only(),
    )));
    let surface = ControlSurface::with_namespace(controller, "hw.wdog");
    assert_eq!(surface.resolve("hw.wdog.state")?, Property::State);
    assert_eq!(surface.qualified(Property::Enable), "hw.wdog.enable");
    assert_eq!(
        surface.controller().capabilities().max_timeout(),
        Duration::from_secs(60)
    );
    Ok(())
}
