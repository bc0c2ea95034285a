//! Capability descriptors of the supported chips.
//!
//! These mirror the values the board drivers register, so tests can exercise
//! the controller against realistic granularities without the simulated
//! hardware.

use std::time::Duration;

use wdog::{Action, ActionSet, IrqLine, WatchdogCapabilities};

/// A named capability descriptor.
#[derive(Debug, Clone, Copy)]
pub struct CapabilitiesFixture {
    /// Chip name.
    pub name: &'static str,
    /// Registered capabilities.
    pub capabilities: WatchdogCapabilities,
}

fn caps(step: Duration, step_count: u64, actions: ActionSet) -> WatchdogCapabilities {
    match WatchdogCapabilities::new(step, step_count, actions) {
        Ok(caps) => caps,
        Err(e) => panic!("fixture capabilities rejected: {e}"),
    }
}

/// One-second steps, a minute of range, reset only.
pub fn reset_only() -> WatchdogCapabilities {
    caps(Duration::from_secs(1), 60, ActionSet::from(Action::Reset))
}

/// AMD CS5536 MFGPT0: 512 ms steps, 32000 of them, NMI or reset.
pub fn cs5536() -> WatchdogCapabilities {
    caps(
        Duration::from_millis(512),
        32_000,
        ActionSet::of(&[Action::Nmi, Action::Reset]),
    )
}

/// SC1100 X-Bus: 256 ms steps, 16384 of them, reset only.
pub fn sc1100() -> WatchdogCapabilities {
    caps(
        Duration::from_millis(256),
        16_384,
        ActionSet::from(Action::Reset),
    )
}

/// DMP md6117d: 32.768 kHz, 24-bit counter, ten IRQ lines, NMI or reset.
pub fn md6117d() -> WatchdogCapabilities {
    let mut actions = ActionSet::of(&[Action::Nmi, Action::Reset]);
    actions.extend(
        [3, 4, 5, 6, 7, 9, 10, 12, 14, 15]
            .into_iter()
            .filter_map(IrqLine::new)
            .map(Action::Irq),
    );
    caps(Duration::from_nanos(30_517), 1 << 24, actions)
}

/// Software watchdog at `hz` ticks per second with the debugger trap.
pub fn software(hz: u32) -> WatchdogCapabilities {
    let hz = u64::from(hz.max(1));
    caps(
        Duration::from_nanos(1_000_000_000 / hz),
        86_400 * hz,
        ActionSet::of(&[Action::Debugger, Action::Panic]),
    )
}

/// Every fixture above.
pub fn all() -> Vec<CapabilitiesFixture> {
    vec![
        CapabilitiesFixture {
            name: "reset_only",
            capabilities: reset_only(),
        },
        CapabilitiesFixture {
            name: "cs5536",
            capabilities: cs5536(),
        },
        CapabilitiesFixture {
            name: "sc1100",
            capabilities: sc1100(),
        },
        CapabilitiesFixture {
            name: "md6117d",
            capabilities: md6117d(),
        },
        CapabilitiesFixture {
            name: "software",
            capabilities: software(1000),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_ranges() {
        assert_eq!(sc1100().max_timeout(), Duration::from_millis(256 * 16_384));
        assert_eq!(cs5536().max_timeout(), Duration::from_millis(512 * 32_000));
        assert_eq!(software(1000).max_timeout(), Duration::from_secs(86_400));
        assert_eq!(md6117d().supported_actions().len(), 12);
    }
}
