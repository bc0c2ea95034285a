//! Controller flags and the set-once latch behind the immutable flag.

use core::fmt;

use serde::Serialize;

/// A one-way latch.
///
/// Once [`Latch::set`] has been called the latch stays set for the lifetime of
/// the value; there is deliberately no way to clear it.
#[derive(Debug, Default)]
pub struct Latch {
    set: bool,
}

impl Latch {
    /// Create a cleared latch.
    #[must_use]
    pub const fn new() -> Self {
        Self { set: false }
    }

    /// Set the latch. Returns `true` if this call set it.
    pub fn set(&mut self) -> bool {
        let fresh = !self.set;
        self.set = true;
        fresh
    }

    /// Check whether the latch is set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.set
    }
}

/// Snapshot of a controller's state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ControllerFlags {
    /// The backend is armed.
    pub running: bool,
    /// The configuration is locked and the watchdog cannot be disabled.
    pub immutable: bool,
}

impl ControllerFlags {
    /// Bit for [`ControllerFlags::running`].
    pub const RUNNING: u32 = 0x01;
    /// Bit for [`ControllerFlags::immutable`].
    pub const IMMUTABLE: u32 = 0x02;

    /// Raw flag word.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.running {
            bits |= Self::RUNNING;
        }
        if self.immutable {
            bits |= Self::IMMUTABLE;
        }
        bits
    }

    /// Names of the set flags.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        [(self.running, "running"), (self.immutable, "immutable")]
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
    }
}

impl fmt::Display for ControllerFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::render::write_bitmask(f, self.bits(), self.names())
    }
}

/// Lifecycle phase of a controller, orthogonal to the immutable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Timeout or action still unset.
    Unconfigured,
    /// Timeout and action set, backend not armed.
    Configured,
    /// Backend armed.
    Running,
}

impl Phase {
    /// Get the phase as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Configured => "configured",
            Self::Running => "running",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_is_monotonic() {
        let mut latch = Latch::new();
        assert!(!latch.is_set());
        assert!(latch.set());
        assert!(latch.is_set());
        assert!(!latch.set());
        assert!(latch.is_set());
    }

    #[test]
    fn test_flags_rendering() {
        assert_eq!(ControllerFlags::default().to_string(), "0");
        let flags = ControllerFlags {
            running: true,
            immutable: false,
        };
        assert_eq!(flags.to_string(), "1<running>");
        let flags = ControllerFlags {
            running: true,
            immutable: true,
        };
        assert_eq!(flags.to_string(), "3<running,immutable>");
        let flags = ControllerFlags {
            running: false,
            immutable: true,
        };
        assert_eq!(flags.to_string(), "2<immutable>");
    }
}
