//! Stored watchdog configuration.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Timeout and action the controller programs into its backend on the next
/// enable.
///
/// Starts out cleared at attach time. Mutated only through the controller's
/// validated setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Timeout, already rounded down to a whole number of backend steps.
    pub timeout: Option<Duration>,
    /// Action taken on expiry.
    pub action: Option<Action>,
}

impl WatchdogConfig {
    /// Create a cleared configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            action: None,
        }
    }

    /// Both halves of the pair, if complete.
    #[must_use]
    pub fn pair(&self) -> Option<(Duration, Action)> {
        match (self.timeout, self.action) {
            (Some(timeout), Some(action)) if !timeout.is_zero() => Some((timeout, action)),
            _ => None,
        }
    }

    /// Check whether the configuration can be programmed into a backend.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.pair().is_some()
    }
}
