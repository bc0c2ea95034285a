//! Prelude for wdog-sw.

pub use crate::config::{SoftwareWatchdogConfig, SoftwareWatchdogConfigBuilder};
pub use crate::fire::{FireHandler, FireKind, PanicFireHandler, RecordingFireHandler};
pub use crate::registry::HeartbeatRegistry;
pub use crate::software::{PokeOutcome, SoftwareWatchdog};
pub use crate::ticker::Ticker;
