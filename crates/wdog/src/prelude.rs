//! Prelude for wdog.
//!
//! Re-exports the types needed to attach a backend and drive it.
//!
//! ```rust
//! use wdog::prelude::*;
//!
//! let set: ActionSet = [Action::Reset, Action::Nmi].into_iter().collect();
//! assert_eq!(set.to_string(), "6<nmi,reset>");
//! ```

pub use crate::action::{Action, ActionSet, IrqLine};
pub use crate::backend::Backend;
pub use crate::capabilities::WatchdogCapabilities;
pub use crate::config::WatchdogConfig;
pub use crate::control::{Access, ControlSurface, NodeInfo, Property};
pub use crate::controller::WatchdogController;
pub use crate::error::{ErrorKind, WatchdogError, WatchdogResult};
pub use crate::state::{ControllerFlags, Phase};
