//! # wdog
//!
//! Device-class-independent watchdog layer for embedded x86 boards.
//!
//! Chip drivers implement the small [`Backend`] trait and describe their
//! granularity, range and expiry actions with [`WatchdogCapabilities`]. A
//! [`WatchdogController`] owns one backend, validates every request against
//! those capabilities and enforces the enable/disable/immutable state
//! machine. A [`ControlSurface`] exposes the controller as a sysctl-like
//! property tree under `dev.watchdog.<unit>`.
//!
//! ## Architecture
//!
//! - [`action`] - expiry actions and capability sets
//! - [`capabilities`] - step/step-count arithmetic
//! - [`backend`] - the hardware interface
//! - [`controller`] - state machine and validation
//! - [`control`] - string property tree
//! - [`error`] - error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use core::time::Duration;
//! use std::sync::Arc;
//! use wdog::prelude::*;
//! # struct Chip(WatchdogCapabilities);
//! # impl Backend for Chip {
//! #     fn capabilities(&self) -> &WatchdogCapabilities { &self.0 }
//! #     fn enable(&mut self) -> WatchdogResult<()> { Ok(()) }
//! #     fn disable(&mut self) -> WatchdogResult<()> { Ok(()) }
//! #     fn configure(&mut self, _: Duration, _: Action) -> WatchdogResult<()> { Ok(()) }
//! #     fn rearm(&mut self) -> WatchdogResult<()> { Ok(()) }
//! # }
//!
//! let caps = WatchdogCapabilities::new(
//!     Duration::from_millis(500),
//!     65_535,
//!     ActionSet::of(&[Action::Nmi, Action::Reset]),
//! )?;
//! let surface = ControlSurface::new(Arc::new(WatchdogController::attach(Chip(caps))), 0);
//!
//! surface.write("config.timeout", "45")?;
//! surface.write("config.action", "reset")?;
//! surface.write("enable", "1")?;
//! assert_eq!(surface.read("dev.watchdog.0.state")?, "1<running>");
//! assert_eq!(surface.read("capabilities.actions")?, "6<nmi,reset>");
//! # Ok::<(), WatchdogError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod action;
pub mod backend;
pub mod capabilities;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod prelude;
mod render;
pub mod state;

pub use action::{Action, ActionSet, IrqLine, MAX_IRQ_LINE};
pub use backend::Backend;
pub use capabilities::WatchdogCapabilities;
pub use config::WatchdogConfig;
pub use control::{Access, ControlSurface, NodeInfo, Property, format_seconds, parse_seconds};
pub use controller::WatchdogController;
pub use error::{ErrorKind, WatchdogError, WatchdogResult};
pub use state::{ControllerFlags, Latch, Phase};
