//! # wdog-sw
//!
//! Software fallback watchdog for boards without a usable hardware timer.
//!
//! - [`SoftwareWatchdog`] implements [`wdog::Backend`] over an atomic tick
//!   counter; one tick is `1/hz` seconds and the range is one day.
//! - [`HeartbeatRegistry`] is the single active-watchdog slot heartbeat
//!   producers poke.
//! - [`Ticker`] is a background heartbeat producer.
//! - [`FireHandler`] decides what an expiry does; [`PanicFireHandler`] panics,
//!   [`RecordingFireHandler`] only records.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wdog::prelude::*;
//! use wdog_sw::prelude::*;
//!
//! let config = SoftwareWatchdogConfig::builder().hz(100).debugger(true).build()?;
//! let handler = Arc::new(RecordingFireHandler::new());
//! let watchdog = SoftwareWatchdog::with_handler(config, handler.clone())?;
//! let registry = HeartbeatRegistry::new();
//! registry.register(&watchdog)?;
//!
//! let controller = WatchdogController::attach(watchdog);
//! controller.set_timeout(Duration::from_millis(50))?;
//! controller.set_action(Action::Debugger)?;
//! controller.enable()?;
//!
//! for _ in 0..5 {
//!     registry.poke(1);
//! }
//! assert_eq!(handler.debugger_count(), 1);
//! # Ok::<(), WatchdogError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod fire;
pub mod prelude;
pub mod registry;
pub mod software;
pub mod ticker;

pub use config::{SoftwareWatchdogConfig, SoftwareWatchdogConfigBuilder};
pub use fire::{FireHandler, FireKind, PanicFireHandler, RecordingFireHandler};
pub use registry::HeartbeatRegistry;
pub use software::{PokeOutcome, SoftwareWatchdog};
pub use ticker::Ticker;
