//! # wdog-sim
//!
//! Behavioral models of the watchdog timers found on embedded x86 boards.
//!
//! Each model implements [`wdog::Backend`] with the quirks of its chip and
//! [`SimulatedChip`] to let time pass explicitly:
//!
//! | model | step | steps | actions | quirk |
//! |---|---|---|---|---|
//! | [`Cs5536`] | 512 ms | 32000 | nmi, reset | write-once setup |
//! | [`Sc520`] | 1 s | 32 | reset | discrete `2^exp` timeouts, no reconfigure while armed |
//! | [`Sc1100`] | 256 ms | 16384 | reset | arming by reload |
//! | [`Md6117d`] | 30.5 us | 2^24 | irq3..15, nmi, reset | IRQ routing |
//!
//! Register layouts are not modelled.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use wdog::prelude::*;
//! use wdog_sim::{ChipModel, SimulatedChip};
//!
//! let controller = WatchdogController::attach(ChipModel::Sc1100.build()?);
//! controller.set_timeout(Duration::from_secs(1))?;
//! controller.set_action(Action::Reset)?;
//! controller.enable()?;
//!
//! let fired = controller.with_backend_mut(|chip| chip.advance(Duration::from_secs(1)));
//! assert_eq!(fired, Some(Action::Reset));
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

pub mod chip;
mod countdown;
pub mod cs5536;
pub mod md6117d;
pub mod sc1100;
pub mod sc520;

pub use chip::{ChipModel, SimulatedChip};
pub use cs5536::Cs5536;
pub use md6117d::Md6117d;
pub use sc1100::Sc1100;
pub use sc520::Sc520;
