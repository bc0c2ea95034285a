//! Shared test utilities for the wdog crates.
//!
//! # Modules
//!
//! - [`mod@must`] - `#[track_caller]` unwrap helpers
//! - [`assertions`] - Assertion macros for watchdog results
//! - [`fixtures`] - Capability descriptors of the supported chips
//! - [`mock`] - Recording, scriptable [`Backend`](wdog::Backend)
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! wdog-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use wdog_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod fixtures;
pub mod must;
pub mod prelude;

#[cfg(feature = "mock")]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

pub use must::*;
