//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use wdog_test_helpers::prelude::*;
//! ```

pub use crate::fixtures;
pub use crate::must::{must, must_fail};

#[cfg(feature = "mock")]
pub use crate::mock::{BackendCall, Journal, MockBackend, Op};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
