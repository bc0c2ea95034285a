//! Unwrap helpers for tests and benches.
//!
//! `#[track_caller]` keeps the panic location at the call site, so a failed
//! controller call points at the line that made it.

use std::fmt::Debug;

use wdog::{ErrorKind, WatchdogError, WatchdogResult};

/// Unwrap a `Result`, panicking with the error value.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use wdog::{Action, ActionSet, WatchdogCapabilities};
/// use wdog_test_helpers::must;
///
/// let caps = must(WatchdogCapabilities::new(
///     Duration::from_secs(1),
///     60,
///     ActionSet::from(Action::Reset),
/// ));
/// assert_eq!(caps.max_timeout(), Duration::from_secs(60));
/// ```
///
/// # Panics
///
/// Panics if the result is `Err`.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap the error of a watchdog result and check its kind.
///
/// # Example
///
/// ```rust
/// use wdog::{ErrorKind, WatchdogError, WatchdogResult};
/// use wdog_test_helpers::must_fail;
///
/// let result: WatchdogResult<()> = Err(WatchdogError::invalid("bad"));
/// let err = must_fail(result, ErrorKind::Invalid);
/// assert_eq!(err.errno(), 22);
/// ```
///
/// # Panics
///
/// Panics if the result is `Ok` or fails with another kind.
#[track_caller]
pub fn must_fail<T: Debug>(result: WatchdogResult<T>, kind: ErrorKind) -> WatchdogError {
    match result {
        Ok(v) => panic!("must_fail: expected {kind} error, got Ok({v:?})"),
        Err(e) if e.kind() == kind => e,
        Err(e) => panic!("must_fail: expected {kind} error, got {e:?}"),
    }
}
