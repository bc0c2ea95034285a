//! Assertion macros for watchdog results.

/// Assert that a watchdog result failed with the given
/// [`ErrorKind`](wdog::ErrorKind) variant, yielding the error.
///
/// # Example
///
/// ```rust
/// use wdog::{WatchdogError, WatchdogResult};
/// use wdog_test_helpers::assert_kind;
///
/// let result: WatchdogResult<()> = Err(WatchdogError::unsupported("too long"));
/// assert_kind!(result, Unsupported);
/// ```
#[macro_export]
macro_rules! assert_kind {
    ($result:expr, $kind:ident $(,)?) => {
        match $result {
            Err(e) if e.kind() == ::wdog::ErrorKind::$kind => e,
            Err(e) => panic!(
                "assertion failed: expected {} error, got {:?}",
                ::wdog::ErrorKind::$kind,
                e
            ),
            Ok(v) => panic!(
                "assertion failed: expected {} error, got Ok({:?})",
                ::wdog::ErrorKind::$kind,
                v
            ),
        }
    };
}

/// Assert that a control surface read yields `expected`.
///
/// # Example
///
/// ```rust,ignore
/// assert_reads!(surface, "state", "1<running>");
/// ```
#[macro_export]
macro_rules! assert_reads {
    ($surface:expr, $name:expr, $expected:expr $(,)?) => {
        match $surface.read($name) {
            Ok(v) => assert_eq!(v, $expected, "reading {}", $name),
            Err(e) => panic!("assertion failed: reading {} failed: {:?}", $name, e),
        }
    };
}
