//! Error types for watchdog operations.
//!
//! Every failure surfaced by the controller, the control surface or a backend
//! falls into one of four classes. The class is what callers match on; the
//! message is for humans.

use thiserror::Error;

/// FreeBSD `EPERM`.
const EPERM: i32 = 1;
/// FreeBSD `EINVAL`.
const EINVAL: i32 = 22;
/// FreeBSD `EOPNOTSUPP`.
const EOPNOTSUPP: i32 = 45;

/// Errors that can occur during watchdog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Malformed input: non-numeric timeout, unknown action token, bad
    /// trigger value, unknown property.
    #[error("Invalid argument: {0}")]
    Invalid(String),

    /// Value outside the hardware-representable range, or an action the
    /// backend does not implement.
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Operation not permitted in the current run/config state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Blocked by the immutable flag.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Coarse error classification, cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`WatchdogError::Invalid`].
    Invalid,
    /// See [`WatchdogError::Unsupported`].
    Unsupported,
    /// See [`WatchdogError::InvalidState`].
    InvalidState,
    /// See [`WatchdogError::PermissionDenied`].
    PermissionDenied,
}

impl WatchdogError {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create an unsupported error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create an invalid state error.
    #[must_use]
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a permission denied error.
    #[must_use]
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Get the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
        }
    }

    /// Get the errno a FreeBSD `watchdog(4)` sysctl handler reports for this
    /// error.
    ///
    /// The kernel driver reports state violations as `EINVAL`, so two kinds
    /// share a code here; use [`WatchdogError::kind`] to tell them apart.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self.kind() {
            ErrorKind::Invalid | ErrorKind::InvalidState => EINVAL,
            ErrorKind::Unsupported => EOPNOTSUPP,
            ErrorKind::PermissionDenied => EPERM,
        }
    }
}

impl ErrorKind {
    /// Get the kind as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Unsupported => "unsupported",
            Self::InvalidState => "invalid_state",
            Self::PermissionDenied => "permission_denied",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;
