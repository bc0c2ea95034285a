//! Error types for wdctl

use std::path::PathBuf;

use thiserror::Error;
use wdog::{ErrorKind, WatchdogError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    ConfigFormat(PathBuf),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Backend {0} cannot be used here")]
    WrongBackend(&'static str),

    #[error("Watchdog expired: {0}")]
    Expired(String),
}

/// Process exit code for a failed invocation.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let watchdog = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<WatchdogError>());
    match watchdog.map(WatchdogError::kind) {
        Some(ErrorKind::InvalidState) => 3,
        Some(ErrorKind::Invalid) => 4,
        Some(ErrorKind::Unsupported) => 5,
        Some(ErrorKind::PermissionDenied) => 6,
        None => 1,
    }
}

/// Short machine-readable name of the failure.
pub fn error_type_name(error: &anyhow::Error) -> &'static str {
    if let Some(e) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<WatchdogError>())
    {
        return e.kind().as_str();
    }
    match error.downcast_ref::<CliError>() {
        Some(CliError::ConfigRead { .. } | CliError::ConfigFormat(_)) => "config",
        Some(CliError::JsonError(_) | CliError::YamlError(_)) => "parse",
        Some(CliError::WrongBackend(_)) => "usage",
        Some(CliError::Expired(_)) => "expired",
        None => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn watchdog_kinds_map_to_exit_codes() {
        let cases = [
            (WatchdogError::invalid_state("x"), 3),
            (WatchdogError::invalid("x"), 4),
            (WatchdogError::unsupported("x"), 5),
            (WatchdogError::permission_denied("x"), 6),
        ];
        for (error, code) in cases {
            assert_eq!(exit_code(&anyhow::Error::new(error)), code);
        }
    }

    #[test]
    fn context_does_not_hide_the_kind() {
        let result: Result<(), WatchdogError> = Err(WatchdogError::unsupported("nmi"));
        let wrapped = result.context("writing config.action");
        let error = wrapped.err();
        assert!(error.is_some());
        if let Some(error) = error {
            assert_eq!(exit_code(&error), 5);
            assert_eq!(error_type_name(&error), "unsupported");
        }
    }

    #[test]
    fn other_failures_exit_with_one() {
        let error = anyhow::Error::new(CliError::Expired("panic".to_owned()));
        assert_eq!(exit_code(&error), 1);
        assert_eq!(error_type_name(&error), "expired");
    }
}
