//! Configuration file loading.
//!
//! The file is YAML (`.yaml`/`.yml`) or JSON (`.json`). Every field is
//! optional; command-line flags override it.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wdog::{WatchdogError, WatchdogResult};
use wdog_sw::SoftwareWatchdogConfig;

use crate::backend::BackendKind;
use crate::error::CliError;

/// Contents of a `wdctl` configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WdctlConfig {
    pub backend: Option<BackendKind>,
    pub unit: u32,
    pub software: SoftwareWatchdogConfig,
    pub run: RunSettings,
}

/// Defaults for `wdctl run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    pub duration_ms: u64,
    pub rearm_interval_ms: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            duration_ms: 3_000,
            rearm_interval_ms: 250,
        }
    }
}

impl RunSettings {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn rearm_interval(&self) -> Duration {
        Duration::from_millis(self.rearm_interval_ms)
    }
}

impl WdctlConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match extension.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(CliError::ConfigFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> WatchdogResult<()> {
        self.software.validate()?;
        if self.run.rearm_interval_ms == 0 {
            return Err(WatchdogError::invalid("run.rearm_interval_ms must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn write_temp(suffix: &str, content: &str) -> Result<tempfile::NamedTempFile, std::io::Error> {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn loads_yaml() -> TestResult {
        let file = write_temp(
            ".yaml",
            "backend: sc520\nunit: 2\nsoftware:\n  hz: 100\n  debugger: false\nrun:\n  duration_ms: 500\n",
        )?;
        let config = WdctlConfig::load(file.path())?;
        assert_eq!(config.backend, Some(BackendKind::Sc520));
        assert_eq!(config.unit, 2);
        assert_eq!(config.software.hz, 100);
        assert!(!config.software.debugger);
        assert_eq!(config.run.duration(), Duration::from_millis(500));
        assert_eq!(config.run.rearm_interval(), Duration::from_millis(250));
        config.validate()?;
        Ok(())
    }

    #[test]
    fn loads_json() -> TestResult {
        let file = write_temp(".json", r#"{"backend": "sw", "software": {"hz": 50}}"#)?;
        let config = WdctlConfig::load(file.path())?;
        assert_eq!(config.backend, Some(BackendKind::Sw));
        assert_eq!(config.software.hz, 50);
        assert_eq!(config.unit, 0);
        Ok(())
    }

    #[test]
    fn rejects_unknown_extension() -> TestResult {
        let file = write_temp(".toml", "backend = 'sw'")?;
        let result = WdctlConfig::load(file.path());
        assert!(matches!(result, Err(CliError::ConfigFormat(_))));
        Ok(())
    }

    #[test]
    fn rejects_unknown_fields() -> TestResult {
        let file = write_temp(".yaml", "backend: sw\ntimeout: 5\n")?;
        let result = WdctlConfig::load(file.path());
        assert!(matches!(result, Err(CliError::YamlError(_))));
        Ok(())
    }

    #[test]
    fn validate_checks_software_rate() {
        let config = WdctlConfig {
            software: SoftwareWatchdogConfig {
                hz: 0,
                debugger: true,
            },
            ..WdctlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(e) if e.kind() == wdog::ErrorKind::Invalid
        ));
    }
}
