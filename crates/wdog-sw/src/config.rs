//! Configuration for the software watchdog.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use wdog::{WatchdogError, WatchdogResult};

/// Lowest supported tick rate.
pub const MIN_HZ: u32 = 1;
/// Highest supported tick rate.
pub const MAX_HZ: u32 = 10_000;
/// Tick rate used when none is configured.
pub const DEFAULT_HZ: u32 = 1000;

const SECONDS_PER_DAY: u64 = 86_400;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Software watchdog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareWatchdogConfig {
    /// Heartbeat ticks per second.
    ///
    /// Default: 1000.
    pub hz: u32,

    /// Offer [`Action::Debugger`](wdog::Action::Debugger) in addition to
    /// panic.
    pub debugger: bool,
}

impl SoftwareWatchdogConfig {
    /// Create a configuration ticking at `hz`.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if `hz` is outside `1..=10000` or does not divide
    /// one second into whole nanoseconds.
    pub fn new(hz: u32) -> WatchdogResult<Self> {
        let config = Self {
            hz,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SoftwareWatchdogConfigBuilder {
        SoftwareWatchdogConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if `hz` is out of range, or if a tick would not be
    /// a whole number of nanoseconds (`hz` must divide 10^9).
    pub fn validate(&self) -> WatchdogResult<()> {
        if !(MIN_HZ..=MAX_HZ).contains(&self.hz) {
            return Err(WatchdogError::invalid(format!(
                "hz must be between {MIN_HZ} and {MAX_HZ}, got {}",
                self.hz
            )));
        }
        if !NANOS_PER_SEC.is_multiple_of(u64::from(self.hz)) {
            return Err(WatchdogError::invalid(format!(
                "hz must divide one second into whole nanoseconds, got {}",
                self.hz
            )));
        }
        Ok(())
    }

    /// Duration of one tick.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_nanos(NANOS_PER_SEC / u64::from(self.hz.max(MIN_HZ)))
    }

    /// Number of ticks in a day, the longest programmable timeout.
    #[must_use]
    pub fn ticks_per_day(&self) -> u64 {
        SECONDS_PER_DAY.saturating_mul(u64::from(self.hz))
    }
}

impl Default for SoftwareWatchdogConfig {
    fn default() -> Self {
        Self {
            hz: DEFAULT_HZ,
            debugger: false,
        }
    }
}

/// Builder for [`SoftwareWatchdogConfig`].
#[derive(Debug, Default)]
pub struct SoftwareWatchdogConfigBuilder {
    config: SoftwareWatchdogConfig,
}

impl SoftwareWatchdogConfigBuilder {
    /// Set the tick rate.
    #[must_use]
    pub fn hz(mut self, hz: u32) -> Self {
        self.config.hz = hz;
        self
    }

    /// Enable or disable the debugger action.
    #[must_use]
    pub fn debugger(mut self, enabled: bool) -> Self {
        self.config.debugger = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<SoftwareWatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SoftwareWatchdogConfig::default();
        assert_eq!(config.hz, 1000);
        assert!(!config.debugger);
        assert_eq!(config.tick(), Duration::from_millis(1));
        assert_eq!(config.ticks_per_day(), 86_400_000);
    }

    #[test]
    fn test_config_validation() {
        assert!(SoftwareWatchdogConfig::new(0).is_err());
        assert!(SoftwareWatchdogConfig::new(10_001).is_err());
        assert!(SoftwareWatchdogConfig::new(1).is_ok());
        assert!(SoftwareWatchdogConfig::new(10_000).is_ok());
    }

    #[test]
    fn test_rate_must_give_whole_nanosecond_ticks() -> WatchdogResult<()> {
        for hz in [3, 6, 7, 9, 1024, 9999] {
            let result = SoftwareWatchdogConfig::new(hz);
            assert!(
                matches!(result, Err(WatchdogError::Invalid(_))),
                "{hz}: {result:?}"
            );
        }
        for hz in [1, 2, 4, 5, 8, 64, 125, 128, 250, 512, 1000, 2000, 10_000] {
            let config = SoftwareWatchdogConfig::new(hz)?;
            let day = config
                .tick()
                .checked_mul(u32::try_from(config.ticks_per_day()).unwrap_or(u32::MAX));
            assert_eq!(day, Some(Duration::from_secs(86_400)), "{hz}");
        }
        Ok(())
    }

    #[test]
    fn test_config_builder() -> WatchdogResult<()> {
        let config = SoftwareWatchdogConfig::builder()
            .hz(100)
            .debugger(true)
            .build()?;
        assert_eq!(config.hz, 100);
        assert!(config.debugger);
        assert_eq!(config.tick(), Duration::from_millis(10));

        let result = SoftwareWatchdogConfig::builder().hz(0).build();
        assert!(matches!(result, Err(WatchdogError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn test_missing_fields_take_defaults() -> Result<(), serde_json::Error> {
        let config: SoftwareWatchdogConfig = serde_json::from_str(r#"{"debugger": true}"#)?;
        assert_eq!(config.hz, DEFAULT_HZ);
        assert!(config.debugger);
        Ok(())
    }
}
