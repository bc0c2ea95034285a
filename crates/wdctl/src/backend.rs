//! Backend selection.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use wdog::{Backend, WatchdogResult};
use wdog_sim::ChipModel;
use wdog_sw::{SoftwareWatchdog, SoftwareWatchdogConfig};

/// Backend a command attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Tick-driven software watchdog
    Sw,
    /// AMD CS5536 MFGPT (simulated)
    Cs5536,
    /// AMD Elan SC520 (simulated)
    Sc520,
    /// National SC1100 (simulated)
    Sc1100,
    /// Vortex86 md6117d (simulated)
    Md6117d,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sw => "sw",
            Self::Cs5536 => "cs5536",
            Self::Sc520 => "sc520",
            Self::Sc1100 => "sc1100",
            Self::Md6117d => "md6117d",
        }
    }

    /// Simulated chip behind this kind, if any.
    pub fn chip(self) -> Option<ChipModel> {
        match self {
            Self::Sw => None,
            Self::Cs5536 => Some(ChipModel::Cs5536),
            Self::Sc520 => Some(ChipModel::Sc520),
            Self::Sc1100 => Some(ChipModel::Sc1100),
            Self::Md6117d => Some(ChipModel::Md6117d),
        }
    }

    /// Build a fresh backend.
    pub fn build(self, software: SoftwareWatchdogConfig) -> WatchdogResult<Box<dyn Backend>> {
        let backend: Box<dyn Backend> = match self.chip() {
            Some(model) => model.build()?,
            None => Box::new(SoftwareWatchdog::new(software)?),
        };
        Ok(backend)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn every_kind_builds() -> TestResult {
        for kind in BackendKind::value_variants() {
            let backend = kind.build(SoftwareWatchdogConfig::default())?;
            assert!(!backend.name().is_empty(), "{kind}");
        }
        Ok(())
    }

    #[test]
    fn chip_models_match_names() {
        for kind in BackendKind::value_variants() {
            if let Some(model) = kind.chip() {
                assert_eq!(model.as_str(), kind.as_str());
            }
        }
    }
}
