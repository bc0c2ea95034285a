//! Common interface of the chip models and model selection.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use serde::{Deserialize, Serialize};
use wdog::{Action, Backend, WatchdogError, WatchdogResult};

use crate::cs5536::Cs5536;
use crate::md6117d::Md6117d;
use crate::sc1100::Sc1100;
use crate::sc520::Sc520;

/// A simulated watchdog timer driven by explicit time steps.
pub trait SimulatedChip: Backend + fmt::Debug {
    /// Which chip this models.
    fn model(&self) -> ChipModel;

    /// Let `elapsed` pass. Returns the action taken if the countdown expired
    /// during this step.
    fn advance(&mut self, elapsed: Duration) -> Option<Action>;

    /// Every action taken so far.
    fn fired(&self) -> &[Action];

    /// Whether the countdown is running.
    fn is_armed(&self) -> bool;

    /// Time left before expiry, `None` while stopped.
    fn remaining(&self) -> Option<Duration>;
}

/// Supported chip models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipModel {
    /// AMD CS5536 companion chip, MFGPT0.
    Cs5536,
    /// AMD Elan SC520.
    Sc520,
    /// National SC1100.
    Sc1100,
    /// DMP Vortex86 md6117d.
    Md6117d,
}

impl ChipModel {
    /// Every model.
    pub const ALL: [Self; 4] = [Self::Cs5536, Self::Sc520, Self::Sc1100, Self::Md6117d];

    /// Short name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cs5536 => "cs5536",
            Self::Sc520 => "sc520",
            Self::Sc1100 => "sc1100",
            Self::Md6117d => "md6117d",
        }
    }

    /// Build a fresh, unconfigured instance.
    ///
    /// # Errors
    ///
    /// Propagates capability construction failures.
    pub fn build(self) -> WatchdogResult<Box<dyn SimulatedChip>> {
        Ok(match self {
            Self::Cs5536 => Box::new(Cs5536::new()?),
            Self::Sc520 => Box::new(Sc520::new()?),
            Self::Sc1100 => Box::new(Sc1100::new()?),
            Self::Md6117d => Box::new(Md6117d::new()?),
        })
    }
}

impl fmt::Display for ChipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChipModel {
    type Err = WatchdogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| WatchdogError::invalid(format!("unknown chip model '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names_round_trip() -> WatchdogResult<()> {
        for model in ChipModel::ALL {
            assert_eq!(model.as_str().parse::<ChipModel>().ok(), Some(model));
            assert_eq!(model.build()?.model(), model);
        }
        assert!("SC520".parse::<ChipModel>().is_ok());
        assert!("i8254".parse::<ChipModel>().is_err());
        Ok(())
    }
}
