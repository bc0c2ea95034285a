//! Node operations given on the command line.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;
use wdog::{Backend, ControlSurface, WatchdogError};

/// One `name` or `name=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Read(String),
    Write { name: String, value: String },
}

impl Op {
    pub fn name(&self) -> &str {
        match self {
            Self::Read(name) | Self::Write { name, .. } => name,
        }
    }

    /// Apply the operation and report what the node reads afterwards.
    pub fn apply<B: Backend>(&self, surface: &ControlSurface<B>) -> Result<Outcome> {
        let property = surface.resolve(self.name())?;
        let node = surface.qualified(property);
        match self {
            Self::Read(_) => {
                let value = surface
                    .read_property(property)
                    .with_context(|| format!("reading {node}"))?;
                Ok(Outcome {
                    node,
                    old: None,
                    value,
                })
            }
            Self::Write { value, .. } => {
                let readable = property.access().readable();
                let old = if readable {
                    Some(surface.read_property(property)?)
                } else {
                    None
                };
                surface
                    .write_property(property, value)
                    .with_context(|| format!("writing {value:?} to {node}"))?;
                let value = if readable {
                    surface.read_property(property)?
                } else {
                    value.trim().to_owned()
                };
                Ok(Outcome { node, old, value })
            }
        }
    }
}

impl FromStr for Op {
    type Err = WatchdogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(WatchdogError::invalid(format!("missing node name in {s:?}")));
        }
        Ok(match value {
            Some(value) => Self::Write {
                name: name.to_owned(),
                value: value.to_owned(),
            },
            None => Self::Read(name.to_owned()),
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(name) => f.write_str(name),
            Self::Write { name, value } => write!(f, "{name}={value}"),
        }
    }
}

/// Result of one applied operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    pub value: String,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old {
            Some(old) => write!(f, "{}: {} -> {}", self.node, old, self.value),
            None => write!(f, "{}: {}", self.node, self.value),
        }
    }
}
