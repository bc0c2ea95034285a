//! Control surface: the device's read/write property tree.
//!
//! Each attached controller exposes the nodes below under a device-scoped
//! namespace such as `dev.watchdog.0`:
//!
//! ```text
//! capabilities.actions      RO  supported actions, e.g. "4<reset>"
//! capabilities.min_timeout  RO  always "1"
//! capabilities.max_timeout  RO  whole seconds
//! config.timeout            RW  seconds
//! config.action             RW  irqN | nmi | reset | debugger | panic
//! enable                    WO  "1"
//! disable                   WO  "1"
//! rearm                     WO  "1"
//! immutable                 RW  "0" | "1"
//! state                     RO  e.g. "3<running,immutable>"
//! ```
//!
//! Values travel as strings, the way sysctl handlers see them; every write is
//! parsed here and validated by the [`WatchdogController`].

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use serde::Serialize;

use crate::action::{Action, ActionSet};
use crate::backend::Backend;
use crate::controller::WatchdogController;
use crate::error::{WatchdogError, WatchdogResult};

const NANOS_PER_SEC: u32 = 1_000_000_000;
const FRACTION_DIGITS: usize = 9;

/// Access mode of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Read only.
    ReadOnly,
    /// Read and write.
    ReadWrite,
    /// Write only; writes trigger an operation.
    WriteOnly,
}

impl Access {
    /// Check whether the property can be read.
    #[must_use]
    pub fn readable(self) -> bool {
        !matches!(self, Self::WriteOnly)
    }

    /// Check whether the property can be written.
    #[must_use]
    pub fn writable(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }

    /// Short sysctl-style tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "RD",
            Self::ReadWrite => "RW",
            Self::WriteOnly => "WR",
        }
    }
}

/// A node of the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// `capabilities.actions`
    CapabilitiesActions,
    /// `capabilities.min_timeout`
    CapabilitiesMinTimeout,
    /// `capabilities.max_timeout`
    CapabilitiesMaxTimeout,
    /// `config.timeout`
    ConfigTimeout,
    /// `config.action`
    ConfigAction,
    /// `enable`
    Enable,
    /// `disable`
    Disable,
    /// `rearm`
    Rearm,
    /// `immutable`
    Immutable,
    /// `state`
    State,
}

impl Property {
    /// Every property, in registration order.
    pub const ALL: [Self; 10] = [
        Self::CapabilitiesActions,
        Self::CapabilitiesMinTimeout,
        Self::CapabilitiesMaxTimeout,
        Self::ConfigTimeout,
        Self::ConfigAction,
        Self::Enable,
        Self::Disable,
        Self::Rearm,
        Self::Immutable,
        Self::State,
    ];

    /// Path relative to the device namespace.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::CapabilitiesActions => "capabilities.actions",
            Self::CapabilitiesMinTimeout => "capabilities.min_timeout",
            Self::CapabilitiesMaxTimeout => "capabilities.max_timeout",
            Self::ConfigTimeout => "config.timeout",
            Self::ConfigAction => "config.action",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Rearm => "rearm",
            Self::Immutable => "immutable",
            Self::State => "state",
        }
    }

    /// Access mode.
    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::CapabilitiesActions
            | Self::CapabilitiesMinTimeout
            | Self::CapabilitiesMaxTimeout
            | Self::State => Access::ReadOnly,
            Self::ConfigTimeout | Self::ConfigAction | Self::Immutable => Access::ReadWrite,
            Self::Enable | Self::Disable | Self::Rearm => Access::WriteOnly,
        }
    }

    /// One-line description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::CapabilitiesActions => "Actions the watchdog can trigger upon timeout",
            Self::CapabilitiesMinTimeout => "Minimum timeout after which <action> is triggered",
            Self::CapabilitiesMaxTimeout => "Maximum timeout after which <action> is triggered",
            Self::ConfigTimeout => "Configured timeout",
            Self::ConfigAction => "Configured action",
            Self::Enable => "Enable the watchdog",
            Self::Disable => "Disable the watchdog",
            Self::Rearm => "Re-arm the watchdog",
            Self::Immutable => "Forbid the watchdog to be disabled, cannot be unset",
            Self::State => "Watchdog state flags",
        }
    }

    /// Look a property up by relative path.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Listing entry returned by [`ControlSurface::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// Fully qualified name.
    pub name: String,
    /// Access mode.
    pub access: Access,
    /// One-line description.
    pub description: &'static str,
}

/// Property tree bound to one controller.
pub struct ControlSurface<B: Backend> {
    namespace: String,
    controller: Arc<WatchdogController<B>>,
}

impl<B: Backend> ControlSurface<B> {
    /// Expose `controller` as `dev.watchdog.<unit>`.
    pub fn new(controller: Arc<WatchdogController<B>>, unit: u32) -> Self {
        Self::with_namespace(controller, format!("dev.watchdog.{unit}"))
    }

    /// Expose `controller` under an arbitrary namespace.
    pub fn with_namespace(
        controller: Arc<WatchdogController<B>>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            controller,
        }
    }

    /// Device namespace, e.g. `dev.watchdog.0`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Controller behind the tree.
    #[must_use]
    pub fn controller(&self) -> &Arc<WatchdogController<B>> {
        &self.controller
    }

    /// Resolve a relative or fully qualified name.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for unknown names.
    pub fn resolve(&self, name: &str) -> WatchdogResult<Property> {
        let name = name.trim();
        let relative = name
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);
        Property::from_path(relative)
            .ok_or_else(|| WatchdogError::invalid(format!("unknown property '{name}'")))
    }

    /// Fully qualified name of `property`.
    #[must_use]
    pub fn qualified(&self, property: Property) -> String {
        format!("{}.{}", self.namespace, property.path())
    }

    /// Enumerate every node.
    pub fn list(&self) -> impl Iterator<Item = NodeInfo> + '_ {
        Property::ALL.into_iter().map(|p| NodeInfo {
            name: self.qualified(p),
            access: p.access(),
            description: p.description(),
        })
    }

    /// Read every readable node as `(qualified name, value)` pairs.
    ///
    /// # Errors
    ///
    /// Propagates read failures, which readable nodes do not produce.
    pub fn snapshot(&self) -> WatchdogResult<Vec<(String, String)>> {
        Property::ALL
            .into_iter()
            .filter(|p| p.access().readable())
            .map(|p| Ok((self.qualified(p), self.read_property(p)?)))
            .collect()
    }

    /// Read a node by name.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for unknown or write-only nodes.
    pub fn read(&self, name: &str) -> WatchdogResult<String> {
        let property = self.resolve(name)?;
        self.read_property(property)
    }

    /// Write a node by name.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for unknown or read-only nodes and malformed values,
    /// otherwise whatever the controller returns.
    pub fn write(&self, name: &str, value: &str) -> WatchdogResult<()> {
        let property = self.resolve(name)?;
        self.write_property(property, value)
    }

    /// Read a node.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for write-only nodes.
    pub fn read_property(&self, property: Property) -> WatchdogResult<String> {
        let caps = self.controller.capabilities();
        let value = match property {
            Property::CapabilitiesActions => caps.supported_actions().to_string(),
            Property::CapabilitiesMinTimeout => "1".to_owned(),
            Property::CapabilitiesMaxTimeout => caps.max_timeout().as_secs().to_string(),
            Property::ConfigTimeout => self
                .controller
                .config()
                .timeout
                .map_or_else(|| "0".to_owned(), format_seconds),
            Property::ConfigAction => self
                .controller
                .config()
                .action
                .map_or_else(|| "<none>".to_owned(), |a| ActionSet::from(a).to_string()),
            Property::Immutable => u8::from(self.controller.is_immutable()).to_string(),
            Property::State => self.controller.query_state().to_string(),
            Property::Enable | Property::Disable | Property::Rearm => {
                return Err(WatchdogError::invalid(format!(
                    "property '{property}' is write-only"
                )));
            }
        };
        Ok(value)
    }

    /// Write a node.
    ///
    /// # Errors
    ///
    /// See [`ControlSurface::write`].
    pub fn write_property(&self, property: Property, value: &str) -> WatchdogResult<()> {
        tracing::debug!(
            namespace = %self.namespace,
            property = %property,
            value,
            "Control surface write"
        );
        match property {
            Property::ConfigTimeout => {
                self.controller.set_timeout(parse_seconds(value)?)?;
            }
            Property::ConfigAction => {
                self.controller.set_action(value.parse::<Action>()?)?;
            }
            Property::Enable => {
                parse_trigger(property, value)?;
                self.controller.enable()?;
            }
            Property::Disable => {
                parse_trigger(property, value)?;
                self.controller.disable()?;
            }
            Property::Rearm => {
                parse_trigger(property, value)?;
                self.controller.rearm()?;
            }
            Property::Immutable => {
                self.controller.set_immutable(parse_flag(value)?)?;
            }
            Property::CapabilitiesActions
            | Property::CapabilitiesMinTimeout
            | Property::CapabilitiesMaxTimeout
            | Property::State => {
                return Err(WatchdogError::invalid(format!(
                    "property '{property}' is read-only"
                )));
            }
        }
        Ok(())
    }
}

impl<B: Backend> fmt::Debug for ControlSurface<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSurface")
            .field("namespace", &self.namespace)
            .field("controller", &self.controller)
            .finish()
    }
}

/// Parse a non-negative decimal number of seconds, e.g. `45` or `2.5`.
///
/// Digits past nanosecond precision are truncated. Leading zeros do not
/// select octal and `0x` prefixes are rejected.
///
/// # Errors
///
/// Returns `Invalid` for anything that is not a plain decimal number and
/// `Unsupported` for values too large to represent.
pub fn parse_seconds(value: &str) -> WatchdogResult<Duration> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
        return Err(WatchdogError::invalid(format!(
            "'{value}' is not a number of seconds"
        )));
    }

    let secs: u64 = whole
        .parse()
        .map_err(|e| WatchdogError::unsupported(format!("'{value}' is out of range: {e}")))?;

    let mut nanos: u32 = 0;
    let mut scale = NANOS_PER_SEC;
    for digit in fraction.bytes().take(FRACTION_DIGITS) {
        scale /= 10;
        nanos = nanos.saturating_add(u32::from(digit.saturating_sub(b'0')).saturating_mul(scale));
    }

    Ok(Duration::new(secs, nanos))
}

/// Render a duration as seconds, with a fractional part only when needed.
#[must_use]
pub fn format_seconds(duration: Duration) -> String {
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        return secs.to_string();
    }
    let fraction = format!("{nanos:09}");
    format!("{secs}.{}", fraction.trim_end_matches('0'))
}

fn parse_trigger(property: Property, value: &str) -> WatchdogResult<()> {
    match value.trim() {
        "1" => Ok(()),
        _ => Err(WatchdogError::invalid(format!(
            "property '{property}' only accepts 1, got '{value}'"
        ))),
    }
}

fn parse_flag(value: &str) -> WatchdogResult<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(WatchdogError::invalid(format!(
            "expected 0 or 1, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() -> WatchdogResult<()> {
        assert_eq!(parse_seconds("45")?, Duration::from_secs(45));
        assert_eq!(parse_seconds(" 2.5 ")?, Duration::from_millis(2500));
        assert_eq!(parse_seconds("0.256")?, Duration::from_millis(256));
        assert_eq!(parse_seconds("1.")?, Duration::from_secs(1));
        assert_eq!(parse_seconds("0")?, Duration::ZERO);
        assert_eq!(parse_seconds("1.0000000019")?, Duration::new(1, 1));
        Ok(())
    }

    #[test]
    fn test_parse_seconds_rejects_garbage() {
        for value in ["", "abc", "-5", "+5", "4 5", ".5", "1e3", "0x10", "5s", "1.2.3"] {
            assert!(
                matches!(parse_seconds(value), Err(WatchdogError::Invalid(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_seconds_is_always_decimal() -> WatchdogResult<()> {
        assert_eq!(parse_seconds("010")?, Duration::from_secs(10));
        assert_eq!(parse_seconds("060")?, Duration::from_secs(60));
        assert!(matches!(parse_seconds("0x3c"), Err(WatchdogError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn test_parse_seconds_overflow_is_unsupported() {
        let result = parse_seconds("99999999999999999999999");
        assert!(matches!(result, Err(WatchdogError::Unsupported(_))));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Duration::from_secs(45)), "45");
        assert_eq!(format_seconds(Duration::from_millis(768)), "0.768");
        assert_eq!(format_seconds(Duration::new(2, 500_000_000)), "2.5");
        assert_eq!(format_seconds(Duration::ZERO), "0");
    }

    #[test]
    fn test_trigger_and_flag_parsing() {
        assert!(parse_trigger(Property::Enable, "1").is_ok());
        assert!(parse_trigger(Property::Enable, " 1\n").is_ok());
        for value in ["0", "2", "yes", "", "-1", "+1", "01", "1.0"] {
            assert!(parse_trigger(Property::Enable, value).is_err(), "{value:?}");
        }
        assert_eq!(parse_flag("0").ok(), Some(false));
        assert_eq!(parse_flag("1").ok(), Some(true));
        assert!(parse_flag("2").is_err());
        assert!(parse_flag("-1").is_err());
    }

    #[test]
    fn test_property_table() {
        for property in Property::ALL {
            assert_eq!(Property::from_path(property.path()), Some(property));
            assert!(!property.description().is_empty());
        }
        assert_eq!(Property::from_path("config"), None);
        assert_eq!(Property::Enable.access(), Access::WriteOnly);
        assert_eq!(Property::State.access(), Access::ReadOnly);
        assert_eq!(Property::Immutable.access(), Access::ReadWrite);
    }
}
