//! Fired actions and capability sets.
//!
//! A backend declares which [`Action`]s it can take when its countdown
//! expires as an [`ActionSet`]. Both render the way the kernel's `%b`
//! formatter renders the underlying bitmask, e.g. `4<reset>` or
//! `c0000000<debugger,panic>`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WatchdogError;

/// Highest IRQ line an [`Action::Irq`] can route to.
pub const MAX_IRQ_LINE: u8 = 15;

const IRQ_SHIFT: u32 = 8;
const NMI_BIT: u32 = 1 << 1;
const RESET_BIT: u32 = 1 << 2;
const IRQ_MASK: u32 = 0xffff << IRQ_SHIFT;
const DEBUGGER_BIT: u32 = 1 << 30;
const PANIC_BIT: u32 = 1 << 31;

/// An ISA interrupt line a watchdog can raise on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IrqLine(u8);

impl IrqLine {
    /// Create an IRQ line, `None` if `line > 15`.
    #[must_use]
    pub const fn new(line: u8) -> Option<Self> {
        if line <= MAX_IRQ_LINE {
            Some(Self(line))
        } else {
            None
        }
    }

    /// Get the line number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Action taken by a backend when its countdown expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Action {
    /// Raise an interrupt on the given line.
    Irq(IrqLine),
    /// Raise a non-maskable interrupt.
    Nmi,
    /// Assert the system reset line.
    Reset,
    /// Trap into the kernel debugger; recoverable.
    Debugger,
    /// Panic the system; terminal.
    Panic,
}

impl Action {
    /// Shorthand for [`Action::Irq`], `None` if `line > 15`.
    #[must_use]
    pub const fn irq(line: u8) -> Option<Self> {
        match IrqLine::new(line) {
            Some(line) => Some(Self::Irq(line)),
            None => None,
        }
    }

    /// Bit occupied by this action in the capability mask.
    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::Irq(line) => 1 << (IRQ_SHIFT + line.0 as u32),
            Self::Nmi => NMI_BIT,
            Self::Reset => RESET_BIT,
            Self::Debugger => DEBUGGER_BIT,
            Self::Panic => PANIC_BIT,
        }
    }

    /// Inverse of [`Action::bit`] for a mask with exactly one bit set.
    #[must_use]
    pub fn from_bit(bit: u32) -> Option<Self> {
        match bit {
            NMI_BIT => Some(Self::Nmi),
            RESET_BIT => Some(Self::Reset),
            DEBUGGER_BIT => Some(Self::Debugger),
            PANIC_BIT => Some(Self::Panic),
            b if b.is_power_of_two() && b & IRQ_MASK != 0 => {
                let line = u8::try_from(b.trailing_zeros() - IRQ_SHIFT).ok()?;
                Self::irq(line)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Irq(line) => write!(f, "irq{}", line.0),
            Self::Nmi => f.write_str("nmi"),
            Self::Reset => f.write_str("reset"),
            Self::Debugger => f.write_str("debugger"),
            Self::Panic => f.write_str("panic"),
        }
    }
}

impl FromStr for Action {
    type Err = WatchdogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token {
            "nmi" => Ok(Self::Nmi),
            "reset" => Ok(Self::Reset),
            "debugger" => Ok(Self::Debugger),
            "panic" => Ok(Self::Panic),
            _ => token
                .strip_prefix("irq")
                .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|n| n.parse::<u8>().ok())
                .and_then(Self::irq)
                .ok_or_else(|| WatchdogError::invalid(format!("unknown action '{token}'"))),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

impl TryFrom<String> for Action {
    type Error = WatchdogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Set of [`Action`]s a backend supports.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSet {
    bits: u32,
}

impl ActionSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Build a set from a slice, usable in `const` capability tables.
    #[must_use]
    pub const fn of(actions: &[Action]) -> Self {
        let mut bits = 0;
        let mut rest = actions;
        while let [first, tail @ ..] = rest {
            bits |= first.bit();
            rest = tail;
        }
        Self { bits }
    }

    /// Add an action, returning whether it was newly inserted.
    pub fn insert(&mut self, action: Action) -> bool {
        let fresh = !self.contains(action);
        self.bits |= action.bit();
        fresh
    }

    /// Remove an action, returning whether it was present.
    pub fn remove(&mut self, action: Action) -> bool {
        let present = self.contains(action);
        self.bits &= !action.bit();
        present
    }

    /// Builder-style [`ActionSet::insert`].
    #[must_use]
    pub fn with(mut self, action: Action) -> Self {
        self.insert(action);
        self
    }

    /// Check membership.
    #[must_use]
    pub const fn contains(&self, action: Action) -> bool {
        self.bits & action.bit() != 0
    }

    /// Check whether the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of actions in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Raw capability mask.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Iterate over the actions in bit order.
    #[must_use]
    pub fn iter(&self) -> Iter {
        Iter { remaining: self.bits }
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = Self::empty();
        set.extend(iter);
        set
    }
}

impl Extend<Action> for ActionSet {
    fn extend<I: IntoIterator<Item = Action>>(&mut self, iter: I) {
        for action in iter {
            self.insert(action);
        }
    }
}

impl IntoIterator for ActionSet {
    type Item = Action;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl From<Action> for ActionSet {
    fn from(action: Action) -> Self {
        Self { bits: action.bit() }
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::render::write_bitmask(f, self.bits, self.iter())
    }
}

/// Iterator over an [`ActionSet`].
#[derive(Debug, Clone)]
pub struct Iter {
    remaining: u32,
}

impl Iterator for Iter {
    type Item = Action;

    fn next(&mut self) -> Option<Action> {
        while self.remaining != 0 {
            let bit = self.remaining & self.remaining.wrapping_neg();
            self.remaining &= !bit;
            if let Some(action) = Action::from_bit(bit) {
                return Some(action);
            }
        }
        None
    }
}
