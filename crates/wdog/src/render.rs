//! `%b`-style bitmask rendering shared by action sets and controller flags.

use core::fmt;

/// Write `value` in hex followed by the names of its set bits, the way the
/// kernel's `printf("%b")` does: `3<running,immutable>`. A zero value is
/// written as `0`.
pub(crate) fn write_bitmask<I, T>(f: &mut fmt::Formatter<'_>, value: u32, names: I) -> fmt::Result
where
    I: IntoIterator<Item = T>,
    T: fmt::Display,
{
    write!(f, "{value:x}")?;
    if value == 0 {
        return Ok(());
    }
    f.write_str("<")?;
    for (i, name) in names.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{name}")?;
    }
    f.write_str(">")
}
