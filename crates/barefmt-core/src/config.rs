//! Build and strategy configuration.
//!
//! The core has no environment to read, so configuration is fixed at compile
//! time through cargo features:
//! - `soft-div`: targets without a hardware divider. [`DivStrategy::native`]
//!   then selects [`DivStrategy::Software`].
//! - `wide-int` (default): enables the 64-bit `%l` / `%lx` conversions.
//!   Without it, `l` is treated like any other unknown specifier.
//!
//! Hosted tooling (the harness) may pick a strategy explicitly per call, which
//! is how both arithmetic paths are exercised on a single machine.

use core::fmt;

/// How base-10 digits are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivStrategy {
    /// Native `/` and `%` operators.
    Hardware,
    /// Shift-subtract division from [`crate::arith`]; no divide instruction.
    Software,
}

impl DivStrategy {
    /// Both strategies, hardware first.
    pub const ALL: [DivStrategy; 2] = [DivStrategy::Hardware, DivStrategy::Software];

    /// Strategy selected for this build.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(feature = "soft-div") {
            Self::Software
        } else {
            Self::Hardware
        }
    }

    /// Parse from string (case-insensitive). Returns `None` for unknown names.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim();
        if ["hardware", "hw", "native", "div"]
            .iter()
            .any(|alias| s.eq_ignore_ascii_case(alias))
        {
            Some(Self::Hardware)
        } else if ["software", "sw", "soft", "soft-div", "shift"]
            .iter()
            .any(|alias| s.eq_ignore_ascii_case(alias))
        {
            Some(Self::Software)
        } else {
            None
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
        }
    }
}

impl Default for DivStrategy {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for DivStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the `%l` conversion family is compiled in.
pub const WIDE_INT: bool = cfg!(feature = "wide-int");
