//! Error taxonomy for the formatting engine.
//!
//! Two kinds of condition are deliberately *not* errors: running out of
//! budget (silent truncation) and unknown conversion codes (silently skipped).

use thiserror::Error;

use crate::stdio::ArgKind;

/// Failure of a formatting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Declared capacity (after clamping to the buffer) is zero. Nothing was written.
    #[error("output capacity is zero")]
    ZeroCapacity,
    /// No template was supplied. Nothing was written.
    #[error("template is absent")]
    MissingTemplate,
    /// The template asked for more arguments than were supplied.
    #[error("conversion needs argument {index}, but {index} argument(s) were supplied")]
    MissingArgument { index: usize },
    /// An argument's kind cannot satisfy the conversion that consumed it.
    #[error("argument {index} is {found}, but the conversion expects {expected}")]
    ArgumentMismatch {
        index: usize,
        expected: ArgKind,
        found: ArgKind,
    },
}

impl FormatError {
    /// Sentinel returned by the byte-level entry points.
    pub const SENTINEL: isize = -1;

    /// Whether the output buffer was left untouched.
    #[must_use]
    pub const fn buffer_untouched(self) -> bool {
        matches!(self, Self::ZeroCapacity | Self::MissingTemplate)
    }
}
