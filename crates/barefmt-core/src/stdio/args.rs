//! Type-tagged argument sequence.
//!
//! C passes conversion arguments through an untyped `va_list`; reading one
//! with the wrong type is undefined behavior. Here every argument carries its
//! kind, and a conversion that meets an argument it cannot accept fails the
//! call with [`FormatError::ArgumentMismatch`] instead.

use core::ffi::CStr;
use core::fmt;

use crate::error::FormatError;

/// One conversion argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    /// A single byte (`%c`).
    Char(u8),
    /// 32-bit unsigned integer (`%d`, `%x`).
    U32(u32),
    /// 64-bit unsigned integer (`%l`, `%lx`).
    U64(u64),
    /// Byte string, logically ending at its first NUL (`%s`).
    Str(&'a [u8]),
}

/// Discriminant of an [`Arg`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Char,
    U32,
    U64,
    Str,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Char => "char",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Str => "byte string",
        })
    }
}

impl Arg<'_> {
    /// The kind tag of this argument.
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        match self {
            Self::Char(_) => ArgKind::Char,
            Self::U32(_) => ArgKind::U32,
            Self::U64(_) => ArgKind::U64,
            Self::Str(_) => ArgKind::Str,
        }
    }
}

impl From<u8> for Arg<'_> {
    fn from(value: u8) -> Self {
        Self::Char(value)
    }
}

impl From<u32> for Arg<'_> {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<u64> for Arg<'_> {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Str(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value.as_bytes())
    }
}

impl<'a> From<&'a CStr> for Arg<'a> {
    fn from(value: &'a CStr) -> Self {
        Self::Str(value.to_bytes())
    }
}

/// Reads arguments in order. A consumed argument is never revisited.
#[derive(Debug, Clone)]
pub struct ArgCursor<'a, 'b> {
    args: &'b [Arg<'a>],
    next: usize,
}

impl<'a, 'b> ArgCursor<'a, 'b> {
    /// Start at the first argument.
    #[must_use]
    pub const fn new(args: &'b [Arg<'a>]) -> Self {
        Self { args, next: 0 }
    }

    /// Number of arguments consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.next
    }

    /// Number of arguments not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.args.len() - self.next
    }

    fn take(&mut self) -> Result<(usize, Arg<'a>), FormatError> {
        let index = self.next;
        let arg = *self
            .args
            .get(index)
            .ok_or(FormatError::MissingArgument { index })?;
        self.next += 1;
        Ok((index, arg))
    }

    /// Next argument as a byte. Integers contribute their low byte, like a C
    /// `int` passed to `%c`.
    pub fn next_char(&mut self) -> Result<u8, FormatError> {
        match self.take()? {
            (_, Arg::Char(c)) => Ok(c),
            (_, Arg::U32(v)) => Ok(v as u8),
            (index, other) => Err(mismatch(index, ArgKind::Char, other)),
        }
    }

    /// Next argument as a 32-bit unsigned value.
    pub fn next_u32(&mut self) -> Result<u32, FormatError> {
        match self.take()? {
            (_, Arg::U32(v)) => Ok(v),
            (_, Arg::Char(c)) => Ok(u32::from(c)),
            (index, other) => Err(mismatch(index, ArgKind::U32, other)),
        }
    }

    /// Next argument as a 64-bit unsigned value. Narrower integers are
    /// zero-extended.
    pub fn next_u64(&mut self) -> Result<u64, FormatError> {
        match self.take()? {
            (_, Arg::U64(v)) => Ok(v),
            (_, Arg::U32(v)) => Ok(u64::from(v)),
            (_, Arg::Char(c)) => Ok(u64::from(c)),
            (index, other) => Err(mismatch(index, ArgKind::U64, other)),
        }
    }

    /// Next argument as a byte string.
    pub fn next_str(&mut self) -> Result<&'a [u8], FormatError> {
        match self.take()? {
            (_, Arg::Str(s)) => Ok(s),
            (index, other) => Err(mismatch(index, ArgKind::Str, other)),
        }
    }
}

fn mismatch(index: usize, expected: ArgKind, found: Arg<'_>) -> FormatError {
    FormatError::ArgumentMismatch {
        index,
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_impls_pick_the_natural_kind() {
        assert_eq!(Arg::from(b'A'), Arg::Char(b'A'));
        assert_eq!(Arg::from(7u32), Arg::U32(7));
        assert_eq!(Arg::from(7u64), Arg::U64(7));
        assert_eq!(Arg::from("id"), Arg::Str(b"id"));
        assert_eq!(Arg::from(b"id"), Arg::Str(b"id"));
        assert_eq!(Arg::from(c"id"), Arg::Str(b"id"));
    }

    #[test]
    fn cursor_consumes_in_order() {
        let args = [Arg::U32(1), Arg::Str(b"two"), Arg::U64(3)];
        let mut cursor = ArgCursor::new(&args);
        assert_eq!(cursor.next_u32(), Ok(1));
        assert_eq!(cursor.next_str(), Ok(&b"two"[..]));
        assert_eq!(cursor.next_u64(), Ok(3));
        assert_eq!(cursor.consumed(), 3);
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(
            cursor.next_u32(),
            Err(FormatError::MissingArgument { index: 3 })
        );
    }

    #[test]
    fn integers_widen_and_narrow_like_c_promotions() {
        let args = [Arg::U32(0x1_41), Arg::Char(200), Arg::U32(u32::MAX), Arg::Char(9)];
        let mut cursor = ArgCursor::new(&args);
        assert_eq!(cursor.next_char(), Ok(0x41));
        assert_eq!(cursor.next_u32(), Ok(200));
        assert_eq!(cursor.next_u64(), Ok(u64::from(u32::MAX)));
        assert_eq!(cursor.next_u64(), Ok(9));
    }

    #[test]
    fn mismatches_report_index_and_kinds() {
        let args = [Arg::Str(b"x"), Arg::U64(1), Arg::U32(5)];
        let mut cursor = ArgCursor::new(&args);
        assert_eq!(
            cursor.next_u32(),
            Err(FormatError::ArgumentMismatch {
                index: 0,
                expected: ArgKind::U32,
                found: ArgKind::Str,
            })
        );
        assert_eq!(
            cursor.next_char(),
            Err(FormatError::ArgumentMismatch {
                index: 1,
                expected: ArgKind::Char,
                found: ArgKind::U64,
            })
        );
        assert_eq!(
            cursor.next_str(),
            Err(FormatError::ArgumentMismatch {
                index: 2,
                expected: ArgKind::Str,
                found: ArgKind::U32,
            })
        );
    }
}
