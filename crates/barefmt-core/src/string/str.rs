//! String length: strlen, strnlen.
//!
//! Strings are `&[u8]` slices where the first NUL byte marks the logical end.

use super::mem::memchr;

/// Returns the length of a NUL-terminated byte string (not counting the NUL).
///
/// Equivalent to C `strlen`. If no NUL is found, returns the full slice length.
pub fn strlen(s: &[u8]) -> usize {
    memchr(s, 0, s.len()).unwrap_or(s.len())
}

/// Returns the length of `s`, scanning at most `max` bytes.
///
/// Equivalent to POSIX `strnlen`.
pub fn strnlen(s: &[u8], max: usize) -> usize {
    let bound = max.min(s.len());
    memchr(s, 0, bound).unwrap_or(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strlen_stops_at_nul() {
        assert_eq!(strlen(b"hello\0world"), 5);
        assert_eq!(strlen(b"\0"), 0);
    }

    #[test]
    fn strlen_without_nul_is_slice_length() {
        assert_eq!(strlen(b"abc"), 3);
        assert_eq!(strlen(b""), 0);
    }

    #[test]
    fn strnlen_respects_bound() {
        assert_eq!(strnlen(b"hello\0", 3), 3);
        assert_eq!(strnlen(b"hi\0there", 8), 2);
        assert_eq!(strnlen(b"abc", 10), 3);
        assert_eq!(strnlen(b"abc", 0), 0);
    }
}
