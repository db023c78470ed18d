//! Conversion-specifier interpreter and bounded writer.
//!
//! One state machine drives three output sinks: a bounded slice with a
//! reserved terminator slot, an unbounded slice, and a byte counter. The
//! bounded sink decides before each numeric token whether the whole token
//! fits; a token that does not fit is dropped and the scan stops, so bounded
//! output is always a prefix of the unbounded rendering.
//!
//! Recognized codes after `%`: `c`, `d`, `x`, `l` / `lx` (with the
//! `wide-int` feature) and `s`. Any other code is consumed and renders
//! nothing, including a second `%`.

use super::args::{Arg, ArgCursor};
use super::digits::{decimal_digits32, decimal_digits64};
use super::itoa::{HEX32_TOKEN_LEN, HEX64_TOKEN_LEN, MAX_TOKEN_LEN, Radix, utoa32, utoa64};
use crate::config::{DivStrategy, WIDE_INT};
use crate::error::FormatError;
use crate::string::{memcpy, strlen};

/// Byte that starts a conversion specifier.
pub const INTRODUCER: u8 = b'%';

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

trait Sink {
    /// Bytes that may still be written.
    fn remaining(&self) -> usize;
    /// Append `bytes`. Callers never exceed [`Sink::remaining`].
    fn put(&mut self, bytes: &[u8]);
    fn written(&self) -> usize;
}

struct BoundedSink<'b> {
    buf: &'b mut [u8],
    pos: usize,
    limit: usize,
}

impl<'b> BoundedSink<'b> {
    /// `buf` must be non-empty; its last byte is reserved for the terminator.
    fn new(buf: &'b mut [u8]) -> Self {
        let limit = buf.len() - 1;
        Self { buf, pos: 0, limit }
    }

    fn terminate(&mut self) {
        self.buf[self.pos] = 0;
    }
}

impl Sink for BoundedSink<'_> {
    fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    fn put(&mut self, bytes: &[u8]) {
        let copied = memcpy(&mut self.buf[self.pos..self.limit], bytes, bytes.len());
        debug_assert_eq!(copied, bytes.len());
        self.pos += copied;
    }

    fn written(&self) -> usize {
        self.pos
    }
}

struct UnboundedSink<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl Sink for UnboundedSink<'_> {
    fn remaining(&self) -> usize {
        usize::MAX
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        assert!(
            end <= self.buf.len(),
            "format_unbounded: rendering overflows the {}-byte output buffer",
            self.buf.len()
        );
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    fn written(&self) -> usize {
        self.pos
    }
}

#[derive(Default)]
struct CountingSink {
    count: usize,
}

impl Sink for CountingSink {
    fn remaining(&self) -> usize {
        usize::MAX
    }

    fn put(&mut self, bytes: &[u8]) {
        self.count = self.count.saturating_add(bytes.len());
    }

    fn written(&self) -> usize {
        self.count
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Commit a numeric token of known length, or report that it does not fit.
fn emit_numeric<S: Sink>(
    sink: &mut S,
    len: usize,
    render: impl FnOnce(&mut [u8]) -> usize,
) -> bool {
    if len > sink.remaining() {
        return false;
    }
    let mut token = [0u8; MAX_TOKEN_LEN];
    let written = render(&mut token);
    debug_assert_eq!(written, len, "digit count disagrees with converter");
    sink.put(&token[..written]);
    true
}

/// Runs the state machine. `Ok(true)` means output stopped short of the full
/// rendering.
fn render<S: Sink>(
    sink: &mut S,
    template: &[u8],
    args: &[Arg<'_>],
    strategy: DivStrategy,
) -> Result<bool, FormatError> {
    let template = &template[..strlen(template)];
    let mut cursor = ArgCursor::new(args);
    let mut pos = 0;

    while pos < template.len() && sink.remaining() > 0 {
        let byte = template[pos];
        pos += 1;
        if byte != INTRODUCER {
            sink.put(&[byte]);
            continue;
        }

        let Some(&code) = template.get(pos) else {
            break;
        };
        pos += 1;

        let fits = match code {
            b'c' => {
                let c = cursor.next_char()?;
                sink.put(&[c]);
                true
            }
            b'd' => {
                let v = cursor.next_u32()?;
                emit_numeric(sink, decimal_digits32(v, strategy), |tok| {
                    utoa32(tok, v, Radix::Decimal, strategy)
                })
            }
            b'x' => {
                let v = cursor.next_u32()?;
                emit_numeric(sink, HEX32_TOKEN_LEN, |tok| {
                    utoa32(tok, v, Radix::Hex, strategy)
                })
            }
            b'l' if WIDE_INT => {
                let hex = template.get(pos) == Some(&b'x');
                if hex {
                    pos += 1;
                }
                let v = cursor.next_u64()?;
                if hex {
                    emit_numeric(sink, HEX64_TOKEN_LEN, |tok| {
                        utoa64(tok, v, Radix::Hex, strategy)
                    })
                } else {
                    emit_numeric(sink, decimal_digits64(v, strategy), |tok| {
                        utoa64(tok, v, Radix::Decimal, strategy)
                    })
                }
            }
            b's' => {
                let s = cursor.next_str()?;
                let full = strlen(s);
                let take = full.min(sink.remaining());
                sink.put(&s[..take]);
                take == full
            }
            _ => true,
        };

        if !fits {
            return Ok(true);
        }
    }

    Ok(renders_more(&template[pos..], cursor))
}

/// Whether `rest` of a template would still produce output. Codes that
/// render nothing and empty strings do not count; an argument error does,
/// since the full rendering cannot match the bounded one.
fn renders_more(rest: &[u8], mut args: ArgCursor<'_, '_>) -> bool {
    let mut pos = 0;
    while let Some(&byte) = rest.get(pos) {
        pos += 1;
        if byte != INTRODUCER {
            return true;
        }
        let Some(&code) = rest.get(pos) else {
            return false;
        };
        pos += 1;
        match code {
            b'c' | b'd' | b'x' => return true,
            b'l' if WIDE_INT => return true,
            b's' => match args.next_str() {
                Ok(s) if strlen(s) == 0 => {}
                _ => return true,
            },
            _ => {}
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Outcome of a bounded rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendered {
    /// Bytes written, excluding the terminator.
    pub len: usize,
    /// Part of the unbounded rendering is missing from the output.
    pub truncated: bool,
}

/// Formatter bound to one [`DivStrategy`].
///
/// The free functions in this module use [`Printer::native`]; build a
/// `Printer` directly to force a particular arithmetic path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Printer {
    strategy: DivStrategy,
}

impl Printer {
    #[must_use]
    pub const fn new(strategy: DivStrategy) -> Self {
        Self { strategy }
    }

    /// Printer using the build's native strategy.
    #[must_use]
    pub const fn native() -> Self {
        Self::new(DivStrategy::native())
    }

    #[must_use]
    pub const fn strategy(&self) -> DivStrategy {
        self.strategy
    }

    /// Bounded rendering into `buf`.
    ///
    /// At most `capacity - 1` data bytes are written, followed by a NUL.
    /// `capacity` is clamped to `buf.len()`. A zero effective capacity or an
    /// absent template fails without touching `buf`. An argument contract
    /// violation fails after terminating the output at the current cursor.
    pub fn bounded(
        &self,
        buf: &mut [u8],
        capacity: usize,
        template: Option<&[u8]>,
        args: &[Arg<'_>],
    ) -> Result<Rendered, FormatError> {
        let capacity = capacity.min(buf.len());
        if capacity == 0 {
            return Err(FormatError::ZeroCapacity);
        }
        let template = template.ok_or(FormatError::MissingTemplate)?;

        let mut sink = BoundedSink::new(&mut buf[..capacity]);
        let outcome = render(&mut sink, template, args, self.strategy);
        sink.terminate();
        let truncated = outcome?;
        Ok(Rendered {
            len: sink.written(),
            truncated,
        })
    }

    /// Unbounded rendering into `buf`, without a terminator.
    ///
    /// # Panics
    ///
    /// Panics if the rendering does not fit in `buf`. Size the buffer with
    /// [`Printer::measure`] first when the arguments are untrusted.
    pub fn unbounded(
        &self,
        buf: &mut [u8],
        template: &[u8],
        args: &[Arg<'_>],
    ) -> Result<usize, FormatError> {
        let mut sink = UnboundedSink { buf, pos: 0 };
        render(&mut sink, template, args, self.strategy)?;
        Ok(sink.written())
    }

    /// Unbounded rendering followed by a NUL. On an argument error the
    /// output is terminated at the point of failure.
    ///
    /// # Panics
    ///
    /// Panics if the rendering plus terminator does not fit in `buf`.
    pub fn terminated(
        &self,
        buf: &mut [u8],
        template: &[u8],
        args: &[Arg<'_>],
    ) -> Result<usize, FormatError> {
        let mut sink = UnboundedSink { buf, pos: 0 };
        let outcome = render(&mut sink, template, args, self.strategy);
        sink.put(&[0]);
        outcome?;
        Ok(sink.written() - 1)
    }

    /// Length of the unbounded rendering. Nothing is written.
    pub fn measure(&self, template: &[u8], args: &[Arg<'_>]) -> Result<usize, FormatError> {
        let mut sink = CountingSink::default();
        render(&mut sink, template, args, self.strategy)?;
        Ok(sink.written())
    }
}

/// Bounded formatter with the byte-level contract: bytes written excluding
/// the terminator, or [`FormatError::SENTINEL`] (−1) on any failure.
pub fn format_bounded(
    buf: &mut [u8],
    capacity: usize,
    template: Option<&[u8]>,
    args: &[Arg<'_>],
) -> isize {
    match try_format_bounded(buf, capacity, template, args) {
        Ok(len) => isize::try_from(len).unwrap_or(isize::MAX),
        Err(_) => FormatError::SENTINEL,
    }
}

/// [`format_bounded`] with a typed error.
pub fn try_format_bounded(
    buf: &mut [u8],
    capacity: usize,
    template: Option<&[u8]>,
    args: &[Arg<'_>],
) -> Result<usize, FormatError> {
    Printer::native()
        .bounded(buf, capacity, template, args)
        .map(|r| r.len)
}

/// Unbounded formatter. Writes no terminator.
///
/// # Panics
///
/// Panics if `buf` is too short for the rendering.
pub fn format_unbounded(
    buf: &mut [u8],
    template: &[u8],
    args: &[Arg<'_>],
) -> Result<usize, FormatError> {
    Printer::native().unbounded(buf, template, args)
}

/// Unbounded formatter that terminates its output. Returns the length
/// excluding the terminator.
///
/// # Panics
///
/// Panics if `buf` is too short for the rendering plus terminator.
pub fn format(buf: &mut [u8], template: &[u8], args: &[Arg<'_>]) -> Result<usize, FormatError> {
    Printer::native().terminated(buf, template, args)
}

/// Length of the unbounded rendering, for sizing a buffer.
pub fn formatted_len(template: &[u8], args: &[Arg<'_>]) -> Result<usize, FormatError> {
    Printer::native().measure(template, args)
}

/// Terminated unbounded formatting with inline arguments.
///
/// Each argument goes through `Arg::from`, so integers, byte strings and
/// `&str` can be passed directly.
///
/// ```
/// let mut buf = [0u8; 16];
/// let n = barefmt_core::bare_format!(&mut buf, "pid=%d", 7u32).unwrap();
/// assert_eq!(&buf[..=n], b"pid=7\0");
/// ```
#[macro_export]
macro_rules! bare_format {
    ($buf:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::stdio::format(
            $buf,
            ::core::convert::AsRef::<[u8]>::as_ref($template),
            &[$($crate::stdio::Arg::from($arg)),*],
        )
    };
}

/// Bounded formatting with inline arguments; returns the byte count or −1.
///
/// ```
/// let mut buf = [0u8; 8];
/// let n = barefmt_core::bare_snprintf!(&mut buf, 8, "%x", 255u32);
/// assert_eq!(n, 0);
/// assert_eq!(buf[0], 0);
/// ```
#[macro_export]
macro_rules! bare_snprintf {
    ($buf:expr, $capacity:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::stdio::format_bounded(
            $buf,
            $capacity,
            ::core::option::Option::Some(::core::convert::AsRef::<[u8]>::as_ref($template)),
            &[$($crate::stdio::Arg::from($arg)),*],
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdio::ArgKind;

    fn bounded(cap: usize, template: &[u8], args: &[Arg<'_>]) -> (isize, std::vec::Vec<u8>) {
        let mut buf = [0xAAu8; 64];
        let ret = format_bounded(&mut buf, cap, Some(template), args);
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        (ret, buf[..end].to_vec())
    }

    fn unbounded(template: &[u8], args: &[Arg<'_>]) -> std::vec::Vec<u8> {
        let mut buf = [0u8; 128];
        let n = format_unbounded(&mut buf, template, args).unwrap();
        buf[..n].to_vec()
    }

    // -- documented examples --

    #[test]
    fn test_literal_truncated_to_capacity() {
        assert_eq!(bounded(6, b"abcdef", &[]), (5, b"abcde".to_vec()));
    }

    #[test]
    fn test_hex_fits() {
        assert_eq!(
            bounded(20, b"%x", &[Arg::U32(255)]),
            (10, b"0x000000ff".to_vec())
        );
    }

    #[test]
    fn test_hex_does_not_fit() {
        assert_eq!(bounded(9, b"%x", &[Arg::U32(255)]), (0, b"".to_vec()));
    }

    #[test]
    fn test_string_and_decimal() {
        assert_eq!(
            bounded(32, b"%s-%d", &[Arg::from("id"), Arg::U32(42)]),
            (5, b"id-42".to_vec())
        );
    }

    // -- specifiers --

    #[test]
    fn test_char_from_char_and_int() {
        assert_eq!(unbounded(b"[%c%c]", &[Arg::Char(b'o'), Arg::U32(0x16b)]), b"[ok]");
    }

    #[test]
    fn test_decimal_extremes() {
        assert_eq!(unbounded(b"%d", &[Arg::U32(0)]), b"0");
        assert_eq!(unbounded(b"%d", &[Arg::U32(u32::MAX)]), b"4294967295");
    }

    #[test]
    fn test_wide_conversions() {
        if !WIDE_INT {
            return;
        }
        assert_eq!(
            unbounded(b"%l", &[Arg::U64(u64::MAX)]),
            b"18446744073709551615"
        );
        assert_eq!(
            unbounded(b"%lx", &[Arg::U64(0xfeed_face_cafe_beef)]),
            b"0xfeedfacecafebeef"
        );
        assert_eq!(unbounded(b"%lx", &[Arg::U32(1)]), b"0x0000000000000001");
    }

    #[test]
    fn test_long_followed_by_other_code_keeps_it_literal() {
        if !WIDE_INT {
            return;
        }
        assert_eq!(unbounded(b"%ld", &[Arg::U64(5)]), b"5d");
    }

    #[test]
    fn test_unknown_specifier_is_skipped_without_consuming() {
        assert_eq!(unbounded(b"a%qb%d", &[Arg::U32(3)]), b"ab3");
        assert_eq!(unbounded(b"100%%", &[]), b"100");
    }

    #[test]
    fn test_trailing_introducer_is_dropped() {
        assert_eq!(unbounded(b"end%", &[]), b"end");
        assert_eq!(formatted_len(b"end%", &[]), Ok(3));
    }

    #[test]
    fn test_template_stops_at_nul() {
        assert_eq!(unbounded(b"ab\0%d", &[]), b"ab");
    }

    #[test]
    fn test_string_stops_at_nul() {
        assert_eq!(unbounded(b"<%s>", &[Arg::Str(b"hi\0there")]), b"<hi>");
        assert_eq!(unbounded(b"<%s>", &[Arg::Str(b"")]), b"<>");
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        assert_eq!(unbounded(b"%d", &[Arg::U32(1), Arg::U32(2)]), b"1");
    }

    // -- truncation --

    #[test]
    fn test_string_is_partially_written() {
        let mut buf = [0u8; 8];
        let r = Printer::native()
            .bounded(&mut buf, 4, Some(b"%s!".as_slice()), &[Arg::from("hello")])
            .unwrap();
        assert_eq!(r, Rendered { len: 3, truncated: true });
        assert_eq!(&buf[..4], b"hel\0");
    }

    #[test]
    fn test_oversized_numeric_token_stops_scan() {
        // 'b' would fit after the skipped token, but writing it would break
        // the prefix property.
        assert_eq!(bounded(3, b"a%db", &[Arg::U32(123)]), (1, b"a".to_vec()));
        assert_eq!(
            bounded(12, b"%x-ab", &[Arg::U32(1)]),
            (11, b"0x00000001-".to_vec())
        );
    }

    #[test]
    fn test_exact_fit_is_not_truncated() {
        let mut buf = [0u8; 6];
        let r = Printer::native()
            .bounded(&mut buf, 6, Some(b"%s".as_slice()), &[Arg::from("abcde")])
            .unwrap();
        assert_eq!(r, Rendered { len: 5, truncated: false });
        let r = Printer::native()
            .bounded(&mut buf, 3, Some(b"%d".as_slice()), &[Arg::U32(42)])
            .unwrap();
        assert_eq!(r, Rendered { len: 2, truncated: false });
    }

    #[test]
    fn test_trailing_silent_codes_are_not_truncation() {
        let cases: [(&[u8], &[Arg<'_>], usize, usize); 6] = [
            (b"abc%q", &[], 4, 3),
            (b"abc%", &[], 4, 3),
            (b"abc%%", &[], 4, 3),
            (b"%d%q", &[Arg::U32(42)], 3, 2),
            (b"ab%s%z", &[Arg::Str(b"")], 3, 2),
            (b"ab%s", &[Arg::Str(b"\0hidden")], 3, 2),
        ];
        for (template, args, cap, len) in cases {
            let mut buf = [0u8; 8];
            let r = Printer::native()
                .bounded(&mut buf, cap, Some(template), args)
                .unwrap();
            assert_eq!(r, Rendered { len, truncated: false }, "{template:?}");
            assert_eq!(Printer::native().measure(template, args), Ok(len));
        }
    }

    #[test]
    fn test_budget_exhausted_before_content_is_truncation() {
        let cases: [(&[u8], &[Arg<'_>]); 5] = [
            (b"abc%qd", &[]),
            (b"abc%c", &[Arg::Char(b'!')]),
            (b"abc%s", &[Arg::Str(b"more")]),
            (b"abc%%%lx", &[Arg::U64(1)]),
            (b"abc%s", &[]),
        ];
        for (template, args) in cases {
            let mut buf = [0u8; 8];
            let r = Printer::native()
                .bounded(&mut buf, 4, Some(template), args)
                .unwrap();
            assert_eq!(r, Rendered { len: 3, truncated: true }, "{template:?}");
        }
    }

    #[test]
    fn test_truncated_flag_matches_measured_length() {
        let args = [Arg::from("id"), Arg::U32(7), Arg::Str(b"")];
        let template = b"%s=%d%q%s%%";
        let full = Printer::native().measure(template, &args).unwrap();
        for cap in 1..=full + 2 {
            let mut buf = [0u8; 16];
            let r = Printer::native()
                .bounded(&mut buf, cap, Some(template.as_slice()), &args)
                .unwrap();
            assert_eq!(r.truncated, r.len < full, "cap {cap}");
        }
    }

    #[test]
    fn test_capacity_one_writes_only_terminator() {
        let mut buf = [b'z'; 4];
        assert_eq!(format_bounded(&mut buf, 1, Some(b"abc".as_slice()), &[]), 0);
        assert_eq!(buf, [0, b'z', b'z', b'z']);
    }

    #[test]
    fn test_capacity_clamped_to_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(format_bounded(&mut buf, 1000, Some(b"abcdef".as_slice()), &[]), 3);
        assert_eq!(&buf, b"abc\0");
    }

    // -- failures --

    #[test]
    fn test_zero_capacity_and_missing_template_leave_buffer() {
        let mut buf = [b'z'; 4];
        assert_eq!(format_bounded(&mut buf, 0, Some(b"abc".as_slice()), &[]), -1);
        assert_eq!(format_bounded(&mut buf, 4, None, &[]), -1);
        assert_eq!(format_bounded(&mut [], 4, Some(b"abc".as_slice()), &[]), -1);
        assert_eq!(buf, [b'z'; 4]);
        assert_eq!(
            try_format_bounded(&mut buf, 4, None, &[]),
            Err(FormatError::MissingTemplate)
        );
    }

    #[test]
    fn test_argument_errors_terminate_at_cursor() {
        let mut buf = [b'z'; 16];
        assert_eq!(
            try_format_bounded(&mut buf, 16, Some(b"ab%dcd".as_slice()), &[]),
            Err(FormatError::MissingArgument { index: 0 })
        );
        assert_eq!(&buf[..3], b"ab\0");

        assert_eq!(
            try_format_bounded(&mut buf, 16, Some(b"%d%s".as_slice()), &[Arg::U32(1), Arg::U32(2)]),
            Err(FormatError::ArgumentMismatch {
                index: 1,
                expected: ArgKind::Str,
                found: ArgKind::U32,
            })
        );
        assert_eq!(&buf[..2], b"1\0");
        assert_eq!(format_bounded(&mut buf, 16, Some(b"%s".as_slice()), &[Arg::U64(1)]), -1);
    }

    #[test]
    fn test_terminated_on_error() {
        let mut buf = [b'z'; 8];
        assert!(format(&mut buf, b"ok%s", &[]).is_err());
        assert_eq!(&buf[..3], b"ok\0");
    }

    // -- unbounded siblings --

    #[test]
    fn test_format_appends_terminator() {
        let mut buf = [b'z'; 16];
        assert_eq!(format(&mut buf, b"%d/%d", &[Arg::U32(3), Arg::U32(4)]), Ok(3));
        assert_eq!(&buf[..4], b"3/4\0");
    }

    #[test]
    fn test_unbounded_writes_no_terminator() {
        let mut buf = [b'z'; 8];
        assert_eq!(format_unbounded(&mut buf, b"abc", &[]), Ok(3));
        assert_eq!(&buf[..4], b"abcz");
    }

    #[test]
    #[should_panic(expected = "format_unbounded")]
    fn test_unbounded_overflow_panics() {
        let mut buf = [0u8; 4];
        let _ = format_unbounded(&mut buf, b"%x", &[Arg::U32(1)]);
    }

    #[test]
    fn test_measure_matches_unbounded() {
        let args = [Arg::from("name"), Arg::U32(77), Arg::U32(0xabc)];
        let template = b"%s=%d (%x)";
        assert_eq!(
            formatted_len(template, &args),
            Ok(unbounded(template, &args).len())
        );
    }

    #[test]
    fn test_strategies_render_identically() {
        let args = [Arg::U32(987_654_321), Arg::U64(12_345_678_901_234), Arg::Char(b'!')];
        let template = b"%d %l %c";
        let mut hw = [0u8; 64];
        let mut sw = [0u8; 64];
        let a = Printer::new(DivStrategy::Hardware).unbounded(&mut hw, template, &args);
        let b = Printer::new(DivStrategy::Software).unbounded(&mut sw, template, &args);
        assert_eq!(a, b);
        assert_eq!(hw, sw);
    }

    #[test]
    fn test_macros() {
        let mut buf = [0u8; 32];
        let n = crate::bare_format!(&mut buf, "%s:%d%c", "port", 8080u32, b'!').unwrap();
        assert_eq!(&buf[..=n], b"port:8080!\0");

        let n = crate::bare_snprintf!(&mut buf, 5, b"%s", "truncate");
        assert_eq!(n, 4);
        assert_eq!(&buf[..5], b"trun\0");

        let n = crate::bare_snprintf!(&mut buf, 32, "plain");
        assert_eq!(n, 5);
    }
}
