//! ABI layer for the bounded `sprintf` family.
//!
//! Every export returns −1 on failure: a null template, a null output buffer
//! with non-zero size, a null argument array with `nargs > 0`, an unknown
//! argument tag, or an argument the template cannot accept.

use std::ffi::{c_char, c_int};

use barefmt_core::stdio::{self, Arg};

use crate::util::{c_str_bytes, len_to_c_int};

/// Maximum arguments decoded per call. Extra entries are ignored.
pub const MAX_VA_ARGS: usize = 32;

/// `value` holds a byte in its low 8 bits.
pub const BAREFMT_ARG_CHAR: u32 = 0;
/// `value` holds a 32-bit unsigned integer in its low 32 bits.
pub const BAREFMT_ARG_U32: u32 = 1;
/// `value` holds a 64-bit unsigned integer.
pub const BAREFMT_ARG_U64: u32 = 2;
/// `value` holds a `const char *`. A null pointer renders as `(null)`.
pub const BAREFMT_ARG_STR: u32 = 3;

const NULL_STR: &[u8] = b"(null)";

/// One tagged conversion argument.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarefmtArg {
    pub tag: u32,
    pub value: u64,
}

impl BarefmtArg {
    #[must_use]
    pub const fn char(c: u8) -> Self {
        Self {
            tag: BAREFMT_ARG_CHAR,
            value: c as u64,
        }
    }

    #[must_use]
    pub const fn u32(v: u32) -> Self {
        Self {
            tag: BAREFMT_ARG_U32,
            value: v as u64,
        }
    }

    #[must_use]
    pub const fn u64(v: u64) -> Self {
        Self {
            tag: BAREFMT_ARG_U64,
            value: v,
        }
    }

    #[must_use]
    pub fn str(s: *const c_char) -> Self {
        Self {
            tag: BAREFMT_ARG_STR,
            value: s as usize as u64,
        }
    }
}

/// Decoded argument array on the stack.
struct Decoded<'a> {
    args: [Arg<'a>; MAX_VA_ARGS],
    len: usize,
}

impl<'a> Decoded<'a> {
    fn as_slice(&self) -> &[Arg<'a>] {
        &self.args[..self.len]
    }
}

/// Decode up to [`MAX_VA_ARGS`] tagged arguments. `None` on a null array
/// with `nargs > 0` or an unknown tag.
///
/// # Safety
///
/// `args` must point to `nargs` readable entries, and every string entry
/// must point to a NUL-terminated string that outlives `'a`.
unsafe fn decode_args<'a>(args: *const BarefmtArg, nargs: usize) -> Option<Decoded<'a>> {
    let mut decoded = Decoded {
        args: [Arg::U32(0); MAX_VA_ARGS],
        len: 0,
    };
    if nargs == 0 {
        return Some(decoded);
    }
    if args.is_null() {
        return None;
    }

    let count = nargs.min(MAX_VA_ARGS);
    let raw = unsafe { std::slice::from_raw_parts(args, count) };
    for (slot, entry) in decoded.args.iter_mut().zip(raw) {
        *slot = match entry.tag {
            BAREFMT_ARG_CHAR => Arg::Char(entry.value as u8),
            BAREFMT_ARG_U32 => Arg::U32(entry.value as u32),
            BAREFMT_ARG_U64 => Arg::U64(entry.value),
            BAREFMT_ARG_STR => {
                let ptr = entry.value as usize as *const c_char;
                if ptr.is_null() {
                    Arg::Str(NULL_STR)
                } else {
                    Arg::Str(unsafe { c_str_bytes(ptr) })
                }
            }
            _ => return None,
        };
    }
    decoded.len = count;
    Some(decoded)
}

/// Bounded formatting: at most `size - 1` bytes plus a terminator.
///
/// Returns the bytes written excluding the terminator, or −1.
///
/// # Safety
///
/// `buf` must be writable for `size` bytes, `fmt` must be null or a
/// NUL-terminated string, and `args` must satisfy the [`BarefmtArg`] tag
/// contract for `nargs` entries.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barefmt_vsnprintf(
    buf: *mut c_char,
    size: usize,
    fmt: *const c_char,
    args: *const BarefmtArg,
    nargs: usize,
) -> c_int {
    if fmt.is_null() || size == 0 || buf.is_null() {
        return -1;
    }
    let Some(decoded) = (unsafe { decode_args(args, nargs) }) else {
        return -1;
    };
    let template = unsafe { c_str_bytes(fmt) };
    let out = unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), size) };

    match stdio::try_format_bounded(out, size, Some(template), decoded.as_slice()) {
        Ok(len) => len_to_c_int(len),
        Err(_) => -1,
    }
}

/// Unbounded formatting without a terminator.
///
/// The rendering is measured first and exactly that many bytes are written.
/// On an argument error nothing is written.
///
/// # Safety
///
/// `buf` must be writable for the full rendering. Otherwise as
/// [`barefmt_vsnprintf`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barefmt_vsprintf(
    buf: *mut c_char,
    fmt: *const c_char,
    args: *const BarefmtArg,
    nargs: usize,
) -> c_int {
    if fmt.is_null() || buf.is_null() {
        return -1;
    }
    let Some(decoded) = (unsafe { decode_args(args, nargs) }) else {
        return -1;
    };
    let template = unsafe { c_str_bytes(fmt) };
    let Ok(len) = stdio::formatted_len(template, decoded.as_slice()) else {
        return -1;
    };
    let out = unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), len) };

    match stdio::format_unbounded(out, template, decoded.as_slice()) {
        Ok(written) => len_to_c_int(written),
        Err(_) => -1,
    }
}

/// [`barefmt_vsprintf`] followed by a terminator.
///
/// # Safety
///
/// `buf` must be writable for the full rendering plus one byte. Otherwise as
/// [`barefmt_vsnprintf`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barefmt_sprintf(
    buf: *mut c_char,
    fmt: *const c_char,
    args: *const BarefmtArg,
    nargs: usize,
) -> c_int {
    let written = unsafe { barefmt_vsprintf(buf, fmt, args, nargs) };
    if let Ok(len) = usize::try_from(written) {
        unsafe { *buf.add(len) = 0 };
    }
    written
}

/// Length of the unbounded rendering, excluding the terminator, or −1.
///
/// # Safety
///
/// As [`barefmt_vsnprintf`], without the buffer requirement.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barefmt_formatted_len(
    fmt: *const c_char,
    args: *const BarefmtArg,
    nargs: usize,
) -> c_int {
    if fmt.is_null() {
        return -1;
    }
    let Some(decoded) = (unsafe { decode_args(args, nargs) }) else {
        return -1;
    };
    let template = unsafe { c_str_bytes(fmt) };
    match stdio::formatted_len(template, decoded.as_slice()) {
        Ok(len) => len_to_c_int(len),
        Err(_) => -1,
    }
}
