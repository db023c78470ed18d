//! Shared internal utilities for ABI adapters.

use std::ffi::c_char;

/// Scan a C string with an optional hard bound.
///
/// Returns `(len, terminated)` where `len` is the byte length before the
/// first NUL (or the bound), and `terminated` says whether a NUL was seen.
///
/// # Safety
///
/// `ptr` must be valid to read up to the discovered length (and bound when given).
pub unsafe fn scan_c_string(ptr: *const c_char, bound: Option<usize>) -> (usize, bool) {
    match bound {
        Some(limit) => {
            for i in 0..limit {
                if unsafe { *ptr.add(i) } == 0 {
                    return (i, true);
                }
            }
            (limit, false)
        }
        None => {
            let mut i = 0usize;
            while unsafe { *ptr.add(i) } != 0 {
                i += 1;
            }
            (i, true)
        }
    }
}

/// Borrow a NUL-terminated C string as bytes, without the terminator.
///
/// # Safety
///
/// `ptr` must be non-null and point to a NUL-terminated string that outlives `'a`.
pub unsafe fn c_str_bytes<'a>(ptr: *const c_char) -> &'a [u8] {
    let (len, _) = unsafe { scan_c_string(ptr, None) };
    unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }
}

/// Saturating conversion of a byte count to a C `int` return value.
pub fn len_to_c_int(len: usize) -> std::ffi::c_int {
    std::ffi::c_int::try_from(len).unwrap_or(std::ffi::c_int::MAX)
}
