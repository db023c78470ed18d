//! Memory operations: memcpy, memchr.

/// Copies `n` bytes from `src` to `dest`.
///
/// Equivalent to C `memcpy`, except that only `min(n, src.len(), dest.len())`
/// bytes are copied. Returns the number of bytes actually copied.
pub fn memcpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    let count = n.min(dest.len()).min(src.len());
    dest[..count].copy_from_slice(&src[..count]);
    count
}

/// Scans the first `n` bytes of `haystack` for the byte `needle`.
///
/// Equivalent to C `memchr`. Returns the index of the first occurrence,
/// or `None` if not found.
pub fn memchr(haystack: &[u8], needle: u8, n: usize) -> Option<usize> {
    let count = n.min(haystack.len());
    haystack[..count].iter().position(|&b| b == needle)
}
