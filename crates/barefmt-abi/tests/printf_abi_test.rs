//! Integration test: printf ABI boundary
//!
//! Drives the exported `barefmt_*` symbols the way a C caller would: raw
//! pointers, NUL-terminated templates and a tagged argument array. Decimal
//! output is cross-checked against the host C library's `snprintf("%u")`.
//!
//! Run: cargo test -p barefmt-abi --test printf_abi_test

use std::ffi::{CStr, c_char};

use barefmt_abi::printf_abi::{
    barefmt_formatted_len, barefmt_sprintf, barefmt_vsnprintf, barefmt_vsprintf,
};
use barefmt_abi::{BAREFMT_ARG_U32, BarefmtArg};

fn vsnprintf(buf: &mut [u8], size: usize, fmt: &CStr, args: &[BarefmtArg]) -> i32 {
    unsafe {
        barefmt_vsnprintf(
            buf.as_mut_ptr().cast::<c_char>(),
            size,
            fmt.as_ptr(),
            args.as_ptr(),
            args.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// 1. Bounded export
// ---------------------------------------------------------------------------

#[test]
fn vsnprintf_renders_and_terminates() {
    let name = c"id";
    let mut buf = [0xFFu8; 32];
    let n = vsnprintf(
        &mut buf,
        32,
        c"%s-%d",
        &[BarefmtArg::str(name.as_ptr()), BarefmtArg::u32(42)],
    );
    assert_eq!(n, 5);
    assert_eq!(&buf[..6], b"id-42\0");
}

#[test]
fn vsnprintf_truncates_without_splitting_hex() {
    let mut buf = [0xFFu8; 16];
    assert_eq!(vsnprintf(&mut buf, 9, c"%x", &[BarefmtArg::u32(255)]), 0);
    assert_eq!(buf[0], 0);
    assert_eq!(vsnprintf(&mut buf, 6, c"abcdef", &[]), 5);
    assert_eq!(&buf[..6], b"abcde\0");
}

#[test]
fn vsnprintf_failures_return_minus_one() {
    let mut buf = [0x11u8; 8];
    assert_eq!(vsnprintf(&mut buf, 0, c"abc", &[]), -1);
    assert_eq!(
        unsafe { barefmt_vsnprintf(buf.as_mut_ptr().cast(), 8, std::ptr::null(), std::ptr::null(), 0) },
        -1
    );
    assert_eq!(
        unsafe { barefmt_vsnprintf(std::ptr::null_mut(), 8, c"abc".as_ptr(), std::ptr::null(), 0) },
        -1
    );
    assert_eq!(buf, [0x11; 8]);

    // Missing argument and unknown tag.
    assert_eq!(vsnprintf(&mut buf, 8, c"%d", &[]), -1);
    assert_eq!(vsnprintf(&mut buf, 8, c"%d", &[BarefmtArg { tag: 42, value: 0 }]), -1);
}

#[test]
fn null_string_argument_renders_placeholder() {
    let mut buf = [0u8; 16];
    let n = vsnprintf(&mut buf, 16, c"<%s>", &[BarefmtArg::str(std::ptr::null())]);
    assert_eq!(n, 8);
    assert_eq!(&buf[..9], b"<(null)>\0");
}

// ---------------------------------------------------------------------------
// 2. Unbounded exports
// ---------------------------------------------------------------------------

#[test]
fn vsprintf_writes_exact_length_without_terminator() {
    let args = [BarefmtArg::u64(1 << 33), BarefmtArg::char(b'!')];
    let len = unsafe { barefmt_formatted_len(c"%lx%c".as_ptr(), args.as_ptr(), args.len()) };
    assert_eq!(len, 19);

    let mut buf = [b'#'; 24];
    let n = unsafe {
        barefmt_vsprintf(buf.as_mut_ptr().cast(), c"%lx%c".as_ptr(), args.as_ptr(), args.len())
    };
    assert_eq!(n, 19);
    assert_eq!(&buf[..20], b"0x0000000200000000!#");
}

#[test]
fn sprintf_appends_terminator() {
    let args = [BarefmtArg::u32(3), BarefmtArg::u32(4)];
    let mut buf = [b'#'; 8];
    let n = unsafe {
        barefmt_sprintf(buf.as_mut_ptr().cast(), c"%d+%d".as_ptr(), args.as_ptr(), args.len())
    };
    assert_eq!(n, 3);
    assert_eq!(&buf[..4], b"3+4\0");
}

#[test]
fn sprintf_argument_error_writes_nothing() {
    let mut buf = [b'#'; 8];
    let n = unsafe { barefmt_sprintf(buf.as_mut_ptr().cast(), c"ab%s".as_ptr(), std::ptr::null(), 0) };
    assert_eq!(n, -1);
    assert_eq!(buf, [b'#'; 8]);
}

// ---------------------------------------------------------------------------
// 3. Host parity
// ---------------------------------------------------------------------------

#[test]
fn decimal_matches_host_snprintf() {
    let mut x: u32 = 1;
    for _ in 0..1_000 {
        let mut ours = [0u8; 16];
        let mut host = [0u8; 16];
        let a = vsnprintf(&mut ours, 16, c"%d", &[BarefmtArg { tag: BAREFMT_ARG_U32, value: u64::from(x) }]);
        let b = unsafe {
            libc::snprintf(host.as_mut_ptr().cast(), 16, c"%u".as_ptr(), x as libc::c_uint)
        };
        assert_eq!(a, b, "value {x}");
        assert_eq!(ours, host, "value {x}");
        x = x.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    }
}
