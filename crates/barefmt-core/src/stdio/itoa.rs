//! Integer-to-text conversion.
//!
//! Digits are produced least-significant first into the destination, then
//! reversed in place. Base 16 always uses a 4-bit mask and shift, which is
//! exact on every target; base 10 extracts digits with the selected
//! [`DivStrategy`].
//!
//! Hex tokens are fixed-width (`0x` + 8 or 16 zero-padded lowercase digits)
//! so a caller can size them before rendering. Decimal tokens are minimal;
//! their length comes from [`super::digits`].

use crate::arith::{udivmod32, udivmod64};
use crate::config::DivStrategy;

/// Prefix of every hex token.
pub const HEX_PREFIX: &[u8; 2] = b"0x";
/// Length of a 32-bit hex token: `0x` + 8 digits.
pub const HEX32_TOKEN_LEN: usize = 10;
/// Length of a 64-bit hex token: `0x` + 16 digits.
pub const HEX64_TOKEN_LEN: usize = 18;
/// Longest decimal rendering of a `u32` (`4294967295`).
pub const DEC32_MAX_LEN: usize = 10;
/// Longest decimal rendering of a `u64` (`18446744073709551615`).
pub const DEC64_MAX_LEN: usize = 20;
/// Longest token any conversion can produce.
pub const MAX_TOKEN_LEN: usize = DEC64_MAX_LEN;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Output base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    /// Minimal base-10 digits.
    Decimal,
    /// Fixed-width `0x`-prefixed base-16 digits.
    Hex,
}

/// Unsigned machine word the converter and digit counter operate on.
pub(crate) trait Word: Copy {
    /// Hex digits in a fixed-width token.
    const HEX_DIGITS: usize;
    /// Longest minimal decimal rendering.
    const DEC_MAX: usize;

    fn is_zero(self) -> bool;
    fn low_nibble(self) -> u8;
    fn shr4(self) -> Self;
    /// `(self / 10, self % 10)` computed with `strategy`.
    fn divmod10(self, strategy: DivStrategy) -> (Self, u8);
}

impl Word for u32 {
    const HEX_DIGITS: usize = 8;
    const DEC_MAX: usize = DEC32_MAX_LEN;

    #[inline]
    fn is_zero(self) -> bool {
        self == 0
    }

    #[inline]
    fn low_nibble(self) -> u8 {
        (self & 0xf) as u8
    }

    #[inline]
    fn shr4(self) -> Self {
        self >> 4
    }

    #[inline]
    fn divmod10(self, strategy: DivStrategy) -> (Self, u8) {
        match strategy {
            DivStrategy::Hardware => (self / 10, (self % 10) as u8),
            DivStrategy::Software => {
                let (q, r) = udivmod32(self, 10);
                (q, r as u8)
            }
        }
    }
}

impl Word for u64 {
    const HEX_DIGITS: usize = 16;
    const DEC_MAX: usize = DEC64_MAX_LEN;

    #[inline]
    fn is_zero(self) -> bool {
        self == 0
    }

    #[inline]
    fn low_nibble(self) -> u8 {
        (self & 0xf) as u8
    }

    #[inline]
    fn shr4(self) -> Self {
        self >> 4
    }

    #[inline]
    fn divmod10(self, strategy: DivStrategy) -> (Self, u8) {
        match strategy {
            DivStrategy::Hardware => (self / 10, (self % 10) as u8),
            DivStrategy::Software => {
                let (q, r) = udivmod64(self, 10);
                (q, r as u8)
            }
        }
    }
}

fn token_capacity<W: Word>(radix: Radix) -> usize {
    match radix {
        Radix::Decimal => W::DEC_MAX,
        Radix::Hex => HEX_PREFIX.len() + W::HEX_DIGITS,
    }
}

fn utoa<W: Word>(dst: &mut [u8], mut value: W, radix: Radix, strategy: DivStrategy) -> usize {
    let need = token_capacity::<W>(radix);
    assert!(
        dst.len() >= need,
        "utoa: destination holds {} bytes, token may need {need}",
        dst.len()
    );

    let start = match radix {
        Radix::Decimal => 0,
        Radix::Hex => {
            dst[..HEX_PREFIX.len()].copy_from_slice(HEX_PREFIX);
            HEX_PREFIX.len()
        }
    };

    let mut end = start;
    loop {
        let digit = match radix {
            Radix::Hex => {
                let d = value.low_nibble();
                value = value.shr4();
                d
            }
            Radix::Decimal => {
                let (q, r) = value.divmod10(strategy);
                value = q;
                r
            }
        };
        dst[end] = DIGITS[usize::from(digit)];
        end += 1;
        if value.is_zero() {
            break;
        }
    }

    if radix == Radix::Hex {
        while end - start < W::HEX_DIGITS {
            dst[end] = b'0';
            end += 1;
        }
    }

    dst[start..end].reverse();
    end
}

/// Render a `u32` at the start of `dst`; returns the bytes written.
///
/// # Panics
///
/// Panics if `dst` is shorter than the worst-case token for `radix`
/// ([`DEC32_MAX_LEN`] or [`HEX32_TOKEN_LEN`]).
pub fn utoa32(dst: &mut [u8], value: u32, radix: Radix, strategy: DivStrategy) -> usize {
    utoa(dst, value, radix, strategy)
}

/// Render a `u64` at the start of `dst`; returns the bytes written.
///
/// # Panics
///
/// Panics if `dst` is shorter than the worst-case token for `radix`
/// ([`DEC64_MAX_LEN`] or [`HEX64_TOKEN_LEN`]).
pub fn utoa64(dst: &mut [u8], value: u64, radix: Radix, strategy: DivStrategy) -> usize {
    utoa(dst, value, radix, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render32(value: u32, radix: Radix, strategy: DivStrategy) -> std::vec::Vec<u8> {
        let mut buf = [0u8; MAX_TOKEN_LEN];
        let n = utoa32(&mut buf, value, radix, strategy);
        buf[..n].to_vec()
    }

    fn render64(value: u64, radix: Radix, strategy: DivStrategy) -> std::vec::Vec<u8> {
        let mut buf = [0u8; MAX_TOKEN_LEN];
        let n = utoa64(&mut buf, value, radix, strategy);
        buf[..n].to_vec()
    }

    #[test]
    fn hex32_is_fixed_width() {
        for strategy in DivStrategy::ALL {
            assert_eq!(render32(0, Radix::Hex, strategy), b"0x00000000");
            assert_eq!(render32(255, Radix::Hex, strategy), b"0x000000ff");
            assert_eq!(render32(0xdead_beef, Radix::Hex, strategy), b"0xdeadbeef");
            assert_eq!(render32(u32::MAX, Radix::Hex, strategy), b"0xffffffff");
        }
    }

    #[test]
    fn hex64_is_fixed_width() {
        assert_eq!(
            render64(0, Radix::Hex, DivStrategy::Hardware),
            b"0x0000000000000000"
        );
        assert_eq!(
            render64(0x1234_5678_9abc_def0, Radix::Hex, DivStrategy::Software),
            b"0x123456789abcdef0"
        );
        assert_eq!(
            render64(1 << 32, Radix::Hex, DivStrategy::Hardware),
            b"0x0000000100000000"
        );
    }

    #[test]
    fn decimal_is_minimal() {
        for strategy in DivStrategy::ALL {
            assert_eq!(render32(0, Radix::Decimal, strategy), b"0");
            assert_eq!(render32(7, Radix::Decimal, strategy), b"7");
            assert_eq!(render32(10, Radix::Decimal, strategy), b"10");
            assert_eq!(render32(42, Radix::Decimal, strategy), b"42");
            assert_eq!(render32(u32::MAX, Radix::Decimal, strategy), b"4294967295");
            assert_eq!(
                render64(u64::MAX, Radix::Decimal, strategy),
                b"18446744073709551615"
            );
            assert_eq!(render64(1_000_000, Radix::Decimal, strategy), b"1000000");
        }
    }

    #[test]
    fn strategies_agree() {
        let mut v: u32 = 3;
        for _ in 0..500 {
            assert_eq!(
                render32(v, Radix::Decimal, DivStrategy::Hardware),
                render32(v, Radix::Decimal, DivStrategy::Software)
            );
            let wide = u64::from(v) * 4_294_967_311;
            assert_eq!(
                render64(wide, Radix::Decimal, DivStrategy::Hardware),
                render64(wide, Radix::Decimal, DivStrategy::Software)
            );
            v = v.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        }
    }

    #[test]
    fn writes_only_at_start_of_destination() {
        let mut buf = [b'#'; 24];
        let n = utoa32(&mut buf, 42, Radix::Decimal, DivStrategy::Hardware);
        assert_eq!(n, 2);
        assert_eq!(&buf[..4], b"42##");
    }

    #[test]
    #[should_panic(expected = "utoa")]
    fn short_destination_panics() {
        let mut buf = [0u8; 9];
        utoa32(&mut buf, 1, Radix::Hex, DivStrategy::Hardware);
    }
}
