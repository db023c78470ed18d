//! Division without a hardware divider.
//!
//! Shift-subtract long division for targets whose instruction set has no
//! integer divide (or whose compiler runtime cannot be linked). Only shifts,
//! comparisons, and subtraction are used, so the routines are safe to call
//! from the code paths that stand in for the missing `/` and `%` operators.

/// Divides `num` by `den`, returning `(quotient, remainder)`.
///
/// The divisor is first shifted left until it reaches the dividend (or its top
/// bit), then walked back down one bit at a time, subtracting wherever it fits.
///
/// `den` must be non-zero.
#[inline]
pub const fn udivmod32(mut num: u32, mut den: u32) -> (u32, u32) {
    debug_assert!(den != 0, "udivmod32: division by zero");
    let mut bit: u32 = 1;
    let mut quot: u32 = 0;

    while den < num && bit != 0 && den & (1 << 31) == 0 {
        den <<= 1;
        bit <<= 1;
    }

    while bit != 0 {
        if num >= den {
            num -= den;
            quot |= bit;
        }
        bit >>= 1;
        den >>= 1;
    }

    (quot, num)
}

/// 64-bit counterpart of [`udivmod32`].
///
/// `den` must be non-zero.
#[inline]
pub const fn udivmod64(mut num: u64, mut den: u64) -> (u64, u64) {
    debug_assert!(den != 0, "udivmod64: division by zero");
    let mut bit: u64 = 1;
    let mut quot: u64 = 0;

    while den < num && bit != 0 && den & (1 << 63) == 0 {
        den <<= 1;
        bit <<= 1;
    }

    while bit != 0 {
        if num >= den {
            num -= den;
            quot |= bit;
        }
        bit >>= 1;
        den >>= 1;
    }

    (quot, num)
}
