//! Decimal digit counting.
//!
//! The bounded writer needs the length of a decimal token before it commits
//! any of it. Counting walks the same `divmod10` as the converter, under the
//! same [`DivStrategy`], so the count and the rendered length cannot drift
//! apart.

use super::itoa::Word;
use crate::config::DivStrategy;

fn count<W: Word>(mut value: W, strategy: DivStrategy) -> usize {
    let mut digits = 1;
    loop {
        value = value.divmod10(strategy).0;
        if value.is_zero() {
            return digits;
        }
        digits += 1;
    }
}

/// Number of digits in the minimal decimal rendering of `value` (`0` => 1).
#[must_use]
pub fn decimal_digits32(value: u32, strategy: DivStrategy) -> usize {
    count(value, strategy)
}

/// 64-bit counterpart of [`decimal_digits32`].
#[must_use]
pub fn decimal_digits64(value: u64, strategy: DivStrategy) -> usize {
    count(value, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdio::itoa::{MAX_TOKEN_LEN, Radix, utoa32, utoa64};

    #[test]
    fn zero_has_one_digit() {
        for strategy in DivStrategy::ALL {
            assert_eq!(decimal_digits32(0, strategy), 1);
            assert_eq!(decimal_digits64(0, strategy), 1);
        }
    }

    #[test]
    fn powers_of_ten_boundaries() {
        for strategy in DivStrategy::ALL {
            let mut p: u64 = 1;
            for expected in 1..=19 {
                assert_eq!(decimal_digits64(p, strategy), expected, "10^{}", expected - 1);
                assert_eq!(decimal_digits64(p - 1, strategy), (expected - 1).max(1));
                p *= 10;
            }
            assert_eq!(decimal_digits32(999_999_999, strategy), 9);
            assert_eq!(decimal_digits32(1_000_000_000, strategy), 10);
            assert_eq!(decimal_digits32(u32::MAX, strategy), 10);
            assert_eq!(decimal_digits64(u64::MAX, strategy), 20);
        }
    }

    #[test]
    fn count_matches_rendered_length() {
        let mut buf = [0u8; MAX_TOKEN_LEN];
        let mut v: u32 = 1;
        for _ in 0..2_000 {
            for strategy in DivStrategy::ALL {
                let n = utoa32(&mut buf, v, Radix::Decimal, strategy);
                assert_eq!(decimal_digits32(v, strategy), n, "value {v}");
                let wide = u64::from(v) << 24 | u64::from(v);
                let n = utoa64(&mut buf, wide, Radix::Decimal, strategy);
                assert_eq!(decimal_digits64(wide, strategy), n, "value {wide}");
            }
            v = v.wrapping_mul(2_654_435_761).wrapping_add(1);
        }
    }
}
