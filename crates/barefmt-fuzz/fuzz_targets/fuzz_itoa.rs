#![no_main]
use barefmt_core::DivStrategy;
use barefmt_core::stdio::{MAX_TOKEN_LEN, Radix, decimal_digits64, utoa64};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|value: u64| {
    let mut hw = [0u8; MAX_TOKEN_LEN];
    let mut sw = [0u8; MAX_TOKEN_LEN];
    for radix in [Radix::Decimal, Radix::Hex] {
        let a = utoa64(&mut hw, value, radix, DivStrategy::Hardware);
        let b = utoa64(&mut sw, value, radix, DivStrategy::Software);
        assert_eq!(&hw[..a], &sw[..b]);
    }

    let digits = decimal_digits64(value, DivStrategy::Software);
    let n = utoa64(&mut hw, value, Radix::Decimal, DivStrategy::Software);
    assert_eq!(digits, n);
    let text = std::str::from_utf8(&hw[..n]).expect("decimal digits are ASCII");
    assert_eq!(text.parse::<u64>().ok(), Some(value));
});
