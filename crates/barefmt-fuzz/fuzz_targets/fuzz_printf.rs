#![no_main]
use barefmt_core::DivStrategy;
use barefmt_core::stdio::{Arg, Printer};
use libfuzzer_sys::fuzz_target;

const GUARD: u8 = 0xA5;
const SLACK: usize = 8;

/// Layout: `[capacity, template bytes.., 0xFF, arg records..]`. Each arg
/// record is a kind byte followed by 8 little-endian value bytes; string
/// args borrow a slice of the template.
fn decode(data: &[u8]) -> Option<(usize, &[u8], Vec<Arg<'_>>)> {
    let (&capacity, rest) = data.split_first()?;
    let split = rest.iter().position(|&b| b == 0xFF).unwrap_or(rest.len());
    let template = &rest[..split];
    let mut args = Vec::new();
    for record in rest.get(split + 1..).unwrap_or_default().chunks_exact(9) {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&record[1..]);
        let value = u64::from_le_bytes(raw);
        args.push(match record[0] % 4 {
            0 => Arg::Char(value as u8),
            1 => Arg::U32(value as u32),
            2 => Arg::U64(value),
            _ => {
                let start = (value as usize) % (template.len() + 1);
                Arg::Str(&template[start..])
            }
        });
    }
    Some((usize::from(capacity), template, args))
}

fuzz_target!(|data: &[u8]| {
    let Some((capacity, template, args)) = decode(data) else {
        return;
    };

    for strategy in DivStrategy::ALL {
        let printer = Printer::new(strategy);
        let mut buf = vec![GUARD; capacity + SLACK];
        let result = printer.bounded(&mut buf, capacity, Some(template), &args);

        // Nothing past the declared capacity is ever written.
        assert!(buf[capacity..].iter().all(|&b| b == GUARD));

        let Ok(rendered) = result else {
            continue;
        };
        assert!(rendered.len < capacity);
        assert_eq!(buf[rendered.len], 0);

        // Bounded output is a prefix of the unbounded rendering. A short
        // capacity can stop the scan before a bad argument is reached.
        let Ok(full) = printer.measure(template, &args) else {
            assert!(rendered.truncated);
            continue;
        };
        let mut whole = vec![0u8; full];
        let n = printer
            .unbounded(&mut whole, template, &args)
            .expect("measure succeeded");
        assert_eq!(n, full);
        assert_eq!(&buf[..rendered.len], &whole[..rendered.len]);
        assert_eq!(rendered.truncated, rendered.len < full);
    }
});
