//! Deterministic property sweep.
//!
//! Generates values and templates from a seeded splitmix64 stream and checks
//! the rendering contract under both division strategies. The same seed
//! always produces the same cases, so a failure report can be replayed with
//! `harness sweep --seed <seed>`.

use barefmt_core::DivStrategy;
use barefmt_core::config::WIDE_INT;
use barefmt_core::stdio::{
    Arg, HEX32_TOKEN_LEN, MAX_TOKEN_LEN, Printer, Radix, decimal_digits32, decimal_digits64,
    utoa32, utoa64,
};
use serde::{Deserialize, Serialize};

/// Property names, in execution order.
pub const PROPERTIES: [&str; 5] = [
    "hex_round_trip",
    "digit_count",
    "strategy_equivalence",
    "measure_matches_render",
    "truncation_prefix",
];

const MAX_REPORTED_FAILURES: usize = 8;

const EDGE_VALUES: [u64; 10] = [
    0,
    1,
    9,
    10,
    0xff,
    0xffff_ffff,
    0x1_0000_0000,
    9_999_999_999,
    u64::MAX - 1,
    u64::MAX,
];

const WORDS: [&[u8]; 6] = [b"", b"a", b"id", b"kernel", b"page\0fault", b"x86_64-unknown-none"];

/// splitmix64 generator.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform-ish value in `0..n`. `n` must be non-zero.
    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// A value biased toward edges and every digit length.
    pub fn value(&mut self) -> u64 {
        if self.below(8) == 0 {
            EDGE_VALUES[self.below(EDGE_VALUES.len() as u64) as usize]
        } else {
            self.next_u64() >> self.below(64)
        }
    }
}

/// Result of one property over the whole sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyResult {
    pub property: String,
    pub cases: u64,
    /// Total failing cases.
    pub failed: u64,
    /// First few failure descriptions.
    pub failures: Vec<String>,
}

impl PropertyResult {
    fn new(property: &str) -> Self {
        Self {
            property: property.to_string(),
            cases: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    fn check(&mut self, ok: bool, describe: impl FnOnce() -> String) {
        self.cases += 1;
        if !ok {
            self.failed += 1;
            if self.failures.len() < MAX_REPORTED_FAILURES {
                self.failures.push(describe());
            }
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed == 0
    }
}

/// Outcome of [`run_sweep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub seed: u64,
    pub count: u64,
    pub properties: Vec<PropertyResult>,
}

impl SweepReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.properties.iter().all(PropertyResult::passed)
    }

    #[must_use]
    pub fn total_cases(&self) -> u64 {
        self.properties.iter().map(|p| p.cases).sum()
    }

    #[must_use]
    pub fn total_failures(&self) -> u64 {
        self.properties.iter().map(|p| p.failed).sum()
    }
}

// ---------------------------------------------------------------------------
// Generated templates
// ---------------------------------------------------------------------------

/// A generated template with its arguments and the output offsets at which
/// bounded rendering may legally stop.
#[derive(Debug, Clone)]
pub struct GeneratedCase {
    pub template: Vec<u8>,
    pub args: Vec<Arg<'static>>,
    /// Sorted offsets, starting at 0 and ending at the full length.
    pub cuts: Vec<usize>,
}

impl GeneratedCase {
    /// Length of the unbounded rendering.
    #[must_use]
    pub fn full_len(&self) -> usize {
        self.cuts.last().copied().unwrap_or(0)
    }

    /// Build a random template of up to `max_pieces` pieces.
    pub fn generate(rng: &mut SplitMix64, max_pieces: u64) -> Self {
        let mut case = Self {
            template: Vec::new(),
            args: Vec::new(),
            cuts: vec![0],
        };
        let pieces = 1 + rng.below(max_pieces.max(1));
        for _ in 0..pieces {
            let end = case.full_len();
            match rng.below(8) {
                0 | 1 => {
                    // No 'x': it would turn a preceding `%l` into `%lx`.
                    let letter = b'a' + rng.below(23) as u8;
                    case.template.push(letter);
                    case.cuts.push(end + 1);
                }
                2 => {
                    let v = rng.value() as u32;
                    case.push_numeric(b"%d", Arg::U32(v), decimal_digits32(v, DivStrategy::Hardware));
                }
                3 => {
                    let v = rng.value() as u32;
                    case.push_numeric(b"%x", Arg::U32(v), HEX32_TOKEN_LEN);
                }
                4 if WIDE_INT => {
                    let v = rng.value();
                    if rng.below(2) == 0 {
                        case.push_numeric(b"%lx", Arg::U64(v), 18);
                    } else {
                        case.push_numeric(b"%l", Arg::U64(v), decimal_digits64(v, DivStrategy::Hardware));
                    }
                }
                5 => {
                    case.template.extend_from_slice(b"%c");
                    case.args.push(Arg::Char(b'A' + rng.below(26) as u8));
                    case.cuts.push(end + 1);
                }
                6 => {
                    let word = WORDS[rng.below(WORDS.len() as u64) as usize];
                    case.template.extend_from_slice(b"%s");
                    case.args.push(Arg::Str(word));
                    let visible = word.iter().position(|&b| b == 0).unwrap_or(word.len());
                    case.cuts.extend((1..=visible).map(|i| end + i));
                }
                _ => {
                    // Unknown specifier: consumes nothing, renders nothing.
                    case.template.extend_from_slice(b"%q");
                }
            }
        }
        case
    }

    fn push_numeric(&mut self, spec: &[u8], arg: Arg<'static>, len: usize) {
        let end = self.full_len();
        self.template.extend_from_slice(spec);
        self.args.push(arg);
        self.cuts.push(end + len);
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn hex_round_trip(rng: &mut SplitMix64, count: u64, out: &mut PropertyResult) {
    let mut tok = [0u8; MAX_TOKEN_LEN];
    for _ in 0..count {
        let v = rng.value() as u32;
        for strategy in DivStrategy::ALL {
            let n = utoa32(&mut tok, v, Radix::Hex, strategy);
            let parsed = std::str::from_utf8(&tok[2..n])
                .ok()
                .and_then(|s| u32::from_str_radix(s, 16).ok());
            out.check(n == HEX32_TOKEN_LEN && &tok[..2] == b"0x" && parsed == Some(v), || {
                format!("{v:#x} under {strategy}: {:?}", String::from_utf8_lossy(&tok[..n]))
            });
        }
    }
}

fn digit_count(rng: &mut SplitMix64, count: u64, out: &mut PropertyResult) {
    let mut tok = [0u8; MAX_TOKEN_LEN];
    for _ in 0..count {
        let v = rng.value();
        for strategy in DivStrategy::ALL {
            let narrow = v as u32;
            let n32 = utoa32(&mut tok, narrow, Radix::Decimal, strategy);
            let c32 = decimal_digits32(narrow, strategy);
            out.check(n32 == c32, || format!("u32 {narrow} under {strategy}: {c32} != {n32}"));
            let n64 = utoa64(&mut tok, v, Radix::Decimal, strategy);
            let c64 = decimal_digits64(v, strategy);
            out.check(n64 == c64, || format!("u64 {v} under {strategy}: {c64} != {n64}"));
        }
    }
}

fn strategy_equivalence(rng: &mut SplitMix64, count: u64, out: &mut PropertyResult) {
    let hw = Printer::new(DivStrategy::Hardware);
    let sw = Printer::new(DivStrategy::Software);
    for _ in 0..count {
        let case = GeneratedCase::generate(rng, 8);
        let mut a = vec![0u8; case.full_len()];
        let mut b = vec![0u8; case.full_len()];
        let ra = hw.unbounded(&mut a, &case.template, &case.args);
        let rb = sw.unbounded(&mut b, &case.template, &case.args);
        out.check(ra == rb && a == b, || {
            format!(
                "template {:?}: hardware {:?} vs software {:?}",
                String::from_utf8_lossy(&case.template),
                String::from_utf8_lossy(&a),
                String::from_utf8_lossy(&b)
            )
        });
    }
}

fn measure_matches_render(rng: &mut SplitMix64, count: u64, out: &mut PropertyResult) {
    for _ in 0..count {
        let case = GeneratedCase::generate(rng, 8);
        let printer = Printer::new(if rng.below(2) == 0 {
            DivStrategy::Hardware
        } else {
            DivStrategy::Software
        });
        let measured = printer.measure(&case.template, &case.args);
        out.check(measured == Ok(case.full_len()), || {
            format!(
                "template {:?}: measured {measured:?}, expected {}",
                String::from_utf8_lossy(&case.template),
                case.full_len()
            )
        });
    }
}

/// Guard bytes past the declared capacity that must stay untouched.
const GUARD: usize = 4;
const GUARD_BYTE: u8 = 0xA5;

fn truncation_prefix(rng: &mut SplitMix64, count: u64, out: &mut PropertyResult) {
    for _ in 0..count {
        let case = GeneratedCase::generate(rng, 6);
        let full_len = case.full_len();
        let mut full = vec![0u8; full_len];
        if Printer::native()
            .unbounded(&mut full, &case.template, &case.args)
            .is_err()
        {
            out.check(false, || "generated case failed to render".to_string());
            continue;
        }

        for strategy in DivStrategy::ALL {
            let printer = Printer::new(strategy);
            for cap in 1..=full_len + 1 {
                let mut buf = vec![GUARD_BYTE; cap + GUARD];
                let ok = match printer.bounded(&mut buf[..], cap, Some(case.template.as_slice()), &case.args) {
                    Ok(r) => {
                        let expected_len = case.cuts.iter().copied().filter(|&c| c < cap).max();
                        Some(r.len) == expected_len
                            && buf[r.len] == 0
                            && buf[..r.len] == full[..r.len]
                            && buf[cap..].iter().all(|&b| b == GUARD_BYTE)
                            && r.truncated == (r.len < full_len)
                    }
                    Err(_) => false,
                };
                out.check(ok, || {
                    format!(
                        "template {:?} cap {cap} under {strategy}: got {:?}",
                        String::from_utf8_lossy(&case.template),
                        String::from_utf8_lossy(&buf[..cap])
                    )
                });
            }
        }
    }
}

/// Run every property `count` times from `seed`.
#[must_use]
pub fn run_sweep(seed: u64, count: u64) -> SweepReport {
    let mut rng = SplitMix64::new(seed);
    let checks: [fn(&mut SplitMix64, u64, &mut PropertyResult); 5] = [
        hex_round_trip,
        digit_count,
        strategy_equivalence,
        measure_matches_render,
        truncation_prefix,
    ];
    let properties = PROPERTIES
        .iter()
        .zip(checks)
        .map(|(name, check)| {
            let mut result = PropertyResult::new(name);
            check(&mut rng, count, &mut result);
            result
        })
        .collect();
    SweepReport {
        seed,
        count,
        properties,
    }
}
