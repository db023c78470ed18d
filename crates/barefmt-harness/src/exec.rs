//! Fixture execution against the engine.
//!
//! Every function renders to a canonical string so fixtures can compare with
//! plain string equality:
//! - writers: `<ret>|<escaped bytes>`, where the bytes include the terminator
//!   when one is written; a failing bounded call that left the buffer alone
//!   renders `-1|untouched`
//! - `formatted_len`, `decimal_digits*`: the number
//! - `utoa*`: `<len>|<token>`
//! - argument contract violations: `error:<message>`

use std::str::FromStr;

use barefmt_core::stdio::{
    Arg, MAX_TOKEN_LEN, Printer, Radix, decimal_digits32, decimal_digits64, utoa32, utoa64,
};
use barefmt_core::{DivStrategy, FormatError};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Function names a fixture case may name.
pub const FUNCTIONS: [&str; 8] = [
    "format_bounded",
    "format_unbounded",
    "format",
    "formatted_len",
    "decimal_digits32",
    "decimal_digits64",
    "utoa32",
    "utoa64",
];

/// Fill byte for output buffers, so untouched bytes are visible.
const FILL: u8 = 0xFF;

/// Serialized form of one conversion argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ArgSpec {
    Char(u8),
    U32(u32),
    U64(u64),
    Str(String),
    /// Raw bytes, for strings carrying a NUL or non-UTF-8 data.
    Bytes(Vec<u8>),
}

impl ArgSpec {
    #[must_use]
    pub fn as_arg(&self) -> Arg<'_> {
        match self {
            Self::Char(c) => Arg::Char(*c),
            Self::U32(v) => Arg::U32(*v),
            Self::U64(v) => Arg::U64(*v),
            Self::Str(s) => Arg::Str(s.as_bytes()),
            Self::Bytes(b) => Arg::Str(b),
        }
    }
}

impl FromStr for ArgSpec {
    type Err = HarnessError;

    /// Parses `kind:value`, e.g. `u32:42`, `u64:0x10`, `char:A`, `str:text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| HarnessError::invalid(format!("argument '{s}' is not kind:value")))?;
        match kind.to_ascii_lowercase().as_str() {
            "char" | "c" => match value.as_bytes() {
                [b] => Ok(Self::Char(*b)),
                _ => parse_u64(value)
                    .and_then(|v| u8::try_from(v).ok())
                    .map(Self::Char)
                    .ok_or_else(|| HarnessError::invalid(format!("bad char value '{value}'"))),
            },
            "u32" | "d" | "x" => parse_u64(value)
                .and_then(|v| u32::try_from(v).ok())
                .map(Self::U32)
                .ok_or_else(|| HarnessError::invalid(format!("bad u32 value '{value}'"))),
            "u64" | "l" => parse_u64(value)
                .map(Self::U64)
                .ok_or_else(|| HarnessError::invalid(format!("bad u64 value '{value}'"))),
            "str" | "s" => Ok(Self::Str(value.to_string())),
            other => Err(HarnessError::invalid(format!("unknown argument kind '{other}'"))),
        }
    }
}

/// Decimal or `0x`-prefixed hex, `_` separators allowed.
fn parse_u64(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => cleaned.parse().ok(),
    }
}

/// Escape bytes for canonical output: printable ASCII as-is, `\0`, `\n`,
/// `\t`, `\\`, and `\xNN` for everything else.
#[must_use]
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            0 => out.push_str("\\0"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Input decoding
// ---------------------------------------------------------------------------

fn field<'v>(inputs: &'v serde_json::Value, key: &str) -> Option<&'v serde_json::Value> {
    inputs.get(key).filter(|v| !v.is_null())
}

fn usize_field(inputs: &serde_json::Value, key: &str) -> Result<Option<usize>, HarnessError> {
    match field(inputs, key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| HarnessError::invalid(format!("'{key}' must be a non-negative integer"))),
    }
}

fn u64_field(inputs: &serde_json::Value, key: &str) -> Result<u64, HarnessError> {
    match field(inputs, key) {
        Some(serde_json::Value::String(s)) => {
            parse_u64(s).ok_or_else(|| HarnessError::invalid(format!("bad '{key}' value '{s}'")))
        }
        Some(v) => v
            .as_u64()
            .ok_or_else(|| HarnessError::invalid(format!("'{key}' must be an unsigned integer"))),
        None => Err(HarnessError::invalid(format!("missing '{key}'"))),
    }
}

fn u32_field(inputs: &serde_json::Value, key: &str) -> Result<u32, HarnessError> {
    let v = u64_field(inputs, key)?;
    u32::try_from(v).map_err(|_| HarnessError::invalid(format!("'{key}' exceeds u32: {v}")))
}

/// Template as bytes. `None` when the field is absent or null.
fn template_field(inputs: &serde_json::Value) -> Result<Option<Vec<u8>>, HarnessError> {
    match field(inputs, "template") {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_bytes().to_vec())),
        Some(v) => serde_json::from_value::<Vec<u8>>(v.clone())
            .map(Some)
            .map_err(|_| HarnessError::invalid("'template' must be a string or byte array")),
    }
}

fn args_field(inputs: &serde_json::Value) -> Result<Vec<ArgSpec>, HarnessError> {
    match field(inputs, "args") {
        None => Ok(Vec::new()),
        Some(v) => Ok(serde_json::from_value(v.clone())?),
    }
}

fn radix_field(inputs: &serde_json::Value) -> Result<Radix, HarnessError> {
    match field(inputs, "radix").and_then(|v| v.as_str()) {
        Some("decimal" | "dec" | "10") | None => Ok(Radix::Decimal),
        Some("hex" | "16") => Ok(Radix::Hex),
        Some(other) => Err(HarnessError::invalid(format!("unknown radix '{other}'"))),
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Outcome of one fixture execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Canonical output string.
    pub output: String,
    /// Extra context for reports, e.g. the typed error behind a `-1`.
    pub note: Option<String>,
}

impl Execution {
    fn plain(output: String) -> Self {
        Self { output, note: None }
    }
}

/// Execute one fixture case under `strategy`.
pub fn execute_fixture_case(
    function: &str,
    inputs: &serde_json::Value,
    strategy: DivStrategy,
) -> Result<Execution, HarnessError> {
    let printer = Printer::new(strategy);
    match function {
        "format_bounded" => exec_bounded(printer, inputs),
        "format_unbounded" => exec_unbounded(printer, inputs, false),
        "format" => exec_unbounded(printer, inputs, true),
        "formatted_len" => {
            let template = template_field(inputs)?
                .ok_or_else(|| HarnessError::invalid("missing 'template'"))?;
            let specs = args_field(inputs)?;
            let args: Vec<Arg<'_>> = specs.iter().map(ArgSpec::as_arg).collect();
            Ok(Execution::plain(match printer.measure(&template, &args) {
                Ok(n) => n.to_string(),
                Err(e) => error_output(e),
            }))
        }
        "decimal_digits32" => Ok(Execution::plain(
            decimal_digits32(u32_field(inputs, "value")?, strategy).to_string(),
        )),
        "decimal_digits64" => Ok(Execution::plain(
            decimal_digits64(u64_field(inputs, "value")?, strategy).to_string(),
        )),
        "utoa32" => {
            let value = u32_field(inputs, "value")?;
            let mut token = [0u8; MAX_TOKEN_LEN];
            let n = utoa32(&mut token, value, radix_field(inputs)?, strategy);
            Ok(Execution::plain(format!("{n}|{}", escape_bytes(&token[..n]))))
        }
        "utoa64" => {
            let value = u64_field(inputs, "value")?;
            let mut token = [0u8; MAX_TOKEN_LEN];
            let n = utoa64(&mut token, value, radix_field(inputs)?, strategy);
            Ok(Execution::plain(format!("{n}|{}", escape_bytes(&token[..n]))))
        }
        other => Err(HarnessError::UnsupportedFunction(other.to_string())),
    }
}

fn error_output(err: FormatError) -> String {
    format!("error:{err}")
}

fn exec_bounded(printer: Printer, inputs: &serde_json::Value) -> Result<Execution, HarnessError> {
    let capacity = usize_field(inputs, "capacity")?
        .ok_or_else(|| HarnessError::invalid("missing 'capacity'"))?;
    let buf_len = usize_field(inputs, "buf_len")?.unwrap_or(capacity);
    let template = template_field(inputs)?;
    let specs = args_field(inputs)?;
    let args: Vec<Arg<'_>> = specs.iter().map(ArgSpec::as_arg).collect();

    let mut buf = vec![FILL; buf_len];
    match printer.bounded(&mut buf, capacity, template.as_deref(), &args) {
        Ok(rendered) => Ok(Execution {
            output: format!("{}|{}", rendered.len, escape_bytes(&buf[..=rendered.len])),
            note: rendered.truncated.then(|| String::from("truncated")),
        }),
        Err(err) => {
            let output = if buf.iter().all(|&b| b == FILL) {
                String::from("-1|untouched")
            } else {
                let end = buf.iter().position(|&b| b == 0).map_or(buf.len(), |i| i + 1);
                format!("-1|{}", escape_bytes(&buf[..end]))
            };
            Ok(Execution {
                output,
                note: Some(err.to_string()),
            })
        }
    }
}

fn exec_unbounded(
    printer: Printer,
    inputs: &serde_json::Value,
    terminate: bool,
) -> Result<Execution, HarnessError> {
    let template =
        template_field(inputs)?.ok_or_else(|| HarnessError::invalid("missing 'template'"))?;
    let specs = args_field(inputs)?;
    let args: Vec<Arg<'_>> = specs.iter().map(ArgSpec::as_arg).collect();

    // The unbounded writers panic on overflow, so size the buffer exactly.
    let len = match printer.measure(&template, &args) {
        Ok(len) => len,
        Err(err) => return Ok(Execution::plain(error_output(err))),
    };
    let mut buf = vec![FILL; len + usize::from(terminate)];
    let n = if terminate {
        printer.terminated(&mut buf, &template, &args)?
    } else {
        printer.unbounded(&mut buf, &template, &args)?
    };
    Ok(Execution::plain(format!("{n}|{}", escape_bytes(&buf))))
}

/// Bounded rendering for ad-hoc CLI use. Returns the rendered bytes (without
/// terminator) and whether output was truncated.
pub fn render_bounded(
    strategy: DivStrategy,
    capacity: usize,
    template: &[u8],
    specs: &[ArgSpec],
) -> Result<(Vec<u8>, bool), HarnessError> {
    let args: Vec<Arg<'_>> = specs.iter().map(ArgSpec::as_arg).collect();
    let mut buf = vec![0u8; capacity];
    let rendered = Printer::new(strategy).bounded(&mut buf, capacity, Some(template), &args)?;
    buf.truncate(rendered.len);
    Ok((buf, rendered.truncated))
}
