//! Formatted output.
//!
//! Implements the freestanding `sprintf` family: the conversion-specifier
//! interpreter, the numeric converter, and the digit counter that lets the
//! bounded writer decide whether a numeric token fits before writing it.

pub mod args;
pub mod digits;
pub mod itoa;
pub mod printf;

pub use args::{Arg, ArgCursor, ArgKind};
pub use digits::{decimal_digits32, decimal_digits64};
pub use itoa::{
    DEC32_MAX_LEN, DEC64_MAX_LEN, HEX_PREFIX, HEX32_TOKEN_LEN, HEX64_TOKEN_LEN, MAX_TOKEN_LEN,
    Radix, utoa32, utoa64,
};
pub use printf::{
    INTRODUCER, Printer, Rendered, format, format_bounded, format_unbounded, formatted_len,
    try_format_bounded,
};
