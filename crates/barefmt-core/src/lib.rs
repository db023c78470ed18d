//! # barefmt-core
//!
//! Freestanding formatted-output engine for kernels and other bare-metal
//! environments that cannot rely on a platform C library.
//!
//! The crate is `no_std`, allocates nothing, and contains no `unsafe` code.
//! Output goes into caller-owned byte slices under a hard byte budget; the
//! bounded writer never writes past `capacity - 1` data bytes and always
//! leaves a NUL terminator behind.
//!
//! ```
//! use barefmt_core::stdio::{Arg, format_bounded};
//!
//! let mut buf = [0u8; 32];
//! let n = format_bounded(&mut buf, 32, Some(b"%s-%d".as_slice()), &[Arg::from("id"), Arg::from(42u32)]);
//! assert_eq!(n, 5);
//! assert_eq!(&buf[..6], b"id-42\0");
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod arith;
pub mod config;
pub mod error;
pub mod stdio;
pub mod string;

pub use config::DivStrategy;
pub use error::FormatError;
