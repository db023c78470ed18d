//! Byte-string and memory primitives.
//!
//! Safe slice versions of the `<string.h>` routines the formatting engine
//! leans on. A NUL byte (`0x00`) marks the logical end of a string; a slice
//! with no NUL ends at its length.

pub mod mem;
pub mod str;

pub use mem::{memchr, memcpy};
pub use str::{strlen, strnlen};
