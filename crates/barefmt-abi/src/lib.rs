//! # barefmt-abi
//!
//! C-callable boundary for `barefmt-core`.
//!
//! C variadics are not available on stable Rust, so arguments cross the
//! boundary as an explicit array of tagged [`printf_abi::BarefmtArg`] values.
//! Each export decodes that array into core [`barefmt_core::stdio::Arg`]s
//! and delegates to the safe engine.
//!
//! ```text
//! C caller -> BarefmtArg[] -> decode (this crate) -> barefmt-core -> return
//! ```

mod util;

pub mod printf_abi;

pub use printf_abi::{
    BAREFMT_ARG_CHAR, BAREFMT_ARG_STR, BAREFMT_ARG_U32, BAREFMT_ARG_U64, BarefmtArg, MAX_VA_ARGS,
};
