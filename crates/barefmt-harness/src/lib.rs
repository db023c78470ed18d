//! Conformance harness for barefmt.
//!
//! This crate provides:
//! - Fixture verify: run JSON fixture packs against the engine under each
//!   division strategy and compare canonical outputs
//! - Property sweep: deterministic randomized checks of the rendering contract
//! - Report generation: markdown + JSON conformance reports
//! - Structured logging: JSONL evidence with artifact digests

#![forbid(unsafe_code)]

pub mod config;
pub mod diff;
pub mod error;
pub mod exec;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod sweep;
pub mod verify;

pub use config::{HarnessConfig, StrategySelection};
pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;
