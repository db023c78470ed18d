//! Harness runtime configuration.
//!
//! Read once from the environment and cached for the process:
//! - `BAREFMT_DIV_STRATEGY`: `hardware`, `software` or `both` (default). Picks
//!   the division strategies fixture runs and sweeps exercise.
//! - `BAREFMT_LOG_DIR`: default directory for JSONL logs.
//!
//! CLI flags take precedence over both.

use std::path::PathBuf;
use std::sync::OnceLock;

use barefmt_core::DivStrategy;
use serde::{Deserialize, Serialize};

pub const STRATEGY_ENV: &str = "BAREFMT_DIV_STRATEGY";
pub const LOG_DIR_ENV: &str = "BAREFMT_LOG_DIR";

/// Which strategies a run covers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategySelection {
    Hardware,
    Software,
    #[default]
    Both,
}

impl StrategySelection {
    /// Parse from string (case-insensitive). Unknown values fall back to `Both`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        if ["both", "all", "matrix"]
            .iter()
            .any(|alias| s.trim().eq_ignore_ascii_case(alias))
        {
            return Self::Both;
        }
        match DivStrategy::from_str_loose(s) {
            Some(DivStrategy::Hardware) => Self::Hardware,
            Some(DivStrategy::Software) => Self::Software,
            None => Self::Both,
        }
    }

    /// Strategies to run, hardware first.
    #[must_use]
    pub fn strategies(self) -> &'static [DivStrategy] {
        match self {
            Self::Hardware => &[DivStrategy::Hardware],
            Self::Software => &[DivStrategy::Software],
            Self::Both => &DivStrategy::ALL,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub selection: StrategySelection,
    pub log_dir: Option<PathBuf>,
}

impl HarnessConfig {
    /// Build from raw variable values. Empty values count as unset.
    #[must_use]
    pub fn from_values(strategy: Option<&str>, log_dir: Option<&str>) -> Self {
        Self {
            selection: strategy
                .filter(|s| !s.trim().is_empty())
                .map(StrategySelection::from_str_loose)
                .unwrap_or_default(),
            log_dir: log_dir
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Read the process environment (uncached).
    #[must_use]
    pub fn from_env() -> Self {
        let strategy = std::env::var(STRATEGY_ENV).ok();
        let log_dir = std::env::var(LOG_DIR_ENV).ok();
        Self::from_values(strategy.as_deref(), log_dir.as_deref())
    }

    /// Process-wide configuration, resolved on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        static CONFIG: OnceLock<HarnessConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::from_env)
    }

    /// Default log path for `name` under the configured log directory.
    #[must_use]
    pub fn log_path(&self, name: &str) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(name))
    }
}
