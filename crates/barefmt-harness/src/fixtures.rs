//! Fixture loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Engine entry point being exercised (see [`crate::exec::FUNCTIONS`]).
    pub function: String,
    /// Contract clause the case pins down.
    #[serde(default)]
    pub clause: String,
    /// Input parameters.
    pub inputs: serde_json::Value,
    /// Expected canonical output.
    pub expected_output: String,
    /// `hardware`, `software` or `both`.
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    String::from("both")
}

/// A collection of fixture cases for one function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Every `*.json` file in `dir`, in path order. Files that fail to parse
    /// are returned separately so callers can report them.
    pub fn from_dir(dir: &Path) -> Result<(Vec<Self>, Vec<(PathBuf, HarnessError)>), HarnessError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut sets = Vec::new();
        let mut rejected = Vec::new();
        for path in paths {
            match Self::from_file(&path) {
                Ok(set) => sets.push(set),
                Err(err) => rejected.push((path, err)),
            }
        }
        Ok((sets, rejected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_defaults_mode_and_clause() {
        let set = FixtureSet::from_json(
            r#"{"version":"v1","family":"stdio/printf","captured_at":"2026-01-01T00:00:00Z",
                "cases":[{"name":"n","function":"formatted_len","inputs":{"template":"ab"},"expected_output":"2"}]}"#,
        )
        .unwrap();
        assert_eq!(set.cases[0].mode, "both");
        assert_eq!(set.cases[0].clause, "");
        let again = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(again.cases[0].expected_output, "2");
    }
}
