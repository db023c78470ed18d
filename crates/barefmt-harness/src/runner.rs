//! Test execution engine.

use std::time::Instant;

use barefmt_core::DivStrategy;

use crate::diff;
use crate::exec::execute_fixture_case;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, StreamKind};
use crate::verify::VerificationResult;

/// Runs a fixture set under one division strategy.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Strategy the engine runs with.
    pub mode: DivStrategy,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: DivStrategy) -> Self {
        Self {
            campaign: campaign.into(),
            mode,
        }
    }

    /// Run all matching fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        self.matching(fixture_set)
            .map(|case| self.verify_case(fixture_set, case).0)
            .collect()
    }

    /// Like [`TestRunner::run`], emitting one log record per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::new();
        for case in self.matching(fixture_set) {
            let (result, latency_ns) = self.verify_case(fixture_set, case);
            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut details = serde_json::json!({
                "campaign": self.campaign,
                "family": fixture_set.family,
                "case": result.case_name,
            });
            if !result.passed {
                details["expected"] = serde_json::Value::from(result.expected.as_str());
                details["actual"] = serde_json::Value::from(result.actual.as_str());
            }
            let entry = LogEntry::new(String::new(), level, "fixture_case")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.mode.as_str())
                .with_symbol(case.function.clone())
                .with_outcome(outcome)
                .with_latency_ns(latency_ns)
                .with_details(details);
            log.emit_entry(entry)?;
            results.push(result);
        }
        Ok(results)
    }

    fn matching<'s>(&self, fixture_set: &'s FixtureSet) -> impl Iterator<Item = &'s FixtureCase> {
        let mode = self.mode;
        fixture_set
            .cases
            .iter()
            .filter(move |case| mode_matches(mode, &case.mode))
    }

    fn verify_case(&self, fixture_set: &FixtureSet, case: &FixtureCase) -> (VerificationResult, u64) {
        let started = Instant::now();
        let (actual, diff) = execute_case(case, self.mode);
        let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let case_name = if case.mode.eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.mode)
        } else {
            case.name.clone()
        };
        let result = VerificationResult {
            case_name,
            family: fixture_set.family.clone(),
            clause: case.clause.clone(),
            mode: self.mode.as_str().to_string(),
            passed: actual == case.expected_output,
            expected: case.expected_output.clone(),
            actual,
            diff,
        };
        (result, latency_ns)
    }
}

fn mode_matches(active: DivStrategy, case_mode: &str) -> bool {
    case_mode.eq_ignore_ascii_case("both")
        || DivStrategy::from_str_loose(case_mode) == Some(active)
}

fn execute_case(case: &FixtureCase, strategy: DivStrategy) -> (String, Option<String>) {
    match execute_fixture_case(&case.function, &case.inputs, strategy) {
        Ok(run) => {
            let diff_out = if run.output != case.expected_output {
                let mut d = diff::render_diff(&case.expected_output, &run.output);
                if let Some(note) = &run.note {
                    d.push_str(&format!("note: {note}\n"));
                }
                Some(d)
            } else {
                run.note
            };
            (run.output, diff_out)
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let diff_out = Some(diff::render_diff(&case.expected_output, &actual));
            (actual, diff_out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> FixtureSet {
        FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"stdio/printf",
                "captured_at":"2026-01-01T00:00:00Z",
                "cases":[
                    {"name":"hex","function":"format_bounded","clause":"hex fits","inputs":{"capacity":20,"template":"%x","args":[{"kind":"u32","value":255}]},"expected_output":"10|0x000000ff\\0","mode":"both"},
                    {"name":"hw_only","function":"decimal_digits32","clause":"digits","inputs":{"value":1000},"expected_output":"4","mode":"hardware"},
                    {"name":"sw_only","function":"decimal_digits32","clause":"digits","inputs":{"value":0},"expected_output":"1","mode":"software"}
                ]
            }"#,
        )
        .expect("valid fixture json")
    }

    #[test]
    fn runner_filters_by_strategy() {
        let hw = TestRunner::new("smoke", DivStrategy::Hardware).run(&fixture());
        assert_eq!(hw.len(), 2);
        assert!(hw.iter().all(|r| r.passed));
        assert_eq!(hw[0].case_name, "hex [hardware]");
        assert_eq!(hw[1].case_name, "hw_only");

        let sw = TestRunner::new("smoke", DivStrategy::Software).run(&fixture());
        assert_eq!(sw.len(), 2);
        assert_eq!(sw[1].case_name, "sw_only");
        assert!(sw.iter().all(|r| r.passed));
    }

    #[test]
    fn failing_case_carries_diff() {
        let mut set = fixture();
        set.cases[1].expected_output = "5".to_string();
        let results = TestRunner::new("smoke", DivStrategy::Hardware).run(&set);
        let bad = &results[1];
        assert!(!bad.passed);
        assert_eq!(bad.actual, "4");
        assert!(bad.diff.as_deref().unwrap_or("").contains("-5\n+4\n"));
    }

    #[test]
    fn unknown_function_is_a_failure_not_a_panic() {
        let mut set = fixture();
        set.cases[0].function = "vfprintf".to_string();
        let results = TestRunner::new("smoke", DivStrategy::Hardware).run(&set);
        assert!(!results[0].passed);
        assert!(results[0].actual.starts_with("unsupported:"));
    }

    #[test]
    fn logged_run_emits_one_record_per_case() {
        let mut log = LogEmitter::sink("run-1", "smoke");
        let results = TestRunner::new("smoke", DivStrategy::Software)
            .run_logged(&fixture(), &mut log)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(log.emitted(), 2);
    }
}
