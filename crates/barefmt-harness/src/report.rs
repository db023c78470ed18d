//! Report generation for conformance results.

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Strategies covered (`hardware`, `software` or `both`).
    pub mode: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown. Failing cases get their diff appended
    /// in a details section.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Mode: {}\n", self.mode));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Family | Clause | Mode | Status |\n");
        out.push_str("|------|--------|--------|------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                r.case_name, r.family, r.clause, r.mode, status
            ));
        }

        let mut failures = self.summary.failures().peekable();
        if failures.peek().is_some() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n```diff\n", r.case_name));
                out.push_str(r.diff.as_deref().unwrap_or("(no diff)"));
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```\n");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{VerificationResult, VerificationSummary};

    fn result(name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: name.to_string(),
            family: "stdio/printf".to_string(),
            clause: "bounded".to_string(),
            mode: "hardware".to_string(),
            passed,
            expected: "1|a\\0".to_string(),
            actual: if passed { "1|a\\0" } else { "0|\\0" }.to_string(),
            diff: (!passed).then(|| crate::diff::render_diff("1|a\\0", "0|\\0")),
        }
    }

    #[test]
    fn markdown_lists_cases_and_failure_diffs() {
        let report = ConformanceReport {
            title: "barefmt Conformance Report".to_string(),
            mode: "both".to_string(),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            summary: VerificationSummary::from_results(vec![
                result("ok", true),
                result("bad", false),
            ]),
        };
        let md = report.to_markdown();
        assert!(md.starts_with("# barefmt Conformance Report"));
        assert!(md.contains("- Failed: 1"));
        assert!(md.contains("| ok | stdio/printf | bounded | hardware | PASS |"));
        assert!(md.contains("### bad"));
        assert!(md.contains("-1|a\\0"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["summary"]["total"], 2);
    }
}
