//! Output comparison and verification.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Name of the test case.
    pub case_name: String,
    /// Fixture family the case came from.
    pub family: String,
    /// The format string under test.
    pub format: String,
    /// Whether both the bytes and the return value matched.
    pub passed: bool,
    /// Expected output, with control bytes escaped.
    pub expected: String,
    /// Actual output, with control bytes escaped.
    pub actual: String,
    pub expected_return: i64,
    pub actual_return: i64,
    /// Engine error code when the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diff if the case failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Total cases run.
    pub total: usize,
    /// Cases passed.
    pub passed: usize,
    /// Cases failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Iterate over failing results only.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Printable form of raw output: ASCII passes through, everything else is
/// shown as an escape (`\n`, `\x1b`, ...).
#[must_use]
pub fn escape_output(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: "c".into(),
            family: "printf".into(),
            format: "%d".into(),
            passed,
            expected: "1".into(),
            actual: if passed { "1".into() } else { "2".into() },
            expected_return: 1,
            actual_return: 1,
            error: None,
            diff: None,
        }
    }

    #[test]
    fn summary_counts() {
        let summary = VerificationSummary::from_results(vec![result(true), result(false), result(true)]);
        assert_eq!((summary.total, summary.passed, summary.failed), (3, 2, 1));
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn escapes_control_bytes() {
        assert_eq!(escape_output(b"\x1b[32mok\n"), "\\x1b[32mok\\n");
    }
}
