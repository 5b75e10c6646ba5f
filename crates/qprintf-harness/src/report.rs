//! Report generation for conformance results.

use serde::{Deserialize, Serialize};

use crate::fixtures::LoadedFixture;
use crate::verify::VerificationSummary;

/// Provenance of one fixture file that fed the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureDigest {
    pub path: String,
    pub family: String,
    pub version: String,
    pub cases: usize,
    pub sha256: String,
}

impl From<&LoadedFixture> for FixtureDigest {
    fn from(fixture: &LoadedFixture) -> Self {
        Self {
            path: fixture.path.display().to_string(),
            family: fixture.set.family.clone(),
            version: fixture.set.version.clone(),
            cases: fixture.set.cases.len(),
            sha256: fixture.sha256.clone(),
        }
    }
}

/// A conformance report combining verification results and fixture provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Campaign name the runner was created with.
    pub campaign: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    pub fixtures: Vec<FixtureDigest>,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Campaign: {}\n", self.campaign));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        if !self.fixtures.is_empty() {
            out.push_str("## Fixtures\n\n");
            out.push_str("| File | Family | Version | Cases | SHA-256 |\n");
            out.push_str("|------|--------|---------|-------|---------|\n");
            for f in &self.fixtures {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | `{}` |\n",
                    f.path, f.family, f.version, f.cases, f.sha256
                ));
            }
            out.push('\n');
        }

        out.push_str("## Cases\n\n");
        out.push_str("| Case | Format | Return | Status |\n");
        out.push_str("|------|--------|--------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | `{}` | {} | {} |\n",
                r.case_name,
                escape_cell(&r.format),
                r.actual_return,
                status
            ));
        }

        let failures: Vec<_> = self.summary.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n", r.case_name));
                if let Some(code) = &r.error {
                    out.push_str(&format!("- Error: `{code}`\n"));
                }
                out.push_str(&format!(
                    "- Return: expected {}, actual {}\n",
                    r.expected_return, r.actual_return
                ));
                if let Some(diff) = &r.diff {
                    out.push_str(&format!("\n```diff\n{}\n```\n", diff.trim_end()));
                }
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

fn escape_cell(text: &str) -> String {
    text.escape_debug().to_string().replace('|', "\\|")
}
