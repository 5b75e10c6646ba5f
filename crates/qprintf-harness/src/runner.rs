//! Test execution engine.

use std::time::Instant;

use qprintf_core::{Arg, ArgList, FormatError, format};

use crate::diff;
use crate::error::HarnessError;
use crate::fixtures::{FixtureArg, FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::verify::{VerificationResult, escape_output};

/// Output of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Bytes the engine wrote, including anything before a failure.
    pub output: Vec<u8>,
    /// The C-contract return: the count, or `-1`.
    pub ret: i64,
    pub error: Option<FormatError>,
}

/// Run `format` against `args` and capture everything the engine produced.
pub fn render(format_str: &str, args: &[FixtureArg]) -> Result<Rendered, HarnessError> {
    let args = args
        .iter()
        .map(FixtureArg::to_arg)
        .collect::<Result<Vec<Arg<'_>>, _>>()?;
    let mut output = Vec::new();
    let result = format(format_str.as_bytes(), ArgList::new(&args), &mut output);
    let (ret, error) = match result {
        Ok(n) => match i32::try_from(n) {
            Ok(n) => (i64::from(n), None),
            Err(_) => (-1, None),
        },
        Err(err) => (-1, Some(err)),
    };
    Ok(Rendered { output, ret, error })
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| execute_case(&fixture_set.family, case))
            .collect()
    }

    /// Like [`run`](Self::run), emitting one structured log record per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::with_capacity(fixture_set.cases.len());
        for case in &fixture_set.cases {
            let started = Instant::now();
            let result = execute_case(&fixture_set.family, case);
            let elapsed = started.elapsed();

            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut entry = LogEntry::new(log.next_trace_id(), level, "case_verified")
                .with_campaign(&self.campaign)
                .with_case(&case.name, &fixture_set.family)
                .with_format(&case.format)
                .with_outcome(outcome)
                .with_returns(result.expected_return, result.actual_return)
                .with_latency_ns(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
            if let Some(code) = &result.error {
                entry = entry.with_error_code(code);
            }
            if !result.passed {
                entry = entry.with_outputs(&result.expected, &result.actual);
            }
            log.emit_entry(entry)?;
            results.push(result);
        }
        Ok(results)
    }
}

fn execute_case(family: &str, case: &FixtureCase) -> VerificationResult {
    let expected = escape_output(case.expected_output.as_bytes());
    match render(&case.format, &case.args) {
        Ok(run) => {
            let output_matches = run.output == case.expected_output.as_bytes();
            let passed = output_matches && run.ret == case.expected_return;
            let diff_out = if !output_matches {
                Some(diff::render_diff(
                    &case.expected_output,
                    &String::from_utf8_lossy(&run.output),
                ))
            } else if !passed {
                Some(format!(
                    "return mismatch: expected={}, actual={}",
                    case.expected_return, run.ret
                ))
            } else {
                None
            };
            VerificationResult {
                case_name: case.name.clone(),
                family: family.to_owned(),
                format: case.format.clone(),
                passed,
                expected,
                actual: escape_output(&run.output),
                expected_return: case.expected_return,
                actual_return: run.ret,
                error: run.error.map(|e| e.code().to_owned()),
                diff: diff_out,
            }
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            VerificationResult {
                case_name: case.name.clone(),
                family: family.to_owned(),
                format: case.format.clone(),
                passed: false,
                diff: Some(diff::render_diff(&case.expected_output, &actual)),
                expected,
                actual,
                expected_return: case.expected_return,
                actual_return: -1,
                error: Some("invalid_fixture".to_owned()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(format: &str, args: Vec<FixtureArg>, out: &str, ret: i64) -> FixtureCase {
        FixtureCase {
            name: format!("case {format}"),
            format: format.into(),
            args,
            expected_output: out.into(),
            expected_return: ret,
            note: None,
        }
    }

    fn set(cases: Vec<FixtureCase>) -> FixtureSet {
        FixtureSet {
            version: "v1".into(),
            family: "printf".into(),
            captured_at: "2026-01-01T00:00:00Z".into(),
            cases,
        }
    }

    #[test]
    fn render_keeps_partial_output_on_failure() {
        let run = render("ab%d%", &[FixtureArg::Int(7)]).unwrap();
        assert_eq!(run.output, b"ab7");
        assert_eq!(run.ret, -1);
        assert_eq!(run.error, Some(FormatError::TrailingPercent));
    }

    #[test]
    fn passing_and_failing_cases() {
        let runner = TestRunner::new("unit");
        let results = runner.run(&set(vec![
            case("%x", vec![FixtureArg::Int(3802)], "eda", 3),
            case("%d", vec![FixtureArg::Int(5)], "6", 1),
            case("%d", vec![FixtureArg::Int(5)], "5", 2),
        ]));
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert!(results[1].diff.as_deref().unwrap().contains("+5"));
        assert!(!results[2].passed);
        assert!(results[2].diff.as_deref().unwrap().starts_with("return mismatch"));
    }

    #[test]
    fn failure_cases_record_error_code() {
        let results = TestRunner::new("unit").run(&set(vec![case("%u", vec![], "", -1)]));
        assert!(results[0].passed);
        assert_eq!(results[0].error.as_deref(), Some("unsupported_conversion"));
    }

    #[test]
    fn bad_fixture_arguments_fail_the_case() {
        let results = TestRunner::new("unit").run(&set(vec![case(
            "%q",
            vec![FixtureArg::Color("MAUVE".into())],
            "",
            0,
        )]));
        assert!(!results[0].passed);
        assert_eq!(results[0].error.as_deref(), Some("invalid_fixture"));
    }

    #[test]
    fn logged_run_emits_one_record_per_case() {
        let mut log = LogEmitter::to_buffer("qprintf", "unit");
        let results = TestRunner::new("unit")
            .run_logged(
                &set(vec![
                    case("%c", vec![FixtureArg::Char("!".into())], "!", 1),
                    case("%o", vec![FixtureArg::Int(-1)], "0", 1),
                ]),
                &mut log,
            )
            .unwrap();
        assert_eq!(results.len(), 2);
        let text = log.buffer_contents().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"outcome\":\"pass\""));
        assert!(lines[1].contains("\"outcome\":\"fail\""));
        assert!(lines[1].contains("37777777777"));
    }
}
