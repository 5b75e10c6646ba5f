//! CLI entrypoint for the qprintf conformance harness.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qprintf_harness::report::FixtureDigest;
use qprintf_harness::runner::render;
use qprintf_harness::structured_log::{LogEmitter, LogLevel, now_utc, validate_log_file};
use qprintf_harness::verify::escape_output;
use qprintf_harness::{
    ConformanceReport, FixtureArg, HarnessError, LoadedFixture, TestRunner, VerificationSummary,
};

/// Conformance tooling for qprintf.
#[derive(Debug, Parser)]
#[command(name = "qprintf-harness")]
#[command(about = "Conformance testing harness for qprintf")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the engine against captured fixtures.
    Verify {
        /// Fixture JSON file, or a directory of them.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown). A JSON twin is written next to it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print the JSON report to stdout instead of a summary.
        #[arg(long)]
        json: bool,
        /// Write one structured JSONL record per case to this path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Campaign name recorded in reports and logs.
        #[arg(long, default_value = "fixture-verify")]
        campaign: String,
    },
    /// Render one format string and show the bytes and return value.
    Render {
        /// Format string.
        #[arg(long)]
        format: String,
        /// Argument as kind:value (int, char, double, str, color). Repeatable.
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Write the raw bytes instead of an escaped rendering.
        #[arg(long)]
        raw: bool,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            json,
            log,
            campaign,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let fixtures = if fixture.is_dir() {
                LoadedFixture::load_dir(&fixture)?
            } else {
                vec![LoadedFixture::load(&fixture)?]
            };

            let runner = TestRunner::new(&campaign);
            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, "qprintf", &campaign)?),
                None => None,
            };
            let mut results = Vec::new();
            for loaded in &fixtures {
                match emitter.as_mut() {
                    Some(emitter) => results.extend(runner.run_logged(&loaded.set, emitter)?),
                    None => results.extend(runner.run(&loaded.set)),
                }
            }

            let summary = VerificationSummary::from_results(results);
            if let Some(emitter) = emitter.as_mut() {
                let level = if summary.all_passed() {
                    LogLevel::Info
                } else {
                    LogLevel::Error
                };
                emitter.emit(level, "verify_complete")?;
                emitter.flush()?;
            }

            let report_doc = ConformanceReport {
                title: String::from("qprintf Conformance Report"),
                campaign,
                timestamp: now_utc(),
                fixtures: fixtures.iter().map(FixtureDigest::from).collect(),
                summary,
            };

            if let Some(path) = report {
                std::fs::write(&path, report_doc.to_markdown())?;
                std::fs::write(path.with_extension("json"), report_doc.to_json())?;
                eprintln!("Report written to {}", path.display());
            }

            if json {
                println!("{}", report_doc.to_json());
            } else {
                for r in report_doc.summary.failures() {
                    eprintln!("FAIL {} ({})", r.case_name, r.format.escape_debug());
                    if let Some(diff) = &r.diff {
                        eprintln!("{diff}");
                    }
                }
                eprintln!(
                    "Results: {}/{} passed",
                    report_doc.summary.passed, report_doc.summary.total
                );
            }

            if !report_doc.summary.all_passed() {
                return Err(HarnessError::VerificationFailed {
                    failed: report_doc.summary.failed,
                    total: report_doc.summary.total,
                }
                .into());
            }
        }
        Command::Render { format, args, raw } => {
            let args = args
                .iter()
                .map(|spec| FixtureArg::parse_cli(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let run = render(&format, &args)?;
            if raw {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&run.output)?;
                stdout.flush()?;
            } else {
                println!("output: \"{}\"", escape_output(&run.output));
            }
            match run.error {
                Some(err) => eprintln!("return: {} ({}: {err})", run.ret, err.code()),
                None => eprintln!("return: {}", run.ret),
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!("{lines} line(s), {} error(s)", errors.len());
            if !errors.is_empty() {
                return Err(HarnessError::InvalidLog(errors.len()).into());
            }
        }
    }

    Ok(())
}
