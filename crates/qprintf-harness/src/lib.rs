//! Conformance testing harness for qprintf.
//!
//! This crate provides:
//! - Fixtures: expected output captured ahead of time from a reference printf
//! - Runner: replay fixtures through the engine and compare bytes and counts
//! - Reports: markdown + JSON summaries carrying fixture digests
//! - Structured logs: canonical JSONL records and their validator
//!
//! The harness never calls the host printf; fixtures are the only oracle.

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureArg, FixtureCase, FixtureSet, LoadedFixture};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
