//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fixture JSON files found in {0}")]
    NoFixtures(PathBuf),
    #[error("invalid argument '{spec}': {reason}")]
    InvalidArg { spec: String, reason: String },
    #[error("{failed} of {total} conformance cases failed")]
    VerificationFailed { failed: usize, total: usize },
    #[error("{0} invalid structured log line(s)")]
    InvalidLog(usize),
}

impl HarnessError {
    pub(crate) fn invalid_arg(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArg {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}
