//! Fixture loading and management.
//!
//! A fixture file pins the exact bytes and return value a reference printf
//! produced for each case. Cases that must fail carry `expected_return: -1`
//! and the output written before the failure.

use std::path::{Path, PathBuf};

use qprintf_core::{Arg, Color};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HarnessError;

/// One argument as written in a fixture file.
///
/// ```json
/// {"kind": "int", "value": -1}
/// {"kind": "color", "value": "GREEN"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FixtureArg {
    Int(i32),
    /// A single character whose code point fits in a byte.
    Char(String),
    Double(f64),
    Str(String),
    /// A `%q` color by header name.
    Color(String),
}

impl FixtureArg {
    /// Convert to the engine's argument type.
    pub fn to_arg(&self) -> Result<Arg<'_>, HarnessError> {
        match self {
            Self::Int(v) => Ok(Arg::Int(*v)),
            Self::Char(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => u8::try_from(u32::from(c))
                        .map(Arg::Char)
                        .map_err(|_| HarnessError::invalid_arg(s.clone(), "char does not fit in a byte")),
                    _ => Err(HarnessError::invalid_arg(s.clone(), "char must be exactly one character")),
                }
            }
            Self::Double(d) => Ok(Arg::Double(*d)),
            Self::Str(s) => Ok(Arg::Str(s.as_bytes())),
            Self::Color(name) => Color::from_name(name)
                .map(Arg::from)
                .ok_or_else(|| HarnessError::invalid_arg(name.clone(), "unknown color name")),
        }
    }

    /// Parse the command-line form `kind:value`, e.g. `int:-1` or `str:love`.
    pub fn parse_cli(spec: &str) -> Result<Self, HarnessError> {
        let (kind, value) = spec
            .split_once(':')
            .ok_or_else(|| HarnessError::invalid_arg(spec, "expected kind:value"))?;
        let arg = match kind {
            "int" => Self::Int(
                value
                    .parse()
                    .map_err(|_| HarnessError::invalid_arg(spec, "not a 32-bit integer"))?,
            ),
            "char" => Self::Char(value.to_owned()),
            "double" => Self::Double(
                value
                    .parse()
                    .map_err(|_| HarnessError::invalid_arg(spec, "not a floating-point number"))?,
            ),
            "str" => Self::Str(value.to_owned()),
            "color" => Self::Color(value.to_owned()),
            _ => return Err(HarnessError::invalid_arg(spec, "unknown kind")),
        };
        // Surface bad chars and colors now rather than at render time.
        arg.to_arg()?;
        Ok(arg)
    }
}

/// A single test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    pub name: String,
    pub format: String,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    pub expected_output: String,
    pub expected_return: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    pub version: String,
    pub family: String,
    pub captured_at: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        Ok(LoadedFixture::load(path)?.set)
    }
}

/// A fixture set together with where it came from and the SHA-256 of its
/// bytes, so reports pin exactly which expectations were checked.
#[derive(Debug, Clone)]
pub struct LoadedFixture {
    pub path: PathBuf,
    pub sha256: String,
    pub set: FixtureSet,
}

impl LoadedFixture {
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        let set = FixtureSet::from_json(&content).map_err(|source| HarnessError::Fixture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            sha256: sha256_hex(content.as_bytes()),
            set,
        })
    }

    /// Load every `*.json` file in `dir`, sorted by path.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, HarnessError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(HarnessError::NoFixtures(dir.to_path_buf()));
        }
        paths.iter().map(|p| Self::load(p)).collect()
    }
}

/// Lower-case hex SHA-256 digest.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
