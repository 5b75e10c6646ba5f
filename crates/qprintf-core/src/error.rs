//! Error taxonomy for the formatting engine.
//!
//! Every failure aborts the current call. At the C boundary the only visible
//! signal is the `-1` return value; the variants below exist so Rust callers,
//! diagnostics and the conformance harness can tell failures apart.

use thiserror::Error;

/// Failure raised while scanning a format string or rendering a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The format string ends right after a `%`.
    #[error("format string ends with a lone '%'")]
    TrailingPercent,
    /// `%` is followed by a byte that is not part of any printf grammar.
    #[error("unknown conversion byte {0:#04x} after '%'")]
    UnknownConversion(u8),
    /// `%` is followed by a standard printf conversion, flag, width or length
    /// modifier that this engine does not implement.
    #[error("conversion byte {0:#04x} is not implemented")]
    UnsupportedConversion(u8),
    /// A rendered value did not fit its scratch buffer.
    #[error("rendered value does not fit the scratch buffer")]
    ScratchOverflow,
    /// `%q` received a code outside the color enumeration.
    #[error("color code {0} is out of range")]
    InvalidColor(i32),
    /// `%f` received an infinity or NaN.
    #[error("cannot render a non-finite value in fixed notation")]
    NonFiniteFloat,
    /// The argument cursor ran out before the format string did.
    #[error("argument list exhausted")]
    MissingArgument,
    /// A text argument was fetched as a number, or a number as text.
    #[error("argument class does not match the conversion")]
    ArgumentMismatch,
    /// A fixed-capacity sink has no room left.
    #[error("output buffer is full")]
    SinkFull,
    /// The underlying file descriptor rejected a write.
    #[error("output sink failed with errno {0}")]
    Sink(i32),
}

/// Coarse grouping of [`FormatError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Trailing `%` or unknown conversion byte.
    Malformed,
    /// Recognisable printf syntax outside the supported subset.
    Unsupported,
    /// Scratch buffer capacity exceeded.
    Overflow,
    /// Out-of-range enumerated input or non-finite float.
    InvalidInput,
    /// Argument list exhausted or of the wrong class.
    Argument,
    /// The sink refused bytes.
    Output,
}

impl FormatError {
    /// Which part of the error taxonomy this failure belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::TrailingPercent | Self::UnknownConversion(_) => ErrorKind::Malformed,
            Self::UnsupportedConversion(_) => ErrorKind::Unsupported,
            Self::ScratchOverflow => ErrorKind::Overflow,
            Self::InvalidColor(_) | Self::NonFiniteFloat => ErrorKind::InvalidInput,
            Self::MissingArgument | Self::ArgumentMismatch => ErrorKind::Argument,
            Self::SinkFull | Self::Sink(_) => ErrorKind::Output,
        }
    }

    /// Stable snake_case token, used by diagnostics and logs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TrailingPercent => "trailing_percent",
            Self::UnknownConversion(_) => "unknown_conversion",
            Self::UnsupportedConversion(_) => "unsupported_conversion",
            Self::ScratchOverflow => "scratch_overflow",
            Self::InvalidColor(_) => "invalid_color",
            Self::NonFiniteFloat => "non_finite_float",
            Self::MissingArgument => "missing_argument",
            Self::ArgumentMismatch => "argument_mismatch",
            Self::SinkFull => "sink_full",
            Self::Sink(_) => "sink_error",
        }
    }
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Unsupported => "unsupported",
            Self::Overflow => "overflow",
            Self::InvalidInput => "invalid_input",
            Self::Argument => "argument",
            Self::Output => "output",
        }
    }
}
