//! Failure diagnostics.
//!
//! With `QPRINTF_TRACE=1` every failed call writes a single key=value line to
//! stderr:
//!
//! ```text
//! qprintf: level=error event=format_failed symbol=my_printf kind=malformed code=trailing_percent
//! ```
//!
//! The line is rendered by the engine itself into a stack buffer, so tracing
//! allocates nothing and cannot recurse into a failing call.

use qprintf_core::stdio::SliceSink;
use qprintf_core::{Arg, ArgList, FormatError, format};

use crate::config::config;
use crate::output::{STDERR_FD, write_best_effort};

const LINE_FORMAT: &[u8] = b"qprintf: level=error event=format_failed symbol=%s kind=%s code=%s\n";
const LINE_CAPACITY: usize = 192;

/// Why a call failed, as reported in the trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Format(FormatError),
    NullFormat,
    NullSlots,
    TooManyArguments,
    CountOverflow,
}

impl Failure {
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Format(err) => err.kind().as_str(),
            Self::NullFormat | Self::NullSlots | Self::TooManyArguments => "argument",
            Self::CountOverflow => "overflow",
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Format(err) => err.code(),
            Self::NullFormat => "null_format",
            Self::NullSlots => "null_slots",
            Self::TooManyArguments => "too_many_arguments",
            Self::CountOverflow => "count_overflow",
        }
    }
}

impl From<FormatError> for Failure {
    fn from(err: FormatError) -> Self {
        Self::Format(err)
    }
}

/// Render the trace line for `failure` into `buf`, returning its length.
pub fn render_line(symbol: &str, failure: Failure, buf: &mut [u8]) -> Result<usize, FormatError> {
    let args = [
        Arg::from(symbol),
        Arg::from(failure.kind()),
        Arg::from(failure.code()),
    ];
    let mut sink = SliceSink::new(buf);
    format(LINE_FORMAT, ArgList::new(&args), &mut sink)
}

/// Emit the trace line if tracing is enabled.
pub fn report(symbol: &str, failure: Failure) {
    if !config().trace {
        return;
    }
    let mut line = [0u8; LINE_CAPACITY];
    if let Ok(len) = render_line(symbol, failure, &mut line) {
        write_best_effort(STDERR_FD, &line[..len]);
    }
}
