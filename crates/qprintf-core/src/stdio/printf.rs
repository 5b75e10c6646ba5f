//! printf formatting engine.
//!
//! The dialect is deliberately small: `%` is followed by exactly one
//! conversion byte from `b c o x d s f q %`. There is no flag, width,
//! precision or length-modifier grammar, and nothing is ever guessed: a
//! trailing `%` or an unrecognised byte aborts the call.
//!
//! Output is streamed. Each literal run and each rendered conversion goes to
//! the sink as soon as it is ready, so a failure at conversion *k* leaves the
//! output of everything before *k* in place and never touches *k + 1*.

use crate::error::FormatError;
use crate::stdio::args::ArgCursor;
use crate::stdio::color::{Color, ColorPolicy};
use crate::stdio::float::{FloatBuf, render_fixed};
use crate::stdio::render::{DigitBuf, INT_SCRATCH, Radix, render_signed, render_unsigned, until_nul};
use crate::stdio::sink::Sink;

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// A supported conversion letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// `%b`
    Binary,
    /// `%c`
    Char,
    /// `%o`
    Octal,
    /// `%x`
    Hex,
    /// `%d`
    Decimal,
    /// `%s`
    Str,
    /// `%f`
    Float,
    /// `%q`
    Color,
}

/// Which cursor fetch a conversion performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgClass {
    /// A C `int` (also `char` and color codes, which are promoted to `int`).
    Word,
    Double,
    Text,
}

impl Conversion {
    pub const ALL: [Conversion; 8] = [
        Conversion::Binary,
        Conversion::Char,
        Conversion::Octal,
        Conversion::Hex,
        Conversion::Decimal,
        Conversion::Str,
        Conversion::Float,
        Conversion::Color,
    ];

    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'b' => Self::Binary,
            b'c' => Self::Char,
            b'o' => Self::Octal,
            b'x' => Self::Hex,
            b'd' => Self::Decimal,
            b's' => Self::Str,
            b'f' => Self::Float,
            b'q' => Self::Color,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Binary => b'b',
            Self::Char => b'c',
            Self::Octal => b'o',
            Self::Hex => b'x',
            Self::Decimal => b'd',
            Self::Str => b's',
            Self::Float => b'f',
            Self::Color => b'q',
        }
    }

    #[must_use]
    pub const fn arg_class(self) -> ArgClass {
        match self {
            Self::Float => ArgClass::Double,
            Self::Str => ArgClass::Text,
            _ => ArgClass::Word,
        }
    }
}

/// Bytes that start a standard printf directive this engine does not
/// implement: other conversions, flags, width, precision, length modifiers.
const RESERVED: &[u8] = b"iuXFeEgGaApnmCS-+ #0123456789.*hljztL";

fn classify_unrecognised(byte: u8) -> FormatError {
    if RESERVED.contains(&byte) {
        FormatError::UnsupportedConversion(byte)
    } else {
        FormatError::UnknownConversion(byte)
    }
}

// ---------------------------------------------------------------------------
// Segment: parsed pieces of a format string
// ---------------------------------------------------------------------------

/// A segment of a parsed format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%', consume no argument).
    Percent,
    /// A conversion consuming exactly one argument.
    Spec(Conversion),
}

/// Iterator over the segments of a format string.
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    fmt: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<FormatSegment<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.fmt.len() {
            return None;
        }
        let rest = &self.fmt[self.pos..];

        if rest[0] != b'%' {
            let run = rest.iter().position(|&b| b == b'%').unwrap_or(rest.len());
            self.pos += run;
            return Some(Ok(FormatSegment::Literal(&rest[..run])));
        }

        let Some(&byte) = rest.get(1) else {
            self.failed = true;
            return Some(Err(FormatError::TrailingPercent));
        };
        self.pos += 2;
        let segment = if byte == b'%' {
            Ok(FormatSegment::Percent)
        } else {
            Conversion::from_byte(byte)
                .map(FormatSegment::Spec)
                .ok_or_else(|| classify_unrecognised(byte))
        };
        self.failed = segment.is_err();
        Some(segment)
    }
}

impl core::iter::FusedIterator for Segments<'_> {}

/// Iterate over segments of a printf format string.
///
/// The string ends at its first NUL byte, if any, as a C string would.
#[must_use]
pub fn parse_format_string(fmt: &[u8]) -> Segments<'_> {
    Segments {
        fmt: until_nul(fmt),
        pos: 0,
        failed: false,
    }
}

/// The argument-consuming conversions of `fmt`, in order.
pub fn conversions(fmt: &[u8]) -> impl Iterator<Item = Result<Conversion, FormatError>> + '_ {
    parse_format_string(fmt).filter_map(|segment| match segment {
        Ok(FormatSegment::Spec(conv)) => Some(Ok(conv)),
        Ok(_) => None,
        Err(err) => Some(Err(err)),
    })
}

/// Number of arguments a successful call with `fmt` consumes.
pub fn count_conversions(fmt: &[u8]) -> Result<usize, FormatError> {
    conversions(fmt).try_fold(0usize, |n, conv| conv.map(|_| n + 1))
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Per-call rendering knobs. The engine never reads the environment; callers
/// that want configurable behavior build one of these.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: ColorPolicy,
}

impl RenderOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            color: ColorPolicy::Always,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: ColorPolicy) -> Self {
        self.color = color;
        self
    }
}

/// Format `fmt` with default options. Returns the number of units written.
pub fn format<'a, S: Sink, A: ArgCursor<'a>>(
    fmt: &[u8],
    args: A,
    sink: S,
) -> Result<usize, FormatError> {
    format_with(fmt, args, sink, &RenderOptions::new())
}

/// Format `fmt`, streaming into `sink`.
///
/// Color escapes are written but not counted. On error the sink keeps what
/// was written before the failing segment.
pub fn format_with<'a, S: Sink, A: ArgCursor<'a>>(
    fmt: &[u8],
    mut args: A,
    mut sink: S,
    opts: &RenderOptions,
) -> Result<usize, FormatError> {
    let mut count = 0usize;
    for segment in parse_format_string(fmt) {
        count += match segment? {
            FormatSegment::Literal(run) => emit(&mut sink, run)?,
            FormatSegment::Percent => emit(&mut sink, b"%")?,
            FormatSegment::Spec(conv) => render_conversion(conv, &mut args, &mut sink, opts)?,
        };
    }
    Ok(count)
}

/// The C contract: the unit count on success, `-1` on any failure.
///
/// A count that does not fit in an `int` is also a failure.
pub fn formatted_write<'a, S: Sink, A: ArgCursor<'a>>(fmt: &[u8], args: A, sink: S) -> i32 {
    format(fmt, args, sink)
        .ok()
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(-1)
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn emit<S: Sink>(sink: &mut S, bytes: &[u8]) -> Result<usize, FormatError> {
    sink.write_bytes(bytes)?;
    Ok(bytes.len())
}

/// `%o %x %b` operate on the low 32 bits of the slot.
fn emit_unsigned<S: Sink>(word: u64, radix: Radix, sink: &mut S) -> Result<usize, FormatError> {
    let mut digits = DigitBuf::<INT_SCRATCH>::new();
    render_unsigned(word as u32, radix, &mut digits)?;
    emit(sink, digits.as_bytes())
}

/// Fetch one argument for `conv`, render it and write it out.
fn render_conversion<'a, S: Sink, A: ArgCursor<'a>>(
    conv: Conversion,
    args: &mut A,
    sink: &mut S,
    opts: &RenderOptions,
) -> Result<usize, FormatError> {
    match conv {
        Conversion::Char => {
            let byte = args.next_word()? as u8;
            emit(sink, &[byte])
        }
        Conversion::Str => {
            let text = until_nul(args.next_text()?);
            emit(sink, text)
        }
        Conversion::Decimal => {
            let mut digits = DigitBuf::<INT_SCRATCH>::new();
            render_signed(args.next_word()? as u32 as i32, &mut digits)?;
            emit(sink, digits.as_bytes())
        }
        Conversion::Binary => emit_unsigned(args.next_word()?, Radix::Binary, sink),
        Conversion::Octal => emit_unsigned(args.next_word()?, Radix::Octal, sink),
        Conversion::Hex => emit_unsigned(args.next_word()?, Radix::Hex, sink),
        Conversion::Float => {
            let mut buf = FloatBuf::new();
            let text = render_fixed(args.next_double()?, &mut buf)?;
            emit(sink, text)
        }
        Conversion::Color => {
            let color = Color::from_code(args.next_word()? as u32 as i32)?;
            if opts.color.emits() {
                sink.write_bytes(color.escape())?;
            }
            Ok(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
