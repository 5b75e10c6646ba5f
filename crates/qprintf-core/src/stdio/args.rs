//! Argument cursor: the engine's view of the caller's variadic list.
//!
//! Fetches are type-directed. The scanner decides which class to pull
//! (integer word, double, or text) from the conversion letter alone and never
//! inspects what the caller actually passed. Between the numeric classes the
//! raw bits are reinterpreted without any check, exactly like reading the
//! wrong type out of a C `va_list`; that mismatch is undefined by contract.

use crate::error::FormatError;
use crate::stdio::color::Color;

/// Forward-only source of conversion arguments.
///
/// Each call consumes exactly one argument. There is no way to rewind.
pub trait ArgCursor<'a> {
    /// Next argument of the integer class (`%d %o %x %b %c %q`).
    ///
    /// The value is a raw 64-bit slot; conversions truncate it to the C `int`
    /// they expect.
    fn next_word(&mut self) -> Result<u64, FormatError>;

    /// Next argument of the floating-point class (`%f`).
    fn next_double(&mut self) -> Result<f64, FormatError>;

    /// Next text argument (`%s`).
    fn next_text(&mut self) -> Result<&'a [u8], FormatError>;
}

impl<'a, C: ArgCursor<'a> + ?Sized> ArgCursor<'a> for &mut C {
    fn next_word(&mut self) -> Result<u64, FormatError> {
        (**self).next_word()
    }

    fn next_double(&mut self) -> Result<f64, FormatError> {
        (**self).next_double()
    }

    fn next_text(&mut self) -> Result<&'a [u8], FormatError> {
        (**self).next_text()
    }
}

/// One caller-supplied argument.
///
/// Integers are C `int`s: `%d %o %x %b` all operate on the 32-bit pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    Int(i32),
    Char(u8),
    Double(f64),
    /// Text; rendering stops at the first NUL byte if one is present.
    Str(&'a [u8]),
}

impl Arg<'_> {
    /// Raw slot bits for the numeric classes, `None` for text.
    #[must_use]
    pub fn bits(&self) -> Option<u64> {
        match *self {
            // Sign-extended, as a promoted `int` sits in a 64-bit slot.
            Self::Int(v) => Some(i64::from(v) as u64),
            Self::Char(c) => Some(u64::from(c)),
            Self::Double(d) => Some(d.to_bits()),
            Self::Str(_) => None,
        }
    }
}

impl From<i32> for Arg<'_> {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Arg<'_> {
    fn from(v: u32) -> Self {
        Self::Int(v as i32)
    }
}

impl From<u8> for Arg<'_> {
    fn from(c: u8) -> Self {
        Self::Char(c)
    }
}

impl From<char> for Arg<'_> {
    /// Only the low byte survives, as with a C `char`.
    fn from(c: char) -> Self {
        Self::Char(c as u32 as u8)
    }
}

impl From<f64> for Arg<'_> {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<f32> for Arg<'_> {
    fn from(f: f32) -> Self {
        Self::Double(f64::from(f))
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(s: &'a [u8]) -> Self {
        Self::Str(s)
    }
}

impl From<Color> for Arg<'_> {
    fn from(color: Color) -> Self {
        Self::Int(color.code())
    }
}

/// Cursor over a borrowed slice of [`Arg`]s.
#[derive(Debug, Clone)]
pub struct ArgList<'a, 'b> {
    args: &'b [Arg<'a>],
    pos: usize,
}

impl<'a, 'b> ArgList<'a, 'b> {
    #[must_use]
    pub const fn new(args: &'b [Arg<'a>]) -> Self {
        Self { args, pos: 0 }
    }

    /// Number of arguments taken so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.pos
    }

    /// Number of arguments not yet taken.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.args.len() - self.pos
    }

    fn take(&mut self) -> Result<Arg<'a>, FormatError> {
        let arg = *self.args.get(self.pos).ok_or(FormatError::MissingArgument)?;
        self.pos += 1;
        Ok(arg)
    }
}

impl<'a> ArgCursor<'a> for ArgList<'a, '_> {
    fn next_word(&mut self) -> Result<u64, FormatError> {
        self.take()?.bits().ok_or(FormatError::ArgumentMismatch)
    }

    fn next_double(&mut self) -> Result<f64, FormatError> {
        match self.take()? {
            Arg::Double(d) => Ok(d),
            other => other
                .bits()
                .map(f64::from_bits)
                .ok_or(FormatError::ArgumentMismatch),
        }
    }

    fn next_text(&mut self) -> Result<&'a [u8], FormatError> {
        match self.take()? {
            Arg::Str(s) => Ok(s),
            _ => Err(FormatError::ArgumentMismatch),
        }
    }
}
