//! Terminal colors for the `%q` conversion.
//!
//! Escapes are ANSI SGR sequences. They are control output, not content, so
//! they never contribute to a call's returned count.

use crate::error::FormatError;

/// Color codes accepted by `%q`. The discriminants are the C-side values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Color {
    Reset = -1,
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Purple = 5,
    LightBlue = 6,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Reset,
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Purple,
        Color::LightBlue,
    ];

    /// Map a raw `%q` argument to a color.
    pub const fn from_code(code: i32) -> Result<Self, FormatError> {
        Ok(match code {
            -1 => Self::Reset,
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Purple,
            6 => Self::LightBlue,
            _ => return Err(FormatError::InvalidColor(code)),
        })
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Escape sequence selecting this color (or restoring defaults).
    #[must_use]
    pub const fn escape(self) -> &'static [u8] {
        match self {
            Self::Reset => b"\x1b[0m",
            Self::Black => b"\x1b[30m",
            Self::Red => b"\x1b[31m",
            Self::Green => b"\x1b[32m",
            Self::Yellow => b"\x1b[33m",
            Self::Blue => b"\x1b[34m",
            Self::Purple => b"\x1b[35m",
            Self::LightBlue => b"\x1b[36m",
        }
    }

    /// Upper-case name as used by the C header.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "RESET",
            Self::Black => "BLACK",
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Blue => "BLUE",
            Self::Purple => "PURPLE",
            Self::LightBlue => "LIGHT_BLUE",
        }
    }

    /// Parse a header name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

/// Whether `%q` writes its escape sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorPolicy {
    /// Emit escapes.
    #[default]
    Always,
    /// Validate and consume the argument, emit nothing.
    Never,
}

impl ColorPolicy {
    #[must_use]
    pub const fn emits(self) -> bool {
        matches!(self, Self::Always)
    }
}
