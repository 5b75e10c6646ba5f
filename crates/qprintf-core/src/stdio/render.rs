//! Integer renderers and the shared digit scratch buffer.
//!
//! Digits are produced least-significant first into the tail of a fixed
//! stack array and read back as one contiguous slice, so the most significant
//! digit comes out first without any reversal pass or heap.

use crate::error::FormatError;

/// Scratch capacity for one 32-bit conversion: 32 binary digits plus a sign.
pub const INT_SCRATCH: usize = 33;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Fixed-capacity buffer filled from the end towards the front.
///
/// Invariant: `start <= N`; the rendered text is `bytes[start..]`.
#[derive(Debug, Clone)]
pub struct DigitBuf<const N: usize> {
    bytes: [u8; N],
    start: usize,
}

impl<const N: usize> DigitBuf<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            start: N,
        }
    }

    /// Prepend one byte. Fails instead of writing before the array.
    pub fn push_front(&mut self, byte: u8) -> Result<(), FormatError> {
        if self.start == 0 {
            return Err(FormatError::ScratchOverflow);
        }
        self.start -= 1;
        self.bytes[self.start] = byte;
        Ok(())
    }

    /// Prepend `value` in `radix`, zero-padded to at least `min_digits`.
    ///
    /// Zero with `min_digits == 1` renders as a single `0`.
    pub fn push_number(
        &mut self,
        mut value: u128,
        radix: u32,
        min_digits: usize,
    ) -> Result<(), FormatError> {
        debug_assert!((2..=16).contains(&radix));
        let radix = u128::from(radix);
        let mut emitted = 0usize;
        while value != 0 || emitted < min_digits.max(1) {
            self.push_front(DIGITS[(value % radix) as usize])?;
            value /= radix;
            emitted += 1;
        }
        Ok(())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        N - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == N
    }

    pub fn clear(&mut self) {
        self.start = N;
    }
}

impl<const N: usize> Default for DigitBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric bases used by the integer conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Binary = 2,
    Octal = 8,
    Decimal = 10,
    Hex = 16,
}

/// `%d`: optional `-`, then the decimal magnitude.
pub fn render_signed<const N: usize>(
    value: i32,
    buf: &mut DigitBuf<N>,
) -> Result<(), FormatError> {
    buf.push_number(u128::from(value.unsigned_abs()), 10, 1)?;
    if value < 0 {
        buf.push_front(b'-')?;
    }
    Ok(())
}

/// `%o %x %b` (and `%d` of a non-negative value): digits of the bit pattern.
pub fn render_unsigned<const N: usize>(
    value: u32,
    radix: Radix,
    buf: &mut DigitBuf<N>,
) -> Result<(), FormatError> {
    buf.push_number(u128::from(value), radix as u32, 1)
}

/// Bytes of a `%s` argument up to, not including, the first NUL.
#[must_use]
pub fn until_nul(text: &[u8]) -> &[u8] {
    match text.iter().position(|&b| b == 0) {
        Some(end) => &text[..end],
        None => text,
    }
}
