//! `%f`: fixed notation with six fractional digits.
//!
//! The decimal expansion is exact. A finite `f64` is `mantissa * 2^exp`, so
//! the six-digit result is `round(|v| * 10^6)` computed in integers:
//!
//! - `exp < 0`: `mantissa * 10^6` fits in 73 bits; shifting right by `-exp`
//!   and inspecting the shifted-out remainder gives round-half-to-even on the
//!   exact binary value, the same decision glibc makes in its default
//!   rounding mode.
//! - `exp >= 0`: the value is an integer below 2^1024 with an all-zero
//!   fraction; its decimal digits come out of a fixed-width stack integer.
//!
//! Carry from the fraction into the integer part needs no special case: it
//! falls out of rounding the scaled integer as a whole (`1.9999999` scales to
//! `1999999.9`, rounds to `2000000`).

use crate::error::FormatError;
use crate::stdio::render::DigitBuf;

/// Fractional digits printed by `%f`.
pub const FIXED_PRECISION: usize = 6;

/// Integer digits of `f64::MAX`.
const MAX_F64_INT_DIGITS: usize = 309;

/// Worst case: sign, integer digits, point, fraction.
pub const FLOAT_SCRATCH: usize = 1 + MAX_F64_INT_DIGITS + 1 + FIXED_PRECISION;

pub type FloatBuf = DigitBuf<FLOAT_SCRATCH>;

const SCALE: u128 = 1_000_000;
const MANTISSA_BITS: u32 = 52;
const EXPONENT_BIAS: i32 = 1075;

/// 33 limbs cover 1056 bits; the largest integral `f64` needs 1024.
const WIDE_LIMBS: usize = 33;
const CHUNK: u32 = 1_000_000_000;
const CHUNK_DIGITS: usize = 9;

/// Render `value` into `buf` and return the rendered text.
pub fn render_fixed(value: f64, buf: &mut FloatBuf) -> Result<&[u8], FormatError> {
    if !value.is_finite() {
        return Err(FormatError::NonFiniteFloat);
    }
    buf.clear();

    let (mantissa, exp) = decompose(value);
    if exp < 0 {
        let scaled = round_scaled(mantissa, exp.unsigned_abs());
        buf.push_number(scaled % SCALE, 10, FIXED_PRECISION)?;
        buf.push_front(b'.')?;
        buf.push_number(scaled / SCALE, 10, 1)?;
    } else {
        for _ in 0..FIXED_PRECISION {
            buf.push_front(b'0')?;
        }
        buf.push_front(b'.')?;
        let mut int_part = WideUint::from_shifted(mantissa, exp.unsigned_abs())?;
        push_wide(&mut int_part, buf)?;
    }

    if value.is_sign_negative() {
        buf.push_front(b'-')?;
    }
    Ok(buf.as_bytes())
}

/// Split a finite `f64` into an integer mantissa and a power-of-two exponent.
fn decompose(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> MANTISSA_BITS) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << MANTISSA_BITS) - 1);
    if biased == 0 {
        // Subnormal: no implicit leading one.
        (fraction, 1 - EXPONENT_BIAS)
    } else {
        (fraction | (1u64 << MANTISSA_BITS), biased - EXPONENT_BIAS)
    }
}

/// `round_half_even(mantissa * 10^6 / 2^shift)`.
fn round_scaled(mantissa: u64, shift: u32) -> u128 {
    let numerator = u128::from(mantissa) * SCALE;
    if shift >= u128::BITS {
        // numerator < 2^73, far below half of 2^shift.
        return 0;
    }
    let quotient = numerator >> shift;
    let remainder = numerator & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    if remainder > half || (remainder == half && quotient & 1 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Emit all decimal digits of `wide`, consuming it.
fn push_wide(wide: &mut WideUint, buf: &mut FloatBuf) -> Result<(), FormatError> {
    loop {
        let chunk = wide.div_rem_small(CHUNK);
        if wide.is_zero() {
            return buf.push_number(u128::from(chunk), 10, 1);
        }
        buf.push_number(u128::from(chunk), 10, CHUNK_DIGITS)?;
    }
}

/// Little-endian fixed-width unsigned integer, just wide enough for `f64`.
struct WideUint {
    limbs: [u32; WIDE_LIMBS],
    /// Significant limbs; `limbs[len..]` are zero.
    len: usize,
}

impl WideUint {
    /// `value << shift`.
    fn from_shifted(value: u64, shift: u32) -> Result<Self, FormatError> {
        let mut wide = Self {
            limbs: [0; WIDE_LIMBS],
            len: 0,
        };
        let limb_offset = (shift / 32) as usize;
        let spread = u128::from(value) << (shift % 32);
        for i in 0..3 {
            let limb = (spread >> (32 * i)) as u32;
            if limb == 0 {
                continue;
            }
            let idx = limb_offset + i;
            if idx >= WIDE_LIMBS {
                return Err(FormatError::ScratchOverflow);
            }
            wide.limbs[idx] = limb;
            wide.len = idx + 1;
        }
        Ok(wide)
    }

    fn is_zero(&self) -> bool {
        self.len == 0
    }

    /// Divide in place, returning the remainder.
    fn div_rem_small(&mut self, divisor: u32) -> u32 {
        let divisor = u64::from(divisor);
        let mut rem = 0u64;
        for limb in self.limbs[..self.len].iter_mut().rev() {
            let cur = (rem << 32) | u64::from(*limb);
            *limb = (cur / divisor) as u32;
            rem = cur % divisor;
        }
        while self.len > 0 && self.limbs[self.len - 1] == 0 {
            self.len -= 1;
        }
        rem as u32
    }
}
