//! `my_printf` family.
//!
//! Every entry point funnels into the same two paths: format to stdout under
//! the stdout lock, or format into a caller buffer with `snprintf`
//! truncation. The variadic forms first copy their arguments out of the
//! `va_list` into 64-bit slots, one per conversion, then take the slot path.

use std::ffi::{CStr, c_char, c_int};

use qprintf_core::stdio::TruncatingSink;
use qprintf_core::{ArgCursor, FormatError, count_conversions, format_with};

use crate::config::config;
use crate::diagnostics::{Failure, report};
use crate::output::{STDOUT_FD, STDOUT_LOCK, fd_out};

/// Maximum variadic arguments extracted per call.
pub const MAX_VA_ARGS: usize = 64;

/// What a null `%s` pointer renders as.
const NULL_TEXT: &[u8] = b"(null)";

// ---------------------------------------------------------------------------
// Color constants
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub static QPRINTF_RESET: c_int = -1;
#[unsafe(no_mangle)]
pub static QPRINTF_BLACK: c_int = 0;
#[unsafe(no_mangle)]
pub static QPRINTF_RED: c_int = 1;
#[unsafe(no_mangle)]
pub static QPRINTF_GREEN: c_int = 2;
#[unsafe(no_mangle)]
pub static QPRINTF_YELLOW: c_int = 3;
#[unsafe(no_mangle)]
pub static QPRINTF_BLUE: c_int = 4;
#[unsafe(no_mangle)]
pub static QPRINTF_PURPLE: c_int = 5;
#[unsafe(no_mangle)]
pub static QPRINTF_LIGHT_BLUE: c_int = 6;

// ---------------------------------------------------------------------------
// Slot cursor
// ---------------------------------------------------------------------------

/// Argument cursor over pre-extracted 64-bit slots.
///
/// Integers occupy the low 32 bits, doubles are stored as their bit pattern
/// and strings as a pointer value.
#[derive(Debug)]
pub struct SlotCursor<'a> {
    slots: &'a [u64],
    pos: usize,
}

impl<'a> SlotCursor<'a> {
    /// # Safety
    ///
    /// Every slot that the format fetches as text must hold either zero or a
    /// pointer to a NUL-terminated string that stays valid for `'a`.
    pub unsafe fn new(slots: &'a [u64]) -> Self {
        Self { slots, pos: 0 }
    }

    #[must_use]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn take(&mut self) -> Result<u64, FormatError> {
        let slot = *self
            .slots
            .get(self.pos)
            .ok_or(FormatError::MissingArgument)?;
        self.pos += 1;
        Ok(slot)
    }
}

impl<'a> ArgCursor<'a> for SlotCursor<'a> {
    fn next_word(&mut self) -> Result<u64, FormatError> {
        self.take()
    }

    fn next_double(&mut self) -> Result<f64, FormatError> {
        self.take().map(f64::from_bits)
    }

    fn next_text(&mut self) -> Result<&'a [u8], FormatError> {
        let ptr = self.take()? as usize as *const c_char;
        if ptr.is_null() {
            return Ok(NULL_TEXT);
        }
        // SAFETY: guaranteed by the contract of `SlotCursor::new`.
        Ok(unsafe { CStr::from_ptr(ptr) }.to_bytes())
    }
}

// ---------------------------------------------------------------------------
// Shared paths
// ---------------------------------------------------------------------------

fn finish(symbol: &str, result: Result<usize, Failure>) -> c_int {
    match result.and_then(|n| c_int::try_from(n).map_err(|_| Failure::CountOverflow)) {
        Ok(n) => n,
        Err(failure) => {
            report(symbol, failure);
            -1
        }
    }
}

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn c_bytes<'a>(ptr: *const c_char) -> Option<&'a [u8]> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per the caller's contract.
        Some(unsafe { CStr::from_ptr(ptr) }.to_bytes())
    }
}

/// # Safety
///
/// `slots` must be null with `count == 0`, or valid for `count` reads.
unsafe fn slot_slice<'a>(slots: *const u64, count: usize) -> Result<&'a [u64], Failure> {
    if count == 0 {
        return Ok(&[]);
    }
    if slots.is_null() {
        return Err(Failure::NullSlots);
    }
    // SAFETY: non-null and valid for `count` elements per the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts(slots, count) })
}

fn print_to_stdout<'a>(fmt: &[u8], args: impl ArgCursor<'a>) -> Result<usize, Failure> {
    let opts = config().render_options(Some(STDOUT_FD));
    let _guard = STDOUT_LOCK.lock();
    Ok(format_with(fmt, args, fd_out(STDOUT_FD), &opts)?)
}

/// Format into `buf[..size]`, keeping at most `size - 1` bytes plus a NUL.
///
/// # Safety
///
/// `buf` must be null or valid for `size` writes.
unsafe fn print_to_buffer<'a>(
    buf: *mut c_char,
    size: usize,
    fmt: &[u8],
    args: impl ArgCursor<'a>,
) -> Result<usize, Failure> {
    let out: &mut [u8] = if buf.is_null() || size == 0 {
        &mut []
    } else {
        // SAFETY: non-null and valid for `size` bytes per the caller's contract.
        unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), size) }
    };
    let opts = config().render_options(None);
    let mut sink = TruncatingSink::new(out);
    let result = format_with(fmt, args, &mut sink, &opts);
    sink.terminate();
    Ok(result?)
}

// ---------------------------------------------------------------------------
// Slot entry points
// ---------------------------------------------------------------------------

/// `printf` with arguments pre-extracted into `slots[..count]`.
///
/// # Safety
///
/// `fmt` must be null or a valid C string; `slots` must be valid for `count`
/// reads and every slot consumed by `%s` must be null or a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn my_printf_slots(
    fmt: *const c_char,
    slots: *const u64,
    count: usize,
) -> c_int {
    const SYMBOL: &str = "my_printf_slots";
    // SAFETY: forwarded caller contract.
    let Some(fmt) = (unsafe { c_bytes(fmt) }) else {
        return finish(SYMBOL, Err(Failure::NullFormat));
    };
    // SAFETY: forwarded caller contract.
    let result = unsafe { slot_slice(slots, count) }
        .and_then(|slots| print_to_stdout(fmt, unsafe { SlotCursor::new(slots) }));
    finish(SYMBOL, result)
}

/// `snprintf` with arguments pre-extracted into `slots[..count]`.
///
/// # Safety
///
/// As [`my_printf_slots`]; additionally `buf` must be null or valid for
/// `size` writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn my_snprintf_slots(
    buf: *mut c_char,
    size: usize,
    fmt: *const c_char,
    slots: *const u64,
    count: usize,
) -> c_int {
    const SYMBOL: &str = "my_snprintf_slots";
    // SAFETY: forwarded caller contract.
    let Some(fmt) = (unsafe { c_bytes(fmt) }) else {
        return finish(SYMBOL, Err(Failure::NullFormat));
    };
    // SAFETY: forwarded caller contract.
    let result = unsafe { slot_slice(slots, count) }.and_then(|slots| unsafe {
        print_to_buffer(buf, size, fmt, SlotCursor::new(slots))
    });
    finish(SYMBOL, result)
}

// ---------------------------------------------------------------------------
// Variadic entry points
// ---------------------------------------------------------------------------

/// Reject formats whose argument count exceeds the slot array.
fn check_arg_budget(fmt: &[u8]) -> Result<(), Failure> {
    match count_conversions(fmt) {
        Ok(n) if n > MAX_VA_ARGS => Err(Failure::TooManyArguments),
        _ => Ok(()),
    }
}

/// Copy variadic arguments from `$args` into `$buf`, guided by the
/// conversions of `$fmt`. Stops at the first malformed specifier; the
/// formatting pass reports that error itself. Evaluates to the slot count.
///
/// A macro so the unstable `VaListImpl` type is never named.
#[cfg(feature = "c-variadic")]
macro_rules! extract_va_args {
    ($fmt:expr, $args:expr, $buf:expr) => {{
        use qprintf_core::ArgClass;

        let mut idx = 0usize;
        for conv in qprintf_core::stdio::conversions($fmt) {
            let Ok(conv) = conv else { break };
            if idx == $buf.len() {
                break;
            }
            $buf[idx] = match conv.arg_class() {
                ArgClass::Word => (unsafe { $args.arg::<c_int>() }) as u32 as u64,
                ArgClass::Double => unsafe { $args.arg::<f64>() }.to_bits(),
                ArgClass::Text => (unsafe { $args.arg::<*const c_char>() }) as usize as u64,
            };
            idx += 1;
        }
        idx
    }};
}

/// `printf(fmt, ...)` to stdout.
///
/// # Safety
///
/// `fmt` must be null or a valid C string, followed by arguments matching
/// its conversions (`int` for `%d %o %x %b %c %q`, `double` for `%f`,
/// `char *` for `%s`).
#[cfg(feature = "c-variadic")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn my_printf(fmt: *const c_char, mut args: ...) -> c_int {
    const SYMBOL: &str = "my_printf";
    // SAFETY: forwarded caller contract.
    let Some(fmt) = (unsafe { c_bytes(fmt) }) else {
        return finish(SYMBOL, Err(Failure::NullFormat));
    };
    if let Err(failure) = check_arg_budget(fmt) {
        return finish(SYMBOL, Err(failure));
    }
    let mut slots = [0u64; MAX_VA_ARGS];
    let extracted = extract_va_args!(fmt, &mut args, &mut slots);
    // SAFETY: text slots hold the caller's `char *` arguments.
    let cursor = unsafe { SlotCursor::new(&slots[..extracted]) };
    finish(SYMBOL, print_to_stdout(fmt, cursor))
}

/// `snprintf(buf, size, fmt, ...)`.
///
/// # Safety
///
/// As [`my_printf`]; additionally `buf` must be null or valid for `size`
/// writes.
#[cfg(feature = "c-variadic")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn my_snprintf(
    buf: *mut c_char,
    size: usize,
    fmt: *const c_char,
    mut args: ...
) -> c_int {
    const SYMBOL: &str = "my_snprintf";
    // SAFETY: forwarded caller contract.
    let Some(fmt) = (unsafe { c_bytes(fmt) }) else {
        return finish(SYMBOL, Err(Failure::NullFormat));
    };
    if let Err(failure) = check_arg_budget(fmt) {
        return finish(SYMBOL, Err(failure));
    }
    let mut slots = [0u64; MAX_VA_ARGS];
    let extracted = extract_va_args!(fmt, &mut args, &mut slots);
    // SAFETY: text slots hold the caller's `char *` arguments; buf per contract.
    let result = unsafe {
        print_to_buffer(buf, size, fmt, SlotCursor::new(&slots[..extracted]))
    };
    finish(SYMBOL, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn snprintf_slots(size: usize, fmt: &str, slots: &[u64]) -> (c_int, Vec<u8>) {
        let fmt = CString::new(fmt).unwrap();
        let mut buf = vec![0xAAu8; size];
        let n = unsafe {
            my_snprintf_slots(
                buf.as_mut_ptr().cast(),
                size,
                fmt.as_ptr(),
                slots.as_ptr(),
                slots.len(),
            )
        };
        (n, buf)
    }

    #[test]
    fn slot_cursor_reads_each_class() {
        let text = CString::new("love").unwrap();
        let slots = [
            (-1i32) as u32 as u64,
            2.5f64.to_bits(),
            text.as_ptr() as usize as u64,
            0,
        ];
        let mut cursor = unsafe { SlotCursor::new(&slots) };
        assert_eq!(cursor.next_word().map(|w| w as u32 as i32), Ok(-1));
        assert_eq!(cursor.next_double(), Ok(2.5));
        assert_eq!(cursor.next_text(), Ok(&b"love"[..]));
        assert_eq!(cursor.next_text(), Ok(NULL_TEXT));
        assert_eq!(cursor.next_word(), Err(FormatError::MissingArgument));
        assert_eq!(cursor.consumed(), 4);
    }

    #[test]
    fn snprintf_renders_and_terminates() {
        let slots = [7u64, 255];
        let (n, buf) = snprintf_slots(32, "%d:%x", &slots);
        assert_eq!(n, 4);
        assert_eq!(&buf[..5], b"7:ff\0");
    }

    #[test]
    fn null_format_fails() {
        let mut buf = [0u8; 8];
        let n = unsafe {
            my_snprintf_slots(
                buf.as_mut_ptr().cast(),
                buf.len(),
                std::ptr::null(),
                std::ptr::null(),
                0,
            )
        };
        assert_eq!(n, -1);
        assert_eq!(unsafe { my_printf_slots(std::ptr::null(), std::ptr::null(), 0) }, -1);
    }

    #[test]
    fn null_slots_with_nonzero_count_fail() {
        let fmt = CString::new("%d").unwrap();
        let mut buf = [0u8; 8];
        let n = unsafe {
            my_snprintf_slots(
                buf.as_mut_ptr().cast(),
                buf.len(),
                fmt.as_ptr(),
                std::ptr::null(),
                3,
            )
        };
        assert_eq!(n, -1);
    }

    #[test]
    fn arg_budget() {
        assert_eq!(check_arg_budget(b"%d%d"), Ok(()));
        assert_eq!(check_arg_budget("%d".repeat(MAX_VA_ARGS).as_bytes()), Ok(()));
        assert_eq!(
            check_arg_budget("%d".repeat(MAX_VA_ARGS + 1).as_bytes()),
            Err(Failure::TooManyArguments)
        );
        // Malformed formats are left for the formatting pass to report.
        assert_eq!(check_arg_budget(b"%"), Ok(()));
    }

    #[test]
    fn color_constants_match_engine() {
        use qprintf_core::Color;
        assert_eq!(QPRINTF_RESET, Color::Reset.code());
        assert_eq!(QPRINTF_GREEN, Color::Green.code());
        assert_eq!(QPRINTF_LIGHT_BLUE, Color::LightBlue.code());
    }
}
