//! Integration tests for the slot-based C entry points.

use std::ffi::{CString, c_char, c_int};
use std::ptr;
use std::sync::Mutex;

use qprintf::printf_abi::{QPRINTF_GREEN, QPRINTF_RESET};
use qprintf::{my_printf_slots, my_snprintf_slots};

static STDOUT_REDIRECT: Mutex<()> = Mutex::new(());

fn int(v: i32) -> u64 {
    v as u32 as u64
}

fn double(v: f64) -> u64 {
    v.to_bits()
}

fn text(s: &CString) -> u64 {
    s.as_ptr() as usize as u64
}

fn snprintf(size: usize, fmt: &str, slots: &[u64]) -> (c_int, Vec<u8>) {
    let fmt = CString::new(fmt).unwrap();
    let mut buf = vec![0xAAu8; size];
    // SAFETY: buf is valid for `size` bytes; text slots point to live CStrings.
    let n = unsafe {
        my_snprintf_slots(
            buf.as_mut_ptr().cast::<c_char>(),
            size,
            fmt.as_ptr(),
            slots.as_ptr(),
            slots.len(),
        )
    };
    (n, buf)
}

/// Run `f` with fd 1 redirected into a pipe and return what it wrote.
fn capture_stdout(f: impl FnOnce() -> c_int) -> (c_int, Vec<u8>) {
    let _guard = STDOUT_REDIRECT.lock().unwrap();
    let mut fds = [0 as c_int; 2];
    // SAFETY: plain fd juggling on descriptors this function owns.
    unsafe {
        assert_eq!(libc::pipe(fds.as_mut_ptr()), 0);
        let saved = libc::dup(1);
        assert!(saved >= 0);
        assert_eq!(libc::dup2(fds[1], 1), 1);

        let ret = f();

        assert_eq!(libc::dup2(saved, 1), 1);
        libc::close(saved);
        libc::close(fds[1]);

        let mut out = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = libc::read(fds[0], chunk.as_mut_ptr().cast(), chunk.len());
            if n <= 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n as usize]);
        }
        libc::close(fds[0]);
        (ret, out)
    }
}

#[test]
fn mixed_line_into_buffer() {
    let love = CString::new("love").unwrap();
    let slots = [int(-1), text(&love), int(3802), int(100), int(33)];
    let (n, buf) = snprintf(64, "%d %s %x %o %b\n", &slots);
    assert_eq!(n, 23);
    assert_eq!(&buf[..24], b"-1 love eda 144 100001\n\0");
}

#[test]
fn float_line_into_buffer() {
    let papoe = CString::new("papoe").unwrap();
    let slots = [
        double(112313.12312),
        int(123),
        text(&papoe),
        double(14.88),
        int(b'1' as i32),
        int(0b1111_0000),
    ];
    let (n, buf) = snprintf(64, "%f %d %s %f %c %b\n", &slots);
    assert_eq!(n, 45);
    assert_eq!(&buf[..46], b"112313.123120 123 papoe 14.880000 1 11110000\n\0");
}

#[test]
fn truncation_keeps_prefix_and_full_count() {
    let (n, buf) = snprintf(5, "%d-%d", &[int(1234), int(5678)]);
    assert_eq!(n, 9);
    assert_eq!(&buf, b"1234\0");
}

#[test]
fn size_zero_writes_nothing_but_counts() {
    let (n, buf) = snprintf(0, "%s", &[text(&CString::new("abc").unwrap())]);
    assert_eq!(n, 3);
    assert!(buf.is_empty());

    let fmt = CString::new("%d").unwrap();
    let slot = [int(42)];
    // SAFETY: a null buffer with size 0 is never written.
    let n = unsafe { my_snprintf_slots(ptr::null_mut(), 0, fmt.as_ptr(), slot.as_ptr(), 1) };
    assert_eq!(n, 2);
}

#[test]
fn null_string_renders_placeholder() {
    let (n, buf) = snprintf(16, "[%s]", &[0]);
    assert_eq!(n, 8);
    assert_eq!(&buf[..9], b"[(null)]\0");
}

#[test]
fn failure_returns_sentinel_and_terminates_prefix() {
    let (n, buf) = snprintf(16, "ab%d%", &[int(7)]);
    assert_eq!(n, -1);
    assert_eq!(&buf[..4], b"ab7\0");

    let (n, _) = snprintf(16, "%q", &[int(7)]);
    assert_eq!(n, -1);

    let (n, _) = snprintf(16, "%d %d", &[int(7)]);
    assert_eq!(n, -1, "missing slot");
}

#[test]
fn colors_use_exported_codes() {
    let (n, buf) = snprintf(32, "%qok%q", &[int(QPRINTF_GREEN), int(QPRINTF_RESET)]);
    assert_eq!(n, 2);
    // Escapes are written to buffers unless QPRINTF_COLOR says otherwise.
    if std::env::var("QPRINTF_COLOR").is_err() {
        assert_eq!(&buf[..11], b"\x1b[32mok\x1b[0m");
    }
}

#[test]
fn printf_slots_writes_to_stdout() {
    let love = CString::new("love").unwrap();
    let fmt = CString::new("%o\n%d %s %x %d%%%c%b\n").unwrap();
    let slots = [
        int(-1),
        int(-1),
        text(&love),
        int(3802),
        int(100),
        int(b'!' as i32),
        int(127),
    ];
    let (n, out) = capture_stdout(|| {
        // SAFETY: fmt and love outlive the call.
        unsafe { my_printf_slots(fmt.as_ptr(), slots.as_ptr(), slots.len()) }
    });
    assert_eq!(n, 37);
    assert_eq!(out, b"37777777777\n-1 love eda 100%!1111111\n");
}

#[test]
fn printf_slots_failure_keeps_prior_output() {
    let fmt = CString::new("done%").unwrap();
    let (n, out) = capture_stdout(|| {
        // SAFETY: fmt outlives the call; no slots are read.
        unsafe { my_printf_slots(fmt.as_ptr(), ptr::null(), 0) }
    });
    assert_eq!(n, -1);
    assert_eq!(out, b"done");
}
