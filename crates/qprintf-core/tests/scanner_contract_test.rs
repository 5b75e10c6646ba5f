//! Call-level contract of the scanner: sentinel, counting, argument
//! consumption and repeatability.

use qprintf_core::stdio::{CountingSink, SliceSink, TruncatingSink};
use qprintf_core::{
    Arg, ArgCursor, ArgList, Color, ErrorKind, FormatError, count_conversions, format,
    formatted_write,
};

/// Cursor that records which class each fetch asked for.
struct Recording<'a> {
    inner: ArgList<'a, 'a>,
    log: Vec<char>,
}

impl<'a> ArgCursor<'a> for Recording<'a> {
    fn next_word(&mut self) -> Result<u64, FormatError> {
        self.log.push('w');
        self.inner.next_word()
    }

    fn next_double(&mut self) -> Result<f64, FormatError> {
        self.log.push('f');
        self.inner.next_double()
    }

    fn next_text(&mut self) -> Result<&'a [u8], FormatError> {
        self.log.push('t');
        self.inner.next_text()
    }
}

fn long_args() -> Vec<Arg<'static>> {
    vec![
        Arg::Int(-1),
        Arg::Int(-1),
        Arg::from("love"),
        Arg::Int(3802),
        Arg::Int(100),
        Arg::Char(b'!'),
        Arg::Int(127),
    ]
}

#[test]
fn fetch_class_follows_conversion_letter() {
    let args = [
        Arg::Int(1),
        Arg::Char(b'c'),
        Arg::Int(2),
        Arg::Int(3),
        Arg::Int(4),
        Arg::from("s"),
        Arg::Double(0.5),
        Arg::from(Color::Blue),
    ];
    let mut cursor = Recording {
        inner: ArgList::new(&args),
        log: Vec::new(),
    };
    let mut out = Vec::new();
    format(b"%d%c%o%x%b%s%f%q%%", &mut cursor, &mut out).unwrap();
    assert_eq!(cursor.log.iter().collect::<String>(), "wwwwwtfw");
}

#[test]
fn consumed_equals_conversions_processed() {
    let args = long_args();
    let fmt = b"%o\n%d %s %x %d%%%c%b\n";
    let mut cursor = ArgList::new(&args);
    format(fmt, &mut cursor, CountingSink::new()).unwrap();
    assert_eq!(cursor.consumed(), count_conversions(fmt).unwrap());
}

#[test]
fn failure_at_k_does_not_touch_k_plus_one() {
    let args = [Arg::Int(1), Arg::Double(f64::INFINITY), Arg::Int(3)];
    let mut cursor = Recording {
        inner: ArgList::new(&args),
        log: Vec::new(),
    };
    let mut out = Vec::new();
    let err = format(b"%d-%f-%d", &mut cursor, &mut out).unwrap_err();
    assert_eq!(err, FormatError::NonFiniteFloat);
    assert_eq!(cursor.log, ['w', 'f']);
    assert_eq!(out, b"1-");
}

#[test]
fn malformed_formats_return_sentinel() {
    for fmt in [&b"%"[..], b"abc%", b"%k", b"%d %", b"%5d", b"%i", b"x%\0"] {
        let args = [Arg::Int(1), Arg::Int(2)];
        assert_eq!(
            formatted_write(fmt, ArgList::new(&args), CountingSink::new()),
            -1,
            "{:?}",
            String::from_utf8_lossy(fmt)
        );
    }
}

#[test]
fn malformed_errors_are_classified() {
    let kind = |fmt: &[u8]| {
        format(fmt, ArgList::new(&[]), CountingSink::new())
            .unwrap_err()
            .kind()
    };
    assert_eq!(kind(b"%"), ErrorKind::Malformed);
    assert_eq!(kind(b"%w"), ErrorKind::Malformed);
    assert_eq!(kind(b"%u"), ErrorKind::Unsupported);
    assert_eq!(kind(b"%d"), ErrorKind::Argument);
}

#[test]
fn trailing_percent_keeps_only_prior_output() {
    let mut out = Vec::new();
    let args = [Arg::Int(42)];
    let res = format(b"n=%d%", ArgList::new(&args), &mut out);
    assert_eq!(res, Err(FormatError::TrailingPercent));
    assert_eq!(out, b"n=42");
}

#[test]
fn count_equals_visible_bytes() {
    let args = long_args();
    let mut out = Vec::new();
    let n = format(b"%o\n%d %s %x %d%%%c%b\n", ArgList::new(&args), &mut out).unwrap();
    assert_eq!(out, b"37777777777\n-1 love eda 100%!1111111\n");
    assert_eq!(n, 37);
    assert_eq!(n, out.len());
}

#[test]
fn color_escapes_do_not_count() {
    let args = [Arg::from(Color::Green), Arg::from(Color::Reset)];
    let mut out = Vec::new();
    let n = format(b"%q%q\n", ArgList::new(&args), &mut out).unwrap();
    assert_eq!(n, 1);
    assert_eq!(out, b"\x1b[32m\x1b[0m\n");
}

#[test]
fn identical_calls_are_byte_identical() {
    let args = [
        Arg::Double(112313.12312),
        Arg::Int(123),
        Arg::from("papoe"),
        Arg::Double(14.88),
        Arg::Char(b'1'),
        Arg::Int(0b1111_0000),
    ];
    let fmt = b"%f %d %s %f %c %b\n";

    let mut a = [0u8; 64];
    let mut b = [0u8; 64];
    let mut sa = SliceSink::new(&mut a);
    let mut sb = SliceSink::new(&mut b);
    let na = format(fmt, ArgList::new(&args), &mut sa).unwrap();
    let nb = format(fmt, ArgList::new(&args), &mut sb).unwrap();
    assert_eq!(na, 45);
    assert_eq!(na, nb);
    assert_eq!(sa.as_bytes(), sb.as_bytes());
}

#[test]
fn truncating_sink_still_reports_full_count() {
    let args = [Arg::from("a long string argument")];
    let mut buf = [0u8; 8];
    let mut sink = TruncatingSink::new(&mut buf);
    let n = format(b"[%s]", ArgList::new(&args), &mut sink).unwrap();
    assert_eq!(n, 24);
    assert_eq!(sink.total(), 24);
    sink.terminate();
    assert_eq!(&buf, b"[a long\0");
}

#[test]
fn many_conversions_in_one_call() {
    // 25 arguments in a single call.
    let args: Vec<Arg<'static>> = (0..25).map(Arg::Int).collect();
    let fmt = "%d,".repeat(25);
    let mut out = Vec::new();
    let n = format(fmt.as_bytes(), ArgList::new(&args), &mut out).unwrap();
    let expected: String = (0..25).map(|i| format!("{i},")).collect();
    assert_eq!(out, expected.as_bytes());
    assert_eq!(n, expected.len());
}
