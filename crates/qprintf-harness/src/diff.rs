//! Diff rendering for fixture comparison.

/// Render a line diff between expected and actual output.
///
/// Lines are shown with control characters escaped so color sequences and
/// trailing newlines stay visible.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let actual_lines: Vec<&str> = actual.split('\n').collect();
    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        let e = expected_lines.get(i);
        let a = actual_lines.get(i);
        if e == a {
            continue;
        }
        out.push_str(&format!("@@ line {} @@\n", i + 1));
        if let Some(e) = e {
            out.push_str(&format!("-{}\n", e.escape_debug()));
        }
        if let Some(a) = a {
            out.push_str(&format!("+{}\n", a.escape_debug()));
        }
    }
    out
}
