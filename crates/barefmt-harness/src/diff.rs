//! Diff rendering for fixture comparison.

/// Render a line diff between expected and actual output.
///
/// Lines present on only one side are shown as pure additions or removals.
/// For single-line outputs the first differing byte column is reported too,
/// since canonical outputs are usually one line.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");

    let exp: Vec<&str> = expected.lines().collect();
    let act: Vec<&str> = actual.lines().collect();
    for i in 0..exp.len().max(act.len()) {
        match (exp.get(i), act.get(i)) {
            (Some(e), Some(a)) if e == a => {}
            (e, a) => {
                out.push_str(&format!("@@ line {} @@\n", i + 1));
                if let Some(e) = e {
                    out.push_str(&format!("-{e}\n"));
                }
                if let Some(a) = a {
                    out.push_str(&format!("+{a}\n"));
                }
            }
        }
    }

    if exp.len() <= 1 && act.len() <= 1 {
        let column = expected
            .bytes()
            .zip(actual.bytes())
            .position(|(e, a)| e != a)
            .unwrap_or_else(|| expected.len().min(actual.len()));
        out.push_str(&format!("first difference at byte {column}\n"));
    }
    out
}
