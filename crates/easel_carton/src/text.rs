//! Whitespace and indentation normalization.
//!
//! All functions are pure and operate on `\n`-separated text. A trailing
//! `\r` on a line is treated as whitespace, so CRLF input normalizes to LF.

/// Number of spaces per indentation level used by [`indent_all`] and
/// [`normalize`].
pub const INDENT_WIDTH: usize = 4;

#[inline]
fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Remove leading and trailing lines that are empty after trimming.
///
/// Returns a slice of the input. An empty or all-blank input yields `""`.
pub fn strip_outer_blank_lines(text: &str) -> &str {
    let mut start = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if !is_blank(content) {
            if start.is_none() {
                start = Some(offset);
            }
            end = offset + content.len();
        }
        offset += line.len();
    }

    match start {
        Some(start) => &text[start..end],
        None => "",
    }
}

/// Minimum count of leading whitespace characters over all non-blank lines.
///
/// Blank lines do not participate. Returns `0` when every line is blank.
pub fn compute_minimum_indent<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !is_blank(line))
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0)
}

/// Remove `min_indent` characters from the front of every line at least that
/// long. Shorter lines pass through unchanged.
pub fn reindent_left<'a>(lines: &[&'a str], min_indent: usize) -> Vec<&'a str> {
    lines
        .iter()
        .map(|line| match line.char_indices().nth(min_indent) {
            Some((byte_offset, _)) => &line[byte_offset..],
            None if line.chars().count() == min_indent => "",
            None => line,
        })
        .collect()
}

/// Replace every tab with `width` spaces.
pub fn tabs_to_spaces(text: &str, width: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    text.replace('\t', &" ".repeat(width))
}

/// Prefix every line from `starting_at_line` onwards with `levels` indentation
/// levels of [`INDENT_WIDTH`] spaces.
pub fn indent_all(text: &str, levels: usize, starting_at_line: usize) -> String {
    let indent = " ".repeat(levels * INDENT_WIDTH);
    let mut out = String::with_capacity(text.len() + indent.len() * 8);

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if index >= starting_at_line {
            out.push_str(&indent);
        }
        out.push_str(line);
    }

    out
}

/// Strip outer blank lines, trim line ends, and collapse the common leading
/// indentation of already tab-free text.
pub fn strip_spaces(text: &str) -> String {
    let lines: Vec<&str> = strip_outer_blank_lines(text)
        .split('\n')
        .map(str::trim_end)
        .collect();

    let min_indent = compute_minimum_indent(&lines);
    reindent_left(&lines, min_indent).join("\n")
}

/// Canonical whitespace form of a block of text.
///
/// Tabs become [`INDENT_WIDTH`] spaces, outer blank lines are removed, line
/// ends are trimmed and the minimal indentation is removed. Idempotent.
pub fn normalize(text: &str) -> String {
    strip_spaces(&tabs_to_spaces(text, INDENT_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_outer_blank_lines() {
        assert_eq!(strip_outer_blank_lines("\n  \nabc\n\ndef\n \t\n"), "abc\n\ndef");
        assert_eq!(strip_outer_blank_lines("  abc  "), "  abc  ");
        assert_eq!(strip_outer_blank_lines("abc\r\n\r\n"), "abc");
    }

    #[test]
    fn test_strip_outer_blank_lines_all_blank() {
        assert_eq!(strip_outer_blank_lines(""), "");
        assert_eq!(strip_outer_blank_lines("\n\n\n"), "");
        assert_eq!(strip_outer_blank_lines("   \n\t\n  "), "");
    }

    #[test]
    fn test_compute_minimum_indent_ignores_blank_lines() {
        let lines = ["    a", "", "  ", "      b"];
        assert_eq!(compute_minimum_indent(&lines), 4);
    }

    #[test]
    fn test_compute_minimum_indent_no_content() {
        let lines: [&str; 2] = ["", "   "];
        assert_eq!(compute_minimum_indent(&lines), 0);
        assert_eq!(compute_minimum_indent::<&str>(&[]), 0);
    }

    #[test]
    fn test_reindent_left() {
        let lines = ["    a", "  ", "      b", "    "];
        assert_eq!(reindent_left(&lines, 4), vec!["a", "  ", "  b", ""]);
    }

    #[test]
    fn test_tabs_to_spaces() {
        assert_eq!(tabs_to_spaces("\ta\t", 4), "    a    ");
        assert_eq!(tabs_to_spaces("\ta", 2), "  a");
        assert_eq!(tabs_to_spaces("a", 4), "a");
    }

    #[test]
    fn test_indent_all() {
        assert_eq!(indent_all("a\nb\nc", 1, 0), "    a\n    b\n    c");
        assert_eq!(indent_all("a\nb\nc", 2, 1), "a\n        b\n        c");
        assert_eq!(indent_all("a", 0, 0), "a");
    }

    #[test]
    fn test_normalize() {
        let text = "\n\t\tfunction f() {\n\t\t\treturn 1;   \n\t\t}\n\n";
        assert_eq!(normalize(text), "function f() {\n    return 1;\n}");
    }

    #[test]
    fn test_normalize_keeps_inner_blank_lines() {
        let text = "    a\n\n    b";
        assert_eq!(normalize(text), "a\n\nb");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "\n\n",
            "abc",
            "   abc",
            "\t\t<div>\n\t\t\t<span></span>\n\t\t</div>",
            "  a\n \n    b\n\t c  \n",
            "\r\n  x\r\n    y\r\n",
            "line\n\n\n  \n\tline",
            "  \u{3000}wide\n  narrow",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
