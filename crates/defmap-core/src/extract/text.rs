//! Verbatim slicing and dedenting of source text.

use std::collections::BTreeSet;
use std::ops::Range;

/// Returns the text in `range`, or an empty string when the range does not
/// fall on character boundaries.
pub(super) fn slice(source: &str, range: Range<usize>) -> &str {
    source.get(range).unwrap_or_default()
}

/// Returns the text between the start of the line containing `byte` and
/// `byte` itself.
pub(super) fn line_prefix(source: &str, byte: usize) -> &str {
    let before = slice(source, 0..byte);
    before
        .rfind('\n')
        .map_or(before, |newline| slice(before, newline.saturating_add(1)..before.len()))
}

/// Returns `prefix` when it is pure indentation, otherwise an empty string.
pub(super) fn indentation(prefix: &str) -> &str {
    if prefix.chars().all(|ch| ch == ' ' || ch == '\t') {
        prefix
    } else {
        ""
    }
}

/// Splits a verbatim slice into lines and removes `indent` from every line
/// after the first.
///
/// `first_row` is the zero-based source row of the slice's first line. Rows
/// listed in `string_rows` begin inside a string literal and are kept
/// byte-for-byte. Whitespace-only lines become empty.
pub(super) fn dedent_lines(
    text: &str,
    first_row: usize,
    indent: &str,
    string_rows: &BTreeSet<usize>,
) -> Vec<String> {
    text.split('\n')
        .enumerate()
        .map(|(offset, line)| {
            let row = first_row.saturating_add(offset);
            if string_rows.contains(&row) {
                line.to_owned()
            } else if line.trim().is_empty() {
                String::new()
            } else if offset == 0 {
                line.to_owned()
            } else {
                line.strip_prefix(indent)
                    .unwrap_or_else(|| line.trim_start())
                    .to_owned()
            }
        })
        .collect()
}
