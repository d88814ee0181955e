//! Line layout for regenerated source: indentation, blank-line separation,
//! and documentation string literals.

use std::collections::BTreeSet;

/// One emitted body element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ItemKind {
    /// Docstring, raw statements, or a spliced statement.
    Statement,
    /// A class or function block.
    Definition,
}

/// Collects the lines of one body, separating definitions from their
/// neighbours with blank lines.
#[derive(Debug)]
pub(super) struct BodyEmitter {
    blank_lines: usize,
    lines: Vec<String>,
    last: Option<ItemKind>,
}

impl BodyEmitter {
    /// Creates an emitter for a body at `depth`; module-level definitions are
    /// separated by two blank lines, nested ones by one.
    pub(super) const fn new(depth: usize) -> Self {
        Self {
            blank_lines: if depth == 0 { 2 } else { 1 },
            lines: Vec::new(),
            last: None,
        }
    }

    /// Appends an item's already-indented lines.
    pub(super) fn push(&mut self, kind: ItemKind, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        if let Some(previous) = self.last
            && (previous == ItemKind::Definition || kind == ItemKind::Definition)
        {
            self.lines
                .extend(std::iter::repeat_n(String::new(), self.blank_lines));
        }
        self.lines.extend(lines);
        self.last = Some(kind);
    }

    /// Returns true when nothing has been emitted.
    pub(super) const fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Consumes the emitter, returning its lines.
    pub(super) fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Prefixes every line with `prefix`, leaving empty lines and rows that begin
/// inside a string literal untouched.
pub(super) fn indent_lines<'a>(
    lines: impl IntoIterator<Item = (usize, &'a str)>,
    prefix: &str,
    string_rows: &BTreeSet<usize>,
) -> Vec<String> {
    lines
        .into_iter()
        .map(|(row, line)| {
            if string_rows.contains(&row) {
                line.to_owned()
            } else if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}

/// Renders a docstring value as a triple-double-quoted literal indented by
/// `prefix`.
///
/// The literal decodes back to `value`: backslashes and control characters
/// are escaped, and quotes are escaped whenever they could end the literal
/// early. A multi-line value closes on its own line. Whitespace-only lines
/// are written without the prefix so the margin never grows.
pub(super) fn docstring_literal(value: &str, prefix: &str) -> Vec<String> {
    let escape_quotes = value.contains("\"\"\"") || value.ends_with('"');
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' if escape_quotes => escaped.push_str("\\\""),
            '\n' | '\t' => escaped.push(ch),
            '\r' => escaped.push_str("\\r"),
            control if control.is_control() => {
                escaped.push_str(&format!("\\u{:04x}", u32::from(control)));
            }
            other => escaped.push(other),
        }
    }

    let mut lines: Vec<String> = escaped
        .split('\n')
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                format!("{prefix}\"\"\"{line}")
            } else if line.trim().is_empty() {
                line.to_owned()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect();

    if lines.len() > 1 {
        lines.push(format!("{prefix}\"\"\""));
    } else if let Some(only) = lines.first_mut() {
        only.push_str("\"\"\"");
    }
    lines
}
