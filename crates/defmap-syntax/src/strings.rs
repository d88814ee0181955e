//! Detection of source rows that sit inside multi-line string literals.
//!
//! Re-indenting Python text is only safe outside string literals: a row that
//! begins inside a triple-quoted string carries its leading whitespace as part
//! of the string's value.

use std::collections::BTreeSet;

/// Grammar node kind for every string literal, including f-strings.
const STRING_KIND: &str = "string";

/// Records every row that starts inside a string literal spanning more than
/// one row.
pub(crate) fn collect_string_interior_rows(node: tree_sitter::Node<'_>, rows: &mut BTreeSet<usize>) {
    if node.kind() == STRING_KIND {
        let first = node.start_position().row;
        let last = node.end_position().row;
        rows.extend(first.saturating_add(1)..=last);
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_string_interior_rows(child, rows);
    }
}
