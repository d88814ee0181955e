//! Recognition and decoding of documentation strings.
//!
//! A documentation string is the value of a lone, plain string literal. The
//! stored value has escape sequences resolved (unless the literal is raw) and
//! is cleaned the way Python's `inspect.cleandoc` cleans docstrings.

use tree_sitter::Node;

use super::text::slice;

const TAB_WIDTH: usize = 8;

/// Returns the docstring value when `statement` is an expression statement
/// holding exactly one plain string literal, possibly parenthesised.
pub(super) fn docstring_value(statement: Node<'_>, source: &str) -> Option<String> {
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return None;
    }
    let mut literal = first_named_child(statement)?;
    while literal.kind() == "parenthesized_expression" && literal.named_child_count() == 1 {
        literal = first_named_child(literal)?;
    }
    if literal.kind() != "string" {
        return None;
    }
    decode_literal(slice(source, literal.byte_range())).map(|value| cleandoc(&value))
}

fn first_named_child<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).next()
}

/// Decodes the text of a single string literal.
///
/// Returns `None` for bytes, formatted, and template literals, whose values
/// are not documentation strings, and for literals using `\N{NAME}` escapes,
/// whose values cannot be resolved without the Unicode name table. Such a
/// literal stays in the raw body verbatim.
pub(super) fn decode_literal(text: &str) -> Option<String> {
    let quote_at = text.find(['"', '\''])?;
    let prefix = slice(text, 0..quote_at).to_ascii_lowercase();
    if prefix.contains(['b', 'f', 't']) {
        return None;
    }
    let quoted = slice(text, quote_at..text.len());
    let delimiter = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|candidate| quoted.starts_with(candidate))?;
    let body = quoted
        .strip_prefix(delimiter)
        .and_then(|rest| rest.strip_suffix(delimiter))?;

    if prefix.contains('r') {
        Some(body.to_owned())
    } else {
        unescape(body)
    }
}

fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(escaped),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut digits = String::from(escaped);
                while digits.len() < 3 {
                    match chars.next_if(|next| next.is_digit(8)) {
                        Some(next) => digits.push(next),
                        None => break,
                    }
                }
                push_code_point(&mut out, &digits, 8, escaped);
            }
            'x' => push_fixed(&mut out, &mut chars, 2, 'x'),
            'u' => push_fixed(&mut out, &mut chars, 4, 'u'),
            'U' => push_fixed(&mut out, &mut chars, 8, 'U'),
            'N' => return None,
            // Unknown escapes keep their backslash.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn push_fixed(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    width: usize,
    marker: char,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.next_if(char::is_ascii_hexdigit) {
            Some(next) => digits.push(next),
            None => break,
        }
    }
    if digits.len() == width {
        push_code_point(out, &digits, 16, marker);
    } else {
        out.push('\\');
        out.push(marker);
        out.push_str(&digits);
    }
}

fn push_code_point(out: &mut String, digits: &str, radix: u32, marker: char) {
    match u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
    {
        Some(decoded) => out.push(decoded),
        None => {
            out.push('\\');
            if radix == 16 {
                out.push(marker);
            }
            out.push_str(digits);
        }
    }
}

/// Cleans a docstring value: expands tabs, strips the first line's leading
/// whitespace, removes the common margin of later lines, empties
/// whitespace-only lines, and drops blank leading and trailing lines.
pub(crate) fn cleandoc(value: &str) -> String {
    let mut lines: Vec<String> = value.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            (!content.is_empty()).then(|| leading_width(line, content))
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_owned();
    }
    for line in lines.iter_mut().skip(1) {
        *line = if line.trim().is_empty() {
            String::new()
        } else {
            line.chars().skip(margin.unwrap_or_default()).collect()
        };
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);
    lines.join("\n")
}

fn leading_width(line: &str, content: &str) -> usize {
    line.chars()
        .count()
        .saturating_sub(content.chars().count())
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0_usize;
    for ch in line.chars() {
        match ch {
            '\t' => {
                let pad = TAB_WIDTH.saturating_sub(column.rem_euclid(TAB_WIDTH));
                out.extend(std::iter::repeat_n(' ', pad));
                column = column.saturating_add(pad);
            }
            '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column = column.saturating_add(1);
            }
        }
    }
    out
}
