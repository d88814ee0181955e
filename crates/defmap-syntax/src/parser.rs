//! Tree-sitter parsing wrapper for Python source.
//!
//! This module provides a high-level interface for parsing Python using
//! Tree-sitter. It wraps the raw Tree-sitter parser and provides structured
//! access to parse results and syntax errors.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::error::SyntaxError;
use crate::position::point_to_one_based;
use crate::strings::collect_string_interior_rows;

/// Result of parsing source code.
///
/// Contains the parsed syntax tree along with the source it was built from.
/// Tree-sitter is error-tolerant, so a parse result may contain both a valid
/// tree and error nodes; [`ParseResult::ensure_valid`] turns the latter into
/// a hard failure.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns whether the parse result contains any syntax errors.
    ///
    /// Tree-sitter produces ERROR nodes for portions of the source that
    /// could not be parsed according to the grammar.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        has_error_nodes(self.tree.root_node())
    }

    /// Collects all syntax errors found in the parse result.
    ///
    /// Each error includes position information and a description of the
    /// problem.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }

    /// Fails with [`SyntaxError::InvalidSource`] describing the first syntax
    /// error when the tree contains any.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is not valid Python.
    pub fn ensure_valid(&self) -> Result<(), SyntaxError> {
        match self.errors().into_iter().next() {
            Some(first) => Err(SyntaxError::invalid_source(first)),
            None => Ok(()),
        }
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns the zero-based rows that begin inside a multi-line string
    /// literal.
    ///
    /// The leading whitespace of such rows is part of the literal's value, so
    /// callers must never dedent or re-indent them.
    #[must_use]
    pub fn string_interior_rows(&self) -> BTreeSet<usize> {
        let mut rows = BTreeSet::new();
        collect_string_interior_rows(self.tree.root_node(), &mut rows);
        rows
    }

    /// Returns the zero-based rows on which top-level statements (and
    /// top-level comments) start.
    #[must_use]
    pub fn statement_start_rows(&self) -> BTreeSet<usize> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .map(|child| child.start_position().row)
            .collect()
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    /// Creates a new syntax error info from a Tree-sitter node.
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let start = node.start_position();
        let byte_range = node.byte_range();

        // Extract context: the text of the error node, truncated if too long
        let context = source
            .get(byte_range.clone())
            .map(|s| {
                if s.len() > 50 {
                    let truncated: String = s.chars().take(47).collect();
                    format!("{truncated}...")
                } else {
                    s.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = point_to_one_based(start);

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

/// Tree-sitter parser wrapper configured with the Python grammar.
pub struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Creates a new Python parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised
    /// with the Python grammar.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Parses source code and returns the result.
    ///
    /// Tree-sitter is error-tolerant, so this method will return a parse
    /// result even if the source contains syntax errors. Use
    /// [`ParseResult::has_errors`] or [`ParseResult::ensure_valid`] to check
    /// for errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser fails to produce a syntax tree. This
    /// is rare and typically indicates a parser configuration issue.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse("parsing failed"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
        })
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").field("language", &"python").finish()
    }
}

/// Recursively checks if a node or any of its descendants is an ERROR node.
fn has_error_nodes(node: tree_sitter::Node<'_>) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_error_nodes(child) {
            return true;
        }
    }

    false
}

/// Recursively collects all ERROR nodes from a syntax tree.
fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("def hello():\n    pass")]
    #[case("class Foo(Base):\n    x: int = 1\n")]
    #[case("async def fetch():\n    return await other()\n")]
    #[case("")]
    fn parser_parses_valid_source(#[case] source: &str) {
        let mut parser = Parser::new().expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(!result.has_errors());
        assert!(result.ensure_valid().is_ok());
    }

    #[rstest]
    #[case("def broken(")]
    #[case("def broken_function(:\n    print('missing parenthesis')")]
    #[case("class :\n")]
    fn parser_detects_syntax_errors(#[case] source: &str) {
        let mut parser = Parser::new().expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(result.has_errors());
        assert!(!result.errors().is_empty());
    }

    #[test]
    fn ensure_valid_reports_first_error_location() {
        let mut parser = Parser::new().expect("parser init");
        let result = parser.parse("x = 1\ndef broken(:\n    pass\n").expect("parse");

        let error = result.ensure_valid().expect_err("invalid source");
        match error {
            SyntaxError::InvalidSource { line, column, .. } => {
                assert!(line >= 2, "unexpected line {line}");
                assert!(column >= 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn statement_start_rows_lists_top_level_statements() {
        let mut parser = Parser::new().expect("parser init");
        let result = parser
            .parse("x = 1\nif x:\n    y = 2\nz = 3\n")
            .expect("parse");

        let rows: Vec<usize> = result.statement_start_rows().into_iter().collect();
        assert_eq!(rows, vec![0, 1, 3]);
    }
}
