//! Regeneration of Python source from a [`DefinitionNode`] tree.
//!
//! Each node is regenerated according to its kind: a header at the node's
//! depth, then its docstring, then its `raw_body` interleaved with its
//! children one level deeper. Children are placed using their `anchor`; when
//! anchors are missing or inconsistent every raw line is emitted before the
//! children.

mod layout;

use std::collections::BTreeSet;
use std::ops::Range;

use defmap_syntax::Parser;
use tracing::{debug, warn};

use self::layout::{BodyEmitter, ItemKind, docstring_literal, indent_lines};
use crate::document::{DefinitionNode, NodeKind, validate};
use crate::error::DefMapError;

const REBUILD_TARGET: &str = "defmap_core::rebuild";

/// Layout options for regenerated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildOptions {
    /// Text repeated once per nesting level.
    pub indent_unit: String,
}

impl RebuildOptions {
    /// Creates options that indent with `width` spaces per level.
    #[must_use]
    pub fn with_indent_width(width: usize) -> Self {
        Self {
            indent_unit: " ".repeat(width),
        }
    }
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self::with_indent_width(4)
    }
}

/// Regenerates source text from document trees.
///
/// Rebuilding never mutates its input; a single document may be rebuilt any
/// number of times.
#[derive(Debug)]
pub struct Rebuilder {
    parser: Parser,
    options: RebuildOptions,
}

impl Rebuilder {
    /// Creates a rebuilder with default options.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Parse`] if the grammar cannot be loaded.
    pub fn new() -> Result<Self, DefMapError> {
        Self::with_options(RebuildOptions::default())
    }

    /// Creates a rebuilder with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Parse`] if the grammar cannot be loaded.
    pub fn with_options(options: RebuildOptions) -> Result<Self, DefMapError> {
        let parser = Parser::new().map_err(DefMapError::parse_memory)?;
        Ok(Self { parser, options })
    }

    /// Returns the layout options in use.
    #[must_use]
    pub const fn options(&self) -> &RebuildOptions {
        &self.options
    }

    /// Regenerates the source text of the module `root`.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Structure`] when the tree is malformed.
    pub fn rebuild(&mut self, root: &DefinitionNode) -> Result<String, DefMapError> {
        validate(root)?;
        let lines = self.body(root, 0)?.into_lines();
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        debug!(
            target: REBUILD_TARGET,
            definitions = root.body_definitions.len(),
            bytes = text.len(),
            "rebuilt module"
        );
        Ok(text)
    }

    fn prefix(&self, depth: usize) -> String {
        self.options.indent_unit.repeat(depth)
    }

    /// Emits the lines of `node` itself at `depth`.
    fn node(&mut self, node: &DefinitionNode, depth: usize) -> Result<Vec<String>, DefMapError> {
        match node.kind {
            NodeKind::Module => Ok(self.body(node, depth)?.into_lines()),
            NodeKind::Class
            | NodeKind::NestedClass
            | NodeKind::Function
            | NodeKind::NestedFunction => self.definition(node, depth),
            NodeKind::OtherStatement => {
                let raw = self.raw_text(&node.raw_body)?;
                Ok(raw.lines_in(0..raw.lines.len(), &self.prefix(depth)))
            }
        }
    }

    fn definition(
        &mut self,
        node: &DefinitionNode,
        depth: usize,
    ) -> Result<Vec<String>, DefMapError> {
        let header = self.header_lines(&node.header, depth)?;
        let body = self.body(node, depth.saturating_add(1))?;

        let mut lines = header;
        if body.is_empty() {
            lines.push(format!("{}pass", self.prefix(depth.saturating_add(1))));
        } else {
            lines.extend(body.into_lines());
        }
        Ok(lines)
    }

    fn header_lines(&mut self, header: &str, depth: usize) -> Result<Vec<String>, DefMapError> {
        let probe = format!("{header}\n{}pass\n", self.options.indent_unit);
        let string_rows = self
            .parser
            .parse(&probe)
            .map_err(DefMapError::parse_memory)?
            .string_interior_rows();
        Ok(indent_lines(
            header.split('\n').enumerate(),
            &self.prefix(depth),
            &string_rows,
        ))
    }

    /// Emits the docstring, raw lines, and children of `node` at `depth`.
    fn body(&mut self, node: &DefinitionNode, depth: usize) -> Result<BodyEmitter, DefMapError> {
        let prefix = self.prefix(depth);
        let mut emitter = BodyEmitter::new(depth);
        if let Some(docstring) = &node.docstring {
            emitter.push(ItemKind::Statement, docstring_literal(docstring, &prefix));
        }

        let raw = self.raw_text(&node.raw_body)?;
        for segment in plan(node, &raw) {
            match segment {
                Segment::Raw(rows) => {
                    emitter.push(ItemKind::Statement, raw.lines_in(rows, &prefix));
                }
                Segment::Child(child) => {
                    let kind = if child.kind == NodeKind::OtherStatement {
                        ItemKind::Statement
                    } else {
                        ItemKind::Definition
                    };
                    let lines = self.node(child, depth)?;
                    emitter.push(kind, lines);
                }
            }
        }
        Ok(emitter)
    }

    fn raw_text<'a>(&mut self, raw_body: &'a str) -> Result<RawText<'a>, DefMapError> {
        if raw_body.is_empty() {
            return Ok(RawText {
                lines: Vec::new(),
                string_rows: BTreeSet::new(),
                boundaries: BTreeSet::from([0]),
            });
        }
        let parsed = self
            .parser
            .parse(raw_body)
            .map_err(DefMapError::parse_memory)?;
        let lines: Vec<&str> = raw_body.split('\n').collect();
        let mut boundaries = parsed.statement_start_rows();
        boundaries.insert(lines.len());
        Ok(RawText {
            lines,
            string_rows: parsed.string_interior_rows(),
            boundaries,
        })
    }
}

/// A node's `raw_body` split into lines, with the rows that may not be
/// re-indented and the rows where a statement starts.
struct RawText<'a> {
    lines: Vec<&'a str>,
    string_rows: BTreeSet<usize>,
    boundaries: BTreeSet<usize>,
}

impl RawText<'_> {
    fn lines_in(&self, rows: Range<usize>, prefix: &str) -> Vec<String> {
        let selected = self
            .lines
            .iter()
            .enumerate()
            .skip(rows.start)
            .take(rows.end.saturating_sub(rows.start))
            .map(|(row, line)| (row, *line));
        indent_lines(selected, prefix, &self.string_rows)
    }
}

enum Segment<'a> {
    Raw(Range<usize>),
    Child(&'a DefinitionNode),
}

/// Orders the raw lines and children of `node` for emission.
fn plan<'a>(node: &'a DefinitionNode, raw: &RawText<'_>) -> Vec<Segment<'a>> {
    let total = raw.lines.len();
    let mut segments = Vec::new();
    let Some(anchors) = usable_anchors(node, raw) else {
        warn!(
            target: REBUILD_TARGET,
            name = %node.name,
            kind = %node.kind,
            "child anchors are missing or inconsistent; emitting raw body before definitions"
        );
        if total > 0 {
            segments.push(Segment::Raw(0..total));
        }
        segments.extend(node.body_definitions.iter().map(Segment::Child));
        return segments;
    };

    let mut cursor = 0;
    for (child, anchor) in node.body_definitions.iter().zip(anchors) {
        if anchor > cursor {
            segments.push(Segment::Raw(cursor..anchor));
            cursor = anchor;
        }
        segments.push(Segment::Child(child));
    }
    if total > cursor {
        segments.push(Segment::Raw(cursor..total));
    }
    segments
}

/// Returns the children's anchors when every child has one, they never
/// decrease, and each falls on a statement boundary of the raw body.
fn usable_anchors(node: &DefinitionNode, raw: &RawText<'_>) -> Option<Vec<usize>> {
    let anchors: Vec<usize> = node
        .body_definitions
        .iter()
        .map(|child| child.anchor)
        .collect::<Option<_>>()?;
    let consistent = anchors.is_sorted()
        && anchors
            .iter()
            .all(|anchor| raw.boundaries.contains(anchor));
    consistent.then_some(anchors)
}
