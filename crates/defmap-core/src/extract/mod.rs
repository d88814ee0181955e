//! Extraction of a [`DefinitionNode`] tree from Python source.
//!
//! The extractor walks the syntax tree top-down. Every body element is routed
//! through [`Category`]: class and function definitions become child nodes,
//! and anything else is sliced verbatim into the enclosing node's `raw_body`
//! so that nothing the extractor does not decompose is lost.

mod docstring;
mod text;

use std::collections::BTreeSet;
use std::fs;
use std::ops::Range;
use std::path::Path;

use defmap_syntax::{Parser, SyntaxError, row_to_line};
use tracing::debug;
use tree_sitter::Node;

use self::docstring::docstring_value;
use self::text::{dedent_lines, indentation, line_prefix, slice};
use crate::document::{DefinitionNode, NodeKind, Span};
use crate::error::DefMapError;

const EXTRACT_TARGET: &str = "defmap_core::extract";

/// Builds [`DefinitionNode`] trees from Python source.
///
/// An extractor owns a parser and can be reused for any number of files.
/// Each call produces a fresh, self-contained tree.
#[derive(Debug)]
pub struct Extractor {
    parser: Parser,
}

impl Extractor {
    /// Creates an extractor with a freshly initialised Python parser.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Parse`] if the grammar cannot be loaded.
    pub fn new() -> Result<Self, DefMapError> {
        let parser = Parser::new().map_err(DefMapError::parse_memory)?;
        Ok(Self { parser })
    }

    /// Extracts a module tree from in-memory source text.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Parse`] when the text is not valid Python.
    pub fn extract_source(&mut self, source: &str) -> Result<DefinitionNode, DefMapError> {
        self.extract(source, None)
    }

    /// Reads and extracts the module at `path`, recording the path on the
    /// root node.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Read`] when the file cannot be read and
    /// [`DefMapError::Parse`] when it is not valid Python.
    pub fn extract_file(&mut self, path: &Path) -> Result<DefinitionNode, DefMapError> {
        let source = fs::read_to_string(path).map_err(|error| DefMapError::read(path, error))?;
        let mut module = self.extract(&source, Some(path))?;
        module.source_path = Some(path.display().to_string());
        Ok(module)
    }

    fn extract(
        &mut self,
        source: &str,
        origin: Option<&Path>,
    ) -> Result<DefinitionNode, DefMapError> {
        let normalised = source.replace("\r\n", "\n");
        let to_error = |error: SyntaxError| match origin {
            Some(path) => DefMapError::parse_file(path, error),
            None => DefMapError::parse_memory(error),
        };

        let parsed = self.parser.parse(&normalised).map_err(to_error)?;
        parsed.ensure_valid().map_err(to_error)?;

        let walk = Walk {
            source: parsed.source(),
            string_rows: parsed.string_interior_rows(),
        };
        let module = walk.module(parsed.root_node());
        debug!(
            target: EXTRACT_TARGET,
            definitions = module.body_definitions.len(),
            raw_lines = module.raw_line_count(),
            bytes = normalised.len(),
            "extracted module"
        );
        Ok(module)
    }
}

/// Structural category of a syntax node.
#[derive(Debug, Clone, Copy)]
enum Category<'tree> {
    Module,
    Class {
        outer: Node<'tree>,
        definition: Node<'tree>,
    },
    Function {
        outer: Node<'tree>,
        definition: Node<'tree>,
    },
    Other,
}

impl<'tree> Category<'tree> {
    /// Classifies `node`. A decorated definition is classified by the
    /// definition it decorates, keeping the decorators as the outer node.
    fn of(node: Node<'tree>) -> Self {
        match node.kind() {
            "module" => Self::Module,
            "class_definition" => Self::Class {
                outer: node,
                definition: node,
            },
            "function_definition" => Self::Function {
                outer: node,
                definition: node,
            },
            "decorated_definition" => node
                .child_by_field_name("definition")
                .map_or(Self::Other, |definition| match definition.kind() {
                    "class_definition" => Self::Class {
                        outer: node,
                        definition,
                    },
                    "function_definition" => Self::Function {
                        outer: node,
                        definition,
                    },
                    _ => Self::Other,
                }),
            _ => Self::Other,
        }
    }
}

/// The kind of body a definition appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
    Function,
}

impl Scope {
    const fn class_kind(self) -> NodeKind {
        match self {
            Self::Module => NodeKind::Class,
            Self::Class | Self::Function => NodeKind::NestedClass,
        }
    }

    const fn function_kind(self) -> NodeKind {
        match self {
            Self::Module | Self::Class => NodeKind::Function,
            Self::Function => NodeKind::NestedFunction,
        }
    }
}

struct Walk<'src> {
    source: &'src str,
    string_rows: BTreeSet<usize>,
}

impl Walk<'_> {
    fn module(&self, root: Node<'_>) -> DefinitionNode {
        let mut module = DefinitionNode::module();
        let mut cursor = root.walk();
        let elements: Vec<Node<'_>> = root.named_children(&mut cursor).collect();
        self.fill_body(&mut module, &elements, "", Scope::Module);

        let lines = self.source.lines().count();
        module.span = Some(Span {
            start_line: 1,
            end_line: u32::try_from(lines).unwrap_or(u32::MAX),
        });
        module
    }

    fn definition(
        &self,
        outer: Node<'_>,
        definition: Node<'_>,
        kind: NodeKind,
        scope: Scope,
    ) -> DefinitionNode {
        let name = definition
            .child_by_field_name("name")
            .map(|name| slice(self.source, name.byte_range()).to_owned())
            .unwrap_or_default();
        let body = definition.child_by_field_name("body");
        let header = HeaderEnd::find(definition, body);
        let outer_indent = indentation(line_prefix(self.source, outer.start_byte()));

        let mut node = DefinitionNode::new(kind, name);
        node.header = dedent_lines(
            slice(self.source, outer.start_byte()..header.byte),
            outer.start_position().row,
            outer_indent,
            &self.string_rows,
        )
        .join("\n");
        node.span = Some(span_of(outer));

        // Comments between the colon and the block belong to the definition
        // node rather than the block.
        let mut elements: Vec<Node<'_>> = {
            let mut cursor = definition.walk();
            definition
                .children(&mut cursor)
                .filter(|child| child.kind() == "comment" && child.start_byte() >= header.byte)
                .collect()
        };
        if let Some(block) = body {
            let mut cursor = block.walk();
            elements.extend(block.named_children(&mut cursor));
        }
        elements.sort_by_key(Node::start_byte);

        // Comments may sit at any column, so only statements fix the body
        // indentation.
        let below_header: Vec<&Node<'_>> = elements
            .iter()
            .filter(|element| element.start_position().row > header.row)
            .collect();
        let indent = below_header
            .iter()
            .find(|element| element.kind() != "comment")
            .or_else(|| below_header.first())
            .map_or(outer_indent, |element| {
                indentation(line_prefix(self.source, element.start_byte()))
            });
        self.fill_body(&mut node, &elements, indent, scope);
        node
    }

    fn fill_body(
        &self,
        node: &mut DefinitionNode,
        elements: &[Node<'_>],
        indent: &str,
        scope: Scope,
    ) {
        let docstring = elements
            .iter()
            .find(|element| element.kind() != "comment")
            .and_then(|first| {
                docstring_value(*first, self.source).map(|value| (first.id(), value))
            });
        let docstring_id = docstring.as_ref().map(|(id, _)| *id);
        node.docstring = docstring.map(|(_, value)| value);

        let mut raw = RawBody {
            source: self.source,
            string_rows: &self.string_rows,
            indent,
            lines: Vec::new(),
            pending: None,
        };
        for element in elements {
            if Some(element.id()) == docstring_id {
                raw.flush();
                continue;
            }
            let child = match Category::of(*element) {
                Category::Class { outer, definition } => {
                    self.definition(outer, definition, scope.class_kind(), Scope::Class)
                }
                Category::Function { outer, definition } => {
                    self.definition(outer, definition, scope.function_kind(), Scope::Function)
                }
                Category::Module | Category::Other => {
                    raw.push(*element);
                    continue;
                }
            };
            raw.flush();
            node.body_definitions.push(DefinitionNode {
                anchor: Some(raw.lines.len()),
                ..child
            });
        }
        raw.flush();
        node.raw_body = raw.lines.join("\n");
    }
}

/// Where a definition's header stops.
struct HeaderEnd {
    byte: usize,
    row: usize,
}

impl HeaderEnd {
    /// Locates the block-opening colon, extended over a same-line comment
    /// when the body starts on a later line.
    fn find(definition: Node<'_>, body: Option<Node<'_>>) -> Self {
        let body_start = body.map_or_else(|| definition.end_byte(), |block| block.start_byte());
        let body_row = body.map_or_else(
            || definition.end_position().row,
            |block| block.start_position().row,
        );
        let mut cursor = definition.walk();
        let children: Vec<Node<'_>> = definition.children(&mut cursor).collect();

        let Some(colon) = children
            .iter()
            .rev()
            .find(|child| child.kind() == ":" && child.end_byte() <= body_start)
        else {
            return Self {
                byte: body_start,
                row: body_row,
            };
        };
        let row = colon.end_position().row;
        let byte = children
            .iter()
            .find(|child| {
                child.kind() == "comment"
                    && child.start_byte() >= colon.end_byte()
                    && child.start_position().row == row
                    && body_row > row
            })
            .map_or(colon.end_byte(), |comment| comment.end_byte());
        Self { byte, row }
    }
}

/// Accumulates verbatim raw statements, merging statements that share a
/// source row (`a = 1; b = 2`, trailing comments).
struct RawBody<'a> {
    source: &'a str,
    string_rows: &'a BTreeSet<usize>,
    indent: &'a str,
    lines: Vec<String>,
    pending: Option<Group>,
}

struct Group {
    bytes: Range<usize>,
    start_row: usize,
    end_row: usize,
}

impl RawBody<'_> {
    fn push(&mut self, element: Node<'_>) {
        let start_row = element.start_position().row;
        let end_row = element.end_position().row;
        if let Some(group) = self.pending.as_mut().filter(|group| group.end_row == start_row) {
            group.bytes.end = element.end_byte();
            group.end_row = end_row;
            return;
        }
        self.flush();
        self.pending = Some(Group {
            bytes: element.byte_range(),
            start_row,
            end_row,
        });
    }

    fn flush(&mut self) {
        if let Some(group) = self.pending.take() {
            self.lines.extend(dedent_lines(
                slice(self.source, group.bytes),
                group.start_row,
                self.indent,
                self.string_rows,
            ));
        }
    }
}

fn span_of(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    let end_row = if end.column == 0 && end.row > start.row {
        end.row.saturating_sub(1)
    } else {
        end.row
    };
    Span {
        start_line: row_to_line(start.row),
        end_line: row_to_line(end_row),
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn extractor() -> Extractor {
        Extractor::new().expect("extractor")
    }

    #[rstest]
    fn methods_are_functions_and_inner_definitions_are_nested(mut extractor: Extractor) {
        let source = concat!(
            "class Outer:\n",
            "    class Inner:\n",
            "        pass\n",
            "\n",
            "    def method(self):\n",
            "        def helper():\n",
            "            class Local:\n",
            "                pass\n",
            "            return Local\n",
            "        return helper\n",
        );
        let module = extractor.extract_source(source).expect("extract");

        let outer = module.child("Outer").expect("Outer");
        assert_eq!(outer.kind, NodeKind::Class);
        assert_eq!(outer.child("Inner").map(|n| n.kind), Some(NodeKind::NestedClass));

        let method = outer.child("method").expect("method");
        assert_eq!(method.kind, NodeKind::Function);
        let helper = method.child("helper").expect("helper");
        assert_eq!(helper.kind, NodeKind::NestedFunction);
        assert_eq!(helper.child("Local").map(|n| n.kind), Some(NodeKind::NestedClass));
        assert_eq!(helper.raw_body, "return Local");
    }

    #[rstest]
    fn anchors_count_preceding_raw_lines(mut extractor: Extractor) {
        let source = "import os\nx = 1\n\ndef f():\n    pass\n\ny = 2\n\nclass A:\n    pass\n";
        let module = extractor.extract_source(source).expect("extract");

        assert_eq!(module.raw_body, "import os\nx = 1\ny = 2");
        let anchors: Vec<Option<usize>> =
            module.body_definitions.iter().map(|node| node.anchor).collect();
        assert_eq!(anchors, vec![Some(2), Some(3)]);
    }

    #[rstest]
    fn same_row_statements_stay_together(mut extractor: Extractor) {
        let module = extractor
            .extract_source("a = 1; b = 2  # both\nc = 3\n")
            .expect("extract");

        assert_eq!(module.raw_body, "a = 1; b = 2  # both\nc = 3");
    }

    #[rstest]
    fn multiline_strings_keep_their_indentation(mut extractor: Extractor) {
        let source = concat!(
            "def f():\n",
            "    text = \"\"\"\n",
            "        indented\n",
            "    \"\"\"\n",
            "    return text\n",
        );
        let module = extractor.extract_source(source).expect("extract");
        let function = module.child("f").expect("f");

        assert_eq!(
            function.raw_body,
            "text = \"\"\"\n        indented\n    \"\"\"\nreturn text"
        );
    }

    #[rstest]
    fn headers_are_dedented_and_keep_decorators(mut extractor: Extractor) {
        let source = concat!(
            "class A:\n",
            "    @property\n",
            "    def value(\n",
            "        self,\n",
            "    ) -> int:  # computed\n",
            "        return 1\n",
        );
        let module = extractor.extract_source(source).expect("extract");
        let value = module
            .child("A")
            .and_then(|class| class.child("value"))
            .expect("value");

        assert_eq!(value.header, "@property\ndef value(\n    self,\n) -> int:  # computed");
        assert_eq!(value.raw_body, "return 1");
        assert_eq!(
            value.span,
            Some(Span {
                start_line: 2,
                end_line: 6
            })
        );
    }

    #[rstest]
    fn same_line_bodies_are_split_from_the_header(mut extractor: Extractor) {
        let module = extractor
            .extract_source("def f(): return 1\n")
            .expect("extract");
        let function = module.child("f").expect("f");

        assert_eq!(function.header, "def f():");
        assert_eq!(function.raw_body, "return 1");
    }

    #[rstest]
    #[case::bytes("def f():\n    b\"data\"\n")]
    #[case::formatted("def f():\n    f\"{1}\"\n")]
    #[case::concatenated("def f():\n    \"a\" \"b\"\n")]
    #[case::not_first("def f():\n    x = 1\n    \"late\"\n")]
    #[case::named_escape("def f():\n    \"\\N{BULLET}\"\n")]
    fn only_a_leading_plain_literal_is_a_docstring(
        mut extractor: Extractor,
        #[case] source: &str,
    ) {
        let module = extractor.extract_source(source).expect("extract");
        let function = module.child("f").expect("f");

        assert_eq!(function.docstring, None);
        assert!(!function.raw_body.is_empty());
    }

    #[rstest]
    fn parenthesised_literals_are_docstrings(mut extractor: Extractor) {
        let module = extractor
            .extract_source("def f():\n    ((\"doc\"))\n    return 1\n")
            .expect("extract");
        let function = module.child("f").expect("f");

        assert_eq!(function.docstring.as_deref(), Some("doc"));
        assert_eq!(function.raw_body, "return 1");
    }

    #[rstest]
    #[case::column_zero(
        "def f(x):\n# note\n    if x:\n        y = 1\n    else:\n        y = 2\n    return y\n",
        "# note\nif x:\n    y = 1\nelse:\n    y = 2\nreturn y"
    )]
    #[case::over_indented(
        "def f(x):\n        # deep\n    if x:\n        return 1\n",
        "# deep\nif x:\n    return 1"
    )]
    fn leading_comments_do_not_set_the_body_indentation(
        mut extractor: Extractor,
        #[case] source: &str,
        #[case] expected: &str,
    ) {
        let module = extractor.extract_source(source).expect("extract");
        let function = module.child("f").expect("f");

        assert_eq!(function.raw_body, expected);
    }

    #[rstest]
    fn crlf_sources_are_normalised(mut extractor: Extractor) {
        let module = extractor
            .extract_source("x = 1\r\ndef f():\r\n    return x\r\n")
            .expect("extract");

        assert_eq!(module.raw_body, "x = 1");
        assert_eq!(module.child("f").map(|f| f.raw_body.as_str()), Some("return x"));
    }

    #[rstest]
    fn invalid_source_reports_a_parse_error(mut extractor: Extractor) {
        let error = extractor
            .extract_source("def broken(:\n    pass\n")
            .expect_err("invalid");

        assert!(matches!(error, DefMapError::Parse { ref origin, .. } if origin == "<memory>"));
    }
}
