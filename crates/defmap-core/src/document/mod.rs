//! The structured document: a tree of [`DefinitionNode`] values.
//!
//! Every node, whatever its depth, carries the same fields. The JSON
//! interchange form is the serde rendering of this type, so the mapping a
//! caller edits and the typed tree are two views of the same data.

mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefMapError;

pub(crate) use validate::validate;

/// Structural category of a [`DefinitionNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The document root: one per source file.
    Module,
    /// A class defined at module level.
    Class,
    /// A module-level function, or a method directly inside a class body.
    Function,
    /// A class defined inside a class or function body.
    NestedClass,
    /// A function defined inside a function body.
    NestedFunction,
    /// A positioned raw statement spliced in by a caller.
    OtherStatement,
}

impl NodeKind {
    /// Returns the interchange spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::NestedClass => "nested_class",
            Self::NestedFunction => "nested_function",
            Self::OtherStatement => "other_statement",
        }
    }

    /// Returns true for both class kinds.
    #[must_use]
    pub const fn is_class(self) -> bool {
        matches!(self, Self::Class | Self::NestedClass)
    }

    /// Returns true for both function kinds.
    #[must_use]
    pub const fn is_function(self) -> bool {
        matches!(self, Self::Function | Self::NestedFunction)
    }

    /// Returns true for kinds that regenerate a `class` or `def` block.
    #[must_use]
    pub const fn is_definition(self) -> bool {
        self.is_class() || self.is_function()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-based source lines covered by a node when it was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First line of the node.
    pub start_line: u32,
    /// Last line of the node.
    pub end_line: u32,
}

/// The structured-document unit for a module, class, function, or spliced
/// statement.
///
/// `extensibility` is caller-owned: extraction leaves it empty and rebuilding
/// never reads it, but it survives serialisation unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionNode {
    /// Structural category.
    pub kind: NodeKind,
    /// Identifier of the class or function; empty for the module root.
    #[serde(default)]
    pub name: String,
    /// Declaration text (decorators through the block-opening colon).
    #[serde(default)]
    pub header: String,
    /// Documentation string value, when the body starts with one.
    #[serde(default)]
    pub docstring: Option<String>,
    /// Nested definitions in source order.
    #[serde(default)]
    pub body_definitions: Vec<DefinitionNode>,
    /// Body statements that are not nested definitions, one per line group.
    #[serde(default)]
    pub raw_body: String,
    /// Opaque caller metadata.
    #[serde(default)]
    pub extensibility: Vec<Value>,
    /// Original source lines covered by the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Number of parent `raw_body` lines preceding this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<usize>,
    /// Path the module was extracted from (root only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl DefinitionNode {
    /// Creates an empty node of the given kind and name.
    #[must_use]
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            header: String::new(),
            docstring: None,
            body_definitions: Vec::new(),
            raw_body: String::new(),
            extensibility: Vec::new(),
            span: None,
            anchor: None,
            source_path: None,
        }
    }

    /// Creates an empty module root.
    #[must_use]
    pub fn module() -> Self {
        Self::new(NodeKind::Module, "")
    }

    /// Creates a positioned raw statement for splicing into
    /// `body_definitions`.
    #[must_use]
    pub fn other_statement(raw_body: impl Into<String>) -> Self {
        Self {
            raw_body: raw_body.into(),
            ..Self::new(NodeKind::OtherStatement, "")
        }
    }

    /// Finds the first direct child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.body_definitions.iter().find(|node| node.name == name)
    }

    /// Finds the first direct child with the given name, mutably.
    #[must_use]
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.body_definitions.iter_mut().find(|node| node.name == name)
    }

    /// Returns the number of lines in `raw_body`.
    #[must_use]
    pub fn raw_line_count(&self) -> usize {
        if self.raw_body.is_empty() {
            0
        } else {
            self.raw_body.split('\n').count()
        }
    }

    /// Returns a copy of the tree with positional metadata removed.
    ///
    /// Spans change whenever layout is normalised, so structural comparisons
    /// across a rebuild use this view.
    #[must_use]
    pub fn without_spans(&self) -> Self {
        Self {
            span: None,
            source_path: None,
            body_definitions: self
                .body_definitions
                .iter()
                .map(Self::without_spans)
                .collect(),
            ..self.clone()
        }
    }

    /// Converts the tree into its plain mapping form.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Encode`] if serialisation fails.
    pub fn to_value(&self) -> Result<Value, DefMapError> {
        serde_json::to_value(self).map_err(DefMapError::Encode)
    }

    /// Reads a tree from its plain mapping form and checks its structure.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Structure`] when the mapping does not describe
    /// a well-formed document.
    pub fn from_value(value: Value) -> Result<Self, DefMapError> {
        let node: Self = serde_json::from_value(value).map_err(DefMapError::from_json)?;
        validate(&node)?;
        Ok(node)
    }

    /// Reads a tree from interchange text and checks its structure.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Decode`] for malformed JSON and
    /// [`DefMapError::Structure`] for a malformed document.
    pub fn from_json(text: &str) -> Result<Self, DefMapError> {
        let node: Self = serde_json::from_str(text).map_err(DefMapError::from_json)?;
        validate(&node)?;
        Ok(node)
    }

    /// Serialises the tree as interchange text indented by four spaces.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Encode`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, DefMapError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)
            .map_err(DefMapError::Encode)?;
        String::from_utf8(buffer).map_err(|error| {
            DefMapError::Encode(serde::ser::Error::custom(error.to_string()))
        })
    }
}
