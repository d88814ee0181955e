//! Round-trip entry points: extract to a mapping or JSON, load it back,
//! rebuild source, and hand the result to an executor.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::document::{DefinitionNode, validate};
use crate::error::DefMapError;
use crate::execute::Executor;
use crate::extract::Extractor;
use crate::rebuild::{RebuildOptions, Rebuilder};

/// A document in any of the forms callers hold it in.
///
/// Rebuild entry points accept all three and detect which one was given.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentInput {
    /// Interchange text.
    Text(String),
    /// The plain mapping form. A JSON string value is treated as interchange
    /// text.
    Mapping(Value),
    /// A typed tree.
    Node(DefinitionNode),
}

impl DocumentInput {
    /// Normalises the input into a validated tree.
    ///
    /// # Errors
    ///
    /// Returns [`DefMapError::Decode`] for malformed interchange text and
    /// [`DefMapError::Structure`] for a malformed document.
    pub fn into_node(self) -> Result<DefinitionNode, DefMapError> {
        match self {
            Self::Text(text) | Self::Mapping(Value::String(text)) => {
                DefinitionNode::from_json(&text)
            }
            Self::Mapping(value) => DefinitionNode::from_value(value),
            Self::Node(node) => {
                validate(&node)?;
                Ok(node)
            }
        }
    }
}

impl From<String> for DocumentInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for DocumentInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for DocumentInput {
    fn from(value: Value) -> Self {
        Self::Mapping(value)
    }
}

impl From<DefinitionNode> for DocumentInput {
    fn from(node: DefinitionNode) -> Self {
        Self::Node(node)
    }
}

impl From<&DefinitionNode> for DocumentInput {
    fn from(node: &DefinitionNode) -> Self {
        Self::Node(node.clone())
    }
}

/// Extracts a module tree from in-memory source text.
///
/// # Errors
///
/// Returns [`DefMapError::Parse`] when the text is not valid Python.
pub fn extract_source(source: &str) -> Result<DefinitionNode, DefMapError> {
    Extractor::new()?.extract_source(source)
}

/// Extracts the module tree of the file at `path`.
///
/// # Errors
///
/// Returns [`DefMapError::Read`] for an unreadable path and
/// [`DefMapError::Parse`] for invalid Python.
pub fn extract_file(path: impl AsRef<Path>) -> Result<DefinitionNode, DefMapError> {
    Extractor::new()?.extract_file(path.as_ref())
}

/// Extracts the file at `path` into its plain mapping form.
///
/// # Errors
///
/// See [`extract_file`].
pub fn get_ast_as_dict(path: impl AsRef<Path>) -> Result<Value, DefMapError> {
    extract_file(path)?.to_value()
}

/// Extracts the file at `path` into interchange text.
///
/// # Errors
///
/// See [`extract_file`].
pub fn get_ast_as_json(path: impl AsRef<Path>) -> Result<String, DefMapError> {
    extract_file(path)?.to_json()
}

/// Extracts `source_path` and writes the interchange text to `output_path`.
///
/// # Errors
///
/// Returns the extraction error, or [`DefMapError::Write`] when the output
/// cannot be written. Nothing is written if extraction fails.
pub fn save_ast_as_json(
    source_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<(), DefMapError> {
    let json = get_ast_as_json(source_path)?;
    write_text(output_path.as_ref(), &json)
}

/// Reads interchange text from `path` and returns the validated mapping.
///
/// # Errors
///
/// Returns [`DefMapError::Read`], [`DefMapError::Decode`], or
/// [`DefMapError::Structure`].
pub fn load_ast_from_json(path: impl AsRef<Path>) -> Result<Value, DefMapError> {
    let file = path.as_ref();
    let text = fs::read_to_string(file).map_err(|error| DefMapError::read(file, error))?;
    DefinitionNode::from_json(&text)?.to_value()
}

/// Regenerates source text from a document with default layout options.
///
/// # Errors
///
/// Returns [`DefMapError::Decode`] or [`DefMapError::Structure`] for a bad
/// document.
pub fn rebuild_from_json(input: impl Into<DocumentInput>) -> Result<String, DefMapError> {
    rebuild_with_options(input, RebuildOptions::default())
}

/// Regenerates source text from a document with the given layout options.
///
/// # Errors
///
/// See [`rebuild_from_json`].
pub fn rebuild_with_options(
    input: impl Into<DocumentInput>,
    options: RebuildOptions,
) -> Result<String, DefMapError> {
    let node = input.into().into_node()?;
    Rebuilder::with_options(options)?.rebuild(&node)
}

/// Regenerates source text and writes it to `output_path`, returning the
/// text.
///
/// # Errors
///
/// Returns the rebuild error, or [`DefMapError::Write`] when the output
/// cannot be written. Nothing is written if rebuilding fails.
pub fn rebuild_from_dict_or_json(
    input: impl Into<DocumentInput>,
    output_path: impl AsRef<Path>,
) -> Result<String, DefMapError> {
    let source = rebuild_from_json(input)?;
    write_text(output_path.as_ref(), &source)?;
    Ok(source)
}

/// Regenerates source text and submits it to `executor`, relaying the
/// bindings it returns.
///
/// # Errors
///
/// Returns the rebuild error, or [`DefMapError::Execution`] wrapping the
/// executor's own error unmodified.
pub fn execute_rebuilt<X>(
    input: impl Into<DocumentInput>,
    executor: &X,
) -> Result<X::Bindings, DefMapError>
where
    X: Executor + ?Sized,
{
    let source = rebuild_from_json(input)?;
    executor.execute(&source).map_err(DefMapError::execution)
}

fn write_text(path: &Path, text: &str) -> Result<(), DefMapError> {
    fs::write(path, text).map_err(|error| DefMapError::write(path, error))
}
