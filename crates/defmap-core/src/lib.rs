//! Bidirectional Python source ⇄ structured document transform.
//!
//! `defmap-core` turns a Python module into a tree of [`DefinitionNode`]
//! values, lets callers edit that tree (typed, or as a plain JSON mapping),
//! and regenerates valid source from the edited tree:
//!
//! - [`Extractor`] walks a Tree-sitter syntax tree and emits one node per
//!   module, class, and function. Everything that is not a definition is
//!   kept verbatim in the enclosing node's `raw_body`.
//! - [`Rebuilder`] regenerates each node according to its kind, reinserting
//!   docstrings and interleaving raw statements with child definitions.
//! - [`Executor`] is the capability boundary for running regenerated code;
//!   [`execute_rebuilt`] relays its bindings or its error unchanged.
//!
//! # Example
//!
//! ```
//! use defmap_core::{extract_source, rebuild_from_json};
//!
//! let module = extract_source("class Foo:\n    \"desc\"\n    def bar(self): return 1\n")?;
//! let foo = module.child("Foo").expect("class Foo");
//! assert_eq!(foo.docstring.as_deref(), Some("desc"));
//!
//! let source = rebuild_from_json(&module)?;
//! assert!(source.starts_with("class Foo:\n    \"\"\"desc\"\"\""));
//! # Ok::<(), defmap_core::DefMapError>(())
//! ```
//!
//! Every call builds a fresh tree and shares no state with other calls, so
//! independent files may be processed on separate threads.

mod api;
mod document;
mod error;
mod execute;
mod extract;
mod rebuild;

#[cfg(test)]
mod tests;

pub use api::{
    DocumentInput, execute_rebuilt, extract_file, extract_source, get_ast_as_dict,
    get_ast_as_json, load_ast_from_json, rebuild_from_dict_or_json, rebuild_from_json,
    rebuild_with_options, save_ast_as_json,
};
pub use document::{DefinitionNode, NodeKind, Span};
pub use error::{DefMapError, ErrorKind, ExecutionSource};
pub use execute::Executor;
pub use extract::Extractor;
pub use rebuild::{RebuildOptions, Rebuilder};
