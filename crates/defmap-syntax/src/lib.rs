//! Tree-sitter powered Python parsing for the defmap toolchain.
//!
//! This crate is the grammar boundary of defmap. It provides:
//!
//! - [`Parser`], a thin wrapper around a Tree-sitter parser loaded with the
//!   Python grammar;
//! - [`ParseResult`], which owns the tree and source and reports syntax errors
//!   with one-based positions;
//! - helpers that classify rows which begin inside multi-line string literals,
//!   so callers can dedent and re-indent Python text without altering string
//!   values.
//!
//! # Example
//!
//! ```
//! use defmap_syntax::Parser;
//!
//! let mut parser = Parser::new()?;
//! let parsed = parser.parse("def greet():\n    return 'hi'\n")?;
//! parsed.ensure_valid()?;
//! assert_eq!(parsed.root_node().kind(), "module");
//! # Ok::<(), defmap_syntax::SyntaxError>(())
//! ```

mod error;
mod parser;
mod position;
mod strings;

pub use error::SyntaxError;
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::row_to_line;
