//! Domain errors raised by extraction, rebuilding, and execution.
//!
//! All errors use a `thiserror`-derived enum with structured context so
//! callers can inspect the failure programmatically. I/O errors are wrapped in
//! `Arc` to satisfy the `result_large_err` Clippy lint.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use defmap_syntax::SyntaxError;
use thiserror::Error;

/// Boxed error produced by an execution collaborator.
pub type ExecutionSource = Box<dyn StdError + Send + Sync + 'static>;

/// Errors arising from defmap operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DefMapError {
    /// The input is not syntactically valid Python, or the grammar failed to
    /// load.
    #[error("failed to parse {origin}: {source}")]
    Parse {
        /// Path of the source file, or `<memory>` for in-memory text.
        origin: String,
        /// Underlying parser failure.
        #[source]
        source: SyntaxError,
    },

    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The interchange text is not valid JSON.
    #[error("interchange document is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The interchange document is missing a field its kind requires, or its
    /// nesting is malformed.
    #[error("invalid document at {path}: {message}")]
    Structure {
        /// Location of the offending node, for example
        /// `$.body_definitions[0]`.
        path: String,
        /// Description of the violation.
        message: String,
    },

    /// The document could not be serialised.
    #[error("failed to serialise document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The execution collaborator reported a failure, relayed unmodified.
    #[error("execution of rebuilt source failed: {source}")]
    Execution {
        /// The collaborator's own error value.
        #[source]
        source: ExecutionSource,
    },
}

/// Coarse failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input source: re-extract after fixing the Python text.
    Parse,
    /// A path was unreadable or unwritable.
    Io,
    /// Bad interchange document: fix the document.
    Structure,
    /// Regenerated code failed when executed: inspect the generated code.
    Execution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse",
            Self::Io => "io",
            Self::Structure => "structure",
            Self::Execution => "execution",
        })
    }
}

impl DefMapError {
    /// Creates a parse error for source read from `path`.
    #[must_use]
    pub fn parse_file(path: &Path, source: SyntaxError) -> Self {
        Self::Parse {
            origin: path.display().to_string(),
            source,
        }
    }

    /// Creates a parse error for in-memory source text.
    #[must_use]
    pub fn parse_memory(source: SyntaxError) -> Self {
        Self::Parse {
            origin: String::from("<memory>"),
            source,
        }
    }

    /// Creates a read error.
    #[must_use]
    pub fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Creates a write error.
    #[must_use]
    pub fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Creates a structure error for the node at `path`.
    #[must_use]
    pub fn structure(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wraps an executor failure without altering it.
    #[must_use]
    pub fn execution<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Execution {
            source: Box::new(source),
        }
    }

    /// Classifies a JSON failure: malformed text is a decode error, a
    /// well-formed document of the wrong shape is a structure error.
    #[must_use]
    pub fn from_json(error: serde_json::Error) -> Self {
        match error.classify() {
            serde_json::error::Category::Data => Self::structure("$", error.to_string()),
            serde_json::error::Category::Io
            | serde_json::error::Category::Syntax
            | serde_json::error::Category::Eof => Self::Decode(error),
        }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Read { .. } | Self::Write { .. } => ErrorKind::Io,
            Self::Decode(_) | Self::Structure { .. } | Self::Encode(_) => ErrorKind::Structure,
            Self::Execution { .. } => ErrorKind::Execution,
        }
    }

    /// Returns the executor's error when this is an execution failure of
    /// type `E`.
    #[must_use]
    pub fn execution_source<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Self::Execution { source } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq, Eq)]
    #[error("boom: {0}")]
    struct Boom(&'static str);

    #[test]
    fn execution_errors_keep_the_original_value() {
        let error = DefMapError::execution(Boom("NameError"));

        assert_eq!(error.kind(), ErrorKind::Execution);
        assert_eq!(error.execution_source::<Boom>(), Some(&Boom("NameError")));
        assert!(error.to_string().contains("boom: NameError"));
    }

    #[test]
    fn invalid_json_text_is_a_decode_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json")
            .expect_err("not json");
        let error = DefMapError::from_json(json_error);

        assert!(matches!(error, DefMapError::Decode(_)));
        assert_eq!(error.kind(), ErrorKind::Structure);
    }

    #[test]
    fn io_errors_report_their_path() {
        let error = DefMapError::read(
            Path::new("missing.py"),
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );

        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(error.to_string().contains("missing.py"));
    }
}
