//! Errors raised while running regenerated source in an interpreter.
//!
//! I/O errors are wrapped in `Arc` to keep the enum small.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Errors arising from interpreter execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The interpreter process could not be started.
    #[error("failed to start interpreter {interpreter}: {source}")]
    Spawn {
        /// Interpreter that was launched.
        interpreter: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The sandbox refused to launch the interpreter.
    #[error("sandbox rejected interpreter {interpreter}: {message}")]
    Sandbox {
        /// Interpreter that was refused.
        interpreter: PathBuf,
        /// Description of the sandbox failure.
        message: String,
    },

    /// Communicating with the interpreter failed.
    #[error("I/O error while {stage}: {source}")]
    Io {
        /// What the executor was doing.
        stage: &'static str,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The interpreter did not finish in time and was killed.
    #[error("execution timed out after {timeout:?}")]
    Timeout {
        /// Configured limit.
        timeout: Duration,
    },

    /// The interpreter exited unsuccessfully without reporting a result.
    #[error("interpreter exited with status {status}: {stderr}")]
    NonZeroExit {
        /// Exit code, or -1 when the process was ended by a signal.
        status: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The interpreter's report could not be understood.
    #[error("interpreter wrote an invalid report: {message}")]
    InvalidOutput {
        /// Description of the problem.
        message: String,
    },

    /// The executed source raised an exception.
    #[error("{exception}: {message}")]
    Raised {
        /// Exception class name, for example `NameError`.
        exception: String,
        /// The exception's message.
        message: String,
        /// Formatted traceback as printed by the interpreter.
        traceback: String,
    },
}

impl ExecError {
    pub(crate) fn io(stage: &'static str, source: io::Error) -> Self {
        Self::Io {
            stage,
            source: Arc::new(source),
        }
    }

    /// Returns the exception class name when the source raised.
    #[must_use]
    pub fn exception(&self) -> Option<&str> {
        match self {
            Self::Raised { exception, .. } => Some(exception),
            _ => None,
        }
    }
}
