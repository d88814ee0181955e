//! Errors raised while preparing a sandboxed launch.

use std::io;
use std::path::PathBuf;

use birdcage::error::Error as BirdcageError;
use thiserror::Error;

/// Errors raised while preparing or launching a sandboxed process.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The program path was relative.
    #[error("sandboxed programs must be given as absolute paths, got {0}")]
    ProgramNotAbsolute(PathBuf),

    /// The program is not listed as an executable on the profile.
    #[error("executable {program} is not whitelisted by the sandbox profile")]
    ExecutableNotAuthorised {
        /// Canonical path of the rejected program.
        program: PathBuf,
    },

    /// A path named by the command or the profile does not exist.
    #[error("path {path} does not exist on the host filesystem")]
    MissingPath {
        /// The missing path as supplied.
        path: PathBuf,
    },

    /// Resolving a path to its canonical form failed.
    #[error("failed to canonicalise {path}: {source}")]
    CanonicalisationFailed {
        /// The path as supplied.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// More than one thread is running in the current process.
    #[error("sandboxing requires a single-threaded process (observed {thread_count} threads)")]
    MultiThreaded {
        /// Number of threads observed.
        thread_count: usize,
    },

    /// The thread count could not be read from `/proc`.
    #[error("failed to determine thread count: {source}")]
    ThreadCountUnavailable {
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// `birdcage` refused an exception or failed to activate.
    #[error("sandbox activation failed: {0}")]
    Activation(#[from] BirdcageError),
}
