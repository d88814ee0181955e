//! Capability boundary for running regenerated source.
//!
//! The core never executes code itself. Callers supply an [`Executor`] (a
//! subprocess, a sandboxed interpreter, or a test double) and the core relays
//! its bindings or its error unchanged.

use std::error::Error as StdError;

/// Runs source text and returns the resulting namespace bindings.
pub trait Executor {
    /// Namespace produced by a successful run.
    type Bindings;
    /// Failure reported by the executor.
    type Error: StdError + Send + Sync + 'static;

    /// Executes `source` to completion.
    ///
    /// # Errors
    ///
    /// Returns the executor's own error when the source cannot be run or
    /// raises.
    fn execute(&self, source: &str) -> Result<Self::Bindings, Self::Error>;
}
