//! Python interpreter backend for [`defmap_core::Executor`].
//!
//! Regenerated source is piped to an interpreter subprocess that executes it
//! as a fresh module named `__rebuilt__` and reports the resulting bindings
//! (or the exception raised) as one line of JSON. The subprocess can run
//! inside the `defmap-sandbox` cage and is killed when it exceeds its
//! timeout.

mod error;
mod namespace;
mod process;

#[cfg(test)]
mod tests;

pub use error::ExecError;
pub use namespace::{Binding, Namespace};
pub use process::{DEFAULT_TIMEOUT, Isolation, PythonExecutor};
