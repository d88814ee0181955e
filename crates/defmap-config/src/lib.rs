//! Layered configuration for the `defmap` tools.
//!
//! [`Config`] is assembled by `ortho_config` from, lowest precedence first:
//! built-in defaults, a TOML file named by `--config-path`, `DEFMAP_*`
//! environment variables, and command-line flags.

mod defaults;
mod isolation;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_EXEC_TIMEOUT_SECS, DEFAULT_INDENT_WIDTH, DEFAULT_LOG_FILTER, DEFAULT_PYTHON,
    default_exec_timeout_secs, default_indent_width, default_isolation, default_log_filter,
    default_log_filter_string, default_log_format, default_python,
};
pub use isolation::{IsolationMode, IsolationModeParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Widest indentation accepted for rebuilt source.
pub const MAX_INDENT_WIDTH: usize = 16;

/// Settings shared by the `defmap` binary and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEFMAP")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `defmap_core=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format: `compact` or `json`.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Spaces per indentation level in rebuilt source.
    #[ortho_config(default = default_indent_width())]
    pub indent_width: usize,
    /// Python interpreter used by `defmap run`.
    #[ortho_config(default = default_python())]
    pub python: Utf8PathBuf,
    /// How `defmap run` confines the interpreter: `unconfined` or `sandboxed`.
    #[ortho_config(default = default_isolation())]
    pub isolation: IsolationMode,
    /// Seconds an execution may run before it is killed.
    #[ortho_config(default = default_exec_timeout_secs())]
    pub exec_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            indent_width: default_indent_width(),
            python: default_python(),
            isolation: default_isolation(),
            exec_timeout_secs: default_exec_timeout_secs(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Spaces per indentation level in rebuilt source.
    #[must_use]
    pub const fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Interpreter path.
    #[must_use]
    pub fn python(&self) -> &Utf8Path {
        &self.python
    }

    /// Interpreter confinement.
    #[must_use]
    pub const fn isolation(&self) -> IsolationMode {
        self.isolation
    }

    /// Execution time limit.
    #[must_use]
    pub const fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indent_width == 0 || self.indent_width > MAX_INDENT_WIDTH {
            return Err(ConfigError::IndentWidth {
                width: self.indent_width,
            });
        }
        if self.exec_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.isolation == IsolationMode::Sandboxed && !self.python.is_absolute() {
            return Err(ConfigError::RelativeSandboxedPython {
                python: self.python.clone(),
            });
        }
        Ok(())
    }
}

/// Settings that load successfully but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `indent_width` is outside `1..=MAX_INDENT_WIDTH`.
    #[error("indent_width must be between 1 and {MAX_INDENT_WIDTH}, got {width}")]
    IndentWidth {
        /// The configured width.
        width: usize,
    },
    /// `exec_timeout_secs` is zero.
    #[error("exec_timeout_secs must be greater than zero")]
    ZeroTimeout,
    /// A sandboxed interpreter was named by a relative path.
    #[error("sandboxed execution requires an absolute python path, got {python}")]
    RelativeSandboxedPython {
        /// The configured interpreter.
        python: Utf8PathBuf,
    },
}
