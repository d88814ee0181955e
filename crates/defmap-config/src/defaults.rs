//! Built-in configuration values, the lowest precedence layer.

use camino::Utf8PathBuf;

use crate::isolation::IsolationMode;
use crate::logging::LogFormat;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default number of spaces per indentation level in rebuilt source.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Default interpreter used to execute rebuilt source.
pub const DEFAULT_PYTHON: &str = "/usr/bin/python3";

/// Default wall-clock limit, in seconds, for one execution.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default indentation width.
#[must_use]
pub const fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

/// Default interpreter path.
#[must_use]
pub fn default_python() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PYTHON)
}

/// Default execution timeout in seconds.
#[must_use]
pub const fn default_exec_timeout_secs() -> u64 {
    DEFAULT_EXEC_TIMEOUT_SECS
}

/// Execution runs unconfined unless requested otherwise.
#[must_use]
pub const fn default_isolation() -> IsolationMode {
    IsolationMode::Unconfined
}
