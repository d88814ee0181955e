use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How executed source is confined.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IsolationMode {
    /// An ordinary child process.
    #[default]
    Unconfined,
    /// A child process inside the sandbox.
    Sandboxed,
}

/// Errors encountered while parsing an [`IsolationMode`] from text.
pub type IsolationModeParseError = strum::ParseError;
