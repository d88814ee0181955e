//! Error type for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use defmap_config::ConfigError;
use defmap_core::DefMapError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("{} error: {source}", .source.kind())]
    DefMap {
        #[from]
        source: DefMapError,
    },
    #[error("failed to serialise bindings: {0}")]
    SerialiseBindings(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

impl AppError {
    /// Clap renders help and version requests as errors that should print to
    /// standard output and succeed.
    pub(crate) fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::CliUsage(error) if matches!(
                error.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            )
        )
    }
}
