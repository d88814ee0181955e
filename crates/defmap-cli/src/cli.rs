//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Extract Python modules into editable documents and rebuild them.
///
/// Configuration flags (`--config-path`, `--log-filter`, `--log-format`,
/// `--indent-width`, `--python`, `--isolation`, `--exec-timeout-secs`) go
/// before the command.
#[derive(Parser, Debug)]
#[command(name = "defmap", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Extracts a Python source file into a JSON document.
    Extract {
        /// Python source file to read.
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
        /// Writes the document here instead of standard output.
        #[arg(long, short, value_name = "JSON")]
        output: Option<PathBuf>,
    },
    /// Regenerates Python source from a JSON document.
    Rebuild {
        /// Document to read.
        #[arg(value_name = "JSON")]
        document: PathBuf,
        /// Writes the source here instead of standard output.
        #[arg(long, short, value_name = "PY")]
        output: Option<PathBuf>,
    },
    /// Regenerates source from a document, executes it, and prints the
    /// resulting bindings as JSON.
    Run {
        /// Document to read.
        #[arg(value_name = "JSON")]
        document: PathBuf,
    },
}
