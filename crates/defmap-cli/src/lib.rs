//! Command-line runtime for the `defmap` binary.
//!
//! The runtime splits configuration flags from the command, loads layered
//! configuration, installs telemetry, and runs one of:
//!
//! - `extract <SOURCE> [--output <JSON>]`
//! - `rebuild <JSON> [--output <PY>]`
//! - `run <JSON>`
//!
//! Streams and the configuration loader are parameters so tests can drive the
//! runtime in-process.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;


use cli::Cli;
use config::{ArgumentSplit, ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;

/// Runs the CLI with the given arguments and output streams.
///
/// Errors are written to `stderr` as a single line and reported as
/// [`ExitCode::FAILURE`].
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    match dispatch(&split, stdout, loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_informational() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let text = error.to_string();
            let _ = writeln!(stderr, "{}", text.trim_end());
            ExitCode::FAILURE
        }
    }
}

fn dispatch<W, L>(split: &ArgumentSplit, stdout: &mut W, loader: &L) -> Result<(), AppError>
where
    W: Write,
    L: ConfigLoader,
{
    let cli = Cli::try_parse_from(&split.command_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    config.validate()?;
    telemetry::initialise(&config)?;
    commands::execute(cli.command, &config, stdout)
}
