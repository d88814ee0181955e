//! Implementations of the `extract`, `rebuild`, and `run` commands.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use defmap_config::{Config, IsolationMode};
use defmap_core::{
    DefMapError, RebuildOptions, execute_rebuilt, get_ast_as_json, load_ast_from_json,
    rebuild_with_options, save_ast_as_json,
};
use defmap_exec::{Isolation, PythonExecutor};

use crate::cli::CliCommand;
use crate::errors::AppError;

const COMMAND_TARGET: &str = "defmap_cli::commands";

pub(crate) fn execute<W: Write>(
    command: CliCommand,
    config: &Config,
    stdout: &mut W,
) -> Result<(), AppError> {
    match command {
        CliCommand::Extract { source, output } => extract(&source, output.as_deref(), stdout),
        CliCommand::Rebuild { document, output } => {
            rebuild(&document, output.as_deref(), config, stdout)
        }
        CliCommand::Run { document } => run(&document, config, stdout),
    }
}

fn extract<W: Write>(source: &Path, output: Option<&Path>, stdout: &mut W) -> Result<(), AppError> {
    if let Some(target) = output {
        save_ast_as_json(source, target)?;
        info!(
            target: COMMAND_TARGET,
            source = %source.display(),
            output = %target.display(),
            "document saved"
        );
        return Ok(());
    }
    let json = get_ast_as_json(source)?;
    writeln!(stdout, "{json}").map_err(AppError::WriteOutput)
}

fn rebuild<W: Write>(
    document: &Path,
    output: Option<&Path>,
    config: &Config,
    stdout: &mut W,
) -> Result<(), AppError> {
    let mapping = load_ast_from_json(document)?;
    let options = RebuildOptions::with_indent_width(config.indent_width());
    let source = rebuild_with_options(mapping, options)?;
    if let Some(target) = output {
        fs::write(target, &source).map_err(|error| DefMapError::write(target, error))?;
        info!(
            target: COMMAND_TARGET,
            document = %document.display(),
            output = %target.display(),
            bytes = source.len(),
            "source saved"
        );
        return Ok(());
    }
    stdout
        .write_all(source.as_bytes())
        .map_err(AppError::WriteOutput)
}

fn run<W: Write>(document: &Path, config: &Config, stdout: &mut W) -> Result<(), AppError> {
    let mapping = load_ast_from_json(document)?;
    let namespace = execute_rebuilt(mapping, &executor(config))?;
    let json = serde_json::to_string_pretty(&namespace).map_err(AppError::SerialiseBindings)?;
    writeln!(stdout, "{json}").map_err(AppError::WriteOutput)
}

fn executor(config: &Config) -> PythonExecutor {
    let isolation = match config.isolation() {
        IsolationMode::Unconfined => Isolation::Unconfined,
        IsolationMode::Sandboxed => Isolation::Sandboxed,
    };
    PythonExecutor::new(config.python().as_std_path())
        .with_isolation(isolation)
        .with_timeout(config.exec_timeout())
}
