//! Entry point for the `defmap` binary.
//!
//! Delegates to [`defmap_cli::run`], which loads configuration, installs
//! telemetry, and dispatches the `extract`, `rebuild`, and `run` commands.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    defmap_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
