//! Runs regenerated source in a Python interpreter subprocess.
//!
//! [`PythonExecutor`] launches the interpreter with a small harness
//! (`harness.py`) passed through `-c`, writes the source to its stdin, and
//! reads back a single JSON report describing the module namespace or the
//! exception it raised. The interpreter runs either unconfined or inside the
//! `defmap-sandbox` cage, and is killed when it overruns its timeout.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use defmap_core::Executor;
use defmap_sandbox::process::Stdio as SandboxStdio;
use defmap_sandbox::{Sandbox, SandboxChild, SandboxCommand, SandboxProfile};

use crate::error::ExecError;
use crate::namespace::{Namespace, parse_report};

/// Tracing target for interpreter process operations.
const PROCESS_TARGET: &str = "defmap_exec::process";

/// Default wall-clock limit for one execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const HARNESS: &str = include_str!("harness.py");
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How the interpreter process is confined.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Isolation {
    /// Run as an ordinary child process with the caller's environment.
    #[default]
    Unconfined,
    /// Run under the `birdcage` sandbox: no network, empty environment,
    /// read-only access to the runtime roots and any extra read paths.
    ///
    /// Activation requires a single-threaded caller.
    Sandboxed,
}

/// An [`Executor`] backed by a Python interpreter.
///
/// ```rust,no_run
/// use defmap_core::execute_rebuilt;
/// use defmap_exec::PythonExecutor;
///
/// let executor = PythonExecutor::new("/usr/bin/python3");
/// let document = defmap_core::extract_source("x = 40 + 2\n")?;
/// let namespace = execute_rebuilt(&document, &executor)?;
/// assert_eq!(namespace.value("x"), Some(&serde_json::json!(42)));
/// # Ok::<(), defmap_core::DefMapError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PythonExecutor {
    interpreter: PathBuf,
    isolation: Isolation,
    timeout: Duration,
    read_paths: Vec<PathBuf>,
}

impl PythonExecutor {
    /// Creates an unconfined executor for `interpreter` with the default
    /// timeout.
    #[must_use]
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            isolation: Isolation::default(),
            timeout: DEFAULT_TIMEOUT,
            read_paths: Vec::new(),
        }
    }

    /// Sets how the interpreter is confined.
    #[must_use]
    pub const fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// Sets the wall-clock limit for one execution.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Grants the sandboxed interpreter read access to `path`, for example a
    /// site-packages directory outside the runtime roots.
    #[must_use]
    pub fn allow_read_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_paths.push(path.into());
        self
    }

    /// The interpreter this executor launches.
    #[must_use]
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// The confinement applied to the interpreter.
    #[must_use]
    pub const fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// The wall-clock limit for one execution.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes `source` and returns the namespace it leaves behind.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Raised`] when the source raises, and the other
    /// [`ExecError`] variants when the interpreter cannot be launched,
    /// overruns its timeout, or reports nothing usable.
    pub fn run(&self, source: &str) -> Result<Namespace, ExecError> {
        debug!(
            target: PROCESS_TARGET,
            interpreter = %self.interpreter.display(),
            isolation = ?self.isolation,
            source_bytes = source.len(),
            "spawning interpreter"
        );
        let mut child = self.spawn()?;
        let (input, output, errors) = child.take_pipes()?;

        let stdout_reader = read_in_background(output);
        let stderr_reader = read_in_background(errors);
        if let Err(error) = write_source(input, source) {
            child.kill();
            return Err(error);
        }
        let waited = self.wait_for_exit(&mut child);
        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        let exit = waited?;

        debug!(
            target: PROCESS_TARGET,
            status = ?exit.code,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "interpreter exited"
        );
        if !exit.success {
            return Err(ExecError::NonZeroExit {
                status: exit.code.unwrap_or(-1),
                stderr: stderr.trim().to_owned(),
            });
        }
        parse_report(&stdout)
    }

    fn spawn(&self) -> Result<RunningChild, ExecError> {
        match self.isolation {
            Isolation::Unconfined => {
                let mut command = Command::new(&self.interpreter);
                command
                    .args(["-B", "-c", HARNESS])
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
                command
                    .spawn()
                    .map(RunningChild::Unconfined)
                    .map_err(|error| ExecError::Spawn {
                        interpreter: self.interpreter.clone(),
                        source: error.into(),
                    })
            }
            Isolation::Sandboxed => {
                let profile = SandboxProfile::new()
                    .allow_executable(&self.interpreter)
                    .allow_read_paths(self.read_paths.iter().cloned());
                let mut command = SandboxCommand::new(&self.interpreter);
                command.args(["-B", "-c", HARNESS]);
                command.stdin(SandboxStdio::piped());
                command.stdout(SandboxStdio::piped());
                command.stderr(SandboxStdio::piped());
                Sandbox::new(profile)
                    .spawn(command)
                    .map(RunningChild::Sandboxed)
                    .map_err(|error| ExecError::Sandbox {
                        interpreter: self.interpreter.clone(),
                        message: error.to_string(),
                    })
            }
        }
    }

    /// Polls for exit, killing the child once the timeout has passed.
    fn wait_for_exit(&self, child: &mut RunningChild) -> Result<Exit, ExecError> {
        let start = Instant::now();
        loop {
            if let Some(exit) = child
                .try_wait()
                .map_err(|error| ExecError::io("waiting for the interpreter", error))?
            {
                return Ok(exit);
            }
            if start.elapsed() > self.timeout {
                warn!(
                    target: PROCESS_TARGET,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "interpreter timed out, killing process"
                );
                child.kill();
                return Err(ExecError::Timeout {
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Executor for PythonExecutor {
    type Bindings = Namespace;
    type Error = ExecError;

    fn execute(&self, source: &str) -> Result<Namespace, ExecError> {
        self.run(source)
    }
}

struct Exit {
    success: bool,
    code: Option<i32>,
}

type Pipes = (
    Box<dyn Write + Send>,
    Box<dyn Read + Send>,
    Box<dyn Read + Send>,
);

/// A launched interpreter, confined or not.
enum RunningChild {
    Unconfined(Child),
    Sandboxed(SandboxChild),
}

impl RunningChild {
    fn take_pipes(&mut self) -> Result<Pipes, ExecError> {
        let pipes = match self {
            Self::Unconfined(child) => {
                boxed_pipes(child.stdin.take(), child.stdout.take(), child.stderr.take())
            }
            Self::Sandboxed(child) => {
                boxed_pipes(child.stdin.take(), child.stdout.take(), child.stderr.take())
            }
        };
        if pipes.is_none() {
            self.kill();
        }
        pipes.ok_or_else(|| {
            ExecError::io(
                "capturing interpreter pipes",
                io::Error::new(io::ErrorKind::BrokenPipe, "standard streams were not piped"),
            )
        })
    }

    fn try_wait(&mut self) -> io::Result<Option<Exit>> {
        match self {
            Self::Unconfined(child) => Ok(child.try_wait()?.map(|status| Exit {
                success: status.success(),
                code: status.code(),
            })),
            Self::Sandboxed(child) => Ok(child.try_wait()?.map(|status| Exit {
                success: status.success(),
                code: status.code(),
            })),
        }
    }

    /// Kills and reaps the child. Failures mean it has already exited.
    fn kill(&mut self) {
        match self {
            Self::Unconfined(child) => {
                drop(child.kill());
                drop(child.wait());
            }
            Self::Sandboxed(child) => {
                drop(child.kill());
                drop(child.wait());
            }
        }
    }
}

fn boxed_pipes<I, O, E>(stdin: Option<I>, stdout: Option<O>, stderr: Option<E>) -> Option<Pipes>
where
    I: Write + Send + 'static,
    O: Read + Send + 'static,
    E: Read + Send + 'static,
{
    let input: Box<dyn Write + Send> = Box::new(stdin?);
    let output: Box<dyn Read + Send> = Box::new(stdout?);
    let errors: Box<dyn Read + Send> = Box::new(stderr?);
    Some((input, output, errors))
}

/// Writes the source and closes stdin so the harness sees end of input.
fn write_source(mut stdin: Box<dyn Write + Send>, source: &str) -> Result<(), ExecError> {
    let written = stdin
        .write_all(source.as_bytes())
        .and_then(|()| stdin.flush());
    match written {
        // The interpreter exited before reading everything; its exit status
        // and stderr tell the real story.
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.map_err(|error| ExecError::io("writing source", error)),
    }
}

fn read_in_background(mut reader: Box<dyn Read + Send>) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn join_reader(handle: JoinHandle<io::Result<String>>) -> Result<String, ExecError> {
    handle
        .join()
        .map_err(|_| {
            ExecError::io(
                "reading interpreter output",
                io::Error::other("reader thread panicked"),
            )
        })?
        .map_err(|error| ExecError::io("reading interpreter output", error))
}
