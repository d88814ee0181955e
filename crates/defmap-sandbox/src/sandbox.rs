//! Preflight checks and `birdcage` activation.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use birdcage::process::{Child, Command, Output};
use birdcage::{Birdcage, Exception, Sandbox as _};

use crate::env_guard::EnvGuard;
use crate::error::SandboxError;
use crate::profile::{NetworkPolicy, SandboxProfile};
use crate::runtime::thread_count;

/// Builder for a sandboxed command.
pub type SandboxCommand = Command;
/// Handle to a running sandboxed process.
pub type SandboxChild = Child;
/// Captured output of a finished sandboxed process.
pub type SandboxOutput = Output;

/// Launches commands under a [`SandboxProfile`].
#[derive(Debug, Clone)]
pub struct Sandbox {
    profile: SandboxProfile,
}

impl Sandbox {
    /// Creates a sandbox enforcing `profile`.
    #[must_use]
    pub const fn new(profile: SandboxProfile) -> Self {
        Self { profile }
    }

    /// The profile this sandbox enforces.
    #[must_use]
    pub const fn profile(&self) -> &SandboxProfile {
        &self.profile
    }

    /// Spawns `command` inside the sandbox.
    ///
    /// The program must be an absolute path listed on the profile. Path
    /// checks run before the thread check, so a misconfigured command is
    /// reported the same way from any thread.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::ProgramNotAbsolute`],
    /// [`SandboxError::MissingPath`], or
    /// [`SandboxError::ExecutableNotAuthorised`] for a rejected program,
    /// [`SandboxError::MultiThreaded`] when other threads are running, and
    /// [`SandboxError::Activation`] when `birdcage` fails.
    pub fn spawn(&self, command: SandboxCommand) -> Result<SandboxChild, SandboxError> {
        let program = canonical_program(Path::new(command.get_program()))?;
        let executables = canonicalised_set(self.profile.executable_paths())?;
        if !executables.contains(&program) {
            return Err(SandboxError::ExecutableNotAuthorised { program });
        }
        let exceptions = self.exceptions(executables)?;
        ensure_single_threaded()?;

        let env_guard = EnvGuard::capture();
        let mut birdcage = Birdcage::new();
        for exception in exceptions {
            birdcage.add_exception(exception)?;
        }
        let child = birdcage.spawn(command)?;
        drop(env_guard);
        Ok(child)
    }

    fn exceptions(&self, executables: BTreeSet<PathBuf>) -> Result<Vec<Exception>, SandboxError> {
        let mut exceptions: Vec<Exception> = canonicalised_set(self.profile.read_only_paths())?
            .into_iter()
            .map(Exception::Read)
            .collect();
        exceptions.extend(
            canonicalised_set(self.profile.read_write_paths())?
                .into_iter()
                .map(Exception::WriteAndRead),
        );
        exceptions.extend(executables.into_iter().map(Exception::ExecuteAndRead));
        exceptions.extend(self.profile.environment_policy().to_exceptions());
        if self.profile.network_policy() == NetworkPolicy::Allow {
            exceptions.push(Exception::Networking);
        }
        Ok(exceptions)
    }
}

fn ensure_single_threaded() -> Result<(), SandboxError> {
    let threads =
        thread_count().map_err(|source| SandboxError::ThreadCountUnavailable { source })?;
    if threads > 1 {
        return Err(SandboxError::MultiThreaded {
            thread_count: threads,
        });
    }
    Ok(())
}

fn canonical_program(program: &Path) -> Result<PathBuf, SandboxError> {
    if !program.is_absolute() {
        return Err(SandboxError::ProgramNotAbsolute(program.to_path_buf()));
    }
    canonicalise(program)
}

fn canonicalised_set(paths: &[PathBuf]) -> Result<BTreeSet<PathBuf>, SandboxError> {
    paths.iter().map(|path| canonicalise(path)).collect()
}

fn canonicalise(path: &Path) -> Result<PathBuf, SandboxError> {
    if !path.exists() {
        return Err(SandboxError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    fs::canonicalize(path).map_err(|source| SandboxError::CanonicalisationFailed {
        path: path.to_path_buf(),
        source,
    })
}
