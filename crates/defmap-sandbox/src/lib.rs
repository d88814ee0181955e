//! Process sandbox for executing regenerated Python modules.
//!
//! `defmap-sandbox` wraps [`birdcage`] so that an interpreter running
//! untrusted, freshly rebuilt source sees as little of the host as possible.
//! A [`SandboxProfile`] lists what the child may touch; a [`Sandbox`] checks
//! the request and launches the child under Linux namespaces and
//! `seccomp-bpf` filters.
//!
//! Profiles start closed:
//! - no network,
//! - an empty environment,
//! - read access to the standard Linux library roots only.
//!
//! Executables must be whitelisted by absolute path.
//!
//! ```rust,no_run
//! use defmap_sandbox::{Sandbox, SandboxCommand, SandboxProfile, process::Stdio};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = SandboxProfile::new().allow_executable("/usr/bin/python3");
//!
//! let mut command = SandboxCommand::new("/usr/bin/python3");
//! command.args(["-c", "print(40 + 2)"]).stdout(Stdio::piped());
//!
//! let child = Sandbox::new(profile).spawn(command)?;
//! let output = child.wait_with_output()?;
//! assert_eq!(String::from_utf8_lossy(&output.stdout), "42\n");
//! # Ok(()) }
//! ```
//!
//! `birdcage` asserts that activation happens on a single-threaded process.
//! [`Sandbox::spawn`] reports [`SandboxError::MultiThreaded`] instead of
//! tripping that assertion.

mod env_guard;
mod error;
mod profile;
mod runtime;
mod sandbox;


pub use birdcage::process;
pub use error::SandboxError;
pub use profile::{EnvironmentPolicy, NetworkPolicy, SandboxProfile};
pub use sandbox::{Sandbox, SandboxChild, SandboxCommand, SandboxOutput};
