//! Declarative sandbox policy.

use std::collections::BTreeSet;
use std::path::PathBuf;

use birdcage::Exception;

use crate::runtime::linux_runtime_roots;

/// Which parent environment variables reach the sandboxed child.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvironmentPolicy {
    /// The child starts with an empty environment.
    #[default]
    Isolated,
    /// Only the named variables are inherited.
    AllowList(BTreeSet<String>),
    /// The full environment is inherited.
    InheritAll,
}

impl EnvironmentPolicy {
    fn with_allowed(self, key: String) -> Self {
        match self {
            Self::Isolated => Self::AllowList(BTreeSet::from([key])),
            Self::AllowList(mut keys) => {
                let _ = keys.insert(key);
                Self::AllowList(keys)
            }
            Self::InheritAll => Self::InheritAll,
        }
    }

    pub(crate) fn to_exceptions(&self) -> Vec<Exception> {
        match self {
            Self::Isolated => Vec::new(),
            Self::AllowList(keys) => keys.iter().cloned().map(Exception::Environment).collect(),
            Self::InheritAll => vec![Exception::FullEnvironment],
        }
    }
}

/// Whether the sandboxed child may use the network.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NetworkPolicy {
    /// The child runs in its own, empty network namespace.
    #[default]
    Deny,
    /// The child shares the host network.
    Allow,
}

impl NetworkPolicy {
    /// Returns true when networking is denied.
    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Deny)
    }
}

/// The resources a sandboxed interpreter may access.
///
/// A new profile denies networking, strips the environment, and grants read
/// access to the host's runtime library roots only. The interpreter binary
/// and any data it needs must be added explicitly.
#[derive(Debug, Clone)]
pub struct SandboxProfile {
    read_only_paths: Vec<PathBuf>,
    read_write_paths: Vec<PathBuf>,
    executable_paths: Vec<PathBuf>,
    environment: EnvironmentPolicy,
    network: NetworkPolicy,
}

impl SandboxProfile {
    /// Creates a profile with the runtime library roots readable.
    ///
    /// ```
    /// use defmap_sandbox::SandboxProfile;
    ///
    /// let profile = SandboxProfile::new()
    ///     .allow_executable("/usr/bin/python3")
    ///     .allow_read_path("/usr/share/defmap");
    /// assert!(profile.network_policy().is_denied());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_only_paths: linux_runtime_roots(),
            read_write_paths: Vec::new(),
            executable_paths: Vec::new(),
            environment: EnvironmentPolicy::default(),
            network: NetworkPolicy::default(),
        }
    }

    /// Grants execute and read access to `path`.
    #[must_use]
    pub fn allow_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_paths.push(path.into());
        self
    }

    /// Grants read access to `path`.
    #[must_use]
    pub fn allow_read_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_only_paths.push(path.into());
        self
    }

    /// Grants read access to every path in `paths`.
    #[must_use]
    pub fn allow_read_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.read_only_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Grants read and write access to `path`.
    #[must_use]
    pub fn allow_read_write_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_write_paths.push(path.into());
        self
    }

    /// Lets the child inherit the environment variable `key`.
    ///
    /// Has no effect once the full environment is inherited.
    #[must_use]
    pub fn allow_environment_variable(mut self, key: impl Into<String>) -> Self {
        self.environment = self.environment.with_allowed(key.into());
        self
    }

    /// Lets the child inherit the full parent environment.
    #[must_use]
    pub fn allow_full_environment(mut self) -> Self {
        self.environment = EnvironmentPolicy::InheritAll;
        self
    }

    /// Lets the child use the host network.
    #[must_use]
    pub const fn allow_networking(mut self) -> Self {
        self.network = NetworkPolicy::Allow;
        self
    }

    /// Paths the child may read.
    #[must_use]
    pub fn read_only_paths(&self) -> &[PathBuf] {
        &self.read_only_paths
    }

    /// Paths the child may read and write.
    #[must_use]
    pub fn read_write_paths(&self) -> &[PathBuf] {
        &self.read_write_paths
    }

    /// Programs the child may execute.
    #[must_use]
    pub fn executable_paths(&self) -> &[PathBuf] {
        &self.executable_paths
    }

    /// The environment inheritance policy.
    #[must_use]
    pub const fn environment_policy(&self) -> &EnvironmentPolicy {
        &self.environment
    }

    /// The network policy.
    #[must_use]
    pub const fn network_policy(&self) -> NetworkPolicy {
        self.network
    }
}

impl Default for SandboxProfile {
    fn default() -> Self {
        Self::new()
    }
}
