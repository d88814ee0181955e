//! Host probes used for profile defaults and spawn preflight.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Library roots a dynamically linked interpreter needs to start.
#[cfg(target_os = "linux")]
const RUNTIME_ROOTS: [&str; 6] = [
    "/lib",
    "/lib64",
    "/usr/lib",
    "/usr/lib64",
    "/lib/x86_64-linux-gnu",
    "/usr/lib/x86_64-linux-gnu",
];

/// Returns the canonical forms of the runtime roots present on this host.
#[must_use]
pub(crate) fn linux_runtime_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        RUNTIME_ROOTS
            .iter()
            .map(Path::new)
            .filter(|root| root.exists())
            .filter_map(|root| fs::canonicalize(root).ok())
            .collect()
    }

    #[cfg(not(target_os = "linux"))]
    {
        Vec::new()
    }
}

/// Returns the number of threads in the current process.
pub(crate) fn thread_count() -> io::Result<usize> {
    #[cfg(target_os = "linux")]
    {
        let status = fs::read_to_string("/proc/self/status")?;
        parse_thread_count(&status)
    }

    #[cfg(not(target_os = "linux"))]
    {
        Ok(1)
    }
}

/// Reads the `Threads:` field of a `/proc/<pid>/status` document.
pub(crate) fn parse_thread_count(status: &str) -> io::Result<usize> {
    let (_, tail) = status
        .split_once("Threads:")
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing thread count"))?;
    let count = tail
        .split_whitespace()
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed thread count"))?;
    count
        .parse::<usize>()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}
