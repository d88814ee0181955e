//! Restores the parent environment after `birdcage` activation.

use std::collections::{HashMap, HashSet};
use std::env;
use std::ffi::OsString;

/// Snapshot of the process environment, restored on drop.
///
/// `birdcage` clears variables in the calling process while it activates;
/// the guard puts them back once the child is running.
#[derive(Debug)]
pub(crate) struct EnvGuard {
    original: HashMap<OsString, OsString>,
}

impl EnvGuard {
    pub(crate) fn capture() -> Self {
        Self {
            original: env::vars_os().collect(),
        }
    }

    pub(crate) fn restore(&self) {
        let expected: HashSet<&OsString> = self.original.keys().collect();
        let introduced: Vec<OsString> = env::vars_os()
            .map(|(key, _)| key)
            .filter(|key| !expected.contains(key))
            .collect();

        for key in introduced {
            // SAFETY: spawn runs only after the single-thread preflight.
            unsafe { env::remove_var(key) };
        }
        for (key, value) in &self.original {
            // SAFETY: as above.
            unsafe { env::set_var(key, value) };
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
