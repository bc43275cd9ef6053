//! Environment detection for the installer
//!
//! Captures, once at startup, everything the workflow reads from the process
//! environment: whether stdin is a terminal, CI markers, the sudo askpass
//! helper and `PATH`.

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::Path;

/// Variables whose presence marks an unattended CI run.
const CI_VARS: &[&str] = &["CI", "TRAVIS"];

/// Snapshot of the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// stdin is attached to a terminal.
    pub interactive: bool,
    pub ci: bool,
    /// `SUDO_ASKPASS` is set, so sudo should be invoked with `-A`.
    pub askpass: bool,
    pub path: Option<OsString>,
}

impl Environment {
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal(),
            ci: is_ci_environment(),
            askpass: std::env::var_os("SUDO_ASKPASS").is_some(),
            path: std::env::var_os("PATH"),
        }
    }

    /// Confirmation is only requested from a human at a terminal.
    pub fn should_prompt(&self) -> bool {
        self.interactive && !self.ci
    }

    /// Whether `dir` is one of the `PATH` entries.
    pub fn path_contains(&self, dir: &Path) -> bool {
        self.path
            .as_ref()
            .is_some_and(|p| std::env::split_paths(p).any(|entry| entry == dir))
    }
}

/// Check if running under a CI service
///
/// Any of the [`CI_VARS`] being set (to anything) counts.
pub fn is_ci_environment() -> bool {
    CI_VARS.iter().any(|v| std::env::var_os(v).is_some())
}
