//! Privilege escalation for the installer
//!
//! Everything that needs root goes through a [`PrivilegedRunner`]; the
//! production runner is `sudo`. The [`SudoTicket`] guard makes sure a sudo
//! timestamp created by this run does not outlive it.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::error::InstallerError;
use super::ui;

const DEFAULT_SUDO: &str = "/usr/bin/sudo";

fn sudo_path() -> PathBuf {
    which::which("sudo").unwrap_or_else(|_| PathBuf::from(DEFAULT_SUDO))
}

/// Runs one command with elevated privileges.
pub trait PrivilegedRunner {
    fn run_privileged(&self, argv: &[String]) -> Result<ExitStatus, InstallerError>;

    /// How the command is shown to the user and in failure messages.
    fn describe(&self, argv: &[String]) -> String {
        ui::shell_display(argv)
    }
}

/// Run `argv` through `runner`, turning a non-zero exit into
/// [`InstallerError::CommandFailed`].
pub fn run_checked(runner: &dyn PrivilegedRunner, argv: &[String]) -> Result<(), InstallerError> {
    let status = runner.run_privileged(argv)?;
    if status.success() {
        Ok(())
    } else {
        log::debug!("privileged command exited with {status}");
        Err(InstallerError::CommandFailed {
            command: runner.describe(argv),
        })
    }
}

/// [`PrivilegedRunner`] that shells out to `sudo`.
#[derive(Debug, Clone)]
pub struct SudoRunner {
    sudo: PathBuf,
    /// Pass `-A` so sudo asks `SUDO_ASKPASS` for the password.
    askpass: bool,
}

impl SudoRunner {
    pub fn new(askpass: bool) -> Self {
        Self {
            sudo: sudo_path(),
            askpass,
        }
    }

    fn full_argv(&self, argv: &[String]) -> Vec<String> {
        let mut full = vec![self.sudo.display().to_string()];
        if self.askpass {
            full.push("-A".to_string());
        }
        if let Some((program, rest)) = argv.split_first() {
            full.push(resolve_program(program));
            full.extend(rest.iter().cloned());
        }
        full
    }
}

/// Absolute path of `program` when it can be found, so sudo's secure_path
/// cannot change which binary runs.
fn resolve_program(program: &str) -> String {
    if Path::new(program).is_absolute() {
        return program.to_string();
    }
    which::which(program)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| program.to_string())
}

impl PrivilegedRunner for SudoRunner {
    fn run_privileged(&self, argv: &[String]) -> Result<ExitStatus, InstallerError> {
        let full = self.full_argv(argv);
        ui::ohai(&ui::shell_display(&full));

        let (program, args) = full
            .split_first()
            .ok_or_else(|| InstallerError::CommandFailed {
                command: String::new(),
            })?;
        Command::new(program)
            .args(args)
            .status()
            .map_err(|e| InstallerError::io(format!("Failed to execute {program}"), e))
    }

    fn describe(&self, argv: &[String]) -> String {
        ui::shell_display(&self.full_argv(argv))
    }
}

/// Scoped sudo timestamp.
///
/// On creation, checks whether a sudo timestamp is already valid
/// (`sudo -n -v`). If it was not, the timestamp is invalidated (`sudo -k`)
/// when the guard drops, so the run leaves no cached credentials behind.
#[derive(Debug)]
pub struct SudoTicket {
    sudo: PathBuf,
    invalidate_on_drop: bool,
}

impl SudoTicket {
    pub fn acquire() -> Self {
        Self::acquire_with(sudo_path())
    }

    pub fn acquire_with(sudo: PathBuf) -> Self {
        let active = Command::new(&sudo)
            .args(["-n", "-v"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success());
        log::debug!("sudo timestamp active at start: {active}");
        Self {
            sudo,
            invalidate_on_drop: !active,
        }
    }

    pub fn was_active(&self) -> bool {
        !self.invalidate_on_drop
    }
}

impl Drop for SudoTicket {
    fn drop(&mut self) {
        if self.invalidate_on_drop {
            // Best effort; nothing useful can be done if this fails on the way out.
            let _ = Command::new(&self.sudo)
                .arg("-k")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
        }
    }
}
