//! Plan display and the single-keypress confirmation.

use std::io::Read;

use nix::sys::termios::{self, SetArg, Termios};

use super::environment::Environment;
use super::error::InstallerError;
use super::plan::PermissionPlan;
use super::ui;

const CR: u8 = 13;
const LF: u8 = 10;

/// Source of a single keypress.
pub trait KeyReader {
    /// Read one byte; `None` on end of input.
    fn read_key(&mut self) -> std::io::Result<Option<u8>>;
}

/// Reads keys from any byte stream.
pub struct ReaderKeys<R>(pub R);

impl<R: Read> KeyReader for ReaderKeys<R> {
    fn read_key(&mut self) -> std::io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.0.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Reads one key from stdin with the terminal in raw, no-echo mode.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeyReader for TerminalKeys {
    fn read_key(&mut self) -> std::io::Result<Option<u8>> {
        let _raw = RawMode::enable()?;
        ReaderKeys(std::io::stdin().lock()).read_key()
    }
}

/// Restores the saved terminal attributes on drop.
struct RawMode {
    original: Termios,
}

impl RawMode {
    fn enable() -> std::io::Result<Self> {
        let stdin = std::io::stdin();
        let original = termios::tcgetattr(&stdin)?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &raw)?;
        Ok(Self { original })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = termios::tcsetattr(std::io::stdin(), SetArg::TCSANOW, &self.original);
    }
}

/// Print every non-empty plan category.
pub fn describe_plan(plan: &PermissionPlan, user: &str, group: &str) {
    if !plan.chmod_targets.is_empty() {
        ui::ohai("The following existing directories will be made group writable:");
        ui::print_paths(&plan.chmod_targets);
    }
    if !plan.chown_targets.is_empty() {
        ui::ohai_emphasized(
            "The following existing directories will have their owner set to ",
            Some(user),
            ":",
        );
        ui::print_paths(&plan.chown_targets);
    }
    if !plan.chgrp_targets.is_empty() {
        ui::ohai_emphasized(
            "The following existing directories will have their group set to ",
            Some(group),
            ":",
        );
        ui::print_paths(&plan.chgrp_targets);
    }
    if !plan.mkdir_targets.is_empty() {
        ui::ohai("The following new directories will be created:");
        ui::print_paths(&plan.mkdir_targets);
    }
}

/// Wait for RETURN when a human is watching; proceed unconditionally otherwise.
///
/// Only CR or LF confirm. Anything else, including end of input, is
/// [`InstallerError::Declined`].
pub fn confirm(
    env: &Environment,
    assume_yes: bool,
    keys: &mut dyn KeyReader,
) -> Result<(), InstallerError> {
    if assume_yes || !env.should_prompt() {
        log::debug!(
            "skipping confirmation (assume_yes={assume_yes}, interactive={}, ci={})",
            env.interactive,
            env.ci
        );
        return Ok(());
    }

    println!();
    println!("Press RETURN to continue or any other key to abort");

    let key = keys
        .read_key()
        .map_err(|e| InstallerError::io("Failed to read confirmation key", e))?;
    match key {
        Some(CR) | Some(LF) => Ok(()),
        _ => Err(InstallerError::Declined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanicKeys;

    impl KeyReader for PanicKeys {
        fn read_key(&mut self) -> std::io::Result<Option<u8>> {
            panic!("confirmation should not read input");
        }
    }

    fn interactive() -> Environment {
        Environment {
            interactive: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_return_and_newline_proceed() {
        for byte in [13u8, 10u8] {
            let input = [byte];
            let mut keys = ReaderKeys(&input[..]);
            assert!(confirm(&interactive(), false, &mut keys).is_ok());
        }
    }

    #[test]
    fn test_other_bytes_abort() {
        for byte in [b'y', b'n', b' ', 0x1b, 3] {
            let input = [byte];
            let mut keys = ReaderKeys(&input[..]);
            let err = confirm(&interactive(), false, &mut keys).unwrap_err();
            assert!(matches!(err, InstallerError::Declined), "byte {byte}");
        }
    }

    #[test]
    fn test_end_of_input_aborts() {
        let mut keys = ReaderKeys(&b""[..]);
        let err = confirm(&interactive(), false, &mut keys).unwrap_err();
        assert!(matches!(err, InstallerError::Declined));
    }

    #[test]
    fn test_non_interactive_skips_reading() {
        let env = Environment::default();
        assert!(confirm(&env, false, &mut PanicKeys).is_ok());
    }

    #[test]
    fn test_ci_skips_reading() {
        let env = Environment {
            interactive: true,
            ci: true,
            ..Default::default()
        };
        assert!(confirm(&env, false, &mut PanicKeys).is_ok());
    }

    #[test]
    fn test_assume_yes_skips_reading() {
        assert!(confirm(&interactive(), true, &mut PanicKeys).is_ok());
    }
}
