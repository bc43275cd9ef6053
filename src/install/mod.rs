//! kube-cli installation library
//!
//! Installs the kube-cli release binary into `<prefix>/bin`:
//! preflight checks, permission planning, confirmation, privileged repair of
//! the prefix, then download and extraction of the release archive.

pub mod cli;
pub mod confirm;
pub mod download;
pub mod environment;
pub mod error;
pub mod executor;
pub mod host;
pub mod plan;
pub mod preflight;
pub mod privilege;
mod runners;
pub mod ui;
pub mod version;

// Public exports
pub use cli::Cli;
pub use confirm::{KeyReader, ReaderKeys, TerminalKeys};
pub use download::{InstalledBinary, Platform, ReleaseTag};
pub use environment::{Environment, is_ci_environment};
pub use error::InstallerError;
pub use host::{HostInfo, Identity, SystemHost};
pub use plan::PermissionPlan;
pub use privilege::{PrivilegedRunner, SudoRunner, SudoTicket};
pub use runners::{InstallOptions, InstallOutcome, Installer, run_install};
pub use version::OsVersion;

