//! Error types for installation.
//!
//! Every abort path of the installer maps to one variant. Each variant knows
//! how to explain itself to the user via [`InstallerError::fix_suggestion`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an installation run.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Operating system version {found} is too old (minimum supported is {minimum})")]
    UnsupportedOsVersion { found: String, minimum: String },

    #[error("Could not parse version string {0:?}")]
    InvalidVersion(String),

    #[error("Don't run this as root!")]
    RunningAsRoot,

    #[error("This script requires the user {user} to be an Administrator.")]
    NotAdministrator { user: String, group: String },

    #[error("The install path, {}, exists but is not searchable.", prefix.display())]
    PrefixNotSearchable { prefix: PathBuf },

    #[error("Unsupported platform: {os} {arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The user pressed something other than RETURN at the confirmation prompt.
    #[error("Installation aborted by user")]
    Declined,

    /// An external command (privileged or not) exited unsuccessfully.
    #[error("Failed during: {command}")]
    CommandFailed { command: String },

    #[error("Failed during: {step}: {message}")]
    Download { step: String, message: String },

    #[error("Release metadata from {url} has no tag_name")]
    MissingTag { url: String },

    #[error("Failed during: extracting {}: {message}", archive.display())]
    Extract { archive: PathBuf, message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Actionable hint shown below the error message, if one applies.
    pub fn fix_suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedOsVersion { minimum, .. } => Some(format!(
                "Upgrade your operating system to {minimum} or later and run the installer again."
            )),
            Self::RunningAsRoot => Some(
                "Run the installer as your regular user; it asks for sudo when needed.".to_string(),
            ),
            Self::NotAdministrator { user, group } => Some(format!(
                "Add {user} to the {group} group, or run the installer as an administrator account."
            )),
            Self::PrefixNotSearchable { prefix } => Some(format!(
                "If this is not intentional, please restore the default permissions and \
                 try running the installer again:\n    sudo chmod 775 {}",
                prefix.display()
            )),
            Self::CommandFailed { .. } | Self::Download { .. } | Self::Extract { .. } => Some(
                "Fix the problem above and run the installer again; completed steps are skipped."
                    .to_string(),
            ),
            Self::MissingTag { .. } => {
                Some("Pass an explicit release with --tag <TAG>.".to_string())
            }
            Self::InvalidVersion(_)
            | Self::UnsupportedPlatform { .. }
            | Self::Declined
            | Self::Io { .. } => None,
        }
    }

    /// Whether the failure should be reported to the user.
    ///
    /// A declined confirmation exits non-zero without further output.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Declined)
    }
}
