//! CLI argument parsing for the kube-cli installer

use clap::Parser;
use std::path::PathBuf;

use crate::config::InstallerConfig;

/// Command-line arguments for kube-cli-install
#[derive(Parser, Clone, Debug, Default)]
#[command(name = "kube-cli-install")]
#[command(version, about = "Install the kube-cli command line tool")]
pub struct Cli {
    /// Force downloads through curl (accepted for compatibility; no effect)
    #[arg(long)]
    pub force_curl: bool,

    /// Install under this prefix instead of /usr/local
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Path to an installer config file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Install this release tag instead of the latest one
    #[arg(long)]
    pub tag: Option<String>,

    /// Show what would be done without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Don't wait for RETURN before making changes
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply flag overrides on top of a loaded config.
    pub fn apply_to(&self, config: &mut InstallerConfig) {
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
    }
}
