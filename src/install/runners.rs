//! The installation workflow, from preflight to the post-install summary.
//!
//! [`Installer`] runs the steps strictly in order against injected host,
//! privilege and keyboard seams. [`run_install`] wires it to the real system.

use anyhow::{Context, Result};

use super::cli::Cli;
use super::confirm::{self, KeyReader, TerminalKeys};
use super::download::{self, InstalledBinary, Platform, ReleaseTag};
use super::environment::Environment;
use super::error::InstallerError;
use super::executor::{self, Ownership};
use super::host::{HostInfo, SystemHost};
use super::plan::PermissionPlan;
use super::preflight;
use super::privilege::{PrivilegedRunner, SudoRunner, SudoTicket};
use super::ui;
use crate::config::InstallerConfig;

/// Per-run switches that are not part of the persistent config.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub dry_run: bool,
    pub assume_yes: bool,
    /// Release to install; `None` means latest.
    pub tag: Option<ReleaseTag>,
    /// Parsed for compatibility; the download path does not consult it.
    pub force_curl: bool,
}

/// What a finished run did.
#[derive(Debug, Clone)]
pub enum InstallOutcome {
    Installed(InstalledBinary),
    /// `--dry-run`: the plan that would have been applied.
    Planned(PermissionPlan),
}

pub struct Installer<'a> {
    pub config: InstallerConfig,
    pub options: InstallOptions,
    pub env: Environment,
    pub platform: Platform,
    pub host: &'a dyn HostInfo,
    pub runner: &'a dyn PrivilegedRunner,
    pub keys: &'a mut dyn KeyReader,
}

impl Installer<'_> {
    pub async fn run(&mut self) -> Result<InstallOutcome, InstallerError> {
        let prefix = self.config.prefix.clone();
        if self.options.force_curl {
            log::debug!("--force-curl given; downloads always use the built-in HTTP client");
        }

        let report = preflight::run(
            self.host,
            &self.config.min_os_version,
            &self.config.admin_group,
            &prefix,
        )?;
        log::info!("Preflight passed for {} on OS {}", report.user, report.os_version);

        ui::ohai("This script will install:");
        println!("{}", self.config.binary_path().display());

        let plan = PermissionPlan::compute(&prefix, &self.config.binary, &report.identity);
        log::debug!("{plan:?}");
        confirm::describe_plan(&plan, &report.user, &self.config.admin_group);

        if self.options.dry_run {
            ui::ohai("Dry run: no changes made.");
            return Ok(InstallOutcome::Planned(plan));
        }

        confirm::confirm(&self.env, self.options.assume_yes, self.keys)?;

        let owners = Ownership {
            user: &report.user,
            admin_group: &self.config.admin_group,
            root_owner: &self.config.root_owner,
        };
        executor::apply_plan(&plan, &prefix, &owners, self.runner)?;

        ui::ohai(&format!("Downloading and installing {}...", self.config.binary));
        let installed =
            download::install_release(&self.config, self.platform, self.options.tag.clone())
                .await?;

        let bin_dir = self.config.bin_dir();
        if !self.env.path_contains(&bin_dir) {
            ui::warn(&format!("{} is not in your PATH.", bin_dir.display()));
        }

        ui::ohai(&format!("Installation successful! ({})", installed.tag));
        println!();
        ui::bell();
        ui::ohai("Next steps:");
        println!("- Run `{} --help` for more info", self.config.binary);

        Ok(InstallOutcome::Installed(installed))
    }
}

/// Run the installer against the real system.
///
/// The sudo timestamp guard lives for the whole call, so it is released on
/// every return path.
pub async fn run_install(cli: &Cli) -> Result<()> {
    let mut config = InstallerConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate().context("Invalid installer settings")?;

    let env = Environment::detect();
    let platform = Platform::detect()?;

    let _ticket = SudoTicket::acquire();
    let runner = SudoRunner::new(env.askpass);
    let mut keys = TerminalKeys;

    let mut installer = Installer {
        config,
        options: InstallOptions {
            dry_run: cli.dry_run,
            assume_yes: cli.yes,
            tag: cli.tag.clone().map(ReleaseTag::new),
            force_curl: cli.force_curl,
        },
        env,
        platform,
        host: &SystemHost,
        runner: &runner,
        keys: &mut keys,
    };

    installer.run().await?;
    Ok(())
}
