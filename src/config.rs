use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Installer configuration (defaults install kube-cli into `/usr/local`).
///
/// Every field may be overridden from a TOML file; missing fields fall back to
/// the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Root of the installation; the binary lands in `<prefix>/bin`.
    pub prefix: PathBuf,
    pub binary: String,
    /// `owner/name` of the GitHub repository publishing releases.
    pub repo: String,
    /// Latest-release metadata endpoint; `{repo}` is substituted.
    pub releases_url: String,
    /// Release asset base; the final URL is `<base>/<tag>/<asset>`.
    pub download_base: String,
    pub admin_group: String,
    /// `owner:group` given to a freshly created prefix.
    pub root_owner: String,
    pub min_os_version: String,
    pub connect_timeout_secs: u64,
    pub inactivity_timeout_secs: u64,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("/usr/local"),
            binary: "kube-cli".into(),
            repo: "ajdnik/kube-cli".into(),
            releases_url: "https://api.github.com/repos/{repo}/releases/latest".into(),
            download_base: "https://github.com/{repo}/releases/download".into(),
            admin_group: default_admin_group().into(),
            root_owner: default_root_owner().into(),
            min_os_version: default_min_os_version().into(),
            connect_timeout_secs: 30,
            inactivity_timeout_secs: 300,
        }
    }
}

fn default_admin_group() -> &'static str {
    if cfg!(target_os = "macos") { "admin" } else { "sudo" }
}

fn default_root_owner() -> &'static str {
    if cfg!(target_os = "macos") { "root:wheel" } else { "root:root" }
}

fn default_min_os_version() -> &'static str {
    // macOS product version; elsewhere the kernel release.
    if cfg!(target_os = "macos") { "10.10" } else { "3.2" }
}

impl InstallerConfig {
    /// Standard per-user location of the optional config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("kube-cli").join("installer.toml"))
    }

    /// Load from an explicit path, else from [`Self::default_path`] if that
    /// file exists, else use defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let cfg = match path {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                let cfg: InstallerConfig = toml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                log::info!("Using config from: {}", path.display());
                cfg
            }
            None => {
                log::debug!("No installer config found, using defaults");
                Self::default()
            }
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.binary.is_empty() || self.binary.contains('/') {
            anyhow::bail!("binary must be a plain file name, got {:?}", self.binary);
        }
        if !self.prefix.is_absolute() {
            anyhow::bail!("prefix must be an absolute path, got {}", self.prefix.display());
        }
        self.releases_url().context("Invalid releases_url")?;
        self.download_url("v0.0.0", "probe.tar.gz")
            .context("Invalid download_base")?;
        Ok(())
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    pub fn binary_path(&self) -> PathBuf {
        self.bin_dir().join(&self.binary)
    }

    pub fn releases_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.releases_url.replace("{repo}", &self.repo))
    }

    pub fn download_url(&self, tag: &str, asset: &str) -> Result<Url, url::ParseError> {
        let base = self.download_base.replace("{repo}", &self.repo);
        Url::parse(&format!("{}/{tag}/{asset}", base.trim_end_matches('/')))
    }
}
