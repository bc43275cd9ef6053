//! GitHub release download and binary extraction
//!
//! ## Module Organization
//!
//! - `platform` - Platform detection and release asset naming
//! - `github` - Latest-release tag lookup
//! - `fetch` - Archive download with timeouts
//! - `extract` - Single-binary extraction from the tarball

mod extract;
mod fetch;
mod github;
mod platform;

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

pub use github::{GitHubRelease, ReleaseTag};
pub use platform::Platform;

use crate::config::InstallerConfig;
use crate::install::error::InstallerError;
use crate::install::plan::STANDARD_MODE;

/// Result of a successful fetch.
#[derive(Debug, Clone)]
pub struct InstalledBinary {
    pub path: PathBuf,
    pub tag: ReleaseTag,
}

/// Resolve the release, download its archive into `<prefix>/bin`, extract the
/// binary, delete the archive and make the binary `755`.
///
/// `pinned` skips the latest-release lookup. Nothing is rolled back on
/// failure; every step overwrites its output, so re-running is safe.
pub async fn install_release(
    config: &InstallerConfig,
    platform: Platform,
    pinned: Option<ReleaseTag>,
) -> Result<InstalledBinary, InstallerError> {
    let client = fetch::build_client(Duration::from_secs(config.connect_timeout_secs))?;
    let inactivity = Duration::from_secs(config.inactivity_timeout_secs);

    let tag = match pinned {
        Some(tag) => {
            log::info!("Using pinned release {tag}");
            tag
        }
        None => {
            let url = config.releases_url().map_err(|e| InstallerError::Download {
                step: "building release metadata URL".to_string(),
                message: e.to_string(),
            })?;
            github::get_latest_tag(&client, &url, inactivity).await?
        }
    };

    let asset = platform.asset_name(&config.binary);
    let url = config
        .download_url(tag.as_str(), &asset)
        .map_err(|e| InstallerError::Download {
            step: format!("building download URL for {asset}"),
            message: e.to_string(),
        })?;

    let bin_dir = config.bin_dir();
    let archive = bin_dir.join(format!("{}.tar.gz", config.binary));
    fetch::download_archive(&client, &url, &archive, inactivity).await?;

    // tar + gzip decoding is CPU-bound
    let binary = config.binary.clone();
    let archive_clone = archive.clone();
    let path = tokio::task::spawn_blocking(move || {
        extract::extract_binary(&archive_clone, &binary, &bin_dir)
    })
    .await
    .map_err(|e| InstallerError::Extract {
        archive: archive.clone(),
        message: e.to_string(),
    })??;

    tokio::fs::remove_file(&archive)
        .await
        .map_err(|e| InstallerError::io(format!("Failed to remove {}", archive.display()), e))?;

    tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(STANDARD_MODE))
        .await
        .map_err(|e| InstallerError::io(format!("Failed to chmod {}", path.display()), e))?;

    Ok(InstalledBinary { path, tag })
}
