//! Platform detection for release asset selection

use once_cell::sync::OnceCell;

use crate::install::error::InstallerError;

/// Targets kube-cli publishes release archives for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOsArm64,  // macOS Apple Silicon
    MacOsX8664,  // macOS Intel
    LinuxArm64,  // Linux aarch64
    LinuxX8664,  // Linux x86_64
}

/// Global cache for platform detection (initialized once, used everywhere)
static PLATFORM_CACHE: OnceCell<Platform> = OnceCell::new();

impl Platform {
    /// Detect current platform (cached after first call)
    pub fn detect() -> Result<Self, InstallerError> {
        PLATFORM_CACHE
            .get_or_try_init(|| Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH))
            .copied()
    }

    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self, InstallerError> {
        match (os, arch) {
            ("macos", "aarch64") => Ok(Platform::MacOsArm64),
            ("macos", "x86_64") => Ok(Platform::MacOsX8664),
            ("linux", "aarch64") => Ok(Platform::LinuxArm64),
            ("linux", "x86_64") => Ok(Platform::LinuxX8664),
            (os, arch) => Err(InstallerError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// OS component of release asset names.
    pub fn os_name(&self) -> &'static str {
        match self {
            Platform::MacOsArm64 | Platform::MacOsX8664 => "darwin",
            Platform::LinuxArm64 | Platform::LinuxX8664 => "linux",
        }
    }

    /// Architecture component of release asset names.
    pub fn arch_name(&self) -> &'static str {
        match self {
            Platform::MacOsArm64 | Platform::LinuxArm64 => "arm64",
            Platform::MacOsX8664 | Platform::LinuxX8664 => "amd64",
        }
    }

    /// e.g. `kube-cli_darwin_amd64.tar.gz`
    pub fn asset_name(&self, binary: &str) -> String {
        format!("{binary}_{}_{}.tar.gz", self.os_name(), self.arch_name())
    }
}
