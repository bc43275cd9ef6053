//! Preflight checks.
//!
//! Run before anything is planned or changed; the first failing check aborts.

use std::fs;
use std::path::Path;

use super::error::InstallerError;
use super::host::{HostInfo, Identity};
use super::version::OsVersion;

/// Facts established by a passing preflight.
#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub os_version: OsVersion,
    pub user: String,
    pub identity: Identity,
}

/// Check, in order: OS version, not root, admin membership, prefix searchable.
pub fn run(
    host: &dyn HostInfo,
    min_os_version: &str,
    admin_group: &str,
    prefix: &Path,
) -> Result<PreflightReport, InstallerError> {
    let minimum: OsVersion = min_os_version.parse()?;
    let os_version = host.os_version()?;
    log::debug!("OS version {os_version}, minimum {minimum}");
    if os_version < minimum {
        return Err(InstallerError::UnsupportedOsVersion {
            found: os_version.to_string(),
            minimum: minimum.to_string(),
        });
    }

    if host.uid() == 0 {
        return Err(InstallerError::RunningAsRoot);
    }

    let user = host.user_name()?;
    if !host.is_group_member(&user, admin_group)? {
        return Err(InstallerError::NotAdministrator {
            user,
            group: admin_group.to_string(),
        });
    }

    let identity = host.identity(admin_group)?;
    if let Ok(meta) = fs::metadata(prefix)
        && meta.is_dir()
        && !identity.can_search(&meta)
    {
        return Err(InstallerError::PrefixNotSearchable {
            prefix: prefix.to_path_buf(),
        });
    }

    Ok(PreflightReport {
        os_version,
        user,
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    struct FakeHost {
        version: &'static str,
        uid: u32,
        member: bool,
        identity: Identity,
    }

    impl FakeHost {
        fn ok(identity: Identity) -> Self {
            Self {
                version: "10.15.7",
                uid: 501,
                member: true,
                identity,
            }
        }
    }

    impl HostInfo for FakeHost {
        fn os_version(&self) -> Result<OsVersion, InstallerError> {
            self.version.parse()
        }
        fn uid(&self) -> u32 {
            self.uid
        }
        fn user_name(&self) -> Result<String, InstallerError> {
            Ok("alice".to_string())
        }
        fn is_group_member(&self, _user: &str, _group: &str) -> Result<bool, InstallerError> {
            Ok(self.member)
        }
        fn identity(&self, _admin_group: &str) -> Result<Identity, InstallerError> {
            Ok(self.identity.clone())
        }
    }

    fn owner_identity(path: &Path) -> Identity {
        let meta = fs::metadata(path).unwrap();
        Identity {
            uid: meta.uid(),
            gid: meta.gid(),
            groups: vec![],
            admin_gid: None,
        }
    }

    #[test]
    fn test_passes_on_healthy_host() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost::ok(owner_identity(dir.path()));

        let report = run(&host, "10.10", "admin", dir.path()).unwrap();

        assert_eq!(report.user, "alice");
        assert_eq!(report.os_version.to_string(), "10.15.7");
    }

    #[test]
    fn test_old_os_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost {
            version: "10.9",
            ..FakeHost::ok(owner_identity(dir.path()))
        };

        let err = run(&host, "10.10", "admin", dir.path()).unwrap_err();

        assert!(matches!(err, InstallerError::UnsupportedOsVersion { .. }));
    }

    #[test]
    fn test_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost {
            uid: 0,
            ..FakeHost::ok(owner_identity(dir.path()))
        };

        let err = run(&host, "10.10", "admin", dir.path()).unwrap_err();

        assert!(matches!(err, InstallerError::RunningAsRoot));
    }

    #[test]
    fn test_non_admin_rejected_with_user_name() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost {
            member: false,
            ..FakeHost::ok(owner_identity(dir.path()))
        };

        let err = run(&host, "10.10", "admin", dir.path()).unwrap_err();

        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn test_unsearchable_prefix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("local");
        fs::create_dir(&prefix).unwrap();
        fs::set_permissions(&prefix, fs::Permissions::from_mode(0o600)).unwrap();
        let host = FakeHost::ok(owner_identity(&prefix));

        let err = run(&host, "10.10", "admin", &prefix).unwrap_err();

        assert!(matches!(err, InstallerError::PrefixNotSearchable { .. }));
        assert!(err.fix_suggestion().unwrap().contains("sudo chmod 775"));
    }

    #[test]
    fn test_absent_prefix_passes() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost::ok(owner_identity(dir.path()));

        assert!(run(&host, "10.10", "admin", &dir.path().join("missing")).is_ok());
    }
}
