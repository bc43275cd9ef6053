//! Facts about the machine and the invoking user.
//!
//! Preflight and planning only talk to the host through [`HostInfo`], so tests
//! can substitute a fake user, group database and OS version.

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
#[cfg(target_os = "macos")]
use std::process::Command;

use nix::unistd::{Gid, Group, Uid, User};

use super::error::InstallerError;
use super::version::OsVersion;

const READ: u32 = 0o4;
const WRITE: u32 = 0o2;
const EXECUTE: u32 = 0o1;

/// The credentials permission bits are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
    /// Supplementary group ids.
    pub groups: Vec<u32>,
    /// Gid of the administrator group, if it exists on this machine.
    pub admin_gid: Option<u32>,
}

impl Identity {
    /// The `rwx` triple that applies to this identity for a file with the
    /// given owner, group and mode, following the classic Unix rules
    /// (owner class first, then group class, then other).
    pub fn permitted(&self, owner: u32, group: u32, mode: u32) -> u32 {
        if owner == self.uid {
            (mode >> 6) & 0o7
        } else if group == self.gid || self.groups.contains(&group) {
            (mode >> 3) & 0o7
        } else {
            mode & 0o7
        }
    }

    pub fn can_read_write_execute(&self, meta: &Metadata) -> bool {
        self.permitted(meta.uid(), meta.gid(), meta.mode()) == READ | WRITE | EXECUTE
    }

    /// Directory search permission.
    pub fn can_search(&self, meta: &Metadata) -> bool {
        self.permitted(meta.uid(), meta.gid(), meta.mode()) & EXECUTE != 0
    }

    pub fn owns(&self, meta: &Metadata) -> bool {
        meta.uid() == self.uid
    }

    pub fn admin_group_owns(&self, meta: &Metadata) -> bool {
        self.admin_gid == Some(meta.gid())
    }
}

/// Read-only queries against the host system.
pub trait HostInfo {
    fn os_version(&self) -> Result<OsVersion, InstallerError>;

    fn uid(&self) -> u32;

    fn user_name(&self) -> Result<String, InstallerError>;

    fn is_group_member(&self, user: &str, group: &str) -> Result<bool, InstallerError>;

    fn identity(&self, admin_group: &str) -> Result<Identity, InstallerError>;
}

/// [`HostInfo`] backed by the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostInfo for SystemHost {
    fn os_version(&self) -> Result<OsVersion, InstallerError> {
        #[cfg(target_os = "macos")]
        {
            let output = Command::new("/usr/bin/sw_vers")
                .arg("-productVersion")
                .output()
                .map_err(|e| InstallerError::io("Failed to run sw_vers", e))?;
            if !output.status.success() {
                return Err(InstallerError::CommandFailed {
                    command: "/usr/bin/sw_vers -productVersion".to_string(),
                });
            }
            OsVersion::parse_lenient(&String::from_utf8_lossy(&output.stdout))
        }

        #[cfg(not(target_os = "macos"))]
        {
            let uts = nix::sys::utsname::uname()
                .map_err(|e| InstallerError::io("Failed to query kernel release", e.into()))?;
            OsVersion::parse_lenient(&uts.release().to_string_lossy())
        }
    }

    fn uid(&self) -> u32 {
        Uid::current().as_raw()
    }

    fn user_name(&self) -> Result<String, InstallerError> {
        if let Ok(user) = std::env::var("USER")
            && !user.is_empty()
        {
            return Ok(user);
        }
        let uid = Uid::current();
        User::from_uid(uid)
            .map_err(|e| InstallerError::io("Failed to look up current user", e.into()))?
            .map(|u| u.name)
            .ok_or_else(|| {
                InstallerError::io(
                    format!("No passwd entry for uid {uid}"),
                    std::io::ErrorKind::NotFound.into(),
                )
            })
    }

    fn is_group_member(&self, user: &str, group: &str) -> Result<bool, InstallerError> {
        #[cfg(target_os = "macos")]
        {
            let output = Command::new("/usr/bin/dsmemberutil")
                .args(["checkmembership", "-U", user, "-G", group])
                .output()
                .map_err(|e| InstallerError::io("Failed to run dsmemberutil", e))?;
            Ok(String::from_utf8_lossy(&output.stdout).contains("user is a member"))
        }

        #[cfg(not(target_os = "macos"))]
        {
            let Some(grp) = Group::from_name(group).map_err(|e| {
                InstallerError::io(format!("Failed to look up group {group}"), e.into())
            })?
            else {
                log::debug!("group {group} does not exist");
                return Ok(false);
            };
            if grp.mem.iter().any(|m| m == user) {
                return Ok(true);
            }
            let primary = User::from_name(user)
                .map_err(|e| {
                    InstallerError::io(format!("Failed to look up user {user}"), e.into())
                })?
                .map(|u| u.gid);
            Ok(primary == Some(grp.gid))
        }
    }

    fn identity(&self, admin_group: &str) -> Result<Identity, InstallerError> {
        let admin_gid = Group::from_name(admin_group)
            .map_err(|e| {
                InstallerError::io(format!("Failed to look up group {admin_group}"), e.into())
            })?
            .map(|g| g.gid.as_raw());

        Ok(Identity {
            uid: Uid::effective().as_raw(),
            gid: Gid::effective().as_raw(),
            groups: supplementary_groups()?,
            admin_gid,
        })
    }
}

#[cfg(not(target_os = "macos"))]
fn supplementary_groups() -> Result<Vec<u32>, InstallerError> {
    nix::unistd::getgroups()
        .map(|gids| gids.into_iter().map(Gid::as_raw).collect())
        .map_err(|e| InstallerError::io("Failed to read supplementary groups", e.into()))
}

/// `getgroups(2)` truncates at 16 entries on macOS, so ask `id` instead.
#[cfg(target_os = "macos")]
fn supplementary_groups() -> Result<Vec<u32>, InstallerError> {
    let output = Command::new("/usr/bin/id")
        .arg("-G")
        .output()
        .map_err(|e| InstallerError::io("Failed to run id -G", e))?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .filter_map(|g| g.parse().ok())
        .collect())
}
