//! Permission planning for the install prefix.
//!
//! [`PermissionPlan::compute`] only reads metadata. Identical filesystem state
//! and identity always yield an identical plan.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::host::Identity;

/// Mode the installer leaves on `bin` and on the installed binary.
pub const STANDARD_MODE: u32 = 0o755;

/// Filesystem changes needed before the binary can be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPlan {
    /// Existing paths that need `u+rwx` and `g+rwx`.
    pub chmod_targets: Vec<PathBuf>,
    /// Subset of `chmod_targets` not owned by the invoking user.
    pub chown_targets: Vec<PathBuf>,
    /// Subset of `chmod_targets` not owned by the admin group.
    pub chgrp_targets: Vec<PathBuf>,
    /// Directories that do not exist yet.
    pub mkdir_targets: Vec<PathBuf>,
}

impl PermissionPlan {
    pub fn compute(prefix: &Path, binary: &str, identity: &Identity) -> Self {
        let bin = prefix.join("bin");

        let chmod_targets: Vec<PathBuf> = [bin.clone(), bin.join(binary)]
            .into_iter()
            .filter(|p| needs_chmod(p, identity))
            .collect();

        let chown_targets = chmod_targets
            .iter()
            .filter(|p| fs::metadata(p).is_ok_and(|m| !identity.owns(&m)))
            .cloned()
            .collect();

        let chgrp_targets = chmod_targets
            .iter()
            .filter(|p| fs::metadata(p).is_ok_and(|m| !identity.admin_group_owns(&m)))
            .cloned()
            .collect();

        let mkdir_targets = [bin].into_iter().filter(|p| !p.is_dir()).collect();

        Self {
            chmod_targets,
            chown_targets,
            chgrp_targets,
            mkdir_targets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chmod_targets.is_empty()
            && self.chown_targets.is_empty()
            && self.chgrp_targets.is_empty()
            && self.mkdir_targets.is_empty()
    }
}

fn needs_chmod(path: &Path, identity: &Identity) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    if !identity.can_read_write_execute(&meta) {
        return true;
    }
    meta.is_dir() && meta.permissions().mode() & 0o777 != STANDARD_MODE
}
