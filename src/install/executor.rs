//! Applies a [`PermissionPlan`] through a [`PrivilegedRunner`].

use std::path::{Path, PathBuf};

use super::error::InstallerError;
use super::plan::{PermissionPlan, STANDARD_MODE};
use super::privilege::{PrivilegedRunner, run_checked};

/// Who ends up owning what.
#[derive(Debug, Clone)]
pub struct Ownership<'a> {
    pub user: &'a str,
    pub admin_group: &'a str,
    /// `owner:group` for a newly created prefix.
    pub root_owner: &'a str,
}

fn command(program: &str, args: &[&str], paths: &[PathBuf]) -> Vec<String> {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string()))
        .chain(paths.iter().map(|p| p.display().to_string()))
        .collect()
}

/// Apply `plan` to `prefix`.
///
/// Order:
/// 1. existing prefix: repair mode, owner and group of the chmod targets;
///    missing prefix: create it and hand it to the root owner;
/// 2. create missing directories, make them `755`, owned by the user and the
///    admin group.
///
/// The first failing command aborts the whole run.
pub fn apply_plan(
    plan: &PermissionPlan,
    prefix: &Path,
    owners: &Ownership<'_>,
    runner: &dyn PrivilegedRunner,
) -> Result<(), InstallerError> {
    let mut commands: Vec<Vec<String>> = Vec::new();

    if prefix.is_dir() {
        if !plan.chmod_targets.is_empty() {
            commands.push(command("chmod", &["u+rwx"], &plan.chmod_targets));
            commands.push(command("chmod", &["g+rwx"], &plan.chmod_targets));
        }
        if !plan.chown_targets.is_empty() {
            commands.push(command("chown", &[owners.user], &plan.chown_targets));
        }
        if !plan.chgrp_targets.is_empty() {
            commands.push(command("chgrp", &[owners.admin_group], &plan.chgrp_targets));
        }
    } else {
        let prefix = [prefix.to_path_buf()];
        commands.push(command("mkdir", &["-p"], &prefix));
        commands.push(command("chown", &[owners.root_owner], &prefix));
    }

    if !plan.mkdir_targets.is_empty() {
        let mode = format!("{STANDARD_MODE:o}");
        commands.push(command("mkdir", &["-p"], &plan.mkdir_targets));
        commands.push(command("chmod", &["g+rwx"], &plan.mkdir_targets));
        commands.push(command("chmod", &[&mode], &plan.mkdir_targets));
        commands.push(command("chown", &[owners.user], &plan.mkdir_targets));
        commands.push(command("chgrp", &[owners.admin_group], &plan.mkdir_targets));
    }

    log::debug!("applying {} privileged commands", commands.len());
    for argv in &commands {
        run_checked(runner, argv)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail_on: Option<usize>,
    }

    impl PrivilegedRunner for Recorder {
        fn run_privileged(&self, argv: &[String]) -> Result<ExitStatus, InstallerError> {
            let mut calls = self.calls.borrow_mut();
            calls.push(argv.join(" "));
            let code = if self.fail_on == Some(calls.len()) { 1 } else { 0 };
            Ok(ExitStatus::from_raw(code << 8))
        }
    }

    const OWNERS: Ownership<'static> = Ownership {
        user: "alice",
        admin_group: "admin",
        root_owner: "root:wheel",
    };

    #[test]
    fn test_missing_prefix_is_created_then_bin() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("local");
        let bin = prefix.join("bin");
        let plan = PermissionPlan {
            mkdir_targets: vec![bin.clone()],
            ..Default::default()
        };
        let recorder = Recorder::default();

        apply_plan(&plan, &prefix, &OWNERS, &recorder).unwrap();

        let p = prefix.display();
        let b = bin.display();
        assert_eq!(
            *recorder.calls.borrow(),
            vec![
                format!("mkdir -p {p}"),
                format!("chown root:wheel {p}"),
                format!("mkdir -p {b}"),
                format!("chmod g+rwx {b}"),
                format!("chmod 755 {b}"),
                format!("chown alice {b}"),
                format!("chgrp admin {b}"),
            ]
        );
    }

    #[test]
    fn test_existing_prefix_repairs_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        let exe = bin.join("kube-cli");
        let plan = PermissionPlan {
            chmod_targets: vec![bin.clone(), exe.clone()],
            chown_targets: vec![exe.clone()],
            chgrp_targets: vec![bin.clone()],
            mkdir_targets: vec![],
        };
        let recorder = Recorder::default();

        apply_plan(&plan, dir.path(), &OWNERS, &recorder).unwrap();

        let b = bin.display();
        let e = exe.display();
        assert_eq!(
            *recorder.calls.borrow(),
            vec![
                format!("chmod u+rwx {b} {e}"),
                format!("chmod g+rwx {b} {e}"),
                format!("chown alice {e}"),
                format!("chgrp admin {b}"),
            ]
        );
    }

    #[test]
    fn test_empty_plan_on_existing_prefix_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();

        apply_plan(&PermissionPlan::default(), dir.path(), &OWNERS, &recorder).unwrap();

        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn test_first_failure_stops_execution() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("local");
        let plan = PermissionPlan {
            mkdir_targets: vec![prefix.join("bin")],
            ..Default::default()
        };
        let recorder = Recorder {
            fail_on: Some(2),
            ..Default::default()
        };

        let err = apply_plan(&plan, &prefix, &OWNERS, &recorder).unwrap_err();

        assert_eq!(recorder.calls.borrow().len(), 2);
        assert_eq!(
            err.to_string(),
            format!("Failed during: chown root:wheel {}", prefix.display())
        );
    }
}
