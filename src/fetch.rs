use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::{config::Settings, error, progress, shell::Shell, success, trace};

/// Clones the template into `target` and strips its git history.
///
/// Never fails past this boundary: problems are logged and reported as
/// `false`. Refuses to touch a `target` that already has contents, so running
/// twice for the same project name fails here instead of overwriting.
pub fn fetch_template(shell: &dyn Shell, settings: &Settings, target: &Path) -> bool {
    let pb = progress::spinner("Downloading template project");
    let res = try_fetch(shell, settings, target);
    pb.finish_and_clear();

    match res {
        Ok(()) => {
            success!("Template project downloaded");
            true
        }
        Err(e) => {
            error!(
                "Failed to clone the template ({e:#}). Check your access to {}, that branch '{}' exists, and that there is no non-empty '{}' directory here",
                settings.template_url,
                settings.template_branch,
                target.display()
            );
            false
        }
    }
}

fn try_fetch(shell: &dyn Shell, settings: &Settings, target: &Path) -> Result<()> {
    ensure_vacant(target)?;

    let (parent, name) = match (target.parent(), target.file_name().and_then(|n| n.to_str())) {
        (Some(parent), Some(name)) => (parent, name),
        _ => bail!("Invalid target directory {}", target.display()),
    };

    shell.run(
        parent,
        "git",
        &[
            "clone",
            "--depth",
            "1",
            "--branch",
            &settings.template_branch,
            &settings.template_url,
            name,
        ],
    )?;

    let history = target.join(".git");
    if history.exists() {
        trace!("Removing template history at {}", history.display());

        if let Err(e) = fs_extra::dir::remove(&history) {
            if let Err(cleanup) = fs_extra::dir::remove(target) {
                error!(
                    "Failed to remove the partial clone at {} ({cleanup}), delete it by hand",
                    target.display()
                );
            }
            return Err(e).context("Failed to remove the template's .git directory");
        }
    }

    Ok(())
}

fn ensure_vacant(target: &Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }

    if !target.is_dir() {
        bail!("{} exists and is not a directory", target.display());
    }

    let mut entries = target
        .read_dir()
        .with_context(|| format!("Failed to read {}", target.display()))?;

    if entries.next().is_some() {
        bail!("{} already exists and is not empty", target.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct CloneShell {
        calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
        fail: bool,
        /// Leaves `.git` as a plain file, which directory removal rejects
        history_as_file: bool,
    }

    impl Shell for CloneShell {
        fn run(&self, dir: &Path, _program: &str, args: &[&str]) -> Result<()> {
            self.calls.borrow_mut().push((
                dir.to_path_buf(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
            if self.fail {
                bail!("fatal: Remote branch develop not found");
            }
            let target = dir.join(args.last().unwrap());
            if self.history_as_file {
                std::fs::create_dir_all(&target).unwrap();
                std::fs::write(target.join(".git"), "gitdir: elsewhere").unwrap();
            } else {
                std::fs::create_dir_all(target.join(".git")).unwrap();
            }
            std::fs::write(target.join("package.json"), "{}").unwrap();
            Ok(())
        }
    }

    #[test]
    fn clones_into_named_directory_and_strips_history() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("yst-cloudt-web-support");
        let shell = CloneShell::default();

        assert!(fetch_template(&shell, &Settings::default(), &target));

        let calls = shell.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, tmp.path());
        assert_eq!(
            calls[0].1,
            [
                "clone",
                "--depth",
                "1",
                "--branch",
                "develop",
                "git@code.elitescloud.com:cloudt-web-suites/cloudt-web-ice2-template.git",
                "yst-cloudt-web-support"
            ]
        );
        assert!(target.join("package.json").is_file());
        assert!(!target.join(".git").exists());
    }

    #[test]
    fn empty_existing_directory_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("yst-cloudt-web-support");
        std::fs::create_dir(&target).unwrap();

        assert!(fetch_template(&CloneShell::default(), &Settings::default(), &target));
    }

    #[test]
    fn non_empty_directory_is_refused_without_cloning() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("yst-cloudt-web-support");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "mine").unwrap();
        let shell = CloneShell::default();

        assert!(!fetch_template(&shell, &Settings::default(), &target));
        assert!(shell.calls.borrow().is_empty());
        assert_eq!(
            std::fs::read_to_string(target.join("keep.txt")).unwrap(),
            "mine"
        );
    }

    #[test]
    fn clone_failure_reports_false() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("yst-cloudt-web-support");
        let shell = CloneShell {
            fail: true,
            ..Default::default()
        };

        assert!(!fetch_template(&shell, &Settings::default(), &target));
        assert!(!target.exists());
    }

    #[test]
    fn history_removal_failure_removes_the_clone() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("yst-cloudt-web-support");
        let shell = CloneShell {
            history_as_file: true,
            ..Default::default()
        };

        assert!(!fetch_template(&shell, &Settings::default(), &target));
        assert!(!target.exists());
    }
}
