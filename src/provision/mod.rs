//! Ordered provisioning steps with abort-and-rollback.
//!
//! A [`Step`] pairs a human readable description with an action. Required
//! steps stop the run on the first failure, after which the whole project
//! directory is handed to a [`Rollback`]. Optional steps only log their
//! failure.

pub mod actions;
pub mod files;
pub mod render;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::{
    config::Settings, error, info, request::ProvisioningRequest, shell::Shell, success, trace,
    warn,
};

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Nothing to do, with the reason shown to the operator
    Skipped(String),
}

type Action<'s, C> = Box<dyn Fn(&C) -> Result<Outcome> + 's>;

pub struct Step<'s, C> {
    description: String,
    required: bool,
    action: Action<'s, C>,
}

impl<'s, C> Step<'s, C> {
    /// A step whose failure aborts the run
    pub fn required<F>(description: impl Into<String>, action: F) -> Self
    where
        F: Fn(&C) -> Result<Outcome> + 's,
    {
        Self {
            description: description.into(),
            required: true,
            action: Box::new(action),
        }
    }

    /// A step whose failure is only logged
    pub fn optional<F>(description: impl Into<String>, action: F) -> Self
    where
        F: Fn(&C) -> Result<Outcome> + 's,
    {
        Self {
            description: description.into(),
            required: false,
            action: Box::new(action),
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Runs the action and logs one line describing how it went.
    ///
    /// # Errors
    ///
    /// Returns the action's error unchanged, whether or not the step is required
    pub fn run(&self, ctx: &C) -> Result<Outcome> {
        trace!("Starting: {}", self.description);

        match (self.action)(ctx) {
            Ok(Outcome::Done) => {
                success!("{} succeeded", self.description);
                Ok(Outcome::Done)
            }
            Ok(Outcome::Skipped(reason)) => {
                info!("{} skipped ({reason})", self.description);
                Ok(Outcome::Skipped(reason))
            }
            Err(e) => {
                if self.required {
                    error!("{} failed: {e:#}", self.description);
                } else {
                    warn!("{} failed: {e:#}", self.description);
                }
                Err(e)
            }
        }
    }
}

/// The required step that stopped a run.
#[derive(Debug)]
pub struct StepFailure {
    pub step: String,
    pub error: anyhow::Error,
}

/// Runs `steps` in order, stopping at the first required failure. Steps after
/// it never start.
///
/// # Errors
///
/// Returns the first failing required step together with its error
pub fn run_steps<C>(steps: &[Step<'_, C>], ctx: &C) -> Result<(), StepFailure> {
    for step in steps {
        if let Err(error) = step.run(ctx) {
            if step.is_required() {
                return Err(StepFailure {
                    step: step.description.clone(),
                    error,
                });
            }
        }
    }

    Ok(())
}

/// Undoes a failed run.
pub trait Rollback {
    /// # Errors
    ///
    /// Returns an [`Err`] if `dir` could not be removed
    fn rollback(&mut self, dir: &Path) -> Result<()>;
}

/// Deletes the whole project directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveDir;

impl Rollback for RemoveDir {
    fn rollback(&mut self, dir: &Path) -> Result<()> {
        trace!("Removing {}", dir.display());

        fs_extra::dir::remove(dir).with_context(|| format!("Failed to remove {}", dir.display()))
    }
}

#[derive(Debug)]
pub enum Report {
    /// The template could not be fetched; nothing was created
    FetchFailed,
    /// A required step failed and the project directory was rolled back
    StepFailed {
        step: String,
        error: anyhow::Error,
        rolled_back: bool,
    },
    /// Every required step succeeded. `installed` is `None` when installation
    /// was not requested.
    Created { installed: Option<bool> },
}

impl Report {
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Report::Created { .. })
    }
}

/// Runs `steps` against `dir`, rolling back on failure and running
/// `post_install` only after every required step succeeded.
pub fn execute<C>(
    steps: &[Step<'_, C>],
    post_install: Option<&Step<'_, C>>,
    ctx: &C,
    dir: &Path,
    rollback: &mut dyn Rollback,
) -> Report {
    if let Err(StepFailure { step, error }) = run_steps(steps, ctx) {
        let rolled_back = match rollback.rollback(dir) {
            Ok(()) => {
                info!("Removed {}", dir.display());
                true
            }
            Err(e) => {
                error!("{e:#}. Remove {} by hand before retrying", dir.display());
                false
            }
        };

        return Report::StepFailed {
            step,
            error,
            rolled_back,
        };
    }

    let installed = post_install.map(|step| step.run(ctx).is_ok());

    Report::Created { installed }
}

/// Everything an action may touch: the project directory it works in and the
/// read-only request and settings.
pub struct Workspace<'w> {
    pub dir: PathBuf,
    pub request: &'w ProvisioningRequest,
    pub settings: &'w Settings,
    pub shell: &'w dyn Shell,
}

impl Workspace<'_> {
    /// Runs `git` with `args` in the project directory
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if git fails
    pub fn git(&self, args: &[&str]) -> Result<()> {
        self.shell.run(&self.dir, "git", args)
    }

    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }
}
