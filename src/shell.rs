use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::trace;

/// Runs external programs (git, the package manager) on behalf of the
/// pipeline. Every call names its working directory explicitly.
pub trait Shell {
    /// Runs `program` with `args` inside `dir`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the program can not be spawned or exits with a
    /// non-zero status
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<()>;
}

/// Spawns real processes with captured output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<()> {
        let line = command_line(program, args);
        trace!("Running `{line}` in {}", dir.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to spawn `{program}`"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };

            bail!("`{line}` exited with {}: {detail}", output.status);
        }

        Ok(())
    }
}

#[must_use]
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
