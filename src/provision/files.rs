use anyhow::{anyhow, ensure, Context, Result};
use std::path::Path;

use crate::trace;

/// Replaces the first occurrence of `from` with `to`.
///
/// # Errors
///
/// Returns an [`Err`] if `from` does not occur in `source`
pub fn replace_first(source: &str, from: &str, to: &str) -> Result<String> {
    let at = source
        .find(from)
        .ok_or_else(|| anyhow!("placeholder `{from}` not found"))?;

    let mut result = String::with_capacity(source.len() - from.len() + to.len());
    result.push_str(&source[..at]);
    result.push_str(to);
    result.push_str(&source[at + from.len()..]);

    Ok(result)
}

/// Rewrites `file` in place, replacing the template placeholder `from` with `to`.
///
/// # Errors
///
/// Returns an [`Err`] if the file can not be read or written, or it does not
/// contain the placeholder (e.g. it was already provisioned)
pub fn substitute(file: &Path, from: &str, to: &str) -> Result<()> {
    trace!("Replacing `{from}` with `{to}` in {}", file.display());

    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let replaced = replace_first(&contents, from, to)
        .with_context(|| format!("Unexpected contents in {}", file.display()))?;

    std::fs::write(file, replaced).with_context(|| format!("Failed to write {}", file.display()))
}

/// Writes `contents` to `file`, creating missing parent directories.
///
/// # Errors
///
/// Returns an [`Err`] on any IO error
pub fn write_creating_dirs(file: &Path, contents: &str) -> Result<()> {
    trace!("Writing {}", file.display());

    if let Some(parent) = file.parent() {
        fs_extra::dir::create_all(parent, false)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(file, contents).with_context(|| format!("Failed to write {}", file.display()))
}

/// Renames the directory `from` to `to`, refusing to merge into an existing one.
///
/// # Errors
///
/// Returns an [`Err`] if `from` is missing, `to` exists or the rename fails
pub fn rename_dir(from: &Path, to: &Path) -> Result<()> {
    trace!("Moving {} to {}", from.display(), to.display());

    ensure!(from.is_dir(), anyhow!("{} is not a directory", from.display()));
    ensure!(!to.exists(), anyhow!("{} already exists", to.display()));

    std::fs::rename(from, to)
        .with_context(|| format!("Failed to move {} to {}", from.display(), to.display()))
}
