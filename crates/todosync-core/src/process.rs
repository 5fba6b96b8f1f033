//! Blocking subprocess execution for the external command-line tools.

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locate `program` on PATH.
pub fn locate(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| SyncError::ToolNotInstalled(program.to_string()))
}

/// Run `bin` with `args` in `cwd` and return its stdout.
///
/// A non-zero exit becomes `CommandFailed` carrying the trimmed stderr.
pub fn run<S: AsRef<str>>(bin: &Path, args: &[S], cwd: &Path) -> Result<String> {
    let program = bin
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| bin.display().to_string());
    let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
    tracing::debug!(program = %program, args = ?args, "running");

    let output = Command::new(bin)
        .args(&args)
        .current_dir(cwd)
        .output()
        .map_err(|e| SyncError::Spawn {
            program: program.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SyncError::CommandFailed {
            program,
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
