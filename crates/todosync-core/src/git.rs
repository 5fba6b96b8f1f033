use crate::error::Result;
use crate::process;
use crate::remote::VersionControl;
use std::path::{Path, PathBuf};

/// Version control through the `git` command in a working tree.
pub struct GitCli {
    bin: PathBuf,
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: &Path) -> Result<Self> {
        Ok(Self {
            bin: process::locate("git")?,
            repo: repo.to_path_buf(),
        })
    }

    fn git<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        process::run(&self.bin, args, &self.repo)
    }
}

impl VersionControl for GitCli {
    /// Modified, staged, or untracked.
    fn has_changes(&self, path: &Path) -> Result<bool> {
        let path = path.to_string_lossy();
        let out = self.git(&["status", "--porcelain", "--", &*path])?;
        Ok(!out.trim().is_empty())
    }

    fn stage(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.git(&["add", "--", &*path])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message])?;
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.git(&["push"])?;
        Ok(())
    }
}
