use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TODOSYNC_DIR: &str = ".todosync";
pub const CONFIG_FILE: &str = ".todosync/config.yaml";
pub const DEFAULT_DOCUMENT: &str = "TODO.md";

// ---------------------------------------------------------------------------
// Path builders
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Path of `path` relative to `root`, or `path` itself when it lies elsewhere.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
