pub mod config;
pub mod dashboard;
pub mod deadlines;
pub mod pull;
pub mod push;
pub mod tasks;

use anyhow::Context;
use std::path::{Path, PathBuf};
use todosync_core::config::Config;
use todosync_core::gh::GhCli;
use todosync_core::git::GitCli;
use todosync_core::paths;
use todosync_core::sync::{publish_document, PublishOutcome};

/// Project root, its configuration, and the resolved checklist path.
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    pub document: PathBuf,
}

impl Workspace {
    pub fn load(root: &Path, file: Option<&Path>) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config")?;
        let document = match file {
            Some(f) if f.is_absolute() => f.to_path_buf(),
            Some(f) => std::env::current_dir()
                .context("failed to read current directory")?
                .join(f),
            None => config.document_path(root),
        };
        Ok(Self {
            root: root.to_path_buf(),
            config,
            document,
        })
    }

    /// Document path for display.
    pub fn document_display(&self) -> String {
        paths::relative_to(&self.root, &self.document)
            .display()
            .to_string()
    }

    pub fn gh(&self) -> anyhow::Result<GhCli> {
        GhCli::new(
            &self.root,
            self.config.board.clone(),
            self.config.issues.limit,
        )
        .context("the GitHub CLI is required for this command")
    }

    /// Message shown when the checklist is absent; the command then ends successfully.
    pub fn report_missing_document(&self, json: bool) -> anyhow::Result<()> {
        if json {
            crate::output::print_json(&serde_json::json!({
                "document": self.document,
                "found": false,
            }))?;
        } else {
            println!(
                "No checklist at {}; nothing to do.",
                self.document_display()
            );
        }
        Ok(())
    }

    /// Commit and push the checklist if git publishing is enabled.
    ///
    /// Failures are logged; the sync itself has already succeeded.
    pub fn publish(&self, message: &str) -> Option<PublishOutcome> {
        if !self.config.git.enabled {
            return None;
        }
        let repo = self.document.parent().unwrap_or(self.root.as_path());
        let git = match GitCli::new(repo) {
            Ok(git) => git,
            Err(e) => {
                tracing::warn!(error = %e, "skipping git commit");
                return None;
            }
        };
        match publish_document(&git, &self.document, message) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "could not commit the checklist");
                None
            }
        }
    }
}

pub fn print_publish(outcome: Option<PublishOutcome>, message: &str) {
    match outcome {
        Some(PublishOutcome::Pushed) => println!("\ngit: committed and pushed \"{message}\""),
        Some(PublishOutcome::Committed) => {
            println!("\ngit: committed \"{message}\" (push failed, see log)")
        }
        Some(PublishOutcome::NoChanges) | None => {}
    }
}
