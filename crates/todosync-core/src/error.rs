use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("'{0}' is not installed or not on PATH")]
    ToolNotInstalled(String),

    #[error("failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} exited with an error: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("could not resolve project board owner")]
    OwnerUnresolved,

    #[error("project {0} not found for the board owner")]
    ProjectNotFound(u32),

    #[error("no option id configured for board status '{0}'")]
    MissingStatusOption(String),

    #[error("invalid board status: {0}")]
    InvalidBoardStatus(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
