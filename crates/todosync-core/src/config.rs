use crate::deadline::DEFAULT_THRESHOLD_DAYS;
use crate::error::{Result, SyncError};
use crate::paths;
use crate::types::BoardStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// BoardConfig
// ---------------------------------------------------------------------------

/// Option identifiers of the board's single-select status field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusOptions {
    pub todo: String,
    pub in_progress: String,
    pub done: String,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            todo: "f75ad846".to_string(),
            in_progress: "47fc9ee4".to_string(),
            done: "98236657".to_string(),
        }
    }
}

impl StatusOptions {
    pub fn option_for(&self, status: BoardStatus) -> &str {
        match status {
            BoardStatus::Todo => &self.todo,
            BoardStatus::InProgress => &self.in_progress,
            BoardStatus::Done => &self.done,
        }
    }

    /// Option id for `status`; an empty id means the board cannot be moved there.
    pub fn require(&self, status: BoardStatus) -> Result<&str> {
        let id = self.option_for(status).trim();
        if id.is_empty() {
            return Err(SyncError::MissingStatusOption(status.to_string()));
        }
        Ok(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_project_number")]
    pub project_number: u32,
    /// Board owner login. Resolved from the authenticated user when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Project node id. Looked up by number when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default = "default_status_field_id")]
    pub status_field_id: String,
    #[serde(default)]
    pub options: StatusOptions,
    #[serde(default = "default_item_limit")]
    pub item_limit: u32,
}

fn default_project_number() -> u32 {
    1
}

fn default_status_field_id() -> String {
    "PVTSSF_lAHOBuwUxs4BO6Rczg9eVhk".to_string()
}

fn default_item_limit() -> u32 {
    200
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            project_number: default_project_number(),
            owner: None,
            project_id: None,
            status_field_id: default_status_field_id(),
            options: StatusOptions::default(),
            item_limit: default_item_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueConfig / DeadlineConfig / GitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueConfig {
    #[serde(default = "default_issue_limit")]
    pub limit: u32,
}

fn default_issue_limit() -> u32 {
    200
}

impl Default for IssueConfig {
    fn default() -> Self {
        Self {
            limit: default_issue_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineConfig {
    #[serde(default = "default_threshold")]
    pub threshold_days: i64,
}

fn default_threshold() -> i64 {
    DEFAULT_THRESHOLD_DAYS
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_push_message")]
    pub push_message: String,
    #[serde(default = "default_pull_message")]
    pub pull_message: String,
}

fn default_true() -> bool {
    true
}

fn default_push_message() -> String {
    "todosync: push to issues".to_string()
}

fn default_pull_message() -> String {
    "todosync: pull from issues".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            push_message: default_push_message(),
            pull_message: default_pull_message(),
        }
    }
}

// ---------------------------------------------------------------------------
// LabelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    Category,
    Subsection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    pub keywords: Vec<String>,
    pub label: String,
}

/// Rules evaluated in order against one heading; the first hit contributes
/// its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub source: LabelSource,
    pub rules: Vec<LabelRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub groups: Vec<LabelGroup>,
    /// Label for tasks under a to-do subsection.
    #[serde(default)]
    pub todo: Option<String>,
    /// Label for tasks under an in-progress subsection.
    #[serde(default)]
    pub in_progress: Option<String>,
}

fn rule(keywords: &[&str], label: &str) -> LabelRule {
    LabelRule {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        label: label.to_string(),
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            groups: vec![
                LabelGroup {
                    source: LabelSource::Category,
                    rules: vec![
                        rule(&["🎓", "研究"], "研究"),
                        rule(&["💼", "就活", "就職"], "就活"),
                        rule(&["📅", "日常"], "日常"),
                        rule(&["💡", "プロジェクト"], "プロジェクト"),
                    ],
                },
                LabelGroup {
                    source: LabelSource::Category,
                    rules: vec![rule(&["🔥", "緊急"], "緊急")],
                },
                LabelGroup {
                    source: LabelSource::Subsection,
                    rules: vec![
                        rule(&["コンサル", "シンクタンク"], "コンサル"),
                        rule(&["商社"], "商社"),
                        rule(&["通信", "IT"], "IT"),
                        rule(&["横断"], "横断タスク"),
                    ],
                },
            ],
            todo: Some("未着手".to_string()),
            in_progress: Some("進行中".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Checklist document, relative to the project root.
    #[serde(default = "default_document")]
    pub document: PathBuf,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub issues: IssueConfig,
    #[serde(default)]
    pub deadlines: DeadlineConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub git: GitConfig,
}

fn default_version() -> u32 {
    1
}

fn default_document() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DOCUMENT)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            document: default_document(),
            board: BoardConfig::default(),
            issues: IssueConfig::default(),
            deadlines: DeadlineConfig::default(),
            labels: LabelConfig::default(),
            git: GitConfig::default(),
        }
    }
}

impl Config {
    /// Load `.todosync/config.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Absolute path of the checklist document.
    pub fn document_path(&self, root: &Path) -> PathBuf {
        root.join(&self.document)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.document.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "document path is empty".to_string(),
            });
        }

        if self.board.status_field_id.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "board.status_field_id is empty; board status cannot be updated"
                    .to_string(),
            });
        }

        for status in BoardStatus::all() {
            if self.board.options.option_for(*status).trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("board.options has no option id for '{status}'"),
                });
            }
        }

        if self.deadlines.threshold_days < 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "deadlines.threshold_days={} is negative; only overdue and due-today tasks will be reported",
                    self.deadlines.threshold_days
                ),
            });
        }

        if self.issues.limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "issues.limit is 0; no issues will be fetched".to_string(),
            });
        }

        for (gi, group) in self.labels.groups.iter().enumerate() {
            for r in &group.rules {
                if r.label.trim().is_empty() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("labels.groups[{gi}] has a rule with an empty label"),
                    });
                }
                if r.keywords.iter().all(|k| k.is_empty()) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "labels.groups[{gi}] rule '{}' has no keywords and never matches",
                            r.label
                        ),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
