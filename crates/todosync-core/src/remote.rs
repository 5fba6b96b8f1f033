//! Narrow capability traits for the external collaborators: the issue
//! tracker, its project board, and version control.
//!
//! Implementations report failures as `Err`; the sync drivers decide how to
//! degrade.

use crate::error::Result;
use crate::issue::parse_issue_checklist;
use crate::types::{BoardStatus, IssueState};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Remote entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default = "default_issue_state")]
    pub state: IssueState,
}

fn default_issue_state() -> IssueState {
    IssueState::Open
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl RemoteIssue {
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }

    /// Checklist embedded in the body: item text → completed.
    pub fn checklist(&self) -> HashMap<String, bool> {
        parse_issue_checklist(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `None` when the item has no status or one outside the three known columns.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<BoardStatus>,
}

fn lenient_status<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<BoardStatus>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueFilter {
    Open,
    All,
}

impl IssueFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueFilter::Open => "open",
            IssueFilter::All => "all",
        }
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

pub trait IssueTracker {
    fn list_issues(&self, filter: IssueFilter) -> Result<Vec<RemoteIssue>>;

    /// Create an issue and return its identifier (the tracker's URL for `gh`).
    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<String>;

    fn edit_issue_body(&self, number: u64, body: &str) -> Result<()>;

    fn close_issue(&self, number: u64) -> Result<()>;
}

pub trait ProjectBoard {
    fn list_items(&self) -> Result<Vec<ProjectItem>>;

    fn set_item_status(&self, item_id: &str, status: BoardStatus) -> Result<()>;
}

pub trait VersionControl {
    fn has_changes(&self, path: &Path) -> Result<bool>;

    fn stage(&self, path: &Path) -> Result<()>;

    fn commit(&self, message: &str) -> Result<()>;

    fn push(&self) -> Result<()>;
}
