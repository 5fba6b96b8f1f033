use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CheckboxState
// ---------------------------------------------------------------------------

/// The tri-state marker on a checklist line: `[ ]`, `[-]` or `[x]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxState {
    Unchecked,
    Dash,
    Checked,
}

impl CheckboxState {
    pub fn from_mark(mark: char) -> Option<Self> {
        match mark {
            ' ' => Some(CheckboxState::Unchecked),
            '-' => Some(CheckboxState::Dash),
            'x' | 'X' => Some(CheckboxState::Checked),
            _ => None,
        }
    }

    pub fn mark(self) -> char {
        match self {
            CheckboxState::Unchecked => ' ',
            CheckboxState::Dash => '-',
            CheckboxState::Checked => 'x',
        }
    }

    /// The bracket token as it appears at the start of a task line, e.g. `- [x]`.
    pub fn token(self) -> String {
        format!("- [{}]", self.mark())
    }

    pub fn is_checked(self) -> bool {
        self == CheckboxState::Checked
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckboxState::Unchecked => "unchecked",
            CheckboxState::Dash => "dash",
            CheckboxState::Checked => "checked",
        }
    }

    /// Board column a mark corresponds to, used when describing changes.
    pub fn board_status(self) -> BoardStatus {
        match self {
            CheckboxState::Unchecked => BoardStatus::Todo,
            CheckboxState::Dash => BoardStatus::InProgress,
            CheckboxState::Checked => BoardStatus::Done,
        }
    }
}

impl fmt::Display for CheckboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Default status implied by a subsection heading.
    ///
    /// Matches English keywords case-insensitively and their Japanese
    /// counterparts; anything unrecognised is `Todo`.
    pub fn from_heading(heading: &str) -> Self {
        let lower = heading.to_lowercase();
        if heading.contains("進行中") || lower.contains("progress") {
            TaskStatus::InProgress
        } else if heading.contains("完了") || lower.contains("done") {
            TaskStatus::Done
        } else {
            TaskStatus::Todo
        }
    }
}

impl From<CheckboxState> for TaskStatus {
    fn from(state: CheckboxState) -> Self {
        match state {
            CheckboxState::Unchecked => TaskStatus::Todo,
            CheckboxState::Dash => TaskStatus::InProgress,
            CheckboxState::Checked => TaskStatus::Done,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BoardStatus
// ---------------------------------------------------------------------------

/// Kanban column of a remote project item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardStatus {
    #[serde(rename = "Todo")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl BoardStatus {
    pub fn all() -> &'static [BoardStatus] {
        &[BoardStatus::Todo, BoardStatus::InProgress, BoardStatus::Done]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoardStatus::Todo => "Todo",
            BoardStatus::InProgress => "In Progress",
            BoardStatus::Done => "Done",
        }
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BoardStatus {
    type Err = crate::error::SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Todo" => Ok(BoardStatus::Todo),
            "In Progress" => Ok(BoardStatus::InProgress),
            "Done" => Ok(BoardStatus::Done),
            _ => Err(crate::error::SyncError::InvalidBoardStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueState {
    #[serde(alias = "open")]
    Open,
    #[serde(alias = "closed")]
    Closed,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "OPEN",
            IssueState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
