//! Issue tracker and project board backed by the GitHub CLI (`gh`).

use crate::config::BoardConfig;
use crate::error::{Result, SyncError};
use crate::process;
use crate::remote::{IssueFilter, IssueTracker, ProjectBoard, ProjectItem, RemoteIssue};
use crate::types::BoardStatus;
use serde::Deserialize;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

pub struct GhCli {
    bin: PathBuf,
    cwd: PathBuf,
    board: BoardConfig,
    issue_limit: u32,
    owner: OnceCell<String>,
    project_id: OnceCell<String>,
}

impl GhCli {
    /// Fails with `ToolNotInstalled` when `gh` is not on PATH.
    pub fn new(cwd: &Path, board: BoardConfig, issue_limit: u32) -> Result<Self> {
        Ok(Self {
            bin: process::locate("gh")?,
            cwd: cwd.to_path_buf(),
            board,
            issue_limit,
            owner: OnceCell::new(),
            project_id: OnceCell::new(),
        })
    }

    fn gh<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        process::run(&self.bin, args, &self.cwd)
    }

    /// Board owner: configured login, else the authenticated user.
    fn owner(&self) -> Result<&str> {
        if let Some(owner) = self.owner.get() {
            return Ok(owner);
        }
        let owner = match &self.board.owner {
            Some(o) if !o.trim().is_empty() => o.trim().to_string(),
            _ => {
                let login = self.gh(&["api", "user", "--jq", ".login"])?;
                let login = login.trim();
                if login.is_empty() {
                    return Err(SyncError::OwnerUnresolved);
                }
                login.to_string()
            }
        };
        Ok(self.owner.get_or_init(|| owner))
    }

    /// Project node id: configured, else looked up by project number.
    fn project_id(&self) -> Result<&str> {
        if let Some(id) = self.project_id.get() {
            return Ok(id);
        }
        let id = match &self.board.project_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                let owner = self.owner()?.to_string();
                let json = self.gh(&["project", "list", "--owner", owner.as_str(), "--format", "json"])?;
                find_project_id(&json, self.board.project_number)?
                    .ok_or(SyncError::ProjectNotFound(self.board.project_number))?
            }
        };
        Ok(self.project_id.get_or_init(|| id))
    }
}

impl IssueTracker for GhCli {
    fn list_issues(&self, filter: IssueFilter) -> Result<Vec<RemoteIssue>> {
        let json = self.gh(&issue_list_args(filter, self.issue_limit))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<String> {
        let out = self.gh(&issue_create_args(title, body, labels))?;
        Ok(out.trim().to_string())
    }

    fn edit_issue_body(&self, number: u64, body: &str) -> Result<()> {
        let number = number.to_string();
        self.gh(&["issue", "edit", number.as_str(), "--body", body])?;
        Ok(())
    }

    fn close_issue(&self, number: u64) -> Result<()> {
        let number = number.to_string();
        self.gh(&["issue", "close", number.as_str()])?;
        Ok(())
    }
}

impl ProjectBoard for GhCli {
    fn list_items(&self) -> Result<Vec<ProjectItem>> {
        let owner = self.owner()?.to_string();
        let json = self.gh(&item_list_args(
            self.board.project_number,
            &owner,
            self.board.item_limit,
        ))?;
        parse_item_list(&json)
    }

    fn set_item_status(&self, item_id: &str, status: BoardStatus) -> Result<()> {
        let option_id = self.board.options.require(status)?;
        let project_id = self.project_id()?.to_string();
        self.gh(&item_edit_args(
            &project_id,
            item_id,
            &self.board.status_field_id,
            option_id,
        ))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Argument builders and output parsing
// ---------------------------------------------------------------------------

fn issue_list_args(filter: IssueFilter, limit: u32) -> Vec<String> {
    vec![
        "issue".into(),
        "list".into(),
        "--state".into(),
        filter.as_str().into(),
        "--limit".into(),
        limit.to_string(),
        "--json".into(),
        "number,title,body,state".into(),
    ]
}

fn issue_create_args(title: &str, body: &str, labels: &[String]) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "issue".into(),
        "create".into(),
        "--title".into(),
        title.into(),
        "--body".into(),
        body.into(),
    ];
    for label in labels {
        args.push("--label".into());
        args.push(label.clone());
    }
    args
}

fn item_list_args(project_number: u32, owner: &str, limit: u32) -> Vec<String> {
    vec![
        "project".into(),
        "item-list".into(),
        project_number.to_string(),
        "--owner".into(),
        owner.into(),
        "--format".into(),
        "json".into(),
        "--limit".into(),
        limit.to_string(),
    ]
}

fn item_edit_args(project_id: &str, item_id: &str, field_id: &str, option_id: &str) -> Vec<String> {
    vec![
        "project".into(),
        "item-edit".into(),
        "--project-id".into(),
        project_id.into(),
        "--id".into(),
        item_id.into(),
        "--field-id".into(),
        field_id.into(),
        "--single-select-option-id".into(),
        option_id.into(),
    ]
}

#[derive(Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<ProjectItem>,
}

fn parse_item_list(json: &str) -> Result<Vec<ProjectItem>> {
    let list: ItemList = serde_json::from_str(json)?;
    Ok(list.items)
}

#[derive(Deserialize)]
struct ProjectSummary {
    number: u32,
    id: String,
}

#[derive(Deserialize)]
struct ProjectList {
    #[serde(default)]
    projects: Vec<ProjectSummary>,
}

fn find_project_id(json: &str, number: u32) -> Result<Option<String>> {
    let list: ProjectList = serde_json::from_str(json)?;
    Ok(list
        .projects
        .into_iter()
        .find(|p| p.number == number)
        .map(|p| p.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_args_repeat_label_flag() {
        let args = issue_create_args("Thesis", "body", &["research".into(), "todo".into()]);
        assert_eq!(
            args,
            vec![
                "issue", "create", "--title", "Thesis", "--body", "body", "--label", "research",
                "--label", "todo"
            ]
        );
    }

    #[test]
    fn list_args_request_fields() {
        let args = issue_list_args(IssueFilter::All, 50);
        assert_eq!(args[3], "all");
        assert_eq!(args[5], "50");
        assert_eq!(args.last().unwrap(), "number,title,body,state");
    }

    #[test]
    fn edit_args_name_field_and_option() {
        let args = item_edit_args("PVT_1", "PVTI_2", "FIELD", "OPT");
        assert_eq!(
            args,
            vec![
                "project",
                "item-edit",
                "--project-id",
                "PVT_1",
                "--id",
                "PVTI_2",
                "--field-id",
                "FIELD",
                "--single-select-option-id",
                "OPT"
            ]
        );
        let list = item_list_args(3, "someone", 100);
        assert_eq!(&list[2..5], &["3", "--owner", "someone"]);
    }

    #[test]
    fn parses_item_list_output() {
        let json = r#"{"items": [
            {"id": "PVTI_a", "title": "Thesis", "status": "In Progress",
             "content": {"number": 4, "type": "Issue"}},
            {"id": "PVTI_b", "title": "Draft note", "status": null}
        ], "totalCount": 2}"#;
        let items = parse_item_list(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].status, Some(BoardStatus::InProgress));
        assert_eq!(items[1].status, None);
        assert!(parse_item_list("{}").unwrap().is_empty());
        assert!(parse_item_list("not json").is_err());
    }

    #[test]
    fn empty_option_id_fails_before_calling_gh() {
        let mut board = BoardConfig::default();
        board.options.in_progress = " ".to_string();
        let gh = GhCli {
            bin: PathBuf::from("/nonexistent/gh"),
            cwd: PathBuf::from("."),
            board,
            issue_limit: 10,
            owner: OnceCell::new(),
            project_id: OnceCell::new(),
        };
        let err = gh.set_item_status("PVTI_1", BoardStatus::InProgress).unwrap_err();
        assert!(matches!(err, SyncError::MissingStatusOption(s) if s == "In Progress"));
    }

    #[test]
    fn finds_project_by_number() {
        let json = r#"{"projects": [
            {"number": 2, "id": "PVT_two", "title": "Other"},
            {"number": 1, "id": "PVT_one", "title": "Tasks"}
        ], "totalCount": 2}"#;
        assert_eq!(find_project_id(json, 1).unwrap().as_deref(), Some("PVT_one"));
        assert_eq!(find_project_id(json, 9).unwrap(), None);
    }
}
