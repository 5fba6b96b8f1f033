//! Push and pull drivers.
//!
//! Remote failures never abort a run: they are logged, recorded on the
//! report, and treated as "no data" or "not done".

use crate::config::LabelConfig;
use crate::document::{parse_document, read_document, Task};
use crate::error::Result;
use crate::io::atomic_write;
use crate::reconcile::{plan_push, reconcile_pull, BoardPlan, LineChange, PushAction};
use crate::remote::{IssueFilter, IssueTracker, ProjectBoard, ProjectItem, RemoteIssue, VersionControl};
use crate::types::BoardStatus;
use serde::Serialize;
use std::path::Path;

fn fetch_issues<T: IssueTracker + ?Sized>(tracker: &T, filter: IssueFilter) -> Vec<RemoteIssue> {
    match tracker.list_issues(filter) {
        Ok(issues) => issues,
        Err(e) => {
            tracing::warn!(filter = filter.as_str(), error = %e, "failed to list issues; continuing with none");
            Vec::new()
        }
    }
}

fn fetch_items<B: ProjectBoard + ?Sized>(board: &B) -> Vec<ProjectItem> {
    match board.list_items() {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list project items; board status will not be updated");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// A planned action and what happened when it was applied.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedAction {
    #[serde(flatten)]
    pub action: PushAction,
    /// URL of a created issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AppliedAction {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PushReport {
    pub dry_run: bool,
    pub tasks: usize,
    pub open_issues: usize,
    pub board_items: usize,
    pub actions: Vec<AppliedAction>,
}

impl PushReport {
    fn count(&self, pred: impl Fn(&PushAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(&a.action)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|a| matches!(a, PushAction::Create { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|a| matches!(a, PushAction::Update { .. }))
    }

    pub fn closed(&self) -> usize {
        self.count(|a| matches!(a, PushAction::Close { .. }))
    }

    pub fn failed(&self) -> usize {
        self.actions.iter().filter(|a| !a.is_ok()).count()
    }
}

/// Bring open issues and board statuses in line with `tasks`.
///
/// With `dry_run` the plan is computed from live remote state but nothing is
/// written.
pub fn push<T, B>(
    tracker: &T,
    board: &B,
    tasks: &[Task],
    labels: &LabelConfig,
    dry_run: bool,
) -> PushReport
where
    T: IssueTracker + ?Sized,
    B: ProjectBoard + ?Sized,
{
    let open_issues = fetch_issues(tracker, IssueFilter::Open);
    let items = fetch_items(board);
    tracing::info!(
        tasks = tasks.len(),
        open_issues = open_issues.len(),
        items = items.len(),
        "planning push"
    );

    let actions = plan_push(tasks, &open_issues, &items, labels)
        .into_iter()
        .map(|action| {
            if dry_run {
                AppliedAction {
                    action,
                    url: None,
                    errors: Vec::new(),
                }
            } else {
                apply(tracker, board, action)
            }
        })
        .collect();

    PushReport {
        dry_run,
        tasks: tasks.len(),
        open_issues: open_issues.len(),
        board_items: items.len(),
        actions,
    }
}

fn apply<T, B>(tracker: &T, board: &B, action: PushAction) -> AppliedAction
where
    T: IssueTracker + ?Sized,
    B: ProjectBoard + ?Sized,
{
    let mut url = None;
    let mut errors = Vec::new();
    let mut record = |what: &str, res: Result<()>| {
        if let Err(e) = res {
            tracing::warn!(task = action.title(), error = %e, "{what} failed");
            errors.push(format!("{what}: {e}"));
        }
    };

    match &action {
        PushAction::Create {
            title, body, labels, ..
        } => match tracker.create_issue(title, body, labels) {
            Ok(u) => {
                tracing::info!(task = %title, url = %u, "created issue");
                url = Some(u);
            }
            Err(e) => record("create issue", Err(e)),
        },
        PushAction::Update {
            number, body, board: plan, ..
        } => {
            record("edit issue", tracker.edit_issue_body(*number, body));
            if let BoardPlan::Move { item_id, to, .. } = plan {
                record("set board status", board.set_item_status(item_id, *to));
            }
        }
        PushAction::Close {
            number,
            body,
            board_item,
            ..
        } => {
            record("edit issue", tracker.edit_issue_body(*number, body));
            record("close issue", tracker.close_issue(*number));
            if let Some(item_id) = board_item {
                record(
                    "set board status",
                    board.set_item_status(item_id, BoardStatus::Done),
                );
            }
        }
    }

    AppliedAction {
        action,
        url,
        errors,
    }
}

/// Read and parse the document for a push.
///
/// `Ok(None)` when the document does not exist.
pub fn load_tasks(path: &Path, reference_year: i32) -> Result<Option<Vec<Task>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = read_document(path)?;
    Ok(Some(parse_document(&text, reference_year)))
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PullReport {
    pub dry_run: bool,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub board_items: usize,
    pub changes: Vec<LineChange>,
    /// Whether the document was rewritten.
    pub written: bool,
    /// Board items fetched for the run, reused for the dashboard.
    #[serde(skip)]
    pub items: Vec<ProjectItem>,
}

/// Apply remote state to the document at `path`, rewriting it at most once.
///
/// `Ok(None)` when the document does not exist.
pub fn pull<T, B>(tracker: &T, board: &B, path: &Path, dry_run: bool) -> Result<Option<PullReport>>
where
    T: IssueTracker + ?Sized,
    B: ProjectBoard + ?Sized,
{
    if !path.exists() {
        return Ok(None);
    }
    let document = read_document(path)?;
    let issues = fetch_issues(tracker, IssueFilter::All);
    let items = fetch_items(board);

    let closed_issues = issues.iter().filter(|i| i.is_closed()).count();
    let outcome = reconcile_pull(&document, &issues, &items);

    let written = outcome.is_changed() && !dry_run;
    if written {
        atomic_write(path, outcome.text.as_bytes())?;
        tracing::info!(changes = outcome.changes.len(), path = %path.display(), "document updated");
    }

    Ok(Some(PullReport {
        dry_run,
        open_issues: issues.len() - closed_issues,
        closed_issues,
        board_items: items.len(),
        changes: outcome.changes,
        written,
        items,
    }))
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    NoChanges,
    /// Committed locally; pushing failed.
    Committed,
    Pushed,
}

/// Commit the document and push when it has uncommitted changes.
pub fn publish_document<V: VersionControl + ?Sized>(
    vcs: &V,
    path: &Path,
    message: &str,
) -> Result<PublishOutcome> {
    if !vcs.has_changes(path)? {
        return Ok(PublishOutcome::NoChanges);
    }
    vcs.stage(path)?;
    vcs.commit(message)?;
    match vcs.push() {
        Ok(()) => Ok(PublishOutcome::Pushed),
        Err(e) => {
            tracing::warn!(error = %e, "git push failed; commit kept locally");
            Ok(PublishOutcome::Committed)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
