//! Status reconciliation between the checklist document and the remote
//! issue tracker / project board.
//!
//! Push and pull are asymmetric. Pushing treats explicit local
//! marks as authoritative; pulling lets issue closure and board columns
//! override local marks, except that a local mark is never cleared unless the
//! board says Todo and the mark was in progress.

use crate::config::LabelConfig;
use crate::document::{heading, parse_checklist_line, CommentSpan, Task};
use crate::issue::{build_issue_body, derive_labels};
use crate::remote::{ProjectItem, RemoteIssue};
use crate::types::{BoardStatus, CheckboxState};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Push: status derivation
// ---------------------------------------------------------------------------

/// Board column a task should occupy.
pub fn target_status(task: &Task) -> BoardStatus {
    match task.checkbox {
        CheckboxState::Checked => return BoardStatus::Done,
        CheckboxState::Dash => return BoardStatus::InProgress,
        CheckboxState::Unchecked => {}
    }
    if task.subtasks.is_empty() {
        return BoardStatus::Todo;
    }
    let done = task.completed_subtasks();
    if done == task.subtasks.len() {
        BoardStatus::Done
    } else if done > 0 {
        BoardStatus::InProgress
    } else {
        BoardStatus::Todo
    }
}

/// Own box checked, or at least one subtask and every subtask checked.
pub fn is_fully_complete(task: &Task) -> bool {
    task.checkbox.is_checked()
        || (!task.subtasks.is_empty() && task.subtasks.iter().all(|s| s.is_completed()))
}

// ---------------------------------------------------------------------------
// Push: plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardPlan {
    /// The issue has no item on the board.
    NoItem,
    Unchanged { status: BoardStatus },
    Move {
        item_id: String,
        from: Option<BoardStatus>,
        to: BoardStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PushAction {
    Create {
        title: String,
        body: String,
        labels: Vec<String>,
        subtasks: usize,
    },
    Update {
        number: u64,
        title: String,
        body: String,
        target: BoardStatus,
        board: BoardPlan,
    },
    Close {
        number: u64,
        title: String,
        body: String,
        /// Board item forced to Done, if the issue is on the board.
        board_item: Option<String>,
    },
}

impl PushAction {
    pub fn title(&self) -> &str {
        match self {
            PushAction::Create { title, .. }
            | PushAction::Update { title, .. }
            | PushAction::Close { title, .. } => title,
        }
    }
}

fn first_by_title<'a, T>(
    entries: &'a [T],
    title_of: impl Fn(&T) -> &str,
) -> HashMap<&'a str, &'a T> {
    let mut map = HashMap::new();
    for entry in entries {
        map.entry(title_of(entry)).or_insert(entry);
    }
    map
}

/// Compute the remote mutations that bring open issues and the board in
/// line with the document.
///
/// Closed issues in `open_issues` are ignored. Tasks that match no open issue
/// are created; they are not matched against each other within a run.
pub fn plan_push(
    tasks: &[Task],
    open_issues: &[RemoteIssue],
    items: &[ProjectItem],
    labels: &LabelConfig,
) -> Vec<PushAction> {
    let open: Vec<&RemoteIssue> = open_issues.iter().filter(|i| !i.is_closed()).collect();
    let issue_map = first_by_title(&open, |i| i.title.as_str());
    let item_map = first_by_title(items, |i| i.title.as_str());

    tasks
        .iter()
        .map(|task| {
            let body = build_issue_body(task);
            let Some(issue) = issue_map.get(task.title.as_str()) else {
                return PushAction::Create {
                    title: task.title.clone(),
                    body,
                    labels: derive_labels(task, labels),
                    subtasks: task.subtasks.len(),
                };
            };
            let item = item_map.get(task.title.as_str());

            if is_fully_complete(task) {
                return PushAction::Close {
                    number: issue.number,
                    title: task.title.clone(),
                    body,
                    board_item: item.map(|i| i.id.clone()),
                };
            }

            let target = target_status(task);
            let board = match item {
                None => BoardPlan::NoItem,
                Some(i) if i.status == Some(target) => BoardPlan::Unchanged { status: target },
                Some(i) => BoardPlan::Move {
                    item_id: i.id.clone(),
                    from: i.status,
                    to: target,
                },
            };
            PushAction::Update {
                number: issue.number,
                title: task.title.clone(),
                body,
                target,
                board,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    Task {
        from: CheckboxState,
        to: CheckboxState,
    },
    Subtask {
        parent: String,
        done: bool,
    },
}

/// One rewritten line of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChange {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl fmt::Display for LineChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChangeKind::Task { from, to } => write!(
                f,
                "{}: {} → {}",
                self.text,
                from.board_status(),
                to.board_status()
            ),
            ChangeKind::Subtask { parent, done } => {
                let state = if *done { "done" } else { "todo" };
                write!(f, "[{state}] {} ({parent})", self.text)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullOutcome {
    pub text: String,
    pub changes: Vec<LineChange>,
}

impl PullOutcome {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// New mark for a top-level task matched to `issue`.
pub fn pulled_mark(
    old: CheckboxState,
    issue: &RemoteIssue,
    board: Option<BoardStatus>,
) -> CheckboxState {
    if issue.is_closed() {
        return CheckboxState::Checked;
    }
    match board {
        Some(BoardStatus::InProgress) => CheckboxState::Dash,
        Some(BoardStatus::Todo) if old == CheckboxState::Dash => CheckboxState::Unchecked,
        _ => old,
    }
}

/// Replace the `- [m]` token at the start of the line's content, keeping
/// every other byte (indent, text, annotation, line ending) as is.
fn rewrite_mark(line: &str, to: CheckboxState) -> String {
    let start = line.len() - line.trim_start().len();
    let token_end = start + "- [ ]".len();
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..start]);
    out.push_str(&to.token());
    out.push_str(&line[token_end..]);
    out
}

struct MatchedParent<'a> {
    title: String,
    issue: &'a RemoteIssue,
    checklist: HashMap<String, bool>,
}

/// Apply remote issue and board state to the document text.
///
/// `issues` should contain both open and closed issues; the first issue with
/// a given title is used.
pub fn reconcile_pull(document: &str, issues: &[RemoteIssue], items: &[ProjectItem]) -> PullOutcome {
    let issue_map = first_by_title(issues, |i| i.title.as_str());
    let board_map = first_by_title(items, |i| i.title.as_str());

    let mut comments = CommentSpan::default();
    let mut parent: Option<MatchedParent> = None;
    let mut text = String::with_capacity(document.len());
    let mut changes = Vec::new();

    for (idx, line) in document.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let Some(live) = comments.live(line) else {
            text.push_str(line);
            continue;
        };

        if heading(live.trim()).is_some() {
            parent = None;
            text.push_str(line);
            continue;
        }

        let Some(item) = parse_checklist_line(live) else {
            text.push_str(line);
            continue;
        };

        if item.indent == 0 {
            parent = issue_map.get(item.text).map(|&issue| MatchedParent {
                title: item.text.to_string(),
                issue,
                checklist: issue.checklist(),
            });
            let new_mark = match &parent {
                Some(p) => {
                    let board = board_map.get(item.text).and_then(|i| i.status);
                    pulled_mark(item.checkbox, p.issue, board)
                }
                None => item.checkbox,
            };
            if new_mark != item.checkbox {
                changes.push(LineChange {
                    line: line_no,
                    text: item.text.to_string(),
                    kind: ChangeKind::Task {
                        from: item.checkbox,
                        to: new_mark,
                    },
                });
                text.push_str(&rewrite_mark(line, new_mark));
            } else {
                text.push_str(line);
            }
            continue;
        }

        let open_parent = parent.as_ref().filter(|p| !p.issue.is_closed());
        if let Some(p) = open_parent.filter(|_| item.indent >= 2) {
            if let Some(&done) = p.checklist.get(item.text) {
                let new_mark = if done {
                    CheckboxState::Checked
                } else {
                    CheckboxState::Unchecked
                };
                if new_mark != item.checkbox {
                    changes.push(LineChange {
                        line: line_no,
                        text: item.text.to_string(),
                        kind: ChangeKind::Subtask {
                            parent: p.title.clone(),
                            done,
                        },
                    });
                    text.push_str(&rewrite_mark(line, new_mark));
                    continue;
                }
            }
        }
        text.push_str(line);
    }

    PullOutcome { text, changes }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::types::IssueState;

    fn tasks(doc: &str) -> Vec<Task> {
        parse_document(doc, 2026)
    }

    fn issue(number: u64, title: &str, body: &str, state: IssueState) -> RemoteIssue {
        RemoteIssue {
            number,
            title: title.to_string(),
            body: body.to_string(),
            state,
        }
    }

    fn item(id: &str, title: &str, status: Option<BoardStatus>) -> ProjectItem {
        ProjectItem {
            id: id.to_string(),
            title: title.to_string(),
            status,
        }
    }

    // -- push ---------------------------------------------------------------

    #[test]
    fn dash_without_subtasks_is_in_progress() {
        let t = &tasks("## W\n- [-] Solo\n")[0];
        assert_eq!(target_status(t), BoardStatus::InProgress);
        assert!(!is_fully_complete(t));
    }

    #[test]
    fn all_subtasks_done_is_complete_despite_unchecked_parent() {
        let t = &tasks("## W\n- [ ] P\n  - [x] a\n  - [x] b\n  - [x] c\n")[0];
        assert_eq!(target_status(t), BoardStatus::Done);
        assert!(is_fully_complete(t));
    }

    #[test]
    fn subtask_ratio_drives_status() {
        let ts = tasks(
            "## W\n- [ ] None\n  - [ ] a\n  - [-] b\n- [ ] Some\n  - [x] a\n  - [ ] b\n- [ ] Bare\n- [x] Own\n  - [ ] a\n",
        );
        assert_eq!(target_status(&ts[0]), BoardStatus::Todo);
        assert_eq!(target_status(&ts[1]), BoardStatus::InProgress);
        assert_eq!(target_status(&ts[2]), BoardStatus::Todo);
        assert_eq!(target_status(&ts[3]), BoardStatus::Done);
        assert!(is_fully_complete(&ts[3]));
        assert!(!is_fully_complete(&ts[2]));
    }

    #[test]
    fn dash_parent_overrides_finished_subtasks_for_status() {
        let t = &tasks("## W\n- [-] P\n  - [x] a\n")[0];
        assert_eq!(target_status(t), BoardStatus::InProgress);
        assert!(is_fully_complete(t));
    }

    #[test]
    fn plan_creates_unmatched_tasks() {
        let ts = tasks("## 🎓 Research\n- [ ] New\n  - [ ] a\n- [ ] New\n");
        let plan = plan_push(&ts, &[], &[], &LabelConfig::default());
        assert_eq!(plan.len(), 2);
        match &plan[0] {
            PushAction::Create {
                title,
                labels,
                subtasks,
                body,
            } => {
                assert_eq!(title, "New");
                assert_eq!(*subtasks, 1);
                assert_eq!(labels, &vec!["研究".to_string(), "未着手".to_string()]);
                assert!(body.contains("- [ ] a"));
            }
            other => panic!("expected create, got {other:?}"),
        }
        assert!(matches!(plan[1], PushAction::Create { .. }));
    }

    #[test]
    fn plan_closes_complete_tasks_and_forces_done() {
        let ts = tasks("## W\n- [ ] P\n  - [x] a\n");
        let issues = [issue(7, "P", "", IssueState::Open)];
        let items = [item("PVTI_1", "P", Some(BoardStatus::Done))];
        let plan = plan_push(&ts, &issues, &items, &LabelConfig::default());
        assert_eq!(
            plan[0],
            PushAction::Close {
                number: 7,
                title: "P".into(),
                body: build_issue_body(&ts[0]),
                board_item: Some("PVTI_1".into()),
            }
        );
    }

    #[test]
    fn plan_moves_board_only_when_status_differs() {
        let ts = tasks("## W\n- [-] Moving\n- [-] Same\n- [ ] Offboard\n- [ ] Unknown\n");
        let issues = [
            issue(1, "Moving", "", IssueState::Open),
            issue(2, "Same", "", IssueState::Open),
            issue(3, "Offboard", "", IssueState::Open),
            issue(4, "Unknown", "", IssueState::Open),
        ];
        let items = [
            item("I1", "Moving", Some(BoardStatus::Todo)),
            item("I2", "Same", Some(BoardStatus::InProgress)),
            item("I4", "Unknown", None),
        ];
        let plan = plan_push(&ts, &issues, &items, &LabelConfig::default());
        let boards: Vec<&BoardPlan> = plan
            .iter()
            .map(|a| match a {
                PushAction::Update { board, .. } => board,
                other => panic!("expected update, got {other:?}"),
            })
            .collect();
        assert_eq!(
            boards[0],
            &BoardPlan::Move {
                item_id: "I1".into(),
                from: Some(BoardStatus::Todo),
                to: BoardStatus::InProgress,
            }
        );
        assert_eq!(
            boards[1],
            &BoardPlan::Unchanged {
                status: BoardStatus::InProgress
            }
        );
        assert_eq!(boards[2], &BoardPlan::NoItem);
        assert!(matches!(boards[3], BoardPlan::Move { from: None, to: BoardStatus::Todo, .. }));
    }

    #[test]
    fn plan_ignores_closed_issues_and_uses_first_match() {
        let ts = tasks("## W\n- [ ] Dup\n");
        let issues = [
            issue(1, "Dup", "", IssueState::Closed),
            issue(2, "Dup", "", IssueState::Open),
            issue(3, "Dup", "", IssueState::Open),
        ];
        let plan = plan_push(&ts, &issues, &[], &LabelConfig::default());
        assert!(matches!(plan[0], PushAction::Update { number: 2, .. }));
    }

    // -- pull ---------------------------------------------------------------

    #[test]
    fn closed_issue_forces_checked() {
        let doc = "## W\n- [-] Task (due: 3/14)\n";
        let issues = [issue(1, "Task (due: 3/14)", "", IssueState::Closed)];
        let out = reconcile_pull(doc, &issues, &[]);
        assert_eq!(out.text, "## W\n- [x] Task (due: 3/14)\n");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].line, 2);
        assert_eq!(out.changes[0].to_string(), "Task (due: 3/14): In Progress → Done");
    }

    #[test]
    fn board_todo_demotes_only_dash() {
        let doc = "- [-] A\n- [ ] B\n- [x] C\n";
        let issues = [
            issue(1, "A", "", IssueState::Open),
            issue(2, "B", "", IssueState::Open),
            issue(3, "C", "", IssueState::Open),
        ];
        let items = [
            item("1", "A", Some(BoardStatus::Todo)),
            item("2", "B", Some(BoardStatus::Todo)),
            item("3", "C", Some(BoardStatus::Todo)),
        ];
        let out = reconcile_pull(doc, &issues, &items);
        assert_eq!(out.text, "- [ ] A\n- [ ] B\n- [x] C\n");
        assert_eq!(out.changes.len(), 1);
    }

    #[test]
    fn board_in_progress_sets_dash_even_over_checked() {
        let doc = "- [x] A\n";
        let issues = [issue(1, "A", "", IssueState::Open)];
        let items = [item("1", "A", Some(BoardStatus::InProgress))];
        let out = reconcile_pull(doc, &issues, &items);
        assert_eq!(out.text, "- [-] A\n");
    }

    #[test]
    fn unmatched_and_done_board_leave_marks_alone() {
        let doc = "- [-] Local only\n- [ ] Open done\n";
        let issues = [issue(1, "Open done", "", IssueState::Open)];
        let items = [item("1", "Open done", Some(BoardStatus::Done))];
        let out = reconcile_pull(doc, &issues, &items);
        assert_eq!(out.text, doc);
        assert!(!out.is_changed());
    }

    #[test]
    fn subtasks_follow_remote_checklist() {
        let doc = "\
## W
- [ ] Parent
  - [ ] Remote done
  - [-] Remote open
  - [x] Not in remote
";
        let body = "## Tasks\n\n- [x] Remote done\n- [ ] Remote open\n";
        let issues = [issue(1, "Parent", body, IssueState::Open)];
        let out = reconcile_pull(doc, &issues, &[]);
        assert_eq!(
            out.text,
            "## W\n- [ ] Parent\n  - [x] Remote done\n  - [ ] Remote open\n  - [x] Not in remote\n"
        );
        assert_eq!(out.changes.len(), 2);
        assert_eq!(out.changes[0].to_string(), "[done] Remote done (Parent)");
        assert_eq!(out.changes[1].to_string(), "[todo] Remote open (Parent)");
    }

    #[test]
    fn subtasks_under_closed_parent_are_untouched() {
        let doc = "- [ ] Parent\n  - [ ] child\n";
        let issues = [issue(1, "Parent", "- [ ] child", IssueState::Closed)];
        let out = reconcile_pull(doc, &issues, &[]);
        assert_eq!(out.text, "- [x] Parent\n  - [ ] child\n");
    }

    #[test]
    fn subtasks_of_unmatched_parent_are_untouched() {
        let doc = "- [ ] Local\n  - [ ] child\n";
        let issues = [issue(1, "Other", "- [x] child", IssueState::Open)];
        let out = reconcile_pull(doc, &issues, &[]);
        assert!(!out.is_changed());
    }

    #[test]
    fn headings_reset_parent() {
        let doc = "- [ ] Parent\n## Next\n  - [ ] child\n### Sub\n  - [ ] child\n";
        let issues = [issue(1, "Parent", "- [x] child", IssueState::Open)];
        let out = reconcile_pull(doc, &issues, &[]);
        assert_eq!(out.text, doc);
    }

    #[test]
    fn comment_spans_are_not_rewritten() {
        let doc = "<!--\n- [ ] A\n-->\n- [ ] A\n";
        let issues = [issue(1, "A", "", IssueState::Closed)];
        let out = reconcile_pull(doc, &issues, &[]);
        assert_eq!(out.text, "<!--\n- [ ] A\n-->\n- [x] A\n");
        assert_eq!(out.changes[0].line, 4);
    }

    #[test]
    fn task_with_trailing_comment_is_reconciled() {
        let doc = "- [ ] A <!-- note -->\n- [ ] B <!-- opens\n- [ ] A\n-->\n";
        let issues = [
            issue(1, "A", "", IssueState::Closed),
            issue(2, "B", "", IssueState::Closed),
        ];
        let out = reconcile_pull(doc, &issues, &[]);
        assert_eq!(
            out.text,
            "- [x] A <!-- note -->\n- [x] B <!-- opens\n- [ ] A\n-->\n"
        );
        let lines: Vec<usize> = out.changes.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(out.changes[1].text, "B");
    }

    #[test]
    fn rewrite_preserves_everything_but_the_mark() {
        let doc = "- [ ] Pay rent（期限：2026-03-01）  \r\n    - [ ] sub - [ ] literal\r\nno newline";
        let issues = [issue(
            1,
            "Pay rent（期限：2026-03-01）",
            "- [x] sub - [ ] literal",
            IssueState::Open,
        )];
        let items = [item("1", "Pay rent（期限：2026-03-01）", Some(BoardStatus::InProgress))];
        let out = reconcile_pull(doc, &issues, &items);
        assert_eq!(
            out.text,
            "- [-] Pay rent（期限：2026-03-01）  \r\n    - [x] sub - [ ] literal\r\nno newline"
        );
    }

    #[test]
    fn pull_is_idempotent() {
        let doc = "## W\n- [-] A\n  - [ ] a1\n- [ ] B\n- [ ] C\n";
        let issues = [
            issue(1, "A", "- [x] a1", IssueState::Open),
            issue(2, "B", "", IssueState::Closed),
            issue(3, "C", "", IssueState::Open),
        ];
        let items = [
            item("1", "A", Some(BoardStatus::Todo)),
            item("3", "C", Some(BoardStatus::InProgress)),
        ];
        let first = reconcile_pull(doc, &issues, &items);
        assert!(first.is_changed());
        let second = reconcile_pull(&first.text, &issues, &items);
        assert!(!second.is_changed());
        assert_eq!(second.text, first.text);
    }
}
