//! Issue body rendering, checklist extraction, and label derivation.

use crate::config::{LabelConfig, LabelSource};
use crate::document::Task;
use crate::types::TaskStatus;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const BODY_FOOTER: &str = "*This issue is generated from the task checklist by todosync.*";

/// Issue body mirroring a task: category, subsection, and the subtask checklist.
///
/// Subtasks in progress are written unchecked; the remote checklist only
/// knows done / not done.
pub fn build_issue_body(task: &Task) -> String {
    let mut lines = Vec::new();
    lines.push(format!("**Category:** {}", task.category));
    if let Some(sub) = &task.subsection {
        lines.push(format!("**Section:** {sub}"));
    }
    lines.push(String::new());

    if !task.subtasks.is_empty() {
        lines.push("## Tasks".to_string());
        lines.push(String::new());
        for sub in &task.subtasks {
            let mark = if sub.is_completed() { 'x' } else { ' ' };
            lines.push(format!("- [{mark}] {}", sub.text));
        }
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push(BODY_FOOTER.to_string());
    lines.join("\n")
}

static ISSUE_CHECKBOX_RE: OnceLock<Regex> = OnceLock::new();

fn issue_checkbox_re() -> &'static Regex {
    ISSUE_CHECKBOX_RE.get_or_init(|| Regex::new(r"^- \[([ xX])\] (.+)$").unwrap())
}

/// Checklist items in an issue body: item text → completed.
///
/// The first occurrence of a duplicated item wins.
pub fn parse_issue_checklist(body: &str) -> HashMap<String, bool> {
    let mut items = HashMap::new();
    for line in body.lines() {
        let Some(caps) = issue_checkbox_re().captures(line.trim()) else {
            continue;
        };
        let completed = &caps[1] != " ";
        let text = caps[2].trim().to_string();
        items.entry(text).or_insert(completed);
    }
    items
}

/// Labels for a new issue.
///
/// Each configured group contributes the label of its first rule with a
/// keyword contained in the group's source text. A status label follows,
/// taken from the section default status.
pub fn derive_labels(task: &Task, config: &LabelConfig) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    for group in &config.groups {
        let source = match group.source {
            LabelSource::Category => task.category.as_str(),
            LabelSource::Subsection => task.subsection.as_deref().unwrap_or(""),
        };
        if source.is_empty() {
            continue;
        }
        let hit = group
            .rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| !k.is_empty() && source.contains(k.as_str())));
        if let Some(rule) = hit {
            if !labels.contains(&rule.label) {
                labels.push(rule.label.clone());
            }
        }
    }

    let status_label = match task.section_status {
        TaskStatus::InProgress => config.in_progress.as_ref(),
        TaskStatus::Todo => config.todo.as_ref(),
        TaskStatus::Done => None,
    };
    if let Some(label) = status_label.filter(|l| !l.is_empty()) {
        labels.push(label.clone());
    }

    labels
}
