use super::{print_publish, Workspace};
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Datelike;
use todosync_core::reconcile::{BoardPlan, PushAction};
use todosync_core::sync::{self, load_tasks, AppliedAction};

pub fn run(ws: &Workspace, dry_run: bool, no_commit: bool, json: bool) -> anyhow::Result<()> {
    let year = chrono::Local::now().year();
    let Some(tasks) = load_tasks(&ws.document, year).context("failed to read checklist")? else {
        return ws.report_missing_document(json);
    };

    let gh = ws.gh()?;
    let report = sync::push(&gh, &gh, &tasks, &ws.config.labels, dry_run);

    let message = &ws.config.git.push_message;
    let published = if dry_run || no_commit {
        None
    } else {
        ws.publish(message)
    };

    if json {
        print_json(&serde_json::json!({
            "report": report,
            "git": published,
        }))?;
        return Ok(());
    }

    if report.actions.is_empty() {
        println!("No tasks in {}.", ws.document_display());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = report.actions.iter().map(describe).collect();
    print_table(&["ACTION", "ISSUE", "TASK", "DETAIL"], rows);
    println!();

    let prefix = if report.dry_run { "Would push" } else { "Pushed" };
    println!(
        "{prefix}: {} created, {} updated, {} closed",
        report.created(),
        report.updated(),
        report.closed()
    );
    if report.failed() > 0 {
        println!("{} action(s) failed; see the log above.", report.failed());
    }
    print_publish(published, message);
    Ok(())
}

fn describe(applied: &AppliedAction) -> Vec<String> {
    let (action, issue, mut detail) = match &applied.action {
        PushAction::Create {
            labels, subtasks, ..
        } => {
            let mut parts = Vec::new();
            if *subtasks > 0 {
                parts.push(format!("{subtasks} subtasks"));
            }
            if !labels.is_empty() {
                parts.push(format!("labels: {}", labels.join(", ")));
            }
            (
                "create",
                applied.url.clone().unwrap_or_else(|| "-".to_string()),
                parts.join("; "),
            )
        }
        PushAction::Update { number, board, .. } => {
            let detail = match board {
                BoardPlan::NoItem => "not on board".to_string(),
                BoardPlan::Unchanged { status } => status.to_string(),
                BoardPlan::Move { from, to, .. } => format!(
                    "{} → {to}",
                    from.map_or_else(|| "(none)".to_string(), |s| s.to_string())
                ),
            };
            ("update", format!("#{number}"), detail)
        }
        PushAction::Close {
            number, board_item, ..
        } => {
            let detail = if board_item.is_some() {
                "board → Done"
            } else {
                "not on board"
            };
            ("close", format!("#{number}"), detail.to_string())
        }
    };
    if !applied.is_ok() {
        detail = format!("FAILED: {}", applied.errors.join("; "));
    }
    vec![
        action.to_string(),
        issue,
        applied.action.title().to_string(),
        detail,
    ]
}
