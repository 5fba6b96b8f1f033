use super::Workspace;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Datelike;
use todosync_core::reconcile::target_status;
use todosync_core::sync::load_tasks;

pub fn run(ws: &Workspace, json: bool) -> anyhow::Result<()> {
    let year = chrono::Local::now().year();
    let Some(tasks) = load_tasks(&ws.document, year).context("failed to read checklist")? else {
        return ws.report_missing_document(json);
    };

    if json {
        print_json(&tasks)?;
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks in {}.", ws.document_display());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            let subtasks = if t.subtasks.is_empty() {
                String::new()
            } else {
                format!("{}/{}", t.completed_subtasks(), t.subtasks.len())
            };
            vec![
                t.line.to_string(),
                format!("[{}]", t.checkbox.mark()),
                target_status(t).to_string(),
                t.category.clone(),
                t.name().to_string(),
                subtasks,
                t.deadline.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    print_table(
        &["LINE", "MARK", "BOARD", "CATEGORY", "TASK", "SUBTASKS", "DEADLINE"],
        rows,
    );
    Ok(())
}
