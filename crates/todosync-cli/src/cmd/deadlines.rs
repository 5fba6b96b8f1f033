use super::Workspace;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use todosync_core::deadline::{check_deadlines, Severity};
use todosync_core::sync::load_tasks;

pub fn run(
    ws: &Workspace,
    days: Option<i64>,
    today: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let threshold = days.unwrap_or(ws.config.deadlines.threshold_days);

    let Some(tasks) =
        load_tasks(&ws.document, today.year()).context("failed to read checklist")?
    else {
        return ws.report_missing_document(json);
    };
    let alerts = check_deadlines(&tasks, today, threshold);

    if json {
        print_json(&serde_json::json!({
            "today": today,
            "threshold_days": threshold,
            "alerts": alerts,
        }))?;
        return Ok(());
    }

    if alerts.is_empty() {
        println!("No deadlines within {threshold} days of {today}.");
        return Ok(());
    }

    let overdue = alerts
        .iter()
        .filter(|a| a.severity == Severity::Overdue)
        .count();
    println!(
        "{} task(s) need attention ({overdue} overdue) as of {today}",
        alerts.len()
    );
    println!();

    let rows: Vec<Vec<String>> = alerts
        .iter()
        .map(|a| {
            vec![
                a.severity.to_string(),
                a.deadline.to_string(),
                a.describe(),
                a.task.name().to_string(),
                a.task.category.clone(),
            ]
        })
        .collect();
    print_table(&["SEVERITY", "DEADLINE", "WHEN", "TASK", "CATEGORY"], rows);
    Ok(())
}
