use super::{print_publish, Workspace};
use crate::cmd::dashboard::print_dashboard;
use crate::output::print_json;
use anyhow::Context;
use todosync_core::dashboard::Dashboard;
use todosync_core::sync;

pub fn run(ws: &Workspace, dry_run: bool, no_commit: bool, json: bool) -> anyhow::Result<()> {
    if !ws.document.exists() {
        return ws.report_missing_document(json);
    }
    let gh = ws.gh()?;
    let Some(report) = sync::pull(&gh, &gh, &ws.document, dry_run)
        .with_context(|| format!("failed to update {}", ws.document_display()))?
    else {
        return ws.report_missing_document(json);
    };

    let message = &ws.config.git.pull_message;
    let published = if report.written && !no_commit {
        ws.publish(message)
    } else {
        None
    };

    let dashboard = Dashboard::from_items(&report.items);

    if json {
        print_json(&serde_json::json!({
            "report": report,
            "git": published,
            "dashboard": dashboard,
        }))?;
        return Ok(());
    }

    println!(
        "Fetched {} open and {} closed issues, {} board items",
        report.open_issues, report.closed_issues, report.board_items
    );
    if report.changes.is_empty() {
        println!("{} is up to date.", ws.document_display());
    } else {
        let verb = if report.dry_run { "Would update" } else { "Updated" };
        println!("{verb} {} line(s):", report.changes.len());
        for change in &report.changes {
            println!("  L{}: {change}", change.line);
        }
    }
    print_publish(published, message);

    println!();
    print_dashboard(&dashboard);
    Ok(())
}
