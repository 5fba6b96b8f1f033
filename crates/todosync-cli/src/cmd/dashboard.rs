use super::Workspace;
use crate::output::print_json;
use anyhow::Context;
use todosync_core::dashboard::Dashboard;
use todosync_core::remote::ProjectBoard;

pub fn run(ws: &Workspace, json: bool) -> anyhow::Result<()> {
    let gh = ws.gh()?;
    let items = gh.list_items().context("failed to list project items")?;
    let dashboard = Dashboard::from_items(&items);
    if json {
        print_json(&dashboard)?;
    } else {
        print_dashboard(&dashboard);
    }
    Ok(())
}

pub fn print_dashboard(dashboard: &Dashboard) {
    println!("Project board ({} items)", dashboard.total());
    for column in &dashboard.columns {
        println!();
        println!("{} ({})", column.status, column.titles.len());
        for title in &column.titles {
            println!("  - {title}");
        }
    }
}
