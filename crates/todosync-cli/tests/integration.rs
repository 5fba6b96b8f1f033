#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn todosync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("todosync").unwrap();
    cmd.current_dir(dir.path())
        .env("TODOSYNC_ROOT", dir.path())
        .env_remove("TODOSYNC_FILE")
        .env_remove("RUST_LOG");
    cmd
}

const CHECKLIST: &str = "\
# Tasks

## 🎓 Research
### 進行中
- [-] Thesis (2026-10-20)
  - [x] Outline
  - [ ] Draft
- [ ] Reading list (10/14)
### 完了
- [x] Poster (2026-10-01)

## 📅 Daily
<!--
- [ ] Hidden task
-->
- [ ] Laundry
";

fn write_checklist(dir: &TempDir) {
    std::fs::write(dir.path().join("TODO.md"), CHECKLIST).unwrap();
}

// ---------------------------------------------------------------------------
// todosync tasks
// ---------------------------------------------------------------------------

#[test]
fn tasks_lists_parsed_tasks() {
    let dir = TempDir::new().unwrap();
    write_checklist(&dir);
    todosync(&dir)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Thesis"))
        .stdout(predicate::str::contains("In Progress"))
        .stdout(predicate::str::contains("1/2"))
        .stdout(predicate::str::contains("Laundry"))
        .stdout(predicate::str::contains("Hidden task").not());
}

#[test]
fn tasks_json_has_categories_and_deadlines() {
    let dir = TempDir::new().unwrap();
    write_checklist(&dir);
    let output = todosync(&dir).args(["tasks", "--json"]).output().unwrap();
    assert!(output.status.success());
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0]["title"], "Thesis (2026-10-20)");
    assert_eq!(tasks[0]["category"], "🎓 Research");
    assert_eq!(tasks[0]["deadline"], "2026-10-20");
    assert_eq!(tasks[3]["category"], "📅 Daily");
}

#[test]
fn missing_document_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    for sub in ["tasks", "deadlines", "push", "pull"] {
        todosync(&dir)
            .arg(sub)
            .assert()
            .success()
            .stdout(predicate::str::contains("No checklist at TODO.md"));
    }
}

#[test]
fn file_flag_overrides_document() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("notes")).unwrap();
    std::fs::write(dir.path().join("notes/list.md"), "## Work\n- [ ] Report\n").unwrap();
    todosync(&dir)
        .args(["tasks", "--file", "notes/list.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report"));
}

// ---------------------------------------------------------------------------
// todosync deadlines
// ---------------------------------------------------------------------------

#[test]
fn deadlines_report_bands() {
    let dir = TempDir::new().unwrap();
    write_checklist(&dir);
    todosync(&dir)
        .args(["deadlines", "--today", "2026-10-17"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 days overdue"))
        .stdout(predicate::str::contains("in 3 days"))
        .stdout(predicate::str::contains("Poster").not());
}

#[test]
fn deadlines_json_respects_days() {
    let dir = TempDir::new().unwrap();
    write_checklist(&dir);
    let output = todosync(&dir)
        .args(["deadlines", "--today", "2026-10-17", "--days", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let alerts = report["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["severity"], "overdue");
    assert_eq!(alerts[0]["days_until"], -3);
    assert_eq!(report["threshold_days"], 1);
}

#[test]
fn deadlines_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    write_checklist(&dir);
    todosync(&dir)
        .args(["deadlines", "--today", "17/10/2026"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// todosync config
// ---------------------------------------------------------------------------

#[test]
fn config_init_show_validate() {
    let dir = TempDir::new().unwrap();
    todosync(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .todosync/config.yaml"));
    assert!(dir.path().join(".todosync/config.yaml").exists());

    todosync(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    todosync(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status_field_id"))
        .stdout(predicate::str::contains("threshold_days: 7"));

    todosync(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_fails_on_missing_option() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".todosync")).unwrap();
    std::fs::write(
        dir.path().join(".todosync/config.yaml"),
        "board:\n  options:\n    todo: a\n    in_progress: ''\n    done: c\n",
    )
    .unwrap();
    todosync(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_document_setting_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".todosync")).unwrap();
    std::fs::write(dir.path().join(".todosync/config.yaml"), "document: tasks.md\n").unwrap();
    std::fs::write(dir.path().join("tasks.md"), "## Work\n- [ ] Budget\n").unwrap();
    todosync(&dir)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget"));
}

// ---------------------------------------------------------------------------
// push / pull / dashboard against a stand-in `gh`
// ---------------------------------------------------------------------------

#[test]
fn push_without_gh_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    write_checklist(&dir);
    let empty = TempDir::new().unwrap();
    todosync(&dir)
        .env("PATH", empty.path())
        .args(["push", "--no-commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'gh' is not installed"));
}

#[cfg(unix)]
mod fake_gh {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const SCRIPT: &str = r#"#!/bin/sh
case "$1 $2" in
  "issue list") cat "$FAKE_GH_DIR/issues.json" ;;
  "project item-list")
    echo "project item-list" >> "$FAKE_GH_DIR/reads.log"
    cat "$FAKE_GH_DIR/items.json" ;;
  "project list") echo '{"projects":[{"number":1,"id":"PVT_1"}]}' ;;
  "api user") echo someone ;;
  "issue create")
    echo "issue create $4" >> "$FAKE_GH_DIR/calls.log"
    echo "https://github.com/someone/notes/issues/42" ;;
  *) echo "$1 $2 $3" >> "$FAKE_GH_DIR/calls.log" ;;
esac
"#;

    const ISSUES: &str = r#"[
      {"number": 1, "title": "Thesis (2026-10-20)", "body": "- [x] Outline\n- [x] Draft\n", "state": "OPEN"},
      {"number": 2, "title": "Reading list (10/14)", "body": "", "state": "CLOSED"},
      {"number": 3, "title": "Poster (2026-10-01)", "body": "", "state": "OPEN"}
    ]"#;

    const ITEMS: &str = r#"{"items": [
      {"id": "PVTI_1", "title": "Thesis (2026-10-20)", "status": "Todo"},
      {"id": "PVTI_3", "title": "Poster (2026-10-01)", "status": "Done"},
      {"id": "PVTI_9", "title": "Someday", "status": null}
    ]}"#;

    /// Directory holding a `gh` script and its canned responses.
    fn install(dir: &Path) -> String {
        let bin = dir.join("gh");
        std::fs::write(&bin, SCRIPT).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.join("issues.json"), ISSUES).unwrap();
        std::fs::write(dir.join("items.json"), ITEMS).unwrap();
        let path = std::env::var("PATH").unwrap_or_default();
        format!("{}:{path}", dir.display())
    }

    fn calls(dir: &Path) -> String {
        std::fs::read_to_string(dir.join("calls.log")).unwrap_or_default()
    }

    #[test]
    fn push_creates_updates_and_closes() {
        let dir = TempDir::new().unwrap();
        write_checklist(&dir);
        let fake = TempDir::new().unwrap();
        let path = install(fake.path());

        todosync(&dir)
            .env("PATH", &path)
            .env("FAKE_GH_DIR", fake.path())
            .args(["push", "--no-commit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 created, 1 updated, 1 closed"));

        let log = calls(fake.path());
        assert!(log.contains("issue create Reading list (10/14)"));
        assert!(log.contains("issue create Laundry"));
        assert!(log.contains("issue edit 1"));
        assert!(log.contains("issue close 3"));
        assert!(log.contains("project item-edit --project-id"));
    }

    #[test]
    fn push_dry_run_changes_nothing() {
        let dir = TempDir::new().unwrap();
        write_checklist(&dir);
        let fake = TempDir::new().unwrap();
        let path = install(fake.path());

        todosync(&dir)
            .env("PATH", &path)
            .env("FAKE_GH_DIR", fake.path())
            .args(["push", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Would push"));
        assert!(calls(fake.path()).is_empty());
    }

    #[test]
    fn pull_rewrites_marks_and_shows_dashboard() {
        let dir = TempDir::new().unwrap();
        write_checklist(&dir);
        let fake = TempDir::new().unwrap();
        let path = install(fake.path());

        todosync(&dir)
            .env("PATH", &path)
            .env("FAKE_GH_DIR", fake.path())
            .args(["pull", "--no-commit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Fetched 2 open and 1 closed issues"))
            .stdout(predicate::str::contains("Updated 3 line(s)"))
            .stdout(predicate::str::contains("Todo (2)"))
            .stdout(predicate::str::contains("Done (1)"));

        let text = std::fs::read_to_string(dir.path().join("TODO.md")).unwrap();
        assert!(text.contains("- [ ] Thesis (2026-10-20)\n"));
        assert!(text.contains("  - [x] Draft\n"));
        assert!(text.contains("- [x] Reading list (10/14)\n"));
        assert!(text.contains("- [ ] Hidden task\n"));
        let reads = std::fs::read_to_string(fake.path().join("reads.log")).unwrap();
        assert_eq!(reads.matches("project item-list").count(), 1);

        todosync(&dir)
            .env("PATH", &path)
            .env("FAKE_GH_DIR", fake.path())
            .args(["pull", "--no-commit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("is up to date"));
    }

    #[test]
    fn dashboard_json_groups_items() {
        let dir = TempDir::new().unwrap();
        let fake = TempDir::new().unwrap();
        let path = install(fake.path());

        let output = todosync(&dir)
            .env("PATH", &path)
            .env("FAKE_GH_DIR", fake.path())
            .args(["dashboard", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let dash: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let columns = dash["columns"].as_array().unwrap();
        assert_eq!(columns[0]["status"], "Todo");
        assert_eq!(columns[0]["titles"].as_array().unwrap().len(), 2);
        assert_eq!(columns[1]["titles"].as_array().unwrap().len(), 0);
        assert_eq!(columns[2]["titles"][0], "Poster (2026-10-01)");
    }
}
