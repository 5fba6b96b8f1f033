use crate::document::Task;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_THRESHOLD_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Overdue,
    DueToday,
    Upcoming,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Overdue => "overdue",
            Severity::DueToday => "due_today",
            Severity::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadlineAlert<'a> {
    pub task: &'a Task,
    pub deadline: NaiveDate,
    /// Signed whole days from `today` to the deadline.
    pub days_until: i64,
    pub severity: Severity,
}

impl DeadlineAlert<'_> {
    /// Short human description, e.g. "3 days overdue" or "in 2 days".
    pub fn describe(&self) -> String {
        match self.severity {
            Severity::Overdue => match -self.days_until {
                1 => "1 day overdue".to_string(),
                n => format!("{n} days overdue"),
            },
            Severity::DueToday => "due today".to_string(),
            Severity::Upcoming => match self.days_until {
                1 => "in 1 day".to_string(),
                n => format!("in {n} days"),
            },
        }
    }
}

/// Tasks whose deadline is past, today, or within `threshold_days`, most
/// overdue first. Completed tasks and tasks without a deadline are skipped.
pub fn check_deadlines(tasks: &[Task], today: NaiveDate, threshold_days: i64) -> Vec<DeadlineAlert<'_>> {
    let mut alerts: Vec<DeadlineAlert> = tasks
        .iter()
        .filter(|t| !t.checkbox.is_checked())
        .filter_map(|task| {
            let deadline = task.deadline?;
            let days_until = (deadline - today).num_days();
            let severity = match days_until {
                d if d < 0 => Severity::Overdue,
                0 => Severity::DueToday,
                d if d <= threshold_days => Severity::Upcoming,
                _ => return None,
            };
            Some(DeadlineAlert {
                task,
                deadline,
                days_until,
                severity,
            })
        })
        .collect();
    alerts.sort_by_key(|a| a.days_until);
    alerts
}
