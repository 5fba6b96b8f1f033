//! Parsing of the markdown checklist document into tasks and subtasks.
//!
//! ```text
//! ## Category                 <- level-2 heading: category
//! ### In Progress             <- level-3 heading: subsection + default status
//! - [-] Write report (due: 3/14)
//!   - [x] Outline
//!   - [ ] Draft
//! <!-- - [ ] ignored example -->
//! ```

use crate::date::parse_date_expr;
use crate::error::{Result, SyncError};
use crate::types::{CheckboxState, TaskStatus};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subtask {
    pub text: String,
    pub checkbox: CheckboxState,
}

impl Subtask {
    pub fn is_completed(&self) -> bool {
        self.checkbox.is_checked()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Full text after the checkbox marker. Join key against remote issues.
    pub title: String,
    pub category: String,
    pub subsection: Option<String>,
    /// Default status implied by the enclosing subsection heading.
    pub section_status: TaskStatus,
    pub checkbox: CheckboxState,
    pub subtasks: Vec<Subtask>,
    pub deadline: Option<NaiveDate>,
    /// 1-based line number of the task in the document.
    pub line: usize,
}

impl Task {
    /// Effective status: the checkbox marker always overrides the section default.
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from(self.checkbox)
    }

    /// Title without its trailing date annotation.
    pub fn name(&self) -> &str {
        if self.deadline.is_none() {
            return &self.title;
        }
        match annotation_re().find(&self.title) {
            Some(m) => self.title[..m.start()].trim_end(),
            None => &self.title,
        }
    }

    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.is_completed()).count()
    }
}

// ---------------------------------------------------------------------------
// Line grammar
// ---------------------------------------------------------------------------

static CHECKBOX_RE: OnceLock<Regex> = OnceLock::new();
static ANNOTATION_RE: OnceLock<Regex> = OnceLock::new();
static KEYWORD_RE: OnceLock<Regex> = OnceLock::new();

fn checkbox_re() -> &'static Regex {
    CHECKBOX_RE.get_or_init(|| Regex::new(r"^- \[([ \-xX])\] (.+)$").unwrap())
}

fn annotation_re() -> &'static Regex {
    ANNOTATION_RE.get_or_init(|| Regex::new(r"\s*[（(]([^（()）]*)[）)]\s*$").unwrap())
}

fn keyword_re() -> &'static Regex {
    KEYWORD_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:deadline|due|scheduled|期限|締切|予定)\s*[:：]?\s*").unwrap()
    })
}

/// A line that matches the checkbox grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistLine<'a> {
    /// Count of leading whitespace characters.
    pub indent: usize,
    pub checkbox: CheckboxState,
    /// Trimmed text after the marker.
    pub text: &'a str,
}

pub fn parse_checklist_line(line: &str) -> Option<ChecklistLine<'_>> {
    let indent = line.chars().take_while(|c| c.is_whitespace()).count();
    let caps = checkbox_re().captures(line.trim())?;
    let mark = caps.get(1)?.as_str().chars().next()?;
    let checkbox = CheckboxState::from_mark(mark)?;
    let text = caps.get(2)?.as_str().trim();
    Some(ChecklistLine {
        indent,
        checkbox,
        text,
    })
}

/// Heading level and text for a `## Heading` style line (already trimmed).
pub fn heading(trimmed: &str) -> Option<(usize, &str)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = trimmed[level..].strip_prefix(' ')?.trim();
    if rest.is_empty() {
        return None;
    }
    Some((level, rest))
}

/// Deadline carried by a trailing parenthetical such as `(due: 3/14 10:00)`.
///
/// Only the first whitespace-delimited token after the optional keyword is
/// interpreted; trailing notes are discarded.
pub fn parse_deadline_annotation(text: &str, reference_year: i32) -> Option<NaiveDate> {
    let caps = annotation_re().captures(text)?;
    let inner = caps.get(1)?.as_str().trim();
    let rest = match keyword_re().find(inner) {
        Some(m) => &inner[m.end()..],
        None => inner,
    };
    let token = rest.split_whitespace().next()?;
    parse_date_expr(token, reference_year)
}

// ---------------------------------------------------------------------------
// Comment spans
// ---------------------------------------------------------------------------

/// Tracks `<!-- ... -->` spans across lines.
///
/// A line that starts inside a span, or whose content starts with `<!--`, is
/// inert. A live line may open a comment after its text: only the part
/// before `<!--` is live, and an unclosed span carries on to later lines.
#[derive(Debug, Default, Clone)]
pub(crate) struct CommentSpan {
    open: bool,
}

impl CommentSpan {
    /// Live part of `line`, or `None` when the whole line is commented out.
    pub(crate) fn live<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        if self.open {
            if line.contains("-->") {
                self.open = false;
            }
            return None;
        }
        let Some(pos) = line.find("<!--") else {
            return Some(line);
        };
        if !line[pos + 4..].contains("-->") {
            self.open = true;
        }
        let before = &line[..pos];
        if before.trim().is_empty() {
            None
        } else {
            Some(before)
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct ScanState {
    category: Option<String>,
    subsection: Option<String>,
    section_status: TaskStatus,
    parent: Option<usize>,
    comments: CommentSpan,
    reference_year: i32,
}

impl ScanState {
    fn new(reference_year: i32) -> Self {
        Self {
            category: None,
            subsection: None,
            section_status: TaskStatus::Todo,
            parent: None,
            comments: CommentSpan::default(),
            reference_year,
        }
    }

    fn step(&mut self, line_no: usize, line: &str, tasks: &mut Vec<Task>) {
        let Some(line) = self.comments.live(line) else {
            return;
        };

        if let Some((level, text)) = heading(line.trim()) {
            match level {
                2 => {
                    self.category = Some(text.to_string());
                    self.subsection = None;
                    self.section_status = TaskStatus::Todo;
                }
                3 => {
                    self.subsection = Some(text.to_string());
                    self.section_status = TaskStatus::from_heading(text);
                }
                _ => {}
            }
            self.parent = None;
            return;
        }

        let Some(item) = parse_checklist_line(line) else {
            return;
        };
        let Some(category) = self.category.as_ref() else {
            return;
        };

        if item.indent == 0 {
            tasks.push(Task {
                title: item.text.to_string(),
                category: category.clone(),
                subsection: self.subsection.clone(),
                section_status: self.section_status,
                checkbox: item.checkbox,
                subtasks: Vec::new(),
                deadline: parse_deadline_annotation(item.text, self.reference_year),
                line: line_no,
            });
            self.parent = Some(tasks.len() - 1);
        } else if item.indent >= 2 {
            if let Some(parent) = self.parent.and_then(|i| tasks.get_mut(i)) {
                parent.subtasks.push(Subtask {
                    text: item.text.to_string(),
                    checkbox: item.checkbox,
                });
            }
        }
    }
}

/// Parse the document into top-level tasks in document order.
///
/// `reference_year` resolves date expressions that omit the year.
pub fn parse_document(text: &str, reference_year: i32) -> Vec<Task> {
    let (_, tasks) = text.lines().enumerate().fold(
        (ScanState::new(reference_year), Vec::new()),
        |(mut state, mut tasks), (idx, line)| {
            state.step(idx + 1, line, &mut tasks);
            (state, tasks)
        },
    );
    tasks
}

/// Read the checklist document, reporting a missing file distinctly.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SyncError::DocumentNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
