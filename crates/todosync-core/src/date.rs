//! Normalisation of loosely written deadline expressions into calendar dates.
//!
//! Recognised forms, tried in order:
//!
//! | input        | result                                 |
//! |--------------|----------------------------------------|
//! | `2026-03-01` | that date                              |
//! | `2/14・15`   | Feb 15 of the reference year (last day)|
//! | `2/14`       | Feb 14 of the reference year           |
//! | `3月末`, `3月中` | last day of March                  |
//! | `4月以降`, `4月から` | first day of April             |
//!
//! A number must end where its field ends (`2026-03-011` is rejected), but
//! non-digit text after a recognised form is ignored, so `3/14頃` is Mar 14.
//! Anything else yields `None`; callers treat that as "no deadline".

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

static ISO_RE: OnceLock<Regex> = OnceLock::new();
static RANGE_RE: OnceLock<Regex> = OnceLock::new();
static SLASH_RE: OnceLock<Regex> = OnceLock::new();
static MONTH_END_RE: OnceLock<Regex> = OnceLock::new();
static MONTH_FROM_RE: OnceLock<Regex> = OnceLock::new();

fn iso_re() -> &'static Regex {
    ISO_RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:$|\D)").unwrap())
}

fn range_re() -> &'static Regex {
    RANGE_RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})[・·\-](\d{1,2})(?:$|\D)").unwrap())
}

fn slash_re() -> &'static Regex {
    SLASH_RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})(?:$|\D)").unwrap())
}

fn month_end_re() -> &'static Regex {
    MONTH_END_RE.get_or_init(|| Regex::new(r"^(\d{1,2})月(?:末|中)").unwrap())
}

fn month_from_re() -> &'static Regex {
    MONTH_FROM_RE.get_or_init(|| Regex::new(r"^(\d{1,2})月(?:以降|から)").unwrap())
}

/// Parse a date expression relative to `reference_year`.
pub fn parse_date_expr(text: &str, reference_year: i32) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = iso_re().captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = range_re().captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let last_day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(reference_year, month, last_day);
    }

    if let Some(caps) = slash_re().captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(reference_year, month, day);
    }

    if let Some(caps) = month_end_re().captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        return last_day_of_month(reference_year, month);
    }

    if let Some(caps) = month_from_re().captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(reference_year, month, 1);
    }

    None
}

/// Last calendar day of `month` in `year`, or `None` for an invalid month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next_month.pred_opt()
}
