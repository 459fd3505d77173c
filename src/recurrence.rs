// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Next-occurrence computation for recurring scheduled tasks.
//!
//! Every path that completes a task goes through [`next_occurrence`], so the
//! date arithmetic lives in exactly one place.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::{ScheduledTask, TaskDraft};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown recurrence pattern '{0}', expected daily|weekly|monthly|yearly")]
pub struct PatternError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Monthly => "monthly",
            RecurrencePattern::Yearly => "yearly",
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrencePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "diario" | "diário" => Ok(RecurrencePattern::Daily),
            "weekly" | "semanal" => Ok(RecurrencePattern::Weekly),
            "monthly" | "mensal" => Ok(RecurrencePattern::Monthly),
            "yearly" | "anual" => Ok(RecurrencePattern::Yearly),
            other => Err(PatternError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
}

impl Recurrence {
    /// An interval of zero is read as one.
    pub fn new(pattern: RecurrencePattern, interval: u32, end_date: Option<NaiveDate>) -> Self {
        Recurrence {
            pattern,
            interval: interval.max(1),
            end_date,
        }
    }

    /// Shift `from` by one step of this recurrence. Returns `None` only when
    /// the result leaves chrono's representable range.
    pub fn advance(&self, from: NaiveDateTime) -> Option<NaiveDateTime> {
        let n = i64::from(self.interval.max(1));
        match self.pattern {
            RecurrencePattern::Daily => from.checked_add_signed(Duration::days(n)),
            RecurrencePattern::Weekly => from.checked_add_signed(Duration::days(7 * n)),
            RecurrencePattern::Monthly => add_months_rolling(from, n),
            RecurrencePattern::Yearly => add_months_rolling(from, 12 * n),
        }
    }

    /// Whether an occurrence on `at` is still inside the recurrence window.
    pub fn allows(&self, at: NaiveDateTime) -> bool {
        match self.end_date {
            None => true,
            Some(end) => at.date() <= end,
        }
    }

    /// Occurrences starting at `start` (inclusive), bounded by the end date
    /// and by `until` (inclusive).
    pub fn occurrences(&self, start: NaiveDateTime, until: NaiveDateTime) -> Occurrences<'_> {
        Occurrences {
            rule: self,
            next: Some(start),
            until,
        }
    }
}

pub struct Occurrences<'a> {
    rule: &'a Recurrence,
    next: Option<NaiveDateTime>,
    until: NaiveDateTime,
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        if current > self.until || !self.rule.allows(current) {
            self.next = None;
            return None;
        }
        self.next = self.rule.advance(current);
        Some(current)
    }
}

/// Add calendar months keeping the day-of-month and letting it spill into the
/// following month when the target month is shorter: Jan 31 + 1 month is
/// Mar 3 (Mar 2 in leap years), Feb 29 + 12 months is Mar 1.
pub fn add_months_rolling(from: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let date = from.date();
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let day = first.checked_add_days(Days::new(u64::from(date.day() - 1)))?;
    Some(day.and_time(from.time()))
}

/// The next instance of a recurring task, or `None` when the task does not
/// recur or the next date falls after the recurrence end date.
///
/// The draft points back at the head of the lineage: the original's own
/// parent when it has one, otherwise the original itself.
pub fn next_occurrence(task: &ScheduledTask) -> Option<TaskDraft> {
    let rule = task.recurrence.as_ref()?;
    let next = rule.advance(task.schedule_date)?;
    if !rule.allows(next) {
        debug!(task_id = task.id, next = %next, "recurrence window closed");
        return None;
    }
    Some(TaskDraft {
        title: task.title.clone(),
        description: task.description.clone(),
        value: task.value,
        category: task.category.clone(),
        schedule_date: next,
        recurrence: Some(rule.clone()),
        is_completed: false,
        parent_task_id: task.parent_task_id.or(Some(task.id)),
        group_id: task.group_id.clone(),
    })
}
