// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-by-month projection of income and expense.
//!
//! Scheduled tasks come first. A month with nothing scheduled on one side
//! falls back to the recent per-category averages for that side, and the
//! running balance starts net of what savings goals still need.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::goals::GOALS_CATEGORY;
use crate::models::{ScheduledTask, Transaction, TxKind};
use crate::recurrence::add_months_rolling;

/// How many of the newest transactions feed the averages.
pub const RECENT_WINDOW: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastMonth {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub cumulative: Decimal,
    /// Income came from recent averages, not from scheduled tasks.
    pub income_estimated: bool,
    pub expense_estimated: bool,
}

/// Typical monthly income and expense: the average amount of each category,
/// summed per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Baseline {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Averages over `recent`. Goal contributions are left out, since what goals
/// still need is reserved from the opening balance instead.
pub fn baseline(recent: &[Transaction]) -> Baseline {
    let mut by_category: HashMap<(TxKind, &str), (Decimal, u32)> = HashMap::new();
    for t in recent.iter().filter(|t| t.category != GOALS_CATEGORY) {
        let entry = by_category
            .entry((t.kind, t.category.as_str()))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += t.amount;
        entry.1 += 1;
    }
    let mut out = Baseline::default();
    for ((kind, _), (sum, count)) in by_category {
        let avg = (sum / Decimal::from(count)).round_dp(2);
        match kind {
            TxKind::Income => out.income += avg,
            TxKind::Expense => out.expense += avg,
        }
    }
    out
}

fn month_index(d: NaiveDate) -> i64 {
    i64::from(d.year()) * 12 + i64::from(d.month0())
}

/// Project `months` months starting with the month containing `from`.
///
/// Open tasks with a non-zero value land in every month one of their
/// occurrences falls in; recurring tasks are expanded with the same
/// recurrence rules used when a task is completed. Completed tasks are
/// history, not forecast, and are left out. `reserved` is subtracted from
/// `opening` before the first month.
pub fn forecast(
    tasks: &[ScheduledTask],
    typical: Baseline,
    from: NaiveDate,
    months: u32,
    opening: Decimal,
    reserved: Decimal,
) -> Vec<ForecastMonth> {
    let Some(first) = from.with_day(1) else {
        return Vec::new();
    };
    let window_start = first.and_time(NaiveTime::MIN);
    let Some(window_end) = add_months_rolling(window_start, i64::from(months))
        .and_then(|end| end.checked_sub_signed(Duration::seconds(1)))
    else {
        return Vec::new();
    };

    let mut income = vec![Decimal::ZERO; months as usize];
    let mut expense = vec![Decimal::ZERO; months as usize];
    let base = month_index(first);

    let mut place = |at: NaiveDateTime, value: Decimal| {
        let idx = (month_index(at.date()) - base) as usize;
        if value > Decimal::ZERO {
            income[idx] += value;
        } else {
            expense[idx] += -value;
        }
    };

    for task in tasks.iter().filter(|t| !t.is_completed) {
        let Some(value) = task.value.filter(|v| !v.is_zero()) else {
            continue;
        };
        match &task.recurrence {
            Some(rule) => rule
                .occurrences(task.schedule_date, window_end)
                .filter(|at| *at >= window_start)
                .for_each(|at| place(at, value)),
            None => {
                let at = task.schedule_date;
                if at >= window_start && at <= window_end {
                    place(at, value);
                }
            }
        }
    }

    let mut cumulative = opening - reserved;
    (0..months as usize)
        .map(|i| {
            let month_start = add_months_rolling(window_start, i as i64).unwrap_or(window_start);
            let income_estimated = income[i].is_zero() && !typical.income.is_zero();
            let expense_estimated = expense[i].is_zero() && !typical.expense.is_zero();
            let month_income = if income_estimated { typical.income } else { income[i] };
            let month_expense = if expense_estimated { typical.expense } else { expense[i] };
            let balance = month_income - month_expense;
            cumulative += balance;
            ForecastMonth {
                month: month_start.format("%Y-%m").to_string(),
                income: month_income,
                expense: month_expense,
                balance,
                cumulative,
                income_estimated,
                expense_estimated,
            }
        })
        .collect()
}
