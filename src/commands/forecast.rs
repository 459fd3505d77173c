// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::forecast::{ForecastMonth, RECENT_WINDOW, baseline, forecast};
use crate::goals::remaining_total;
use crate::plans::{self, Quota};
use crate::store::{TxFilter, load_goals, load_tasks, query_transactions};
use crate::utils::{
    current_plan, fmt_money, maybe_print_json, month_start, opt_arg, parse_decimal, pretty_table,
};
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn project(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ForecastMonth>> {
    let months = sub.get_one::<u32>("months").copied().unwrap_or(3);
    plans::check_total(current_plan(conn)?, Quota::ForecastMonths, months as usize)?;
    let from = match opt_arg(sub, "from") {
        Some(m) => month_start(m)?,
        None => Local::now().date_naive(),
    };
    let opening = match opt_arg(sub, "opening") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let tasks = load_tasks(conn, false)?;
    let recent = query_transactions(
        conn,
        &TxFilter {
            limit: Some(RECENT_WINDOW),
            newest_first: true,
            ..TxFilter::default()
        },
    )?;
    let reserved = remaining_total(&load_goals(conn)?);
    tracing::debug!(tasks = tasks.len(), recent = recent.len(), %reserved, "forecast inputs");
    Ok(forecast(&tasks, baseline(&recent), from, months, opening, reserved))
}

fn estimated(amount: &Decimal, from_average: bool) -> String {
    if from_average {
        format!("{} *", fmt_money(amount))
    } else {
        fmt_money(amount)
    }
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = project(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                estimated(&m.income, m.income_estimated),
                estimated(&m.expense, m.expense_estimated),
                fmt_money(&m.balance),
                fmt_money(&m.cumulative),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Balance", "Cumulative"], rows)
    );
    if data.iter().any(|m| m.income_estimated || m.expense_estimated) {
        println!("* average of recent transactions, nothing scheduled");
    }
    Ok(())
}
