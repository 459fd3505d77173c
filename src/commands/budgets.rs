// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{UNBUCKETED, group_expenses_by_bucket};
use crate::models::TxKind;
use crate::store::{TxFilter, query_transactions};
use crate::utils::{arg, fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("report", sub)) => report(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BucketLine {
    pub bucket: String,
    pub percentage: Option<u32>,
    pub planned: Option<Decimal>,
    pub spent: Decimal,
    pub remaining: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct BudgetReport {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub lines: Vec<BucketLine>,
}

pub fn build_report(conn: &Connection, month: &str) -> Result<BudgetReport> {
    let filter = TxFilter {
        month: Some(month.to_string()),
        ..TxFilter::default()
    };
    let txs = query_transactions(conn, &filter)?;
    let income: Decimal = txs
        .iter()
        .filter(|t| t.kind == TxKind::Income)
        .map(|t| t.amount)
        .sum();
    let expenses: Vec<(&str, Decimal)> = txs
        .iter()
        .filter(|t| t.kind == TxKind::Expense)
        .map(|t| (t.category.as_str(), t.amount))
        .collect();
    let spent_total: Decimal = expenses.iter().map(|(_, a)| *a).sum();
    let totals = group_expenses_by_bucket(expenses);

    let mut lines: Vec<BucketLine> = totals
        .buckets
        .iter()
        .map(|(bucket, spent)| {
            let planned = bucket.planned(income);
            BucketLine {
                bucket: bucket.name().to_string(),
                percentage: Some(bucket.default_percentage()),
                planned: Some(planned),
                spent: *spent,
                remaining: Some(planned - *spent),
            }
        })
        .collect();
    if let Some(rest) = totals.unbucketed {
        lines.push(BucketLine {
            bucket: UNBUCKETED.to_string(),
            percentage: None,
            planned: None,
            spent: rest,
            remaining: None,
        });
    }
    Ok(BudgetReport {
        month: month.to_string(),
        income,
        expenses: spent_total,
        lines,
    })
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(arg(sub, "month")?)?;
    let report = build_report(conn, &month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let dash = || String::from("-");
    let rows = report
        .lines
        .iter()
        .map(|l| {
            vec![
                l.bucket.clone(),
                l.percentage.map(|p| format!("{}%", p)).unwrap_or_else(dash),
                l.planned.map(|p| fmt_money(&p)).unwrap_or_else(dash),
                fmt_money(&l.spent),
                l.remaining.map(|r| fmt_money(&r)).unwrap_or_else(dash),
            ]
        })
        .collect();
    println!(
        "Budget {}: income {}, expenses {}",
        report.month,
        fmt_money(&report.income),
        fmt_money(&report.expenses)
    );
    println!(
        "{}",
        pretty_table(&["Bucket", "Share", "Planned", "Spent", "Remaining"], rows)
    );
    Ok(())
}
