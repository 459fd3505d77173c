// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::import::investments::normalize_investments;
use crate::import::transactions::normalize_transactions;
use crate::import::{ImportOutcome, RawRow, read_csv_rows, read_json_rows, read_workbook_rows};
use crate::plans::{self, Quota};
use crate::positions::normalize_ticker;
use crate::store::{
    categorizer, count_transactions_in_month, insert_investment, insert_transaction,
    known_assets, load_investments, load_transactions,
};
use crate::utils::{arg, current_plan, locale_arg, opt_arg, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Csv,
    Json,
    Workbook,
}

fn sheet_format(path: &str, flag: Option<&str>) -> SheetFormat {
    let name = flag
        .map(str::to_ascii_lowercase)
        .or_else(|| {
            Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_default();
    match name.as_str() {
        "json" => SheetFormat::Json,
        "xlsx" | "xlsm" | "xls" | "ods" => SheetFormat::Workbook,
        _ => SheetFormat::Csv,
    }
}

fn read_rows(sub: &clap::ArgMatches) -> Result<Vec<RawRow>> {
    let path = arg(sub, "path")?;
    let format = sheet_format(path, opt_arg(sub, "format"));
    let rows = match format {
        SheetFormat::Workbook => read_workbook_rows(Path::new(path)),
        SheetFormat::Json => {
            read_json_rows(File::open(path).with_context(|| format!("Open {}", path))?)
        }
        SheetFormat::Csv => {
            read_csv_rows(File::open(path).with_context(|| format!("Open {}", path))?)
        }
    }
    .with_context(|| format!("Read rows from {}", path))?;
    tracing::debug!(path, rows = rows.len(), ?format, "spreadsheet loaded");
    Ok(rows)
}

fn print_report<T>(what: &str, outcome: &ImportOutcome<T>, dry_run: bool) {
    let verb = if dry_run { "Would import" } else { "Imported" };
    println!(
        "{} {} {}, ignored {}",
        verb,
        outcome.inserted(),
        what,
        outcome.ignored()
    );
    if !outcome.skipped.is_empty() {
        let rows = outcome
            .skipped
            .iter()
            .map(|s| vec![s.row.to_string(), s.reason.to_string()])
            .collect();
        println!("{}", pretty_table(&["Row", "Reason"], rows));
    }
}

pub fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rows = read_rows(sub)?;
    let locale = locale_arg(conn, sub)?;
    let existing = load_transactions(conn)?;
    let outcome = normalize_transactions(&rows, &existing, &categorizer(conn)?, locale);

    let plan = current_plan(conn)?;
    let mut per_month: BTreeMap<String, usize> = BTreeMap::new();
    for r in &outcome.records {
        *per_month.entry(r.date.format("%Y-%m").to_string()).or_default() += 1;
    }
    for (month, added) in &per_month {
        let stored = count_transactions_in_month(conn, month)?;
        plans::check_total(plan, Quota::TransactionsPerMonth, stored + added)
            .with_context(|| format!("Importing {} transactions into {}", added, month))?;
    }

    let dry_run = sub.get_flag("dry-run");
    if !dry_run {
        let group = opt_arg(sub, "group");
        let tx = conn.transaction()?;
        for record in &outcome.records {
            insert_transaction(&tx, record, group)?;
        }
        tx.commit()?;
    }
    tracing::info!(
        inserted = outcome.inserted(),
        ignored = outcome.ignored(),
        dry_run,
        "transaction import finished"
    );
    print_report("transactions", &outcome, dry_run);
    Ok(())
}

pub fn import_investments(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rows = read_rows(sub)?;
    let locale = locale_arg(conn, sub)?;
    let existing = load_investments(conn)?;
    let outcome = normalize_investments(&rows, &existing, locale);

    let mut assets = known_assets(conn)?;
    let before = assets.len();
    for r in &outcome.records {
        let t = normalize_ticker(&r.ticker);
        if !assets.contains(&t) {
            assets.push(t);
        }
    }
    if assets.len() > before {
        plans::check_total(current_plan(conn)?, Quota::Assets, assets.len())
            .with_context(|| format!("Importing {} new assets", assets.len() - before))?;
    }

    let dry_run = sub.get_flag("dry-run");
    if !dry_run {
        let tx = conn.transaction()?;
        for record in &outcome.records {
            insert_investment(&tx, record, None)?;
        }
        tx.commit()?;
    }
    tracing::info!(
        inserted = outcome.inserted(),
        ignored = outcome.ignored(),
        dry_run,
        "investment import finished"
    );
    print_report("trades", &outcome, dry_run);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_flag_then_extension() {
        assert_eq!(sheet_format("extrato.xlsx", None), SheetFormat::Workbook);
        assert_eq!(sheet_format("EXTRATO.XLS", None), SheetFormat::Workbook);
        assert_eq!(sheet_format("rows.json", None), SheetFormat::Json);
        assert_eq!(sheet_format("extrato.txt", None), SheetFormat::Csv);
        assert_eq!(sheet_format("extrato", Some("xlsx")), SheetFormat::Workbook);
        assert_eq!(sheet_format("rows.json", Some("csv")), SheetFormat::Csv);
    }
}
