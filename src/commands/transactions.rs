// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{exporter, importer};
use crate::models::{NewTransaction, Transaction, TxKind};
use crate::plans::{self, Quota};
use crate::store::{
    Scope, TxFilter, categorizer, count_transactions_in_month, insert_transaction,
    query_transactions,
};
use crate::utils::{
    arg, current_plan, maybe_print_json, opt_arg, parse_date, parse_decimal, parse_month,
    pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("import", sub)) => importer::import_transactions(conn, sub)?,
        Some(("export", sub)) => exporter::export_transactions(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(arg(sub, "date")?)?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    if amount.is_zero() {
        bail!("Amount must not be zero");
    }
    let kind: TxKind = arg(sub, "type")?.parse()?;
    let description = opt_arg(sub, "description").map(str::to_string);
    let category = match opt_arg(sub, "category") {
        Some(c) => c.to_string(),
        None => categorizer(conn)?
            .categorize_or_default(description.as_deref().unwrap_or(""), kind)
            .to_string(),
    };

    let month = date.format("%Y-%m").to_string();
    let plan = current_plan(conn)?;
    plans::check(plan, Quota::TransactionsPerMonth, count_transactions_in_month(conn, &month)?)?;

    let record = NewTransaction {
        external_id: None,
        date,
        description,
        category,
        amount: amount.abs(),
        kind,
    };
    let id = insert_transaction(conn, &record, opt_arg(sub, "group"))?;
    tracing::info!(id, %date, category = %record.category, "transaction recorded");
    println!(
        "Recorded {} {} on {} in '{}'",
        record.kind, record.amount, record.date, record.category
    );
    Ok(())
}

pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<TxFilter> {
    Ok(TxFilter {
        month: opt_arg(sub, "month").map(parse_month).transpose()?,
        category: opt_arg(sub, "category").map(str::to_string),
        scope: opt_arg(sub, "scope")
            .map(str::parse::<Scope>)
            .transpose()?
            .unwrap_or_default(),
        limit: sub.try_get_one::<usize>("limit").ok().flatten().copied(),
        newest_first: true,
    })
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub group: String,
}

impl From<Transaction> for TransactionRow {
    fn from(t: Transaction) -> Self {
        TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            description: t.description.unwrap_or_default(),
            category: t.category,
            amount: t.amount.to_string(),
            kind: t.kind,
            group: t.group_id.unwrap_or_default(),
        }
    }
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = filter_from_args(sub)?;
    Ok(query_transactions(conn, &filter)?
        .into_iter()
        .map(TransactionRow::from)
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.description.clone(),
                    r.category.clone(),
                    r.kind.to_string(),
                    r.amount.clone(),
                    r.group.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Description", "Category", "Type", "Amount", "Group"],
                rows,
            )
        );
    }
    Ok(())
}
