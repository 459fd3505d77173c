// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::filter_from_args;
use crate::store::query_transactions;
use crate::utils::arg;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;

/// Header names the importer reads back.
const HEADERS: [&str; 7] = ["id", "date", "description", "category", "amount", "type", "group"];

pub fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;
    let mut filter = filter_from_args(sub)?;
    filter.newest_first = false;
    let data = query_transactions(conn, &filter)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(HEADERS)?;
            for t in &data {
                wtr.write_record([
                    t.external_id.clone().unwrap_or_default(),
                    t.date.to_string(),
                    t.description.clone().unwrap_or_default(),
                    t.category.clone(),
                    t.amount.to_string(),
                    t.kind.to_string(),
                    t.group_id.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = data
                .iter()
                .map(|t| {
                    json!({
                        "id": t.external_id,
                        "date": t.date.to_string(),
                        "description": t.description,
                        "category": t.category,
                        "amount": t.amount.to_string(),
                        "type": t.kind,
                        "group": t.group_id,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(rows = data.len(), format = %fmt, out, "transactions exported");
    println!("Exported {} transactions to {}", data.len(), out);
    Ok(())
}
