// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::importer;
use crate::models::{InvestmentTransaction, Side};
use crate::plans::{self, Quota};
use crate::positions::{Position, calculate_positions, normalize_ticker, quantity_at_date};
use crate::store::{insert_investment, known_assets, load_investments};
use crate::utils::{
    arg, current_plan, maybe_print_json, opt_arg, parse_date, parse_decimal, pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::warn;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("buy", sub)) => record_trade(conn, sub, Side::Buy)?,
        Some(("sell", sub)) => record_trade(conn, sub, Side::Sell)?,
        Some(("positions", sub)) => positions(conn, sub)?,
        Some(("import", sub)) => importer::import_investments(conn, sub)?,
        Some(("quantity-at", sub)) => {
            let ticker = arg(sub, "ticker")?;
            let date = parse_date(arg(sub, "date")?)?;
            let qty = quantity_at_date(&load_investments(conn)?, ticker, date);
            println!("{} held on {}: {}", normalize_ticker(ticker), date, qty.normalize());
        }
        _ => {}
    }
    Ok(())
}

pub fn record_trade(conn: &Connection, sub: &clap::ArgMatches, side: Side) -> Result<()> {
    let date = parse_date(arg(sub, "date")?)?;
    let ticker = arg(sub, "ticker")?.to_uppercase();
    let quantity = parse_decimal(arg(sub, "quantity")?)?;
    let price = parse_decimal(arg(sub, "price")?)?;
    let fees = match opt_arg(sub, "fees") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    if quantity <= Decimal::ZERO {
        bail!("Quantity must be positive, got {}", quantity);
    }
    if price < Decimal::ZERO || fees < Decimal::ZERO {
        bail!("Price and fees must not be negative");
    }

    let history = load_investments(conn)?;
    let key = normalize_ticker(&ticker);
    let previous = history
        .iter()
        .rev()
        .find(|t| normalize_ticker(&t.ticker) == key);

    match side {
        Side::Buy => {
            let assets = known_assets(conn)?;
            if !assets.contains(&key) {
                plans::check(current_plan(conn)?, Quota::Assets, assets.len())?;
            }
        }
        Side::Sell => {
            let held = quantity_at_date(&history, &ticker, date);
            if quantity > held {
                warn!(ticker = %key, %quantity, %held, "selling more than held");
                eprintln!(
                    "Warning: selling {} {} but only {} held on {}; positions clamp the excess",
                    quantity, key, held, date
                );
            }
        }
    }

    let trade = InvestmentTransaction {
        asset_name: opt_arg(sub, "name")
            .map(str::to_string)
            .or_else(|| previous.map(|p| p.asset_name.clone()))
            .unwrap_or_else(|| ticker.clone()),
        asset_type: opt_arg(sub, "asset-type")
            .map(str::to_uppercase)
            .or_else(|| previous.map(|p| p.asset_type.clone()))
            .unwrap_or_else(|| String::from("STOCK")),
        ticker,
        side,
        quantity,
        price,
        fees,
        date,
    };
    insert_investment(conn, &trade, opt_arg(sub, "note"))?;
    println!(
        "Recorded {} {} x {} @ {} (fees {})",
        side, trade.quantity, trade.ticker, trade.price, trade.fees
    );
    Ok(())
}

fn positions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let positions: Vec<Position> = calculate_positions(&load_investments(conn)?);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &positions)? {
        return Ok(());
    }
    let total: Decimal = positions.iter().map(|p| p.total_cost).sum();
    let rows = positions
        .into_iter()
        .map(|p| {
            vec![
                p.ticker,
                p.asset_name,
                p.asset_type,
                format!("{:.4}", p.quantity),
                format!("{:.2}", p.average_price),
                format!("{:.2}", p.total_cost),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Ticker", "Name", "Type", "Qty", "Avg price", "Cost"], rows)
    );
    println!("Total invested: {:.2}", total);
    Ok(())
}
