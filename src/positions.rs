// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Weighted-average cost positions derived from investment transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{InvestmentTransaction, Side};

/// Exchange suffix stripped before grouping (B3 tickers are often stored as `PETR4.SA`).
const TICKER_SUFFIXES: &[&str] = &[".SA"];

/// Positions at or below this quantity count as closed.
pub const QUANTITY_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub ticker: String,
    pub asset_name: String,
    pub asset_type: String,
    pub quantity: Decimal,
    pub total_cost: Decimal,
    pub average_price: Decimal,
}

pub fn normalize_ticker(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    for suffix in TICKER_SUFFIXES {
        if let Some(stripped) = upper.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    upper
}

/// Fold the full transaction history into open positions, one per ticker,
/// ordered by ticker.
///
/// A sale removes cost at the average price held at the moment of the sale,
/// so selling never changes the average cost of what remains. Sales larger
/// than the held quantity only remove what is held.
pub fn calculate_positions(transactions: &[InvestmentTransaction]) -> Vec<Position> {
    let mut by_ticker: BTreeMap<String, Vec<&InvestmentTransaction>> = BTreeMap::new();
    for t in transactions {
        by_ticker.entry(normalize_ticker(&t.ticker)).or_default().push(t);
    }

    let mut positions = Vec::new();
    for (ticker, mut txs) in by_ticker {
        txs.sort_by_key(|t| t.date);

        let mut held = Decimal::ZERO;
        let mut cost = Decimal::ZERO;
        let mut asset_name = ticker.clone();
        let mut asset_type = String::from("OTHER");

        for t in txs {
            if !t.asset_name.trim().is_empty() {
                asset_name = t.asset_name.trim().to_string();
            }
            if !t.asset_type.trim().is_empty() {
                asset_type = t.asset_type.trim().to_string();
            }
            match t.side {
                Side::Buy => {
                    cost += t.quantity * t.price + t.fees;
                    held += t.quantity;
                }
                Side::Sell => {
                    if held <= Decimal::ZERO {
                        warn!(ticker = %ticker, date = %t.date, quantity = %t.quantity, "sell with nothing held");
                        continue;
                    }
                    let sold = if t.quantity > held {
                        warn!(
                            ticker = %ticker,
                            date = %t.date,
                            quantity = %t.quantity,
                            held = %held,
                            "sell exceeds held quantity, clamping"
                        );
                        held
                    } else {
                        t.quantity
                    };
                    let average = cost / held;
                    held -= sold;
                    cost = if held.is_zero() { Decimal::ZERO } else { average * held };
                }
            }
        }

        if held > QUANTITY_EPSILON {
            positions.push(Position {
                average_price: cost / held,
                ticker,
                asset_name,
                asset_type,
                quantity: held,
                total_cost: cost,
            });
        }
    }
    positions
}

/// Net quantity of `ticker` held at the end of `date`, never below zero.
/// Tickers are compared without exchange suffix or case.
pub fn quantity_at_date(
    transactions: &[InvestmentTransaction],
    ticker: &str,
    date: NaiveDate,
) -> Decimal {
    let wanted = normalize_ticker(ticker);
    let quantity = transactions
        .iter()
        .filter(|t| t.date <= date && normalize_ticker(&t.ticker) == wanted)
        .fold(Decimal::ZERO, |acc, t| match t.side {
            Side::Buy => acc + t.quantity,
            Side::Sell => acc - t.quantity,
        });
    quantity.max(Decimal::ZERO)
}
