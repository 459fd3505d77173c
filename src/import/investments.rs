// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::parse::{NumberLocale, amount_from_cell, date_from_cell, parse_side_label};
use super::{Cell, ImportOutcome, RawRow, RowError, columns};
use crate::models::{InvestmentTransaction, Side};

type TradeKey = (String, NaiveDate, Side, Decimal, Decimal);

fn trade_key(t: &InvestmentTransaction) -> TradeKey {
    (
        t.ticker.trim().to_uppercase(),
        t.date,
        t.side,
        t.quantity.normalize(),
        t.price.normalize(),
    )
}

/// Map spreadsheet rows to investment transactions. Rows need a ticker, a
/// date, a positive quantity and a positive price; trades already stored
/// with the same ticker, date, side, quantity and price are skipped. Equal
/// rows within the batch are separate trades and are all kept.
pub fn normalize_investments(
    rows: &[RawRow],
    existing: &[InvestmentTransaction],
    locale: NumberLocale,
) -> ImportOutcome<InvestmentTransaction> {
    let stored: HashSet<TradeKey> = existing.iter().map(trade_key).collect();
    let mut outcome = ImportOutcome::default();
    for (idx, row) in rows.iter().enumerate() {
        match normalize_row(row, locale) {
            Err(reason) => outcome.skip(idx + 1, reason),
            Ok(trade) => {
                if stored.contains(&trade_key(&trade)) {
                    outcome.skip(idx + 1, RowError::Duplicate);
                } else {
                    outcome.records.push(trade);
                }
            }
        }
    }
    tracing::info!(
        inserted = outcome.inserted(),
        ignored = outcome.ignored(),
        "normalized investment rows"
    );
    outcome
}

fn positive(
    cell: Option<&Cell>,
    locale: NumberLocale,
    err: fn(String) -> RowError,
) -> Result<Decimal, RowError> {
    let cell = cell.ok_or_else(|| err(String::new()))?;
    match amount_from_cell(cell, locale) {
        Some(v) if v > Decimal::ZERO => Ok(v),
        _ => Err(err(cell.as_text().unwrap_or_default())),
    }
}

fn normalize_row(row: &RawRow, locale: NumberLocale) -> Result<InvestmentTransaction, RowError> {
    let ticker = row
        .text(columns::TICKER)
        .map(|t| t.to_uppercase())
        .ok_or(RowError::MissingTicker)?;
    let date_cell = row.field(columns::DATE).ok_or(RowError::MissingDate)?;
    let date = date_from_cell(date_cell)
        .ok_or_else(|| RowError::InvalidDate(date_cell.as_text().unwrap_or_default()))?;

    let quantity = positive(row.field(columns::QUANTITY), locale, RowError::InvalidQuantity)?;
    let price = positive(row.field(columns::PRICE), locale, RowError::InvalidPrice)?;
    let fees = match row.field(columns::FEES) {
        None => Decimal::ZERO,
        Some(cell) => match amount_from_cell(cell, locale) {
            Some(v) if v >= Decimal::ZERO => v,
            _ => return Err(RowError::InvalidFees(cell.as_text().unwrap_or_default())),
        },
    };

    let side = row
        .text(columns::SIDE)
        .and_then(|s| parse_side_label(&s))
        .unwrap_or(Side::Buy);
    let asset_name = row.text(columns::ASSET_NAME).unwrap_or_else(|| ticker.clone());
    let asset_type = row
        .text(columns::ASSET_TYPE)
        .map(|t| t.to_uppercase())
        .unwrap_or_else(|| String::from("STOCK"));

    Ok(InvestmentTransaction {
        ticker,
        asset_name,
        asset_type,
        side,
        quantity,
        price,
        fees,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .fold(RawRow::new(), |r, (h, v)| r.with(h, Cell::text(v)))
    }

    #[test]
    fn template_rows_import() {
        let rows = [
            row(&[
                ("ticker", "petr4"),
                ("asset_name", "Petrobras PN"),
                ("asset_type", "stock"),
                ("transaction_date", "2024-01-15"),
                ("transaction_type", "buy"),
                ("quantity", "100"),
                ("price", "35.50"),
                ("fees", "5.00"),
            ]),
            row(&[
                ("Código", "HGLG11"),
                ("Tipo_Ativo", "fii"),
                ("Data", "01/02/2024"),
                ("Tipo", "Compra"),
                ("Quantidade", "10"),
                ("Preço", "165,00"),
            ]),
        ];
        let out = normalize_investments(&rows, &[], NumberLocale::Auto);
        assert_eq!(out.inserted(), 2);
        let first = &out.records[0];
        assert_eq!(first.ticker, "PETR4");
        assert_eq!(first.asset_type, "STOCK");
        assert_eq!(first.fees, d("5"));
        let second = &out.records[1];
        assert_eq!(second.asset_name, "HGLG11");
        assert_eq!(second.asset_type, "FII");
        assert_eq!(second.side, Side::Buy);
        assert_eq!(second.price, d("165"));
        assert_eq!(second.fees, Decimal::ZERO);
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn invalid_rows_are_reported() {
        let rows = [
            row(&[("data", "2024-01-01"), ("quantity", "1"), ("price", "1")]),
            row(&[("ticker", "A"), ("data", "2024-01-01"), ("quantity", "0"), ("price", "1")]),
            row(&[("ticker", "A"), ("data", "2024-01-01"), ("quantity", "1"), ("price", "-2")]),
            row(&[("ticker", "A"), ("quantity", "1"), ("price", "2")]),
            row(&[("ticker", "A"), ("data", "2024-01-01"), ("quantity", "1"), ("price", "2"), ("taxas", "x")]),
        ];
        let out = normalize_investments(&rows, &[], NumberLocale::Auto);
        assert_eq!(out.inserted(), 0);
        let reasons: Vec<_> = out.skipped.into_iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RowError::MissingTicker,
                RowError::InvalidQuantity("0".into()),
                RowError::InvalidPrice("-2".into()),
                RowError::MissingDate,
                RowError::InvalidFees("x".into()),
            ]
        );
    }

    #[test]
    fn stored_trades_are_not_duplicated() {
        let existing = vec![InvestmentTransaction {
            ticker: "ITSA4".into(),
            asset_name: "Itausa".into(),
            asset_type: "STOCK".into(),
            side: Side::Sell,
            quantity: d("10"),
            price: d("10.50"),
            fees: Decimal::ZERO,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }];
        let rows = [
            row(&[("ticker", "itsa4"), ("date", "2024-03-01"), ("side", "venda"), ("quantity", "10"), ("price", "10.5")]),
            row(&[("ticker", "itsa4"), ("date", "2024-03-01"), ("side", "compra"), ("quantity", "10"), ("price", "10.5")]),
        ];
        let out = normalize_investments(&rows, &existing, NumberLocale::Auto);
        assert_eq!(out.inserted(), 1);
        assert_eq!(out.records[0].side, Side::Buy);
        assert_eq!(out.skipped[0].reason, RowError::Duplicate);
    }

    #[test]
    fn repeated_trades_in_one_file_are_kept() {
        let r = row(&[("ticker", "BBSE3"), ("date", "2024-04-02"), ("quantity", "5"), ("price", "33")]);
        let out = normalize_investments(&[r.clone(), r], &[], NumberLocale::Auto);
        assert_eq!(out.inserted(), 2);
        assert_eq!(out.ignored(), 0);
    }
}
