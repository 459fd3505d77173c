// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::parse::{NumberLocale, amount_from_cell, date_from_cell, parse_kind_label};
use super::{ImportOutcome, RawRow, RowError, columns};
use crate::categorize::Categorizer;
use crate::models::{NewTransaction, Transaction, TxKind};

/// Identity used to recognise a row that was already imported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    date: NaiveDate,
    amount: Decimal,
    category: String,
}

impl DedupKey {
    pub fn new(date: NaiveDate, amount: Decimal, category: &str) -> Self {
        DedupKey {
            date,
            amount: amount.normalize(),
            category: category.trim().to_string(),
        }
    }
}

/// Map spreadsheet rows to new cash transactions, skipping rows that are
/// unreadable or already present in `existing`.
///
/// Duplicates are judged against stored records on `(date, amount, category)`.
/// Equal rows inside one batch are separate purchases and are all kept. An
/// explicit `ID` column is an identity, so a repeated id is skipped whether
/// it is stored or appeared earlier in the batch.
pub fn normalize_transactions(
    rows: &[RawRow],
    existing: &[Transaction],
    categorizer: &Categorizer,
    locale: NumberLocale,
) -> ImportOutcome<NewTransaction> {
    let mut seen_ids: HashSet<String> = existing
        .iter()
        .filter_map(|t| t.external_id.clone())
        .collect();
    let stored_keys: HashSet<DedupKey> = existing
        .iter()
        .map(|t| DedupKey::new(t.date, t.amount, &t.category))
        .collect();

    let mut outcome = ImportOutcome::default();
    for (idx, row) in rows.iter().enumerate() {
        let n = idx + 1;
        match normalize_row(row, categorizer, locale) {
            Err(reason) => outcome.skip(n, reason),
            Ok(record) => {
                if let Some(id) = &record.external_id {
                    if !seen_ids.insert(id.clone()) {
                        outcome.skip(n, RowError::DuplicateId(id.clone()));
                        continue;
                    }
                }
                if stored_keys.contains(&DedupKey::new(record.date, record.amount, &record.category)) {
                    outcome.skip(n, RowError::Duplicate);
                    continue;
                }
                outcome.records.push(record);
            }
        }
    }
    tracing::info!(
        inserted = outcome.inserted(),
        ignored = outcome.ignored(),
        "normalized transaction rows"
    );
    outcome
}

fn normalize_row(
    row: &RawRow,
    categorizer: &Categorizer,
    locale: NumberLocale,
) -> Result<NewTransaction, RowError> {
    let date_cell = row.field(columns::DATE).ok_or(RowError::MissingDate)?;
    let amount_cell = row.field(columns::AMOUNT).ok_or(RowError::MissingAmount)?;

    let date = date_from_cell(date_cell)
        .ok_or_else(|| RowError::InvalidDate(date_cell.as_text().unwrap_or_default()))?;
    let signed = amount_from_cell(amount_cell, locale)
        .ok_or_else(|| RowError::InvalidAmount(amount_cell.as_text().unwrap_or_default()))?;
    if signed.is_zero() {
        return Err(RowError::ZeroAmount);
    }

    let kind = row
        .text(columns::TYPE)
        .and_then(|t| parse_kind_label(&t))
        .unwrap_or(TxKind::Expense);

    let description = row.text(columns::DESCRIPTION);
    let category = match row.text(columns::CATEGORY) {
        Some(c) => c,
        None => categorizer
            .categorize_or_default(description.as_deref().unwrap_or(""), kind)
            .to_string(),
    };

    Ok(NewTransaction {
        external_id: row.text(columns::EXTERNAL_ID),
        date,
        description,
        category,
        amount: signed.abs(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::Cell;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .fold(RawRow::new(), |r, (h, v)| r.with(h, Cell::text(v)))
    }

    fn run(rows: &[RawRow], existing: &[Transaction]) -> ImportOutcome<NewTransaction> {
        normalize_transactions(rows, existing, &Categorizer::with_defaults(&[]), NumberLocale::Auto)
    }

    #[test]
    fn brazilian_row_is_normalized() {
        let rows = [row(&[("Data", "15/01/2024"), ("Valor", "R$ 1.234,56"), ("Tipo", "despesa")])];
        let out = run(&rows, &[]);
        assert_eq!(out.inserted(), 1);
        assert_eq!(out.ignored(), 0);
        let rec = &out.records[0];
        assert_eq!(rec.amount, d("1234.56"));
        assert_eq!(rec.kind, TxKind::Expense);
        assert_eq!(rec.date, ymd(2024, 1, 15));
        assert_eq!(rec.category, "Outros");
    }

    #[test]
    fn missing_or_zero_amount_is_ignored() {
        let rows = [
            row(&[("Data", "15/01/2024"), ("Valor", "0")]),
            row(&[("Data", "15/01/2024")]),
            row(&[("Valor", "10,00")]),
            row(&[("Data", "16/01/2024"), ("Valor", "R$ 0,00")]),
        ];
        let out = run(&rows, &[]);
        assert_eq!(out.inserted(), 0);
        assert_eq!(out.ignored(), 4);
        let reasons: Vec<_> = out.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                RowError::ZeroAmount,
                RowError::MissingAmount,
                RowError::MissingDate,
                RowError::ZeroAmount
            ]
        );
    }

    #[test]
    fn unparseable_cells_are_skipped_not_zeroed() {
        let rows = [
            row(&[("Data", "32/01/2024"), ("Valor", "10")]),
            row(&[("Data", "2024-01-02"), ("Valor", "dez reais")]),
            row(&[("Data", "2024-01-03"), ("Valor", "12")]),
        ];
        let out = run(&rows, &[]);
        assert_eq!(out.inserted(), 1);
        assert_eq!(out.skipped[0].row, 1);
        assert_eq!(out.skipped[0].reason, RowError::InvalidDate("32/01/2024".into()));
        assert_eq!(out.skipped[1].reason, RowError::InvalidAmount("dez reais".into()));
    }

    #[test]
    fn existing_triple_is_not_imported_again() {
        let existing = vec![Transaction {
            id: 1,
            external_id: None,
            date: ymd(2024, 1, 15),
            description: None,
            category: "Mercado".into(),
            amount: d("50.00"),
            kind: TxKind::Expense,
            group_id: None,
        }];
        let rows = [
            row(&[("Data", "15/01/2024"), ("Valor", "50"), ("Categoria", "Mercado")]),
            row(&[("Data", "15/01/2024"), ("Valor", "50"), ("Categoria", "Lazer")]),
        ];
        let out = run(&rows, &existing);
        assert_eq!(out.inserted(), 1);
        assert_eq!(out.records[0].category, "Lazer");
        assert_eq!(out.skipped[0].reason, RowError::Duplicate);
    }

    #[test]
    fn equal_rows_inside_one_batch_are_all_kept() {
        let r = row(&[("Data", "15/01/2024"), ("Valor", "5,00"), ("Descrição", "Padaria")]);
        let out = run(&[r.clone(), r], &[]);
        assert_eq!(out.inserted(), 2);
        assert_eq!(out.ignored(), 0);
        assert_eq!(out.records[0], out.records[1]);
        assert_eq!(out.records[0].category, "Alimentação");
    }

    #[test]
    fn repeated_id_inside_one_batch_is_skipped() {
        let r = row(&[("id", "nf-9"), ("date", "2024-02-01"), ("amount", "9.90"), ("description", "Spotify")]);
        let out = run(&[r.clone(), r], &[]);
        assert_eq!(out.inserted(), 1);
        assert_eq!(out.records[0].category, "Lazer");
        assert_eq!(out.skipped[0].reason, RowError::DuplicateId("nf-9".into()));
    }

    #[test]
    fn known_external_id_is_skipped() {
        let existing = vec![Transaction {
            id: 3,
            external_id: Some("abc-1".into()),
            date: ymd(2023, 5, 5),
            description: None,
            category: "Casa".into(),
            amount: d("1"),
            kind: TxKind::Expense,
            group_id: None,
        }];
        let rows = [
            row(&[("ID", "abc-1"), ("Data", "2024-01-01"), ("Valor", "77")]),
            row(&[("ID", "abc-2"), ("Data", "2024-01-01"), ("Valor", "77")]),
        ];
        let out = run(&rows, &existing);
        assert_eq!(out.inserted(), 1);
        assert_eq!(out.records[0].external_id.as_deref(), Some("abc-2"));
        assert_eq!(out.skipped[0].reason, RowError::DuplicateId("abc-1".into()));
    }

    #[test]
    fn kind_comes_from_label_and_amount_is_magnitude() {
        let rows = [
            row(&[("Data", "2024-01-01"), ("Valor", "5000"), ("Tipo", "Receita"), ("Descrição", "Salário ACME")]),
            row(&[("Data", "2024-01-02"), ("Valor", "-35,90"), ("Descrição", "Uber viagem")]),
        ];
        let out = run(&rows, &[]);
        assert_eq!(out.records[0].kind, TxKind::Income);
        assert_eq!(out.records[0].category, "Outros");
        assert_eq!(out.records[1].kind, TxKind::Expense);
        assert_eq!(out.records[1].amount, d("35.90"));
        assert_eq!(out.records[1].category, "Transporte");
    }

    #[test]
    fn explicit_locale_changes_reading() {
        let rows = [row(&[("Data", "2024-01-01"), ("Valor", "1.234")])];
        let cat = Categorizer::new(&[]);
        let auto = normalize_transactions(&rows, &[], &cat, NumberLocale::Auto);
        let comma = normalize_transactions(&rows, &[], &cat, NumberLocale::CommaDecimal);
        assert_eq!(auto.records[0].amount, d("1.234"));
        assert_eq!(comma.records[0].amount, d("1234"));
    }
}
