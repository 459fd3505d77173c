// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spreadsheet import: loosely structured rows in, canonical records out.
//!
//! A row that cannot be read is skipped and reported with a [`RowError`];
//! nothing in here aborts a batch.

pub mod investments;
pub mod parse;
pub mod transactions;

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Range, Reader, open_workbook_auto};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

pub use parse::NumberLocale;

/// One spreadsheet cell as read from CSV, JSON or a workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
}

impl Cell {
    pub fn text(s: &str) -> Cell {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Trimmed display text of the cell, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Cell::Number(n) => Some(n.normalize().to_string()),
        }
    }
}

/// A row keyed by the sheet's own header names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, Cell)>,
}

impl RawRow {
    pub fn new() -> Self {
        RawRow::default()
    }

    pub fn with(mut self, header: &str, cell: Cell) -> Self {
        self.push(header, cell);
        self
    }

    pub fn push(&mut self, header: &str, cell: Cell) {
        self.cells.push((header.trim().to_string(), cell));
    }

    /// First non-blank cell whose header matches one of `aliases`, trying
    /// aliases in order. Header comparison ignores case.
    pub fn field(&self, aliases: &[&str]) -> Option<&Cell> {
        aliases.iter().find_map(|alias| {
            self.cells
                .iter()
                .find(|(h, c)| h.to_lowercase() == *alias && !c.is_blank())
                .map(|(_, c)| c)
        })
    }

    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        self.field(aliases).and_then(Cell::as_text)
    }
}

pub mod columns {
    //! Accepted header names per field, lower case, in lookup order.

    pub const DATE: &[&str] = &["data", "data/hora", "date", "datetime", "transaction_date", "dt"];
    pub const DESCRIPTION: &[&str] = &[
        "descrição",
        "descricao",
        "description",
        "histórico",
        "historico",
        "memo",
    ];
    pub const CATEGORY: &[&str] = &["categoria", "category"];
    pub const AMOUNT: &[&str] = &["valor", "amount", "value", "quantia"];
    pub const TYPE: &[&str] = &["tipo", "type", "transaction_type"];
    pub const EXTERNAL_ID: &[&str] = &["id"];

    pub const TICKER: &[&str] = &["ticker", "codigo", "código"];
    pub const ASSET_NAME: &[&str] = &["asset_name", "nome"];
    pub const ASSET_TYPE: &[&str] = &["asset_type", "tipo_ativo"];
    pub const SIDE: &[&str] = &["transaction_type", "tipo", "side"];
    pub const QUANTITY: &[&str] = &["quantity", "quantidade"];
    pub const PRICE: &[&str] = &["price", "preco", "preço"];
    pub const FEES: &[&str] = &["fees", "taxas"];
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("missing date")]
    MissingDate,
    #[error("missing amount")]
    MissingAmount,
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("zero amount")]
    ZeroAmount,
    #[error("id '{0}' already imported")]
    DuplicateId(String),
    #[error("duplicate of an existing entry")]
    Duplicate,
    #[error("missing ticker")]
    MissingTicker,
    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),
    #[error("invalid price '{0}'")]
    InvalidPrice(String),
    #[error("invalid fees '{0}'")]
    InvalidFees(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based position among the data rows.
    pub row: usize,
    pub reason: RowError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> Default for ImportOutcome<T> {
    fn default() -> Self {
        ImportOutcome {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ImportOutcome<T> {
    pub fn inserted(&self) -> usize {
        self.records.len()
    }

    pub fn ignored(&self) -> usize {
        self.skipped.len()
    }

    pub(crate) fn skip(&mut self, row: usize, reason: RowError) {
        tracing::debug!(row, %reason, "row ignored");
        self.skipped.push(SkippedRow { row, reason });
    }
}

pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers().context("Read CSV header")?.clone();
    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Read CSV row {}", idx + 1))?;
        let mut row = RawRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.push(header, Cell::text(value));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn cell_from_json(v: &serde_json::Value) -> Cell {
    match v {
        serde_json::Value::Null => Cell::Empty,
        serde_json::Value::String(s) => Cell::text(s),
        serde_json::Value::Number(n) => number_cell(n.to_string()),
        serde_json::Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

/// Rows from a JSON array of objects, the shape spreadsheet tools export.
pub fn read_json_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let value: serde_json::Value = serde_json::from_reader(reader).context("Parse JSON rows")?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("Expected a JSON array of row objects"))?;
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| anyhow!("Row {} is not a JSON object", idx + 1))?;
        let mut row = RawRow::new();
        for (k, v) in obj {
            row.push(k, cell_from_json(v));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn number_cell(raw: String) -> Cell {
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map(Cell::Number)
        .unwrap_or(Cell::Text(raw))
}

fn cell_from_sheet(v: &Data) -> Cell {
    match v {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(Decimal::from(*i)),
        Data::Float(f) => number_cell(f.to_string()),
        // Date cells keep their serial day number; the date parser reads serials.
        Data::DateTime(dt) => number_cell(dt.as_f64().to_string()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
    }
}

/// Rows of a worksheet whose first row holds the headers. Rows with no
/// value at all are dropped.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut lines = range.rows();
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_line
        .iter()
        .map(|c| cell_from_sheet(c).as_text().unwrap_or_default())
        .collect();
    lines
        .filter(|line| line.iter().any(|c| !cell_from_sheet(c).is_blank()))
        .map(|line| {
            let mut row = RawRow::new();
            for (header, value) in headers.iter().zip(line.iter()) {
                row.push(header, cell_from_sheet(value));
            }
            row
        })
        .collect()
}

/// Rows from the first worksheet of an xlsx, xls or ods workbook.
pub fn read_workbook_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Open workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook {} has no sheets", path.display()))?
        .with_context(|| format!("Read first sheet of {}", path.display()))?;
    Ok(rows_from_range(&range))
}
