// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cell level parsers for spreadsheet dates, amounts and type labels.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;
use std::str::FromStr;

use super::Cell;
use crate::models::{Side, TxKind};

/// Two-digit years up to this value land in the 2000s, the rest in the 1900s.
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: i64 = 2_958_465;

static PLAIN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d*)?$").expect("static regex"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown number locale '{0}', expected auto|comma|dot")]
pub struct LocaleError(pub String);

/// How decimal and thousands separators are read in amount cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberLocale {
    /// Guess per cell: the last separator is the decimal point.
    #[default]
    Auto,
    /// `1.234,56`
    CommaDecimal,
    /// `1,234.56`
    DotDecimal,
}

impl NumberLocale {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberLocale::Auto => "auto",
            NumberLocale::CommaDecimal => "comma",
            NumberLocale::DotDecimal => "dot",
        }
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberLocale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(NumberLocale::Auto),
            "comma" | "pt-br" | "br" => Ok(NumberLocale::CommaDecimal),
            "dot" | "en" | "en-us" | "us" => Ok(NumberLocale::DotDecimal),
            other => Err(LocaleError(other.to_string())),
        }
    }
}

/// Digits with an optional dot and fraction; a bare trailing dot is allowed.
fn plain_decimal(s: &str) -> Option<Decimal> {
    if !PLAIN_NUMBER.is_match(s) {
        return None;
    }
    Decimal::from_str(s.strip_suffix('.').unwrap_or(s)).ok()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

fn strip_currency(s: &str) -> &str {
    for symbol in ["R$", "US$", "$"] {
        if let Some(rest) = strip_prefix_ignore_case(s, symbol) {
            return rest.trim_start();
        }
    }
    s
}

/// Parse a currency-formatted string such as `R$ 1.234,56`, `(12.50)` or
/// `-$3`. Returns `None` when the text is not a number.
pub fn parse_amount(raw: &str, locale: NumberLocale) -> Option<Decimal> {
    let mut s = raw.trim();
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    // One minus sign, before or after the currency symbol.
    let mut minus = false;
    if let Some(rest) = s.strip_prefix('-') {
        minus = true;
        s = rest.trim_start();
    }
    s = strip_currency(s);
    if !minus {
        if let Some(rest) = s.strip_prefix('-') {
            minus = true;
            s = rest.trim_start();
        }
    }
    if minus {
        negative = !negative;
    }

    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() || !compact.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match locale {
        NumberLocale::CommaDecimal => compact.replace('.', "").replace(',', "."),
        NumberLocale::DotDecimal => compact.replace(',', ""),
        NumberLocale::Auto => {
            // A trailing ",dd" or ".dd" is the usual case; either way the
            // last separator is the decimal point and earlier ones group
            // thousands.
            match compact.rfind([',', '.']) {
                None => compact,
                Some(idx) => {
                    let (int_part, frac_part) = compact.split_at(idx);
                    let int_digits: String =
                        int_part.chars().filter(|c| *c != '.' && *c != ',').collect();
                    format!("{}.{}", int_digits, &frac_part[1..])
                }
            }
        }
    };

    let value = plain_decimal(&normalized)?;
    Some(if negative { -value } else { value })
}

/// Amount from a cell; numeric cells are taken as they are.
pub fn amount_from_cell(cell: &Cell, locale: NumberLocale) -> Option<Decimal> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => parse_amount(s, locale),
    }
}

/// Spreadsheet serial day number to a calendar date. The time fraction is
/// dropped.
pub fn date_from_serial(serial: Decimal) -> Option<NaiveDate> {
    let days = serial.trunc().to_i64()?;
    if !(1..=MAX_SERIAL).contains(&days) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(u64::try_from(days).ok()?))
}

fn expand_year(raw: &str) -> Option<i32> {
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if year <= TWO_DIGIT_YEAR_PIVOT => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

fn parse_day_first(s: &str) -> Option<NaiveDate> {
    // "15/01/2024" optionally followed by a time of day
    let date_part = s.split([' ', 'T']).next()?;
    let mut parts = date_part.split('/');
    let (d, m, y) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let day: u32 = d.trim().parse().ok()?;
    let month: u32 = m.trim().parse().ok()?;
    let year = expand_year(y.trim())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a date written as ISO-8601, `dd/mm/yyyy`, `dd/mm/yy` or a bare
/// spreadsheet serial number.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if PLAIN_NUMBER.is_match(s) {
        return date_from_serial(plain_decimal(s)?);
    }
    if s.contains('/') {
        return parse_day_first(s);
    }
    parse_iso(s)
}

pub fn date_from_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => date_from_serial(*n),
        Cell::Text(s) => parse_date_text(s),
    }
}

/// Free-text type label to a cash direction. Trade sides map onto the cash
/// they move: a buy spends, a sell receives.
pub fn parse_kind_label(raw: &str) -> Option<TxKind> {
    match raw.trim().to_lowercase().as_str() {
        "receita" | "income" | "entrada" | "credito" | "crédito" | "sell" | "venda" => {
            Some(TxKind::Income)
        }
        "despesa" | "expense" | "saida" | "saída" | "debito" | "débito" | "buy" | "compra" => {
            Some(TxKind::Expense)
        }
        _ => None,
    }
}

pub fn parse_side_label(raw: &str) -> Option<Side> {
    raw.parse::<Side>().ok()
}
