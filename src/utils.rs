// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::import::NumberLocale;
use crate::plans::PlanType;

pub const PLAN_KEY: &str = "plan";
pub const LOCALE_KEY: &str = "number_locale";
pub const SETTING_KEYS: &[&str] = &[PLAN_KEY, LOCALE_KEY];

/// A required argument; clap enforces presence, this only turns a missing
/// value into an error instead of a panic.
pub fn arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("Missing --{}", name))
}

/// An optional argument, `None` when absent, blank, or not defined on this
/// subcommand.
pub fn opt_arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    sub.try_get_one::<String>(name)
        .ok()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` or the same with a `T`.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
        format!("Invalid date/time '{}', expected YYYY-MM-DD[ HH:MM[:SS]]", s)
    })?;
    Ok(date.and_time(NaiveTime::MIN))
}

pub fn parse_month(s: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn month_start(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("R$ {}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn current_plan(conn: &Connection) -> Result<PlanType> {
    match get_setting(conn, PLAN_KEY)? {
        Some(v) => v
            .parse()
            .with_context(|| format!("Stored setting '{}' is corrupt", PLAN_KEY)),
        None => Ok(PlanType::default()),
    }
}

pub fn number_locale(conn: &Connection) -> Result<NumberLocale> {
    match get_setting(conn, LOCALE_KEY)? {
        Some(v) => v
            .parse()
            .with_context(|| format!("Stored setting '{}' is corrupt", LOCALE_KEY)),
        None => Ok(NumberLocale::default()),
    }
}

/// Locale given on the command line, else the stored default.
pub fn locale_arg(conn: &Connection, sub: &clap::ArgMatches) -> Result<NumberLocale> {
    match opt_arg(sub, "locale") {
        Some(raw) => raw.parse().map_err(anyhow::Error::from),
        None => number_locale(conn),
    }
}
