// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Loading and saving domain records. Amounts and quantities are stored as
//! decimal TEXT and parsed back with context naming the offending row.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::categorize::{CategoryRule, Categorizer};
use crate::models::{
    Goal, GoalDraft, InvestmentTransaction, NewTransaction, ScheduledTask, Side, TaskDraft,
    Transaction, TxKind, UserCategory,
};
use crate::positions::normalize_ticker;
use crate::recurrence::{Recurrence, RecurrencePattern};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn decimal_col(raw: &str, what: &str, id: i64) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("Invalid {} '{}' in row {}", what, raw, id))
}

fn date_col(raw: &str, id: i64) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' in row {}", raw, id))
}

fn datetime_col(raw: &str, id: i64) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FMT)
        .with_context(|| format!("Invalid schedule '{}' in task {}", raw, id))
}

/// Which transactions a listing or export covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    /// Only transactions outside any group.
    Personal,
    Group(String),
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "all" => Ok(Scope::All),
            "personal" => Ok(Scope::Personal),
            _ => match s.split_once(':') {
                Some((prefix, id)) if prefix.eq_ignore_ascii_case("group") && !id.is_empty() => {
                    Ok(Scope::Group(id.to_string()))
                }
                _ => Err(anyhow!(
                    "Invalid scope '{}', expected all|personal|group:<id>",
                    s
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TxFilter {
    pub month: Option<String>,
    pub category: Option<String>,
    pub scope: Scope,
    pub limit: Option<usize>,
    /// Newest first when set.
    pub newest_first: bool,
}

pub fn query_transactions(conn: &Connection, filter: &TxFilter) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, external_id, date, description, category, amount, type, group_id
         FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.clone());
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND lower(category)=lower(?)");
        params_vec.push(cat.clone());
    }
    match &filter.scope {
        Scope::All => {}
        Scope::Personal => sql.push_str(" AND group_id IS NULL"),
        Scope::Group(id) => {
            sql.push_str(" AND group_id=?");
            params_vec.push(id.clone());
        }
    }
    if filter.newest_first {
        sql.push_str(" ORDER BY date DESC, id DESC");
    } else {
        sql.push_str(" ORDER BY date, id");
    }
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut data = Vec::new();
    for row in rows {
        let (id, external_id, date, description, category, amount, kind, group_id) = row?;
        data.push(Transaction {
            id,
            external_id,
            date: date_col(&date, id)?,
            description,
            category,
            amount: decimal_col(&amount, "amount", id)?,
            kind: TxKind::from_str(&kind).with_context(|| format!("Transaction {}", id))?,
            group_id,
        });
    }
    Ok(data)
}

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    query_transactions(conn, &TxFilter::default())
}

pub fn insert_transaction(
    conn: &Connection,
    t: &NewTransaction,
    group_id: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(external_id, date, description, category, amount, type, group_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            t.external_id,
            t.date.to_string(),
            t.description,
            t.category,
            t.amount.to_string(),
            t.kind.as_str(),
            group_id
        ],
    )
    .with_context(|| format!("Insert transaction dated {}", t.date))?;
    Ok(conn.last_insert_rowid())
}

pub fn count_transactions_in_month(conn: &Connection, month: &str) -> Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE substr(date,1,7)=?1",
        params![month],
        |r| r.get(0),
    )?;
    Ok(n as usize)
}

pub fn load_investments(conn: &Connection) -> Result<Vec<InvestmentTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, ticker, asset_name, asset_type, side, quantity, price, fees, date
         FROM investment_transactions ORDER BY date, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(8)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, ticker, asset_name, asset_type, side, qty, price, fees, date) = row?;
        data.push(InvestmentTransaction {
            ticker,
            asset_name,
            asset_type,
            side: Side::from_str(&side).with_context(|| format!("Trade {}", id))?,
            quantity: decimal_col(&qty, "quantity", id)?,
            price: decimal_col(&price, "price", id)?,
            fees: decimal_col(&fees, "fees", id)?,
            date: date_col(&date, id)?,
        });
    }
    Ok(data)
}

pub fn insert_investment(
    conn: &Connection,
    t: &InvestmentTransaction,
    note: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO investment_transactions(ticker, asset_name, asset_type, side, quantity, price, fees, date, note)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            t.ticker,
            t.asset_name,
            t.asset_type,
            t.side.as_str(),
            t.quantity.to_string(),
            t.price.to_string(),
            t.fees.to_string(),
            t.date.to_string(),
            note
        ],
    )
    .with_context(|| format!("Insert {} trade for {}", t.side, t.ticker))?;
    Ok(conn.last_insert_rowid())
}

/// Distinct assets ever traded, compared without exchange suffix.
pub fn known_assets(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT ticker FROM investment_transactions")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut tickers = Vec::new();
    for row in rows {
        let t = normalize_ticker(&row?);
        if !tickers.contains(&t) {
            tickers.push(t);
        }
    }
    tickers.sort();
    Ok(tickers)
}

pub fn load_categories(conn: &Connection) -> Result<Vec<UserCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, icon, color, keywords FROM categories ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, name, kind, icon, color, keywords) = row?;
        data.push(UserCategory {
            id,
            name,
            kind: TxKind::from_str(&kind).with_context(|| format!("Category {}", id))?,
            icon,
            color,
            keywords: split_keywords(&keywords),
        });
    }
    Ok(data)
}

pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn insert_category(conn: &Connection, c: &UserCategory) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories(name, type, icon, color, keywords) VALUES (?1,?2,?3,?4,?5)",
        params![
            c.name,
            c.kind.as_str(),
            c.icon,
            c.color,
            c.keywords.join(",")
        ],
    )
    .with_context(|| format!("Insert {} category '{}'", c.kind, c.name))?;
    Ok(conn.last_insert_rowid())
}

/// Stored categories in creation order first, then the built-in rules.
pub fn categorizer(conn: &Connection) -> Result<Categorizer> {
    let rules: Vec<CategoryRule> = load_categories(conn)?.iter().map(CategoryRule::from).collect();
    Ok(Categorizer::with_defaults(&rules))
}

type TaskRow = (
    i64,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    bool,
    Option<String>,
    i64,
    Option<String>,
    Option<i64>,
    Option<String>,
);

const TASK_COLUMNS: &str = "id, title, description, value, category, schedule_date, is_completed, \
     recurrence_pattern, recurrence_interval, recurrence_end_date, parent_task_id, group_id";

fn task_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
        r.get(8)?,
        r.get(9)?,
        r.get(10)?,
        r.get(11)?,
    ))
}

fn task_from_row(row: TaskRow) -> Result<ScheduledTask> {
    let (
        id,
        title,
        description,
        value,
        category,
        schedule,
        is_completed,
        pattern,
        interval,
        end_date,
        parent_task_id,
        group_id,
    ) = row;
    let recurrence = match pattern {
        None => None,
        Some(p) => {
            let pattern = RecurrencePattern::from_str(&p).with_context(|| format!("Task {}", id))?;
            let end = end_date.as_deref().map(|d| date_col(d, id)).transpose()?;
            Some(Recurrence::new(pattern, u32::try_from(interval).unwrap_or(1), end))
        }
    };
    Ok(ScheduledTask {
        id,
        title,
        description,
        value: value.as_deref().map(|v| decimal_col(v, "value", id)).transpose()?,
        category,
        schedule_date: datetime_col(&schedule, id)?,
        recurrence,
        is_completed,
        parent_task_id,
        group_id,
    })
}

pub fn load_tasks(conn: &Connection, include_completed: bool) -> Result<Vec<ScheduledTask>> {
    let sql = format!(
        "SELECT {} FROM scheduled_tasks {} ORDER BY schedule_date, id",
        TASK_COLUMNS,
        if include_completed { "" } else { "WHERE is_completed=0" }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], task_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(task_from_row(row?)?);
    }
    Ok(data)
}

pub fn load_task(conn: &Connection, id: i64) -> Result<ScheduledTask> {
    let sql = format!("SELECT {} FROM scheduled_tasks WHERE id=?1", TASK_COLUMNS);
    let row = conn
        .query_row(&sql, params![id], task_row)
        .optional()?
        .with_context(|| format!("Task {} not found", id))?;
    task_from_row(row)
}

pub fn insert_task(conn: &Connection, draft: &TaskDraft) -> Result<i64> {
    let (pattern, interval, end) = match &draft.recurrence {
        Some(r) => (
            Some(r.pattern.as_str()),
            i64::from(r.interval),
            r.end_date.map(|d| d.to_string()),
        ),
        None => (None, 1, None),
    };
    conn.execute(
        "INSERT INTO scheduled_tasks(title, description, value, category, schedule_date, is_completed,
             recurrence_pattern, recurrence_interval, recurrence_end_date, parent_task_id, group_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            draft.title,
            draft.description,
            draft.value.map(|v| v.to_string()),
            draft.category,
            draft.schedule_date.format(DATETIME_FMT).to_string(),
            draft.is_completed,
            pattern,
            interval,
            end,
            draft.parent_task_id,
            draft.group_id
        ],
    )
    .with_context(|| format!("Insert task '{}'", draft.title))?;
    Ok(conn.last_insert_rowid())
}

pub fn set_task_completed(conn: &Connection, id: i64, done: bool) -> Result<()> {
    let n = conn.execute(
        "UPDATE scheduled_tasks SET is_completed=?1 WHERE id=?2",
        params![done, id],
    )?;
    if n == 0 {
        bail!("Task {} not found", id);
    }
    Ok(())
}

pub fn count_open_tasks(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM scheduled_tasks WHERE is_completed=0",
        [],
        |r| r.get(0),
    )?;
    Ok(n as usize)
}

const GOAL_COLUMNS: &str = "id, title, description, target_amount, current_amount, deadline, \
     category, icon, color, group_id";

type GoalRow = (
    i64,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    Option<String>,
);

fn goal_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<GoalRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
        r.get(8)?,
        r.get(9)?,
    ))
}

fn goal_from_row(row: GoalRow) -> Result<Goal> {
    let (id, title, description, target, current, deadline, category, icon, color, group_id) = row;
    Ok(Goal {
        id,
        title,
        description,
        target_amount: decimal_col(&target, "target", id)?,
        current_amount: decimal_col(&current, "current amount", id)?,
        deadline: deadline.as_deref().map(|d| date_col(d, id)).transpose()?,
        category,
        icon,
        color,
        group_id,
    })
}

pub fn load_goals(conn: &Connection) -> Result<Vec<Goal>> {
    let sql = format!("SELECT {} FROM savings_goals ORDER BY id", GOAL_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], goal_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(goal_from_row(row?)?);
    }
    Ok(data)
}

pub fn load_goal(conn: &Connection, id: i64) -> Result<Goal> {
    let sql = format!("SELECT {} FROM savings_goals WHERE id=?1", GOAL_COLUMNS);
    let row = conn
        .query_row(&sql, params![id], goal_row)
        .optional()?
        .with_context(|| format!("Goal {} not found", id))?;
    goal_from_row(row)
}

pub fn insert_goal(conn: &Connection, draft: &GoalDraft) -> Result<i64> {
    conn.execute(
        "INSERT INTO savings_goals(title, description, target_amount, current_amount, deadline,
             category, icon, color, group_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            draft.title,
            draft.description,
            draft.target_amount.to_string(),
            draft.current_amount.to_string(),
            draft.deadline.map(|d| d.to_string()),
            draft.category,
            draft.icon,
            draft.color,
            draft.group_id
        ],
    )
    .with_context(|| format!("Insert goal '{}'", draft.title))?;
    Ok(conn.last_insert_rowid())
}

pub fn set_goal_amount(conn: &Connection, id: i64, current: Decimal) -> Result<()> {
    let n = conn.execute(
        "UPDATE savings_goals SET current_amount=?1 WHERE id=?2",
        params![current.to_string(), id],
    )?;
    if n == 0 {
        bail!("Goal {} not found", id);
    }
    Ok(())
}

/// Delete a goal. Its contribution transactions stay, unlinked.
pub fn delete_goal(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM savings_goals WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Goal {} not found", id);
    }
    Ok(())
}

pub fn count_goals(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM savings_goals", [], |r| r.get(0))?;
    Ok(n as usize)
}

pub fn link_goal_transaction(conn: &Connection, transaction_id: i64, goal_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET goal_id=?1 WHERE id=?2",
        params![goal_id, transaction_id],
    )
    .with_context(|| format!("Link transaction {} to goal {}", transaction_id, goal_id))?;
    Ok(())
}

/// `(date, amount)` of every transaction linked to the goal, oldest first.
pub fn goal_contributions(conn: &Connection, goal_id: i64) -> Result<Vec<(NaiveDate, Decimal)>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, amount FROM transactions WHERE goal_id=?1 ORDER BY date, id",
    )?;
    let rows = stmt.query_map(params![goal_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, date, amount) = row?;
        data.push((date_col(&date, id)?, decimal_col(&amount, "amount", id)?));
    }
    Ok(data)
}
