// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.organiza", "Organiza", "organiza"));

/// Environment variable that points the CLI at a specific database file.
pub const DB_ENV: &str = "ORGANIZA_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(custom) = std::env::var_os(DB_ENV).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(custom);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(path);
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("organiza.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        icon TEXT,
        color TEXT,
        keywords TEXT NOT NULL DEFAULT '', -- comma separated, in match order
        UNIQUE(name, type)
    );

    CREATE TABLE IF NOT EXISTS savings_goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        target_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL DEFAULT '0',
        deadline TEXT,
        category TEXT NOT NULL,
        icon TEXT NOT NULL,
        color TEXT NOT NULL,
        group_id TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT UNIQUE,
        date TEXT NOT NULL,
        description TEXT,
        category TEXT NOT NULL,
        amount TEXT NOT NULL, -- magnitude, sign lives in type
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        group_id TEXT,
        goal_id INTEGER, -- set on goal contributions
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(goal_id) REFERENCES savings_goals(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS investment_transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker TEXT NOT NULL,
        asset_name TEXT NOT NULL,
        asset_type TEXT NOT NULL,
        side TEXT NOT NULL CHECK(side IN ('buy','sell')),
        quantity TEXT NOT NULL,
        price TEXT NOT NULL,
        fees TEXT NOT NULL DEFAULT '0',
        date TEXT NOT NULL,
        note TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_investment_transactions_ticker
        ON investment_transactions(ticker, date);

    CREATE TABLE IF NOT EXISTS scheduled_tasks(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        value TEXT, -- signed: positive income, negative expense
        category TEXT,
        schedule_date TEXT NOT NULL,
        is_completed INTEGER NOT NULL DEFAULT 0,
        recurrence_pattern TEXT CHECK(recurrence_pattern IN ('daily','weekly','monthly','yearly')),
        recurrence_interval INTEGER NOT NULL DEFAULT 1,
        recurrence_end_date TEXT,
        parent_task_id INTEGER,
        group_id TEXT,
        FOREIGN KEY(parent_task_id) REFERENCES scheduled_tasks(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_date ON scheduled_tasks(schedule_date);
    "#,
    )?;
    Ok(())
}
