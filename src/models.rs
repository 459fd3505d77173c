// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::recurrence::Recurrence;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown {what} '{value}'")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(TxKind::Income),
            "expense" | "despesa" => Ok(TxKind::Expense),
            other => Err(UnknownVariant {
                what: "transaction type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" | "compra" => Ok(Side::Buy),
            "sell" | "venda" => Ok(Side::Sell),
            other => Err(UnknownVariant {
                what: "trade side",
                value: other.to_string(),
            }),
        }
    }
}

/// A cash movement. `amount` is always the magnitude; `kind` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub external_id: Option<String>,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub group_id: Option<String>,
}

/// A transaction accepted by the importer, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub external_id: Option<String>,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: String,
    pub amount: Decimal,
    pub kind: TxKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentTransaction {
    pub ticker: String,
    pub asset_name: String,
    pub asset_type: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fees: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledTask {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Positive is income, negative is expense.
    pub value: Option<Decimal>,
    pub category: Option<String>,
    pub schedule_date: NaiveDateTime,
    pub recurrence: Option<Recurrence>,
    pub is_completed: bool,
    pub parent_task_id: Option<i64>,
    pub group_id: Option<String>,
}

impl ScheduledTask {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// A scheduled task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub category: Option<String>,
    pub schedule_date: NaiveDateTime,
    pub recurrence: Option<Recurrence>,
    pub is_completed: bool,
    pub parent_task_id: Option<i64>,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCategory {
    pub id: i64,
    pub name: String,
    pub kind: TxKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub keywords: Vec<String>,
}

/// A savings target. Contributions are `Metas` expense transactions linked
/// to the goal, and each one raises `current_amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub category: String,
    pub icon: String,
    pub color: String,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDraft {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub category: String,
    pub icon: String,
    pub color: String,
    pub group_id: Option<String>,
}
