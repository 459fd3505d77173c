// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::goals::{
    DEFAULT_GOAL_CATEGORY, DEFAULT_GOAL_COLOR, DEFAULT_GOAL_ICON, GOALS_CATEGORY,
    contribution_description, contribution_history,
};
use crate::models::{Goal, GoalDraft, NewTransaction, TxKind};
use crate::plans::{self, Quota};
use crate::store::{
    count_goals, count_transactions_in_month, delete_goal, goal_contributions, insert_goal,
    insert_transaction, link_goal_transaction, load_goal, load_goals, set_goal_amount,
};
use crate::utils::{
    arg, current_plan, fmt_money, maybe_print_json, opt_arg, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("contribute", sub)) => {
            let id = goal_id(sub)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let date = match opt_arg(sub, "date") {
                Some(raw) => parse_date(raw)?,
                None => Local::now().date_naive(),
            };
            let goal = contribute(conn, id, amount, date)?;
            println!(
                "Added {} to '{}': {} of {} ({}%)",
                fmt_money(&amount),
                goal.title,
                fmt_money(&goal.current_amount),
                fmt_money(&goal.target_amount),
                goal.progress()
            );
        }
        Some(("history", sub)) => history(conn, sub)?,
        Some(("rm", sub)) => {
            let id = goal_id(sub)?;
            delete_goal(conn, id)?;
            println!("Removed goal {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn goal_id(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id").copied().context("Missing --id")
}

/// Record a contribution: a `Metas` expense linked to the goal plus the new
/// saved amount, in one database transaction. Returns the updated goal.
pub fn contribute(
    conn: &mut Connection,
    id: i64,
    amount: Decimal,
    date: NaiveDate,
) -> Result<Goal> {
    let plan = current_plan(conn)?;
    let tx = conn.transaction()?;
    let mut goal = load_goal(&tx, id)?;
    goal.current_amount = goal.contributed(amount)?;

    let month = date.format("%Y-%m").to_string();
    plans::check(
        plan,
        Quota::TransactionsPerMonth,
        count_transactions_in_month(&tx, &month)?,
    )?;
    let record = NewTransaction {
        external_id: None,
        date,
        description: Some(contribution_description(&goal.title)),
        category: GOALS_CATEGORY.to_string(),
        amount,
        kind: TxKind::Expense,
    };
    let transaction_id = insert_transaction(&tx, &record, goal.group_id.as_deref())?;
    link_goal_transaction(&tx, transaction_id, id)?;
    set_goal_amount(&tx, id, goal.current_amount)?;
    tx.commit()?;
    tracing::info!(goal_id = id, %amount, "goal contribution recorded");
    Ok(goal)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let draft = GoalDraft {
        title: arg(sub, "title")?.trim().to_string(),
        description: opt_arg(sub, "description").map(str::to_string),
        target_amount: parse_decimal(arg(sub, "target")?)?,
        current_amount: opt_arg(sub, "current")
            .map(parse_decimal)
            .transpose()?
            .unwrap_or(Decimal::ZERO),
        deadline: opt_arg(sub, "deadline").map(parse_date).transpose()?,
        category: opt_arg(sub, "category")
            .unwrap_or(DEFAULT_GOAL_CATEGORY)
            .to_string(),
        icon: opt_arg(sub, "icon").unwrap_or(DEFAULT_GOAL_ICON).to_string(),
        color: opt_arg(sub, "color").unwrap_or(DEFAULT_GOAL_COLOR).to_string(),
        group_id: opt_arg(sub, "group").map(str::to_string),
    };
    draft.validate()?;

    plans::check(current_plan(conn)?, Quota::Goals, count_goals(conn)?)?;
    let id = insert_goal(conn, &draft)?;
    println!(
        "Added goal {} '{}' targeting {}",
        id,
        draft.title,
        fmt_money(&draft.target_amount)
    );
    Ok(())
}

#[derive(Serialize)]
pub struct GoalRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub target: Decimal,
    pub current: Decimal,
    pub progress: Decimal,
    pub remaining: Decimal,
    pub deadline: Option<NaiveDate>,
}

impl From<&Goal> for GoalRow {
    fn from(g: &Goal) -> Self {
        GoalRow {
            id: g.id,
            title: g.title.clone(),
            category: g.category.clone(),
            target: g.target_amount,
            current: g.current_amount,
            progress: g.progress(),
            remaining: g.remaining(),
            deadline: g.deadline,
        }
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data: Vec<GoalRow> = load_goals(conn)?.iter().map(GoalRow::from).collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|g| {
                vec![
                    g.id.to_string(),
                    g.title.clone(),
                    g.category.clone(),
                    fmt_money(&g.current),
                    fmt_money(&g.target),
                    format!("{}%", g.progress),
                    fmt_money(&g.remaining),
                    g.deadline.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Title", "Category", "Saved", "Target", "Progress", "Missing", "Deadline"],
                rows
            )
        );
    }
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = goal_id(sub)?;
    let goal = load_goal(conn, id)?;
    let points = contribution_history(&goal_contributions(conn, id)?);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        return Ok(());
    }
    if points.is_empty() {
        println!("No contributions to '{}' yet", goal.title);
        return Ok(());
    }
    let rows = points
        .iter()
        .map(|p| {
            vec![
                p.date.to_string(),
                fmt_money(&p.value),
                fmt_money(&p.cumulative),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "Amount", "Cumulative"], rows));
    Ok(())
}
