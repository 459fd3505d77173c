// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ScheduledTask, TaskDraft};
use crate::plans::{self, Quota};
use crate::recurrence::{Recurrence, RecurrencePattern, next_occurrence};
use crate::store::{count_open_tasks, insert_task, load_task, load_tasks, set_task_completed};
use crate::utils::{
    arg, current_plan, maybe_print_json, opt_arg, parse_date, parse_datetime, parse_decimal,
    pretty_table,
};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("done", sub)) => {
            let id = task_id(sub)?;
            match complete_task(conn, id)? {
                Some(next) => println!("Completed task {}; next occurrence is task {}", id, next),
                None => println!("Completed task {}", id),
            }
        }
        Some(("undo", sub)) => {
            let id = task_id(sub)?;
            if !load_task(conn, id)?.is_completed {
                bail!("Task {} is not completed", id);
            }
            plans::check(current_plan(conn)?, Quota::Tasks, count_open_tasks(conn)?)?;
            set_task_completed(conn, id, false)?;
            println!("Reopened task {}", id);
        }
        Some(("rm", sub)) => {
            let id = task_id(sub)?;
            let n = conn.execute("DELETE FROM scheduled_tasks WHERE id=?1", params![id])?;
            if n == 0 {
                bail!("Task {} not found", id);
            }
            println!("Removed task {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn task_id(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id").copied().context("Missing --id")
}

/// Mark a task completed and, for recurring tasks, store the next occurrence
/// in the same database transaction. Returns the id of the spawned task.
pub fn complete_task(conn: &mut Connection, id: i64) -> Result<Option<i64>> {
    let tx = conn.transaction()?;
    let task = load_task(&tx, id)?;
    if task.is_completed {
        bail!("Task {} is already completed", id);
    }
    set_task_completed(&tx, id, true)?;
    let spawned = match next_occurrence(&task) {
        Some(draft) => Some(insert_task(&tx, &draft)?),
        None => None,
    };
    tx.commit()?;
    tracing::info!(task_id = id, spawned = ?spawned, "task completed");
    Ok(spawned)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let recurrence = match opt_arg(sub, "repeat") {
        Some(raw) => {
            let pattern: RecurrencePattern = raw.parse()?;
            let every = sub.get_one::<u32>("every").copied().unwrap_or(1);
            let until = opt_arg(sub, "until").map(parse_date).transpose()?;
            Some(Recurrence::new(pattern, every, until))
        }
        None => None,
    };
    let draft = TaskDraft {
        title: arg(sub, "title")?.to_string(),
        description: opt_arg(sub, "description").map(str::to_string),
        value: opt_arg(sub, "value").map(parse_decimal).transpose()?,
        category: opt_arg(sub, "category").map(str::to_string),
        schedule_date: parse_datetime(arg(sub, "at")?)?,
        recurrence,
        is_completed: false,
        parent_task_id: None,
        group_id: opt_arg(sub, "group").map(str::to_string),
    };

    plans::check(current_plan(conn)?, Quota::Tasks, count_open_tasks(conn)?)?;
    let id = insert_task(conn, &draft)?;
    println!("Added task {} '{}' on {}", id, draft.title, draft.schedule_date);
    Ok(())
}

#[derive(Serialize)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub schedule: String,
    pub value: String,
    pub category: String,
    pub recurrence: String,
    pub completed: bool,
    pub parent: Option<i64>,
}

fn describe_recurrence(task: &ScheduledTask) -> String {
    match &task.recurrence {
        None => String::new(),
        Some(r) => {
            let every = if r.interval == 1 {
                r.pattern.to_string()
            } else {
                format!("{} x{}", r.pattern, r.interval)
            };
            match r.end_date {
                Some(end) => format!("{} until {}", every, end),
                None => every,
            }
        }
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tasks = load_tasks(conn, sub.get_flag("all"))?;
    let data: Vec<TaskRow> = tasks
        .iter()
        .map(|t| TaskRow {
            id: t.id,
            title: t.title.clone(),
            schedule: t.schedule_date.to_string(),
            value: t.value.map(|v| v.to_string()).unwrap_or_default(),
            category: t.category.clone().unwrap_or_default(),
            recurrence: describe_recurrence(t),
            completed: t.is_completed,
            parent: t.parent_task_id,
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.schedule.clone(),
                    t.title.clone(),
                    t.value.clone(),
                    t.category.clone(),
                    t.recurrence.clone(),
                    if t.completed { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "When", "Title", "Value", "Category", "Repeats", "Done"],
                rows
            )
        );
    }
    Ok(())
}
