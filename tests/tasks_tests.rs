// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use organiza::commands::tasks::{self, complete_task};
use organiza::store::{load_task, load_tasks};
use organiza::utils::{PLAN_KEY, set_setting};
use organiza::{cli, db};
use rust_decimal::Decimal;
use rusqlite::Connection;

fn setup(plan: &str) -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    set_setting(&conn, PLAN_KEY, plan).unwrap();
    conn
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["organiza", "tasks"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tasks", tasks_m)) = matches.subcommand() {
        tasks::handle(conn, tasks_m)
    } else {
        panic!("no tasks subcommand");
    }
}

#[test]
fn completing_a_monthly_task_spawns_the_next_one() {
    let mut conn = setup("basic");
    run(
        &mut conn,
        &[
            "add", "--title", "Aluguel", "--at", "2024-01-15 09:00", "--value", "-1500",
            "--category", "Casa", "--repeat", "monthly", "--until", "2024-03-01",
        ],
    )
    .unwrap();

    run(&mut conn, &["done", "--id", "1"]).unwrap();
    let first = load_task(&conn, 1).unwrap();
    assert!(first.is_completed);

    let second = load_task(&conn, 2).unwrap();
    assert!(!second.is_completed);
    assert_eq!(second.schedule_date.to_string(), "2024-02-15 09:00:00");
    assert_eq!(second.parent_task_id, Some(1));
    assert_eq!(second.value, Some(Decimal::from(-1500)));
    assert_eq!(second.category.as_deref(), Some("Casa"));

    // 2024-03-15 is past the end date: nothing more is generated.
    assert_eq!(complete_task(&mut conn, 2).unwrap(), None);
    assert!(load_tasks(&conn, false).unwrap().is_empty());
    assert_eq!(load_tasks(&conn, true).unwrap().len(), 2);
}

#[test]
fn lineage_points_at_the_first_task() {
    let mut conn = setup("basic");
    run(
        &mut conn,
        &["add", "--title", "Academia", "--at", "2024-01-31", "--repeat", "monthly"],
    )
    .unwrap();
    let second = complete_task(&mut conn, 1).unwrap().unwrap();
    let third = complete_task(&mut conn, second).unwrap().unwrap();
    let t3 = load_task(&conn, third).unwrap();
    assert_eq!(t3.parent_task_id, Some(1));
    // Jan 31 rolls into March (2024 is a leap year), then keeps the 2nd.
    assert_eq!(load_task(&conn, second).unwrap().schedule_date.to_string(), "2024-03-02 00:00:00");
    assert_eq!(t3.schedule_date.to_string(), "2024-04-02 00:00:00");
}

#[test]
fn one_off_tasks_complete_without_spawning() {
    let mut conn = setup("basic");
    run(&mut conn, &["add", "--title", "IPVA", "--at", "2024-02-10", "--value", "-900"]).unwrap();
    assert_eq!(complete_task(&mut conn, 1).unwrap(), None);
    assert!(complete_task(&mut conn, 1).is_err());
    run(&mut conn, &["undo", "--id", "1"]).unwrap();
    assert!(!load_task(&conn, 1).unwrap().is_completed);
    run(&mut conn, &["rm", "--id", "1"]).unwrap();
    assert!(load_task(&conn, 1).is_err());
    assert!(run(&mut conn, &["rm", "--id", "1"]).is_err());
}

#[test]
fn free_plan_allows_five_open_tasks() {
    let mut conn = setup("free");
    for i in 0..5 {
        let title = format!("t{}", i);
        run(&mut conn, &["add", "--title", &title, "--at", "2024-05-01"]).unwrap();
    }
    let err = run(&mut conn, &["add", "--title", "t5", "--at", "2024-05-01"]).unwrap_err();
    assert_eq!(err.to_string(), "free plan allows at most 5 open tasks");

    // Completing frees a slot.
    complete_task(&mut conn, 1).unwrap();
    run(&mut conn, &["add", "--title", "t5", "--at", "2024-05-01"]).unwrap();
}

#[test]
fn unknown_pattern_is_rejected() {
    let mut conn = setup("basic");
    let err = run(
        &mut conn,
        &["add", "--title", "x", "--at", "2024-05-01", "--repeat", "hourly"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown recurrence pattern 'hourly'"));
}
