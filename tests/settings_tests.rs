// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use organiza::commands::{config, forecast, plan};
use organiza::import::NumberLocale;
use organiza::plans::PlanType;
use organiza::utils::{current_plan, get_setting, number_locale};
use organiza::{cli, db};
use rust_decimal::Decimal;
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["organiza"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("config", sub)) => config::handle(conn, sub),
        Some(("plan", sub)) => plan::handle(conn, sub),
        Some(("tasks", sub)) => organiza::commands::tasks::handle(conn, sub),
        Some(("forecast", sub)) => forecast::handle(conn, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn project(conn: &Connection, args: &[&str]) -> anyhow::Result<Vec<organiza::forecast::ForecastMonth>> {
    let mut argv = vec!["organiza", "forecast"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    forecast::project(conn, sub)
}

#[test]
fn config_stores_canonical_values() {
    let mut conn = setup();
    run(&mut conn, &["config", "set", "--key", "number_locale", "--value", "pt-BR"]).unwrap();
    assert_eq!(get_setting(&conn, "number_locale").unwrap().as_deref(), Some("comma"));
    assert_eq!(number_locale(&conn).unwrap(), NumberLocale::CommaDecimal);

    assert!(run(&mut conn, &["config", "set", "--key", "number_locale", "--value", "roman"]).is_err());
    assert!(run(&mut conn, &["config", "set", "--key", "currency", "--value", "BRL"]).is_err());
    assert!(run(&mut conn, &["config", "get", "--key", "currency"]).is_err());
    run(&mut conn, &["config", "get"]).unwrap();
}

#[test]
fn plan_set_validates_name() {
    let mut conn = setup();
    assert_eq!(current_plan(&conn).unwrap(), PlanType::Free);
    run(&mut conn, &["plan", "set", "--plan", "Avançado"]).unwrap();
    assert_eq!(current_plan(&conn).unwrap(), PlanType::Advanced);
    assert!(run(&mut conn, &["plan", "set", "--plan", "gold"]).is_err());
    assert_eq!(current_plan(&conn).unwrap(), PlanType::Advanced);
    run(&mut conn, &["plan", "show", "--json"]).unwrap();
}

#[test]
fn forecast_follows_recurring_tasks_and_plan_horizon() {
    let mut conn = setup();
    run(&mut conn, &["plan", "set", "--plan", "basic"]).unwrap();
    run(
        &mut conn,
        &["tasks", "add", "--title", "Salário", "--at", "2025-01-05", "--value", "4000", "--repeat", "monthly"],
    )
    .unwrap();
    run(
        &mut conn,
        &[
            "tasks", "add", "--title", "Seguro", "--at", "2025-02-20", "--value", "-600", "--repeat",
            "monthly", "--every", "2",
        ],
    )
    .unwrap();

    let months = project(&conn, &["--from", "2025-02", "--months", "3", "--opening", "-100"]).unwrap();
    let summary: Vec<(String, Decimal, Decimal)> = months
        .iter()
        .map(|m| (m.month.clone(), m.balance, m.cumulative))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2025-02".to_string(), Decimal::from(3400), Decimal::from(3300)),
            ("2025-03".to_string(), Decimal::from(4000), Decimal::from(7300)),
            ("2025-04".to_string(), Decimal::from(3400), Decimal::from(10700)),
        ]
    );

    let err = project(&conn, &["--from", "2025-02", "--months", "4"]).unwrap_err();
    assert_eq!(err.to_string(), "basic plan allows at most 3 forecast months");
}

#[test]
fn free_plan_has_no_forecast() {
    let conn = setup();
    let err = project(&conn, &["--months", "1"]).unwrap_err();
    assert_eq!(err.to_string(), "forecast months are not available on the free plan");
}
