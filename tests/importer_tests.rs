// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use organiza::store::load_transactions;
use organiza::utils::{PLAN_KEY, set_setting};
use organiza::{cli, commands::transactions, db};
use organiza::models::TxKind;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn sheet(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, extra: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["organiza", "tx", "import"];
    argv.extend_from_slice(extra);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

const BRAZILIAN_SHEET: &str = "Data,Descrição,Valor,Tipo,Categoria
15/01/2024,Mercado Extra,\"R$ 1.234,56\",despesa,
16/01/24,Salário ACME,\"5.000,00\",receita,Salário
17/01/2024,Nada,0,despesa,
,Sem data,10,despesa,
";

#[test]
fn brazilian_sheet_is_normalized_and_bad_rows_ignored() {
    let mut conn = base_conn();
    let file = sheet(BRAZILIAN_SHEET, ".csv");
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path]).unwrap();

    let stored = load_transactions(&conn).unwrap();
    assert_eq!(stored.len(), 2);
    let groceries = &stored[0];
    assert_eq!(groceries.date.to_string(), "2024-01-15");
    assert_eq!(groceries.amount, Decimal::from_str("1234.56").unwrap());
    assert_eq!(groceries.kind, TxKind::Expense);
    assert_eq!(groceries.category, "Mercado");
    assert_eq!(groceries.description.as_deref(), Some("Mercado Extra"));

    let salary = &stored[1];
    assert_eq!(salary.date.to_string(), "2024-01-16");
    assert_eq!(salary.amount, Decimal::from(5000));
    assert_eq!(salary.kind, TxKind::Income);
    assert_eq!(salary.category, "Salário");
}

#[test]
fn reimporting_the_same_sheet_adds_nothing() {
    let mut conn = base_conn();
    let file = sheet(BRAZILIAN_SHEET, ".csv");
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path]).unwrap();
    run_import(&mut conn, &["--path", &path]).unwrap();
    assert_eq!(count(&conn), 2);
}

#[test]
fn json_rows_accept_serial_dates_and_numbers() {
    let mut conn = base_conn();
    let file = sheet(
        r#"[
            {"date": 45306, "amount": -35.9, "description": "Uber *trip"},
            {"date": "2024-01-20T10:00:00", "amount": "(12.50)", "description": "padaria"},
            {"date": "sometime", "amount": 10}
        ]"#,
        ".json",
    );
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path]).unwrap();

    let stored = load_transactions(&conn).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].date.to_string(), "2024-01-15");
    assert_eq!(stored[0].amount, Decimal::from_str("35.9").unwrap());
    assert_eq!(stored[0].category, "Transporte");
    assert_eq!(stored[1].amount, Decimal::from_str("12.50").unwrap());
    assert_eq!(stored[1].category, "Alimentação");
}

#[test]
fn dry_run_stores_nothing() {
    let mut conn = base_conn();
    let file = sheet(BRAZILIAN_SHEET, ".csv");
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path, "--dry-run"]).unwrap();
    assert_eq!(count(&conn), 0);
}

#[test]
fn locale_flag_overrides_guess() {
    let mut conn = base_conn();
    let file = sheet("date,amount\n2024-03-01,1.234\n", ".csv");
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path, "--locale", "comma"]).unwrap();
    let stored = load_transactions(&conn).unwrap();
    assert_eq!(stored[0].amount, Decimal::from(1234));
}

#[test]
fn stored_locale_setting_is_the_default() {
    let mut conn = base_conn();
    set_setting(&conn, "number_locale", "comma").unwrap();
    let file = sheet("date,amount\n2024-03-01,2.500\n", ".csv");
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path]).unwrap();
    assert_eq!(load_transactions(&conn).unwrap()[0].amount, Decimal::from(2500));
}

#[test]
fn free_plan_monthly_cap_rejects_whole_batch() {
    let mut conn = base_conn();
    let mut csv = String::from("date,amount\n");
    for i in 1..=51 {
        csv.push_str(&format!("2024-05-02,{}.00\n", i));
    }
    let file = sheet(&csv, ".csv");
    let path = file.path().to_str().unwrap().to_string();

    let err = run_import(&mut conn, &["--path", &path]).unwrap_err();
    assert!(format!("{:#}", err).contains("at most 50 transactions per month"));
    assert_eq!(count(&conn), 0);

    set_setting(&conn, PLAN_KEY, "basic").unwrap();
    run_import(&mut conn, &["--path", &path]).unwrap();
    assert_eq!(count(&conn), 51);
}

#[test]
fn missing_file_is_an_error() {
    let mut conn = base_conn();
    assert!(run_import(&mut conn, &["--path", "/nonexistent/organiza.csv"]).is_err());
}

#[test]
fn two_equal_purchases_in_one_statement_are_both_stored() {
    let mut conn = base_conn();
    let statement = "Data,Valor,Descrição\n15/01/2024,\"5,00\",Padaria\n15/01/2024,\"5,00\",Padaria\n";
    let file = sheet(statement, ".csv");
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["--path", &path]).unwrap();
    assert_eq!(count(&conn), 2);

    // Once stored, the same statement is recognised and skipped.
    run_import(&mut conn, &["--path", &path]).unwrap();
    assert_eq!(count(&conn), 2);
}
