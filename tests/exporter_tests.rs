// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use lessonbook::db::{self, Store, load_ledger};
use lessonbook::models::PaymentMethod;
use lessonbook::{CategoryChoice, NewLesson, NewPayment, cli, commands::exporter};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();

    let mut ledger = load_ledger(&conn).unwrap();
    let pko = ledger.types().find_by_name("ПКО").unwrap().id();
    let id = ledger.add_teacher("Olena").unwrap().id();
    ledger
        .add_lesson(
            id,
            NewLesson {
                date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                duration_hours: Decimal::new(15, 1),
                category: CategoryChoice::Type(pko),
                rate: None,
                paid: false,
            },
        )
        .unwrap();
    let teacher = ledger
        .add_payment(
            id,
            NewPayment {
                date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                amount: Decimal::new(30000, 2),
                method: PaymentMethod::Card,
                note: Some("January".into()),
            },
        )
        .unwrap();
    conn.save_teacher(teacher).unwrap();
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["lessonbook", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("export", export_m)) => exporter::handle(conn, export_m),
        _ => panic!("no export subcommand"),
    }
}

fn without_id(mut v: serde_json::Value) -> serde_json::Value {
    for item in v.as_array_mut().unwrap() {
        assert!(item.as_object_mut().unwrap().remove("id").is_some());
    }
    v
}

#[test]
fn export_lessons_as_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("lessons.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["lessons", "--format", "json", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        without_id(parsed),
        json!([
            {
                "date": "2025-01-02",
                "teacher": "Olena",
                "type": "ПКО",
                "hours": "1.5",
                "rate": "450",
                "cost": "675.0",
                "paid": false
            }
        ])
    );
}

#[test]
fn export_payments_as_csv() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("payments.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["payments", "--out", &out_str]).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        ["date", "teacher", "amount", "method", "note", "id"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "2025-01-05");
    assert_eq!(&rows[0][2], "300.00");
    assert_eq!(&rows[0][3], "card");
    assert_eq!(&rows[0][4], "January");
}

#[test]
fn export_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(&conn, &["lessons", "--format", "xml", "--out", &out_str]).is_err());
    assert!(!out_path.exists());
}
