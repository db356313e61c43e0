// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use lessonbook::cli;
use lessonbook::commands::{self, lessons, payments, reports, teachers, types};
use lessonbook::db::{self, load_ledger};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Parses `args` and dispatches the way `main` does.
fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["lessonbook"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(argv)?;
    let today = commands::today(&matches)?;
    match matches.subcommand() {
        Some(("teacher", sub)) => teachers::handle(conn, sub, today),
        Some(("lesson", sub)) => lessons::handle(conn, sub, today),
        Some(("payment", sub)) => payments::handle(conn, sub, today),
        Some(("type", sub)) => types::handle(conn, sub),
        Some(("report", sub)) => reports::handle(conn, sub, today),
        other => panic!("unexpected command {:?}", other.map(|(name, _)| name)),
    }
}

#[test]
fn lesson_type_prefills_rate() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    run(
        &mut conn,
        &[
            "lesson", "add", "-t", "Olena", "--date", "2025-05-03", "--hours", "2", "--type",
            "МКА",
        ],
    )
    .unwrap();
    run(
        &mut conn,
        &[
            "lesson", "add", "-t", "Olena", "--date", "2025-05-04", "--hours", "1", "--type",
            "МКА", "--rate", "400",
        ],
    )
    .unwrap();

    let ledger = load_ledger(&conn).unwrap();
    let t = ledger.find_teacher_by_name("Olena").unwrap();
    let rates: Vec<_> = t.lessons().iter().map(|l| l.rate_applied()).collect();
    assert_eq!(rates, [dec("330"), dec("400")]);
    assert_eq!(t.total_earned(), dec("1060"));
}

#[test]
fn free_text_lesson_needs_a_rate() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    let err = run(
        &mut conn,
        &["lesson", "add", "-t", "Olena", "--hours", "1", "--label", "Piano"],
    );
    assert!(err.is_err());
    let ledger = load_ledger(&conn).unwrap();
    assert!(ledger.teachers()[0].lessons().is_empty());
}

#[test]
fn mark_prev_month_uses_today_override() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    for d in ["2025-04-10", "2025-04-28", "2025-05-02"] {
        run(
            &mut conn,
            &[
                "lesson", "add", "-t", "Olena", "--date", d, "--hours", "1", "--label", "Math",
                "--rate", "100",
            ],
        )
        .unwrap();
    }
    run(
        &mut conn,
        &["--today", "2025-05-15", "lesson", "mark-prev-month", "-t", "Olena"],
    )
    .unwrap();

    let ledger = load_ledger(&conn).unwrap();
    let t = &ledger.teachers()[0];
    let flags: Vec<_> = t.lessons().iter().map(|l| l.is_paid()).collect();
    assert_eq!(flags, [true, true, false]);
    assert_eq!(t.total_unpaid_salary(), dec("100"));
}

#[test]
fn lesson_list_filters_by_month_and_paid_flag() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    run(&mut conn, &["teacher", "add", "--name", "Iryna"]).unwrap();
    for (teacher, d, paid) in [
        ("Olena", "2025-05-01", false),
        ("Olena", "2025-05-20", true),
        ("Iryna", "2025-05-10", false),
        ("Iryna", "2025-04-30", false),
    ] {
        let mut args = vec![
            "lesson", "add", "-t", teacher, "--date", d, "--hours", "1", "--type", "ПКО",
        ];
        if paid {
            args.push("--paid");
        }
        run(&mut conn, &args).unwrap();
    }

    let ledger = load_ledger(&conn).unwrap();
    let m = cli::build_cli().get_matches_from([
        "lessonbook", "lesson", "list", "--month", "2025-05", "--unpaid",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    let (_, list) = sub.subcommand().unwrap();
    let rows = lessons::query_rows(&ledger, list).unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, ["2025-05-10", "2025-05-01"]);

    let m = cli::build_cli().get_matches_from(["lessonbook", "lesson", "list", "-t", "Olena"]);
    let (_, sub) = m.subcommand().unwrap();
    let (_, list) = sub.subcommand().unwrap();
    let rows = lessons::query_rows(&ledger, list).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.teacher == "Olena"));
}

#[test]
fn payments_and_teacher_delete_flow() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    run(
        &mut conn,
        &[
            "payment", "add", "-t", "Olena", "--date", "2025-05-10", "--amount", "250",
            "--method", "card", "--note", "May",
        ],
    )
    .unwrap();
    run(
        &mut conn,
        &["payment", "add", "-t", "Olena", "--date", "2025-05-11", "--amount", "50"],
    )
    .unwrap();
    assert!(
        run(
            &mut conn,
            &["payment", "add", "-t", "Olena", "--amount", "5", "--method", "barter"],
        )
        .is_err()
    );

    let ledger = load_ledger(&conn).unwrap();
    let t = &ledger.teachers()[0];
    assert_eq!(t.total_paid(), dec("300"));
    assert_eq!(t.current_balance(), dec("-300"));
    let methods: Vec<_> = t.payments().iter().map(|p| p.method().as_str()).collect();
    assert_eq!(methods, ["card", "cash"]);

    run(&mut conn, &["report", "history", "--json"]).unwrap();
    run(&mut conn, &["teacher", "rm", "-t", "Olena"]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM payments", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn editing_a_type_keeps_logged_rates() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    run(&mut conn, &["type", "add", "--name", "Vocal", "--rate", "500"]).unwrap();
    run(
        &mut conn,
        &["lesson", "add", "-t", "Olena", "--hours", "1", "--type", "Vocal"],
    )
    .unwrap();
    run(&mut conn, &["type", "edit", "--type", "Vocal", "--rate", "600"]).unwrap();
    run(&mut conn, &["type", "rm", "--type", "Vocal"]).unwrap();

    let ledger = load_ledger(&conn).unwrap();
    let lesson = &ledger.teachers()[0].lessons()[0];
    assert_eq!(lesson.rate_applied(), dec("500"));
    assert_eq!(lesson.category().display_label(), "Vocal");
    assert!(ledger.types().find_by_name("Vocal").is_none());
}

#[test]
fn stats_rejects_month_with_range() {
    let res = cli::build_cli().try_get_matches_from([
        "lessonbook", "report", "stats", "-t", "Olena", "--month", "2025-05", "--from",
        "2025-05-01", "--to", "2025-05-31",
    ]);
    assert!(res.is_err());
}

#[test]
fn oversized_lesson_is_refused_and_book_stays_readable() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    let res = run(
        &mut conn,
        &[
            "lesson", "add", "-t", "Olena", "--hours", "79228162514264337593543950335",
            "--label", "X", "--rate", "2",
        ],
    );
    assert!(res.is_err());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM lessons", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    run(&mut conn, &["teacher", "list"]).unwrap();
    run(&mut conn, &["report", "balance"]).unwrap();
}

#[test]
fn balance_rows_serialize_with_named_fields() {
    let mut conn = setup();
    run(&mut conn, &["teacher", "add", "--name", "Olena"]).unwrap();
    run(
        &mut conn,
        &[
            "lesson", "add", "-t", "Olena", "--hours", "2", "--label", "Math", "--rate", "100",
        ],
    )
    .unwrap();
    run(&mut conn, &["payment", "add", "-t", "Olena", "--amount", "50"]).unwrap();

    let ledger = load_ledger(&conn).unwrap();
    let rows = reports::balance_rows(&ledger);
    let value = serde_json::to_value(&rows).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {
                "teacher": "Olena",
                "total_earned": "200",
                "total_paid": "50",
                "current_balance": "150"
            }
        ])
    );
    run(&mut conn, &["report", "balance", "--json"]).unwrap();
}
