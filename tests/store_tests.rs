// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use lessonbook::config::{get_currency, set_setting};
use lessonbook::db::{self, Store, load_ledger};
use lessonbook::models::PaymentMethod;
use lessonbook::{CategoryChoice, NewLesson, NewPayment};
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

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn default_types_are_seeded_once() {
    let mut conn = setup();
    let ledger = load_ledger(&conn).unwrap();
    assert_eq!(ledger.types().len(), 3);
    let pko = ledger.types().find_by_name("ПКО").unwrap();
    assert_eq!(pko.default_rate(), dec("450"));

    conn.save_types(&[]).unwrap();
    db::init_schema(&mut conn).unwrap();
    assert!(load_ledger(&conn).unwrap().types().is_empty());
}

#[test]
fn book_survives_a_round_trip() {
    let mut conn = setup();
    let mut ledger = load_ledger(&conn).unwrap();
    let school = ledger.types().find_by_name("Школа").unwrap().id();
    let id = ledger.add_teacher("Olena").unwrap().id();
    ledger
        .add_lesson(
            id,
            NewLesson {
                date: date(2025, 5, 3),
                duration_hours: dec("1.5"),
                category: CategoryChoice::Type(school),
                rate: None,
                paid: true,
            },
        )
        .unwrap();
    ledger
        .add_lesson(
            id,
            NewLesson {
                date: date(2025, 5, 4),
                duration_hours: dec("0.75"),
                category: CategoryChoice::Label("Solfeggio".into()),
                rate: Some(dec("333.33")),
                paid: false,
            },
        )
        .unwrap();
    let teacher = ledger
        .add_payment(
            id,
            NewPayment {
                date: date(2025, 5, 10),
                amount: dec("100.50"),
                method: PaymentMethod::Card,
                note: Some("first transfer".into()),
            },
        )
        .unwrap();
    conn.save_teacher(teacher).unwrap();

    let reloaded = load_ledger(&conn).unwrap();
    assert_eq!(reloaded.teachers(), ledger.teachers());
    let t = reloaded.teacher(id).unwrap();
    assert_eq!(t.lessons()[0].category().type_id(), Some(school));
    assert_eq!(t.lessons()[0].rate_applied(), dec("220"));
    assert_eq!(t.lessons()[1].cost(), dec("249.9975"));
    assert_eq!(t.payments()[0].note(), Some("first transfer"));
    assert_eq!(t.current_balance(), ledger.teacher(id).unwrap().current_balance());
}

#[test]
fn deleting_a_teacher_removes_its_rows() {
    let mut conn = setup();
    let mut ledger = load_ledger(&conn).unwrap();
    let olena = ledger.add_teacher("Olena").unwrap().id();
    let iryna = ledger.add_teacher("Iryna").unwrap().id();
    for id in [olena, iryna] {
        ledger
            .add_lesson(
                id,
                NewLesson {
                    date: date(2025, 5, 3),
                    duration_hours: dec("1"),
                    category: CategoryChoice::Label("Math".into()),
                    rate: Some(dec("100")),
                    paid: false,
                },
            )
            .unwrap();
        ledger
            .add_payment(
                id,
                NewPayment {
                    date: date(2025, 5, 3),
                    amount: dec("10"),
                    method: PaymentMethod::Cash,
                    note: None,
                },
            )
            .unwrap();
    }
    conn.save_all(ledger.teachers()).unwrap();

    ledger.delete_teacher(olena).unwrap();
    conn.save_all(ledger.teachers()).unwrap();

    let count = |table: &str| -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    };
    assert_eq!(count("teachers"), 1);
    assert_eq!(count("lessons"), 1);
    assert_eq!(count("payments"), 1);

    let reloaded = load_ledger(&conn).unwrap();
    assert!(reloaded.teacher(olena).is_err());
    assert_eq!(reloaded.teacher(iryna).unwrap().name(), "Iryna");
}

#[test]
fn teacher_order_is_kept() {
    let mut conn = setup();
    let mut ledger = load_ledger(&conn).unwrap();
    for name in ["Zoya", "Anna", "Maria"] {
        let t = ledger.add_teacher(name).unwrap();
        conn.save_teacher(t).unwrap();
    }
    let names: Vec<String> = load_ledger(&conn)
        .unwrap()
        .teachers()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, ["Zoya", "Anna", "Maria"]);
}

#[test]
fn corrupt_rows_are_reported_not_loaded() {
    let conn = setup();
    conn.execute(
        "INSERT INTO teachers(id, name, position) VALUES('not-a-uuid', 'Ghost', 0)",
        [],
    )
    .unwrap();
    let err = load_ledger(&conn).unwrap_err();
    assert!(err.to_string().contains("not-a-uuid"));
}

#[test]
fn currency_setting_is_validated() {
    let conn = setup();
    assert_eq!(get_currency(&conn).unwrap(), "UAH");
    set_setting(&conn, "currency", "eur").unwrap();
    assert_eq!(get_currency(&conn).unwrap(), "EUR");
    assert!(set_setting(&conn, "currency", "euro").is_err());
    assert!(set_setting(&conn, "colour", "blue").is_err());
    assert_eq!(get_currency(&conn).unwrap(), "EUR");
}
