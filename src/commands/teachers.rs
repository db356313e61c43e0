// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::calc::{monthly_totals, teacher_totals};
use crate::config::get_currency;
use crate::db::{Store, load_ledger};
use crate::ledger::Ledger;
use crate::period::{month_key, payments_in_month};
use crate::utils::{fmt_hours, fmt_money, maybe_print_json, pretty_table, resolve_teacher};

use super::reference_month;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rename", sub)) => rename(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("show", sub)) => show(conn, sub, today)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let mut ledger = load_ledger(conn)?;
    let teacher = ledger.add_teacher(name)?;
    conn.save_teacher(teacher)?;
    println!("Added teacher '{}' ({})", teacher.name(), teacher.id());
    Ok(())
}

fn rename(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let name = sub.get_one::<String>("name").unwrap();
    let mut ledger = load_ledger(conn)?;
    let id = resolve_teacher(&ledger, key)?.id();
    let teacher = ledger.rename_teacher(id, name)?;
    conn.save_teacher(teacher)?;
    println!("Renamed teacher to '{}'", teacher.name());
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let mut ledger = load_ledger(conn)?;
    let id = resolve_teacher(&ledger, key)?.id();
    let removed = ledger.delete_teacher(id)?;
    conn.save_all(ledger.teachers())?;
    println!(
        "Removed teacher '{}' with {} lessons and {} payments",
        removed.name(),
        removed.lessons().len(),
        removed.payments().len()
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TeacherRow {
    pub id: String,
    pub name: String,
    pub lessons: usize,
    pub payments: usize,
    pub earned: String,
    pub paid: String,
    pub balance: String,
}

pub fn teacher_rows(ledger: &Ledger) -> Vec<TeacherRow> {
    ledger
        .teachers()
        .iter()
        .map(|t| {
            let totals = teacher_totals(t);
            TeacherRow {
                id: t.id().to_string(),
                name: t.name().to_string(),
                lessons: t.lessons().len(),
                payments: t.payments().len(),
                earned: totals.total_earned.to_string(),
                paid: totals.total_paid.to_string(),
                balance: totals.current_balance.to_string(),
            }
        })
        .collect()
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = load_ledger(conn)?;
    let data = teacher_rows(&ledger);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.name,
                    r.lessons.to_string(),
                    r.payments.to_string(),
                    r.balance,
                    r.id,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Name", "Lessons", "Payments", "Balance", "Id"], rows)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let reference = reference_month(sub, today)?;
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let teacher = resolve_teacher(&ledger, key)?;

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), teacher)? {
        return Ok(());
    }

    let totals = teacher_totals(teacher);
    let month = monthly_totals(teacher, reference);
    println!("{} ({})", teacher.name(), teacher.id());
    println!(
        "{}",
        pretty_table(
            &["", "Earned", "Paid", "Balance"],
            vec![
                vec![
                    "All time".into(),
                    fmt_money(&totals.total_earned, &ccy),
                    fmt_money(&totals.total_paid, &ccy),
                    fmt_money(&totals.current_balance, &ccy),
                ],
                vec![
                    month_key(reference),
                    fmt_money(&month.earned, &ccy),
                    fmt_money(&month.paid, &ccy),
                    fmt_money(&month.balance, &ccy),
                ],
            ],
        )
    );

    let mut lessons: Vec<_> = teacher.lessons().iter().collect();
    lessons.sort_by(|a, b| b.date().cmp(&a.date()));
    let lesson_rows = lessons
        .into_iter()
        .map(|l| {
            vec![
                l.date().to_string(),
                l.category().display_label().to_string(),
                fmt_hours(&l.duration_hours()),
                fmt_money(&l.cost(), &ccy),
                if l.is_paid() { "yes".into() } else { "no".into() },
                l.id().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Type", "Hours", "Cost", "Paid", "Id"], lesson_rows)
    );

    let mut payments = payments_in_month(teacher.payments(), reference);
    payments.sort_by(|a, b| b.date().cmp(&a.date()));
    let payment_rows = payments
        .into_iter()
        .map(|p| {
            vec![
                p.date().to_string(),
                fmt_money(&p.amount(), &ccy),
                p.method().to_string(),
                p.note().unwrap_or_default().to_string(),
                p.id().to_string(),
            ]
        })
        .collect();
    println!(
        "Payments in {}:\n{}",
        month_key(reference),
        pretty_table(&["Date", "Amount", "Method", "Note", "Id"], payment_rows)
    );
    Ok(())
}
