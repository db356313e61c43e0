// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{Store, load_ledger};
use crate::ledger::{Ledger, NewPayment};
use crate::models::{PaymentEdit, PaymentId, PaymentMethod};
use crate::period::in_same_month;
use crate::utils::{
    maybe_print_json, parse_date, parse_decimal, parse_id, parse_month, pretty_table,
    resolve_teacher,
};

use super::date_or_today;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub, today)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let date = date_or_today(sub, today)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let method: PaymentMethod = sub.get_one::<String>("method").unwrap().parse()?;
    let note = sub.get_one::<String>("note").cloned();

    let mut ledger = load_ledger(conn)?;
    let teacher_id = resolve_teacher(&ledger, key)?.id();
    let teacher = ledger.add_payment(
        teacher_id,
        NewPayment {
            date,
            amount,
            method,
            note,
        },
    )?;
    conn.save_teacher(teacher)?;
    if let Some(p) = teacher.payments().last() {
        println!(
            "Recorded {} ({}) on {} from '{}' ({})",
            p.amount(),
            p.method(),
            p.date(),
            teacher.name(),
            p.id()
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: PaymentId = parse_id(sub.get_one::<String>("id").unwrap())?;
    let edit = PaymentEdit {
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        method: sub
            .get_one::<String>("method")
            .map(|s| s.parse::<PaymentMethod>())
            .transpose()?,
        note: sub.get_one::<String>("note").map(|s| Some(s.clone())),
    };

    let mut ledger = load_ledger(conn)?;
    let teacher = ledger.edit_payment(id, edit)?;
    conn.save_teacher(teacher)?;
    println!("Updated payment {}", id);
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: PaymentId = parse_id(sub.get_one::<String>("id").unwrap())?;
    let mut ledger = load_ledger(conn)?;
    let teacher = ledger.delete_payment(id)?;
    conn.save_teacher(teacher)?;
    println!("Removed payment {}", id);
    Ok(())
}

#[derive(Serialize)]
pub struct PaymentRow {
    pub id: String,
    pub date: String,
    pub teacher: String,
    pub amount: String,
    pub method: String,
    pub note: String,
}

pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Vec<PaymentRow>> {
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let teachers = match sub.get_one::<String>("teacher") {
        Some(key) => vec![resolve_teacher(ledger, key)?],
        None => ledger.teachers().iter().collect(),
    };

    let mut data = Vec::new();
    for teacher in teachers {
        for p in teacher.payments() {
            if month.is_some_and(|m| !in_same_month(p.date(), m)) {
                continue;
            }
            data.push((
                p.date(),
                PaymentRow {
                    id: p.id().to_string(),
                    date: p.date().to_string(),
                    teacher: teacher.name().to_string(),
                    amount: p.amount().to_string(),
                    method: p.method().to_string(),
                    note: p.note().unwrap_or_default().to_string(),
                },
            ));
        }
    }
    data.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(data.into_iter().map(|(_, row)| row).collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = load_ledger(conn)?;
    let data = query_rows(&ledger, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.teacher.clone(),
                    r.amount.clone(),
                    r.method.clone(),
                    r.note.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Teacher", "Amount", "Method", "Note", "Id"], rows)
        );
    }
    Ok(())
}
