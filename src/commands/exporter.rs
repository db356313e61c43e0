// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

use crate::db::load_ledger;
use crate::ledger::Ledger;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let ledger = load_ledger(conn)?;
    match m.subcommand() {
        Some(("lessons", sub)) => export_lessons(&ledger, sub),
        Some(("payments", sub)) => export_payments(&ledger, sub),
        _ => Ok(()),
    }
}

fn output_format(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    match fmt.as_str() {
        "csv" | "json" => Ok(fmt),
        _ => Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
}

fn export_lessons(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = output_format(sub)?;
    let out = sub.get_one::<String>("out").unwrap();

    let mut lessons: Vec<_> = ledger
        .teachers()
        .iter()
        .flat_map(|t| t.lessons().iter().map(move |l| (t.name(), l)))
        .collect();
    lessons.sort_by_key(|(_, l)| l.date());

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "teacher", "type", "hours", "rate", "cost", "paid", "id",
            ])?;
            for (teacher, l) in &lessons {
                wtr.write_record([
                    l.date().to_string(),
                    teacher.to_string(),
                    l.category().display_label().to_string(),
                    l.duration_hours().to_string(),
                    l.rate_applied().to_string(),
                    l.cost().to_string(),
                    l.is_paid().to_string(),
                    l.id().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = lessons
                .iter()
                .map(|(teacher, l)| {
                    json!({
                        "date": l.date(), "teacher": teacher, "type": l.category().display_label(),
                        "hours": l.duration_hours(), "rate": l.rate_applied(), "cost": l.cost(),
                        "paid": l.is_paid(), "id": l.id()
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} lessons to {}", lessons.len(), out);
    Ok(())
}

fn export_payments(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = output_format(sub)?;
    let out = sub.get_one::<String>("out").unwrap();

    let mut payments: Vec<_> = ledger
        .teachers()
        .iter()
        .flat_map(|t| t.payments().iter().map(move |p| (t.name(), p)))
        .collect();
    payments.sort_by_key(|(_, p)| p.date());

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "teacher", "amount", "method", "note", "id"])?;
            for (teacher, p) in &payments {
                wtr.write_record([
                    p.date().to_string(),
                    teacher.to_string(),
                    p.amount().to_string(),
                    p.method().to_string(),
                    p.note().unwrap_or_default().to_string(),
                    p.id().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = payments
                .iter()
                .map(|(teacher, p)| {
                    json!({
                        "date": p.date(), "teacher": teacher, "amount": p.amount(),
                        "method": p.method(), "note": p.note(), "id": p.id()
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} payments to {}", payments.len(), out);
    Ok(())
}
