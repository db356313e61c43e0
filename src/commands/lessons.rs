// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{Store, load_ledger};
use crate::ledger::{CategoryChoice, Ledger, NewLesson};
use crate::models::{LessonEdit, LessonId};
use crate::period::in_same_month;
use crate::utils::{
    maybe_print_json, parse_bool, parse_date, parse_decimal, parse_id, parse_month, pretty_table,
    resolve_lesson_type, resolve_teacher,
};

use super::date_or_today;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub, today)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("paid", sub)) => set_paid(conn, sub)?,
        Some(("mark-prev-month", sub)) => mark_prev_month(conn, sub, today)?,
        _ => {}
    }
    Ok(())
}

fn category_choice(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Option<CategoryChoice>> {
    if let Some(key) = sub.get_one::<String>("type") {
        let lesson_type = resolve_lesson_type(ledger, key)?;
        return Ok(Some(CategoryChoice::Type(lesson_type.id())));
    }
    Ok(sub
        .get_one::<String>("label")
        .map(|l| CategoryChoice::Label(l.trim().to_string())))
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let date = date_or_today(sub, today)?;
    let hours = parse_decimal(sub.get_one::<String>("hours").unwrap())?;
    let rate = sub
        .get_one::<String>("rate")
        .map(|s| parse_decimal(s))
        .transpose()?;

    let mut ledger = load_ledger(conn)?;
    let teacher_id = resolve_teacher(&ledger, key)?.id();
    let category = category_choice(&ledger, sub)?
        .ok_or_else(|| anyhow!("Pass either --type or --label"))?;

    let teacher = ledger.add_lesson(
        teacher_id,
        NewLesson {
            date,
            duration_hours: hours,
            category,
            rate,
            paid: sub.get_flag("paid"),
        },
    )?;
    conn.save_teacher(teacher)?;
    if let Some(lesson) = teacher.lessons().last() {
        println!(
            "Logged {} h of {} on {} at {} = {} for '{}' ({})",
            lesson.duration_hours(),
            lesson.category(),
            lesson.date(),
            lesson.rate_applied(),
            lesson.cost(),
            teacher.name(),
            lesson.id()
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: LessonId = parse_id(sub.get_one::<String>("id").unwrap())?;
    let mut ledger = load_ledger(conn)?;

    let category = match category_choice(&ledger, sub)? {
        Some(choice) => Some(ledger.resolve_category(&choice)?),
        None => None,
    };
    let edit = LessonEdit {
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        duration_hours: sub
            .get_one::<String>("hours")
            .map(|s| parse_decimal(s))
            .transpose()?,
        category,
        rate_applied: sub
            .get_one::<String>("rate")
            .map(|s| parse_decimal(s))
            .transpose()?,
        paid: sub.get_one::<String>("paid").map(|s| parse_bool(s)).transpose()?,
    };

    let teacher = ledger.edit_lesson(id, edit)?;
    conn.save_teacher(teacher)?;
    println!("Updated lesson {}", id);
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: LessonId = parse_id(sub.get_one::<String>("id").unwrap())?;
    let mut ledger = load_ledger(conn)?;
    let teacher = ledger.delete_lesson(id)?;
    conn.save_teacher(teacher)?;
    println!("Removed lesson {}", id);
    Ok(())
}

fn set_paid(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: LessonId = parse_id(sub.get_one::<String>("id").unwrap())?;
    let paid = !sub.get_flag("undo");
    let mut ledger = load_ledger(conn)?;
    let teacher = ledger.set_lesson_paid(id, paid)?;
    conn.save_teacher(teacher)?;
    println!(
        "Lesson {} marked {}",
        id,
        if paid { "paid" } else { "unpaid" }
    );
    Ok(())
}

fn mark_prev_month(conn: &mut Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let mut ledger = load_ledger(conn)?;
    let teacher_id = resolve_teacher(&ledger, key)?.id();
    let (changed, teacher) = ledger.mark_previous_month_paid(teacher_id, today)?;
    // The whole mutated record goes out in one transaction
    conn.save_teacher(teacher)?;
    println!("Marked {} lessons of '{}' as paid", changed, teacher.name());
    Ok(())
}

#[derive(Serialize)]
pub struct LessonRow {
    pub id: String,
    pub date: String,
    pub teacher: String,
    pub lesson_type: String,
    pub hours: String,
    pub rate: String,
    pub cost: String,
    pub paid: bool,
}

pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Vec<LessonRow>> {
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let unpaid_only = sub.get_flag("unpaid");
    let teachers = match sub.get_one::<String>("teacher") {
        Some(key) => vec![resolve_teacher(ledger, key)?],
        None => ledger.teachers().iter().collect(),
    };

    let mut data = Vec::new();
    for teacher in teachers {
        for lesson in teacher.lessons() {
            if month.is_some_and(|m| !in_same_month(lesson.date(), m)) {
                continue;
            }
            if unpaid_only && lesson.is_paid() {
                continue;
            }
            data.push((
                lesson.date(),
                LessonRow {
                    id: lesson.id().to_string(),
                    date: lesson.date().to_string(),
                    teacher: teacher.name().to_string(),
                    lesson_type: lesson.category().display_label().to_string(),
                    hours: lesson.duration_hours().to_string(),
                    rate: lesson.rate_applied().to_string(),
                    cost: lesson.cost().to_string(),
                    paid: lesson.is_paid(),
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
                    r.lesson_type.clone(),
                    r.hours.clone(),
                    r.rate.clone(),
                    r.cost.clone(),
                    if r.paid { "yes".into() } else { "no".into() },
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Teacher", "Type", "Hours", "Rate", "Cost", "Paid", "Id"],
                rows,
            )
        );
    }
    Ok(())
}
