// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calc::{PeriodSummary, monthly_totals, period_summary, teacher_totals, unpaid_summary};
use crate::config::get_currency;
use crate::db::load_ledger;
use crate::grouping::{
    MethodBreakdown, TypeTotal, group_lessons_by_type, group_payments_by_calendar_month,
    lessons_in_month_across, months_newest_first, overall_breakdown, sort_by_cost_desc,
};
use crate::ledger::Ledger;
use crate::models::{PaymentMethod, Teacher};
use crate::period::{Period, month_key};
use crate::utils::{
    fmt_hours, fmt_money, maybe_print_json, parse_date, pretty_table, resolve_teacher,
};

use super::reference_month;

pub fn handle(conn: &Connection, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("balance", sub)) => balance(conn, sub)?,
        Some(("month", sub)) => month(conn, sub, today)?,
        Some(("stats", sub)) => stats(conn, sub, today)?,
        Some(("history", sub)) => history(conn, sub)?,
        Some(("unpaid", sub)) => unpaid(conn, sub)?,
        Some(("monthly-lessons", sub)) => monthly_lessons(conn, sub, today)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub teacher: String,
    pub total_earned: Decimal,
    pub total_paid: Decimal,
    pub current_balance: Decimal,
}

pub fn balance_rows(ledger: &Ledger) -> Vec<BalanceRow> {
    ledger
        .teachers()
        .iter()
        .map(|t| {
            let totals = teacher_totals(t);
            BalanceRow {
                teacher: t.name().to_string(),
                total_earned: totals.total_earned,
                total_paid: totals.total_paid,
                current_balance: totals.current_balance,
            }
        })
        .collect()
}

fn balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let data = balance_rows(&ledger);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.teacher.clone(),
                    fmt_money(&r.total_earned, &ccy),
                    fmt_money(&r.total_paid, &ccy),
                    fmt_money(&r.current_balance, &ccy),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Teacher", "Earned", "Paid", "Balance"], rows)
        );
    }
    Ok(())
}

fn month(conn: &Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let reference = reference_month(sub, today)?;
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let teacher = resolve_teacher(&ledger, key)?;
    let totals = monthly_totals(teacher, reference);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        println!(
            "{}",
            pretty_table(
                &["Month", "Earned", "Paid", "Balance"],
                vec![vec![
                    month_key(reference),
                    fmt_money(&totals.earned, &ccy),
                    fmt_money(&totals.paid, &ccy),
                    fmt_money(&totals.balance, &ccy),
                ]],
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub teacher: String,
    pub period: Period,
    pub summary: PeriodSummary,
    pub by_type: Vec<TypeTotal>,
}

pub fn stats_report(teacher: &Teacher, period: Period) -> StatsReport {
    let lessons = teacher.lessons().iter().filter(|l| period.contains(l.date()));
    let mut by_type = group_lessons_by_type(lessons);
    sort_by_cost_desc(&mut by_type);
    StatsReport {
        teacher: teacher.name().to_string(),
        period,
        summary: period_summary(teacher, &period),
        by_type,
    }
}

fn stats(conn: &Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let period = match (sub.get_one::<String>("from"), sub.get_one::<String>("to")) {
        (Some(from), Some(to)) => Period::range(parse_date(from)?, parse_date(to)?)?,
        _ => Period::month(reference_month(sub, today)?),
    };
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let teacher = resolve_teacher(&ledger, key)?;
    let report = stats_report(teacher, period);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let s = &report.summary;
    println!("{} / {}", report.teacher, report.period.label());
    println!(
        "{}",
        pretty_table(
            &["Earned", "Paid", "Balance", "Hours", "Lessons", "Payments"],
            vec![vec![
                fmt_money(&s.earned, &ccy),
                fmt_money(&s.paid, &ccy),
                fmt_money(&s.balance, &ccy),
                fmt_hours(&s.hours),
                s.lesson_count.to_string(),
                s.payment_count.to_string(),
            ]],
        )
    );
    let rows = report
        .by_type
        .iter()
        .map(|g| {
            vec![
                g.label.clone(),
                fmt_money(&g.cost, &ccy),
                fmt_hours(&g.hours),
                g.lessons.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Type", "Cost", "Hours", "Lessons"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HistoryRow {
    pub month: String,
    pub date: String,
    pub teacher: String,
    pub amount: String,
    pub method: String,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryMonth {
    pub month: String,
    pub breakdown: MethodBreakdown,
    pub total: String,
    pub payments: Vec<HistoryRow>,
}

#[derive(Debug, Serialize)]
pub struct History {
    pub overall: MethodBreakdown,
    pub total: String,
    pub months: Vec<HistoryMonth>,
}

/// Transaction history across teachers, newest month first.
pub fn history_report(ledger: &Ledger) -> History {
    let groups = group_payments_by_calendar_month(ledger.teachers());
    let months = months_newest_first(&groups)
        .map(|g| HistoryMonth {
            month: month_key(g.month),
            breakdown: g.breakdown(),
            total: g.total().to_string(),
            payments: g
                .entries
                .iter()
                .map(|e| HistoryRow {
                    month: month_key(g.month),
                    date: e.payment.date().to_string(),
                    teacher: e.teacher_name.to_string(),
                    amount: e.payment.amount().to_string(),
                    method: e.payment.method().to_string(),
                    note: e.payment.note().unwrap_or_default().to_string(),
                })
                .collect(),
        })
        .collect();
    let overall = overall_breakdown(ledger.teachers());
    History {
        overall,
        total: overall.total().to_string(),
        months,
    }
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let report = history_report(&ledger);
    if sub.get_flag("jsonl") {
        let rows: Vec<&HistoryRow> = report.months.iter().flat_map(|m| &m.payments).collect();
        maybe_print_json(false, true, &rows)?;
        return Ok(());
    }
    if maybe_print_json(sub.get_flag("json"), false, &report)? {
        return Ok(());
    }

    let breakdown_line = |b: &MethodBreakdown| {
        PaymentMethod::ALL
            .iter()
            .filter(|m| !b.get(**m).is_zero())
            .map(|m| format!("{} {}", m, fmt_money(&b.get(*m), &ccy)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!(
        "Received in total: {} ({})",
        fmt_money(&report.overall.total(), &ccy),
        breakdown_line(&report.overall)
    );
    if report.months.is_empty() {
        println!("No payments recorded yet");
        return Ok(());
    }
    for m in &report.months {
        let rows = m
            .payments
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.teacher.clone(),
                    r.amount.clone(),
                    r.method.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!("{}: {}", m.month, breakdown_line(&m.breakdown));
        println!(
            "{}",
            pretty_table(&["Date", "Teacher", "Amount", "Method", "Note"], rows)
        );
    }
    Ok(())
}

fn unpaid(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("teacher").unwrap();
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let teacher = resolve_teacher(&ledger, key)?;
    let s = unpaid_summary(teacher);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!(
            "{}",
            pretty_table(
                &["Unpaid hours", "Unpaid amount", "Paid amount"],
                vec![vec![
                    fmt_hours(&s.unpaid_hours),
                    fmt_money(&s.unpaid_amount, &ccy),
                    fmt_money(&s.paid_amount, &ccy),
                ]],
            )
        );
    }
    Ok(())
}

fn monthly_lessons(conn: &Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let reference = reference_month(sub, today)?;
    let ccy = get_currency(conn)?;
    let ledger = load_ledger(conn)?;
    let entries = lessons_in_month_across(ledger.teachers(), reference);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
        return Ok(());
    }
    if entries.is_empty() {
        println!("No lessons in {}", month_key(reference));
        return Ok(());
    }
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.lesson.date().to_string(),
                e.teacher_name.to_string(),
                e.lesson.category().display_label().to_string(),
                fmt_hours(&e.lesson.duration_hours()),
                fmt_money(&e.lesson.cost(), &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Teacher", "Type", "Hours", "Cost"], rows)
    );
    Ok(())
}
