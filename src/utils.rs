// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;

use crate::ledger::Ledger;
use crate::models::{LessonType, LessonTypeId, Teacher, TeacherId};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s.trim()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s.trim()))
}

pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid flag '{}', expected true|false", other)),
    }
}

pub fn parse_id<T>(s: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.trim()
        .parse::<T>()
        .with_context(|| format!("Invalid id '{}'", s.trim()))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d.round_dp(2), ccy)
}

pub fn fmt_hours(d: &Decimal) -> String {
    format!("{:.1}", d.round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

fn not_found(kind: &str, key: impl Display) -> anyhow::Error {
    anyhow::anyhow!("{} '{}' not found", kind, key)
}

/// Looks a teacher up by id first, then by exact name.
pub fn resolve_teacher<'a>(ledger: &'a Ledger, key: &str) -> Result<&'a Teacher> {
    let key = key.trim();
    if let Ok(id) = key.parse::<TeacherId>() {
        if let Ok(t) = ledger.teacher(id) {
            return Ok(t);
        }
    }
    ledger
        .find_teacher_by_name(key)
        .map_err(|_| not_found("Teacher", key))
}

pub fn resolve_lesson_type<'a>(ledger: &'a Ledger, key: &str) -> Result<&'a LessonType> {
    let key = key.trim();
    if let Ok(id) = key.parse::<LessonTypeId>() {
        if let Some(t) = ledger.types().get(id) {
            return Ok(t);
        }
    }
    ledger
        .types()
        .find_by_name(key)
        .ok_or_else(|| not_found("Lesson type", key))
}
