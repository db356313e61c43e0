// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::DB_PATH_ENV;
use crate::ledger::Ledger;
use crate::models::{
    Lesson, LessonCategory, LessonId, LessonType, LessonTypeId, Payment, PaymentId, PaymentMethod,
    Teacher, TeacherId,
};
use crate::registry::LessonTypeRegistry;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Lessonbook", "lessonbook"));

/// Persistence collaborator. Every save is a single transaction, so a reader
/// never sees half of a mutated teacher.
pub trait Store {
    fn load_all(&self) -> Result<(Vec<Teacher>, Vec<LessonType>)>;
    fn save_all(&mut self, teachers: &[Teacher]) -> Result<()>;
    fn save_types(&mut self, types: &[LessonType]) -> Result<()>;
    fn save_teacher(&mut self, teacher: &Teacher) -> Result<()>;
}

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_PATH_ENV) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("lessonbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS teachers(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        position INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS lessons(
        id TEXT PRIMARY KEY,
        teacher_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        date TEXT NOT NULL,
        duration_hours TEXT NOT NULL,
        type_id TEXT,           -- NULL for free-text lessons
        label TEXT NOT NULL,    -- label captured when the lesson was written
        rate_applied TEXT NOT NULL,
        paid INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(teacher_id) REFERENCES teachers(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_lessons_date ON lessons(date);

    CREATE TABLE IF NOT EXISTS payments(
        id TEXT PRIMARY KEY,
        teacher_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        method TEXT NOT NULL CHECK(method IN ('card','cash','other')),
        note TEXT,
        FOREIGN KEY(teacher_id) REFERENCES teachers(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_payments_date ON payments(date);

    CREATE TABLE IF NOT EXISTS lesson_types(
        id TEXT PRIMARY KEY,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        default_rate TEXT NOT NULL
    );
    "#,
    )?;

    // Seed the built-in types once; a user who later removes them all keeps an
    // empty catalog.
    let seeded: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='types_seeded'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    if seeded.is_none() {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM lesson_types", [], |r| r.get(0))?;
        if count == 0 {
            let defaults = LessonTypeRegistry::with_defaults();
            conn.save_types(defaults.as_slice())?;
            info!(types = defaults.len(), "seeded default lesson types");
        }
        conn.execute(
            "INSERT INTO settings(key, value) VALUES('types_seeded', '1')",
            [],
        )?;
    }
    Ok(())
}

/// Loads the whole book into memory.
pub fn load_ledger(store: &impl Store) -> Result<Ledger> {
    let (teachers, types) = store.load_all()?;
    Ok(Ledger::new(teachers, LessonTypeRegistry::new(types)))
}

fn parse_stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, s))
}

fn load_lessons(conn: &Connection, teacher_id: &str) -> Result<Vec<Lesson>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, duration_hours, type_id, label, rate_applied, paid
         FROM lessons WHERE teacher_id=?1 ORDER BY position",
    )?;
    let mut rows = stmt.query(params![teacher_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: String = r.get(0)?;
        let date: NaiveDate = r.get(1)?;
        let duration: String = r.get(2)?;
        let type_id: Option<String> = r.get(3)?;
        let label: String = r.get(4)?;
        let rate: String = r.get(5)?;
        let paid: bool = r.get(6)?;

        let category = match type_id {
            Some(tid) => LessonCategory::Typed {
                id: tid
                    .parse::<LessonTypeId>()
                    .with_context(|| format!("Invalid lesson type id '{}'", tid))?,
                name: label,
            },
            None => LessonCategory::free_text(&label)?,
        };
        let lesson = Lesson::from_parts(
            id.parse::<LessonId>()
                .with_context(|| format!("Invalid lesson id '{}'", id))?,
            date,
            parse_stored_decimal(&duration, "duration")?,
            category,
            parse_stored_decimal(&rate, "rate")?,
            paid,
        )
        .with_context(|| format!("Lesson {} failed validation", id))?;
        out.push(lesson);
    }
    Ok(out)
}

fn load_payments(conn: &Connection, teacher_id: &str) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, amount, method, note FROM payments WHERE teacher_id=?1 ORDER BY position",
    )?;
    let mut rows = stmt.query(params![teacher_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: String = r.get(0)?;
        let date: NaiveDate = r.get(1)?;
        let amount: String = r.get(2)?;
        let method: String = r.get(3)?;
        let note: Option<String> = r.get(4)?;
        let payment = Payment::from_parts(
            id.parse::<PaymentId>()
                .with_context(|| format!("Invalid payment id '{}'", id))?,
            date,
            parse_stored_decimal(&amount, "amount")?,
            method.parse::<PaymentMethod>()?,
            note,
        )
        .with_context(|| format!("Payment {} failed validation", id))?;
        out.push(payment);
    }
    Ok(out)
}

fn write_teacher(conn: &Connection, teacher: &Teacher) -> Result<()> {
    let tid = teacher.id().to_string();
    conn.execute(
        "INSERT INTO teachers(id, name, position)
         VALUES (?1, ?2, (SELECT IFNULL(MAX(position), -1) + 1 FROM teachers))
         ON CONFLICT(id) DO UPDATE SET name=excluded.name",
        params![tid, teacher.name()],
    )?;
    conn.execute("DELETE FROM lessons WHERE teacher_id=?1", params![tid])?;
    conn.execute("DELETE FROM payments WHERE teacher_id=?1", params![tid])?;

    let mut insert_lesson = conn.prepare_cached(
        "INSERT INTO lessons(id, teacher_id, position, date, duration_hours, type_id, label, rate_applied, paid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for (pos, l) in teacher.lessons().iter().enumerate() {
        insert_lesson.execute(params![
            l.id().to_string(),
            tid,
            pos as i64,
            l.date(),
            l.duration_hours().to_string(),
            l.category().type_id().map(|id| id.to_string()),
            l.category().display_label(),
            l.rate_applied().to_string(),
            l.is_paid(),
        ])?;
    }

    let mut insert_payment = conn.prepare_cached(
        "INSERT INTO payments(id, teacher_id, position, date, amount, method, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (pos, p) in teacher.payments().iter().enumerate() {
        insert_payment.execute(params![
            p.id().to_string(),
            tid,
            pos as i64,
            p.date(),
            p.amount().to_string(),
            p.method().as_str(),
            p.note(),
        ])?;
    }
    Ok(())
}

impl Store for Connection {
    fn load_all(&self) -> Result<(Vec<Teacher>, Vec<LessonType>)> {
        let mut types = Vec::new();
        let mut stmt =
            self.prepare("SELECT id, name, default_rate FROM lesson_types ORDER BY position")?;
        let mut rows = stmt.query([])?;
        while let Some(r) = rows.next()? {
            let id: String = r.get(0)?;
            let name: String = r.get(1)?;
            let rate: String = r.get(2)?;
            let lesson_type = LessonType::from_parts(
                id.parse::<LessonTypeId>()
                    .with_context(|| format!("Invalid lesson type id '{}'", id))?,
                &name,
                parse_stored_decimal(&rate, "default rate")?,
            )?;
            types.push(lesson_type);
        }

        let mut teachers = Vec::new();
        let mut stmt = self.prepare("SELECT id, name FROM teachers ORDER BY position")?;
        let mut rows = stmt.query([])?;
        while let Some(r) = rows.next()? {
            let id: String = r.get(0)?;
            let name: String = r.get(1)?;
            let teacher = Teacher::from_parts(
                id.parse::<TeacherId>()
                    .with_context(|| format!("Invalid teacher id '{}'", id))?,
                &name,
                load_lessons(self, &id)?,
                load_payments(self, &id)?,
            )?;
            teachers.push(teacher);
        }
        debug!(teachers = teachers.len(), types = types.len(), "loaded book");
        Ok((teachers, types))
    }

    fn save_all(&mut self, teachers: &[Teacher]) -> Result<()> {
        let tx = self.transaction()?;
        tx.execute("DELETE FROM lessons", [])?;
        tx.execute("DELETE FROM payments", [])?;
        tx.execute("DELETE FROM teachers", [])?;
        for teacher in teachers {
            write_teacher(&tx, teacher)?;
        }
        tx.commit()?;
        debug!(teachers = teachers.len(), "saved all teachers");
        Ok(())
    }

    fn save_types(&mut self, types: &[LessonType]) -> Result<()> {
        let tx = self.transaction()?;
        tx.execute("DELETE FROM lesson_types", [])?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO lesson_types(id, position, name, default_rate) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (pos, t) in types.iter().enumerate() {
                insert.execute(params![
                    t.id().to_string(),
                    pos as i64,
                    t.name(),
                    t.default_rate().to_string()
                ])?;
            }
        }
        tx.commit()?;
        debug!(types = types.len(), "saved lesson types");
        Ok(())
    }

    fn save_teacher(&mut self, teacher: &Teacher) -> Result<()> {
        let tx = self.transaction()?;
        write_teacher(&tx, teacher)?;
        tx.commit()?;
        debug!(teacher = %teacher.id(), "saved teacher");
        Ok(())
    }
}
