// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::path::PathBuf;

/// Overrides the database location.
pub const DB_PATH_ENV: &str = "LESSONBOOK_DB";
/// Standard `tracing` filter variable.
pub const LOG_ENV: &str = "RUST_LOG";

pub const DEFAULT_CURRENCY: &str = "UAH";

pub const KEY_CURRENCY: &str = "currency";

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("static regex"));

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = validate(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn validate(key: &str, value: &str) -> Result<String> {
    match key {
        KEY_CURRENCY => {
            let ccy = value.trim().to_uppercase();
            if !CURRENCY_RE.is_match(&ccy) {
                return Err(anyhow!(
                    "Invalid currency code '{}', expected three letters like UAH",
                    value.trim()
                ));
            }
            Ok(ccy)
        }
        other => Err(anyhow!("Unknown setting '{}' (known: {})", other, KEY_CURRENCY)),
    }
}

/// Display currency; amounts themselves are never converted.
pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, KEY_CURRENCY)?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub db_path: PathBuf,
    pub currency: String,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            db_path: crate::db::db_path()?,
            currency: get_currency(conn)?,
            log_filter: std::env::var(LOG_ENV).ok(),
        })
    }
}
