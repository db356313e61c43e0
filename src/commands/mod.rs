// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod teachers;
pub mod lessons;
pub mod payments;
pub mod types;
pub mod reports;
pub mod exporter;
pub mod settings;

use anyhow::Result;
use chrono::NaiveDate;

use crate::utils::{parse_date, parse_month};

/// The date commands treat as "now": `--today` if given, else the local clock.
pub fn today(m: &clap::ArgMatches) -> Result<NaiveDate> {
    match m.get_one::<String>("today") {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// `--month` if given, else the month containing `today`.
pub(crate) fn reference_month(sub: &clap::ArgMatches, today: NaiveDate) -> Result<NaiveDate> {
    match sub.get_one::<String>("month") {
        Some(s) => parse_month(s),
        None => Ok(today),
    }
}

pub(crate) fn date_or_today(sub: &clap::ArgMatches, today: NaiveDate) -> Result<NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(s) => parse_date(s),
        None => Ok(today),
    }
}
