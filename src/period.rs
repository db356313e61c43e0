// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar-month matching and reporting periods.
//!
//! Every monthly view in the crate goes through [`in_same_month`], so the
//! numbers a report shows and the lessons a bulk action touches always agree.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Lesson, Payment};

/// True iff both dates share calendar year and month.
pub fn in_same_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Last day of the calendar month before the one containing `now`.
pub fn previous_month(now: NaiveDate) -> NaiveDate {
    month_start(now) - Days::new(1)
}

/// `YYYY-MM` label for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn lessons_in_month(lessons: &[Lesson], reference: NaiveDate) -> Vec<&Lesson> {
    lessons
        .iter()
        .filter(|l| in_same_month(l.date(), reference))
        .collect()
}

pub fn payments_in_month(payments: &[Payment], reference: NaiveDate) -> Vec<&Payment> {
    payments
        .iter()
        .filter(|p| in_same_month(p.date(), reference))
        .collect()
}

/// A reporting window: a whole calendar month, or an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Month { reference: NaiveDate },
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn month(reference: NaiveDate) -> Self {
        Period::Month { reference }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        if start > end {
            return Err(LedgerError::invalid(format!(
                "Period start {} is after end {}",
                start, end
            )));
        }
        Ok(Period::Range { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Period::Month { reference } => in_same_month(date, reference),
            Period::Range { start, end } => start <= date && date <= end,
        }
    }

    pub fn label(&self) -> String {
        match *self {
            Period::Month { reference } => month_key(reference),
            Period::Range { start, end } => {
                format!("{} - {}", start.format("%d.%m.%y"), end.format("%d.%m.%y"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_month_ignores_day_of_month() {
        assert!(in_same_month(date(2025, 1, 1), date(2025, 1, 31)));
        assert!(!in_same_month(date(2025, 1, 31), date(2025, 2, 1)));
        assert!(!in_same_month(date(2024, 1, 15), date(2025, 1, 15)));
    }

    #[test]
    fn previous_month_rolls_over_year_and_short_months() {
        assert_eq!(previous_month(date(2025, 1, 10)), date(2024, 12, 31));
        assert_eq!(previous_month(date(2025, 3, 31)), date(2025, 2, 28));
        assert_eq!(previous_month(date(2024, 3, 1)), date(2024, 2, 29));
        assert_eq!(month_start(date(2024, 2, 29)), date(2024, 2, 1));
    }

    #[test]
    fn range_is_inclusive_and_ordered() {
        let p = Period::range(date(2025, 1, 10), date(2025, 1, 20)).unwrap();
        assert!(p.contains(date(2025, 1, 10)));
        assert!(p.contains(date(2025, 1, 20)));
        assert!(!p.contains(date(2025, 1, 21)));
        assert!(Period::range(date(2025, 2, 1), date(2025, 1, 1)).is_err());
        assert_eq!(p.label(), "10.01.25 - 20.01.25");
    }
}
