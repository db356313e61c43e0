// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, LedgerResult};
use crate::period::in_same_month;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

record_id!(
    /// Identity of a [`Teacher`].
    TeacherId
);
record_id!(
    /// Identity of a [`Lesson`].
    LessonId
);
record_id!(
    /// Identity of a [`Payment`].
    PaymentId
);
record_id!(
    /// Identity of a [`LessonType`].
    LessonTypeId
);

/// Longest lesson accepted, in hours.
pub const MAX_LESSON_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);
/// Largest hourly rate or payment amount accepted. Keeps every product and
/// running total far inside `Decimal`'s range.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn require_positive(value: Decimal, what: &str, max: Decimal) -> LedgerResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "{} must be greater than zero, got {}",
            what, value
        )));
    }
    if value > max {
        return Err(LedgerError::invalid(format!(
            "{} must not exceed {}, got {}",
            what, max, value
        )));
    }
    Ok(value)
}

fn require_name(name: &str, what: &str) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid(format!("{} must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    #[default]
    Cash,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Card, PaymentMethod::Cash, PaymentMethod::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            "other" => Ok(PaymentMethod::Other),
            other => Err(LedgerError::invalid(format!(
                "Unknown payment method '{}' (use card|cash|other)",
                other
            ))),
        }
    }
}

/// Reusable lesson category with a suggested hourly rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonType {
    id: LessonTypeId,
    name: String,
    default_rate: Decimal,
}

impl LessonType {
    pub fn new(name: &str, default_rate: Decimal) -> LedgerResult<Self> {
        Self::from_parts(LessonTypeId::new(), name, default_rate)
    }

    pub fn from_parts(id: LessonTypeId, name: &str, default_rate: Decimal) -> LedgerResult<Self> {
        let name = require_name(name, "Lesson type name")?;
        if default_rate < Decimal::ZERO || default_rate > MAX_MONEY {
            return Err(LedgerError::invalid(format!(
                "Default rate must be between 0 and {}, got {}",
                MAX_MONEY, default_rate
            )));
        }
        Ok(Self {
            id,
            name,
            default_rate,
        })
    }

    pub fn id(&self) -> LessonTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    pub(crate) fn update(&mut self, name: Option<&str>, default_rate: Option<Decimal>) -> LedgerResult<()> {
        let next = Self::from_parts(
            self.id,
            name.unwrap_or(&self.name),
            default_rate.unwrap_or(self.default_rate),
        )?;
        *self = next;
        Ok(())
    }
}

/// What kind of lesson was given.
///
/// Older records only carry a free-text label; newer ones point at a
/// [`LessonType`] and keep the type's name as it was when the lesson was
/// written, so removing or renaming the type later leaves history intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonCategory {
    FreeText(String),
    Typed { id: LessonTypeId, name: String },
}

impl LessonCategory {
    pub fn free_text(label: &str) -> LedgerResult<Self> {
        Ok(LessonCategory::FreeText(require_name(label, "Lesson label")?))
    }

    pub fn from_type(lesson_type: &LessonType) -> Self {
        LessonCategory::Typed {
            id: lesson_type.id(),
            name: lesson_type.name().to_string(),
        }
    }

    pub fn display_label(&self) -> &str {
        match self {
            LessonCategory::FreeText(label) => label,
            LessonCategory::Typed { name, .. } => name,
        }
    }

    pub fn type_id(&self) -> Option<LessonTypeId> {
        match self {
            LessonCategory::FreeText(_) => None,
            LessonCategory::Typed { id, .. } => Some(*id),
        }
    }
}

impl fmt::Display for LessonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    id: LessonId,
    date: NaiveDate,
    duration_hours: Decimal,
    category: LessonCategory,
    rate_applied: Decimal,
    paid: bool,
}

/// Field changes for an existing lesson; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct LessonEdit {
    pub date: Option<NaiveDate>,
    pub duration_hours: Option<Decimal>,
    pub category: Option<LessonCategory>,
    pub rate_applied: Option<Decimal>,
    pub paid: Option<bool>,
}

impl Lesson {
    pub fn new(
        date: NaiveDate,
        duration_hours: Decimal,
        category: LessonCategory,
        rate_applied: Decimal,
    ) -> LedgerResult<Self> {
        Self::from_parts(LessonId::new(), date, duration_hours, category, rate_applied, false)
    }

    pub fn from_parts(
        id: LessonId,
        date: NaiveDate,
        duration_hours: Decimal,
        category: LessonCategory,
        rate_applied: Decimal,
        paid: bool,
    ) -> LedgerResult<Self> {
        let duration_hours = require_positive(duration_hours, "Lesson duration", MAX_LESSON_HOURS)?;
        let rate_applied = require_positive(rate_applied, "Hourly rate", MAX_MONEY)?;
        if duration_hours.checked_mul(rate_applied).is_none() {
            return Err(LedgerError::invalid(format!(
                "Lesson cost {} x {} is out of range",
                duration_hours, rate_applied
            )));
        }
        Ok(Self {
            id,
            date,
            duration_hours,
            category,
            rate_applied,
            paid,
        })
    }

    pub fn id(&self) -> LessonId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn duration_hours(&self) -> Decimal {
        self.duration_hours
    }

    pub fn category(&self) -> &LessonCategory {
        &self.category
    }

    pub fn rate_applied(&self) -> Decimal {
        self.rate_applied
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }

    pub fn cost(&self) -> Decimal {
        self.duration_hours * self.rate_applied
    }

    pub(crate) fn set_paid(&mut self, paid: bool) {
        self.paid = paid;
    }

    /// Validates the whole edit before touching any field.
    pub(crate) fn apply(&mut self, edit: LessonEdit) -> LedgerResult<()> {
        let next = Self::from_parts(
            self.id,
            edit.date.unwrap_or(self.date),
            edit.duration_hours.unwrap_or(self.duration_hours),
            edit.category.unwrap_or_else(|| self.category.clone()),
            edit.rate_applied.unwrap_or(self.rate_applied),
            edit.paid.unwrap_or(self.paid),
        )?;
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    id: PaymentId,
    date: NaiveDate,
    amount: Decimal,
    method: PaymentMethod,
    note: Option<String>,
}

/// Field changes for an existing payment. `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default)]
pub struct PaymentEdit {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub note: Option<Option<String>>,
}

impl Payment {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        method: PaymentMethod,
        note: Option<String>,
    ) -> LedgerResult<Self> {
        Self::from_parts(PaymentId::new(), date, amount, method, note)
    }

    pub fn from_parts(
        id: PaymentId,
        date: NaiveDate,
        amount: Decimal,
        method: PaymentMethod,
        note: Option<String>,
    ) -> LedgerResult<Self> {
        Ok(Self {
            id,
            date,
            amount: require_positive(amount, "Payment amount", MAX_MONEY)?,
            method,
            note: normalize_note(note),
        })
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub(crate) fn apply(&mut self, edit: PaymentEdit) -> LedgerResult<()> {
        let next = Self::from_parts(
            self.id,
            edit.date.unwrap_or(self.date),
            edit.amount.unwrap_or(self.amount),
            edit.method.unwrap_or(self.method),
            edit.note.unwrap_or_else(|| self.note.clone()),
        )?;
        *self = next;
        Ok(())
    }
}

/// Root aggregate: one client the tutor works for, with everything logged
/// against them. Totals are always derived from the owned collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    id: TeacherId,
    name: String,
    lessons: Vec<Lesson>,
    payments: Vec<Payment>,
}

impl Teacher {
    pub fn new(name: &str) -> LedgerResult<Self> {
        Self::from_parts(TeacherId::new(), name, Vec::new(), Vec::new())
    }

    pub fn from_parts(
        id: TeacherId,
        name: &str,
        lessons: Vec<Lesson>,
        payments: Vec<Payment>,
    ) -> LedgerResult<Self> {
        Ok(Self {
            id,
            name: require_name(name, "Teacher name")?,
            lessons,
            payments,
        })
    }

    pub fn id(&self) -> TeacherId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn total_earned(&self) -> Decimal {
        self.lessons.iter().map(Lesson::cost).sum()
    }

    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(Payment::amount).sum()
    }

    /// Positive when more was earned than paid, i.e. money is owed to the tutor.
    pub fn current_balance(&self) -> Decimal {
        self.total_earned() - self.total_paid()
    }

    pub fn total_earned_for_month(&self, reference: NaiveDate) -> Decimal {
        self.lessons
            .iter()
            .filter(|l| in_same_month(l.date, reference))
            .map(Lesson::cost)
            .sum()
    }

    pub fn total_paid_for_month(&self, reference: NaiveDate) -> Decimal {
        self.payments
            .iter()
            .filter(|p| in_same_month(p.date, reference))
            .map(Payment::amount)
            .sum()
    }

    pub fn total_unpaid_salary(&self) -> Decimal {
        self.lessons.iter().filter(|l| !l.paid).map(Lesson::cost).sum()
    }

    pub fn total_paid_salary(&self) -> Decimal {
        self.lessons.iter().filter(|l| l.paid).map(Lesson::cost).sum()
    }

    pub(crate) fn rename(&mut self, name: &str) -> LedgerResult<()> {
        self.name = require_name(name, "Teacher name")?;
        Ok(())
    }

    pub(crate) fn lessons_mut(&mut self) -> &mut Vec<Lesson> {
        &mut self.lessons
    }

    pub(crate) fn payments_mut(&mut self) -> &mut Vec<Payment> {
        &mut self.payments
    }
}
