// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Chart and history groupings over lessons and payments.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Lesson, Payment, PaymentMethod, Teacher};
use crate::period::{in_same_month, month_start};

/// Summed cost of all lessons sharing one display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotal {
    pub label: String,
    pub cost: Decimal,
    pub hours: Decimal,
    pub lessons: usize,
}

/// Groups by `display_label()`, keeping the order in which labels first appear.
pub fn group_lessons_by_type<'a, I>(lessons: I) -> Vec<TypeTotal>
where
    I: IntoIterator<Item = &'a Lesson>,
{
    let mut groups: Vec<TypeTotal> = Vec::new();
    for lesson in lessons {
        let label = lesson.category().display_label();
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => {
                group.cost += lesson.cost();
                group.hours += lesson.duration_hours();
                group.lessons += 1;
            }
            None => groups.push(TypeTotal {
                label: label.to_string(),
                cost: lesson.cost(),
                hours: lesson.duration_hours(),
                lessons: 1,
            }),
        }
    }
    groups
}

/// Highest cost first; equal costs keep their grouping order.
pub fn sort_by_cost_desc(groups: &mut [TypeTotal]) {
    groups.sort_by(|a, b| b.cost.cmp(&a.cost));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MethodBreakdown {
    pub card: Decimal,
    pub cash: Decimal,
    pub other: Decimal,
}

impl MethodBreakdown {
    pub fn add(&mut self, payment: &Payment) {
        let slot = match payment.method() {
            PaymentMethod::Card => &mut self.card,
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Other => &mut self.other,
        };
        *slot += payment.amount();
    }

    pub fn get(&self, method: PaymentMethod) -> Decimal {
        match method {
            PaymentMethod::Card => self.card,
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Other => self.other,
        }
    }

    pub fn total(&self) -> Decimal {
        self.card + self.cash + self.other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentEntry<'a> {
    pub payment: &'a Payment,
    pub teacher_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup<'a> {
    pub month: NaiveDate,
    pub entries: Vec<PaymentEntry<'a>>,
}

impl MonthGroup<'_> {
    pub fn breakdown(&self) -> MethodBreakdown {
        let mut b = MethodBreakdown::default();
        for entry in &self.entries {
            b.add(entry.payment);
        }
        b
    }

    pub fn total(&self) -> Decimal {
        self.breakdown().total()
    }
}

fn all_payments(teachers: &[Teacher]) -> Vec<PaymentEntry<'_>> {
    let mut entries: Vec<PaymentEntry<'_>> = teachers
        .iter()
        .flat_map(|t| {
            t.payments().iter().map(move |payment| PaymentEntry {
                payment,
                teacher_name: t.name(),
            })
        })
        .collect();
    entries.sort_by(|a, b| b.payment.date().cmp(&a.payment.date()));
    entries
}

/// Cross-teacher transaction history keyed by month start. Entries inside a
/// month are newest first.
pub fn group_payments_by_calendar_month(teachers: &[Teacher]) -> BTreeMap<NaiveDate, MonthGroup<'_>> {
    let mut groups: BTreeMap<NaiveDate, MonthGroup<'_>> = BTreeMap::new();
    for entry in all_payments(teachers) {
        let month = month_start(entry.payment.date());
        groups
            .entry(month)
            .or_insert_with(|| MonthGroup {
                month,
                entries: Vec::new(),
            })
            .entries
            .push(entry);
    }
    groups
}

pub fn months_newest_first<'m, 'a>(
    groups: &'m BTreeMap<NaiveDate, MonthGroup<'a>>,
) -> impl Iterator<Item = &'m MonthGroup<'a>> {
    groups.values().rev()
}

pub fn overall_breakdown(teachers: &[Teacher]) -> MethodBreakdown {
    let mut b = MethodBreakdown::default();
    for payment in teachers.iter().flat_map(|t| t.payments()) {
        b.add(payment);
    }
    b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LessonEntry<'a> {
    pub lesson: &'a Lesson,
    pub teacher_name: &'a str,
}

/// Every teacher's lessons in the month of `reference`, newest first.
pub fn lessons_in_month_across(teachers: &[Teacher], reference: NaiveDate) -> Vec<LessonEntry<'_>> {
    let mut entries: Vec<LessonEntry<'_>> = teachers
        .iter()
        .flat_map(|t| {
            t.lessons()
                .iter()
                .filter(move |l| in_same_month(l.date(), reference))
                .map(move |lesson| LessonEntry {
                    lesson,
                    teacher_name: t.name(),
                })
        })
        .collect();
    entries.sort_by(|a, b| b.lesson.date().cmp(&a.lesson.date()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LessonCategory, TeacherId};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lesson(label: &str, cost: &str) -> Lesson {
        let cat = LessonCategory::free_text(label).unwrap();
        Lesson::new(date(2025, 3, 1), Decimal::ONE, cat, dec(cost)).unwrap()
    }

    #[test]
    fn ties_keep_encounter_order_after_sort() {
        let lessons = vec![lesson("B", "50"), lesson("A", "50"), lesson("C", "70")];
        let mut groups = group_lessons_by_type(&lessons);
        sort_by_cost_desc(&mut groups);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["C", "B", "A"]);
    }

    #[test]
    fn month_group_exposes_method_breakdown() {
        let pay = |d, amt: &str, m| Payment::new(d, dec(amt), m, None).unwrap();
        let t = Teacher::from_parts(
            TeacherId::new(),
            "Olena",
            Vec::new(),
            vec![
                pay(date(2025, 3, 2), "100", PaymentMethod::Card),
                pay(date(2025, 3, 9), "40", PaymentMethod::Cash),
                pay(date(2025, 3, 9), "5", PaymentMethod::Other),
            ],
        )
        .unwrap();
        let teachers = vec![t];
        let groups = group_payments_by_calendar_month(&teachers);
        let march = &groups[&date(2025, 3, 1)];
        let b = march.breakdown();
        assert_eq!(b.card, dec("100"));
        assert_eq!(b.cash, dec("40"));
        assert_eq!(b.other, dec("5"));
        assert_eq!(march.total(), dec("145"));
        assert_eq!(march.entries[2].payment.date(), date(2025, 3, 2));
    }
}
