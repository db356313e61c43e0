// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Lesson, Teacher};
use crate::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total_earned: Decimal,
    pub total_paid: Decimal,
    pub current_balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyTotals {
    pub earned: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnpaidSummary {
    pub unpaid_hours: Decimal,
    pub unpaid_amount: Decimal,
    pub paid_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub earned: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
    pub hours: Decimal,
    pub lesson_count: usize,
    pub payment_count: usize,
}

pub fn lesson_cost(lesson: &Lesson) -> Decimal {
    lesson.cost()
}

pub fn total_hours<'a, I>(lessons: I) -> Decimal
where
    I: IntoIterator<Item = &'a Lesson>,
{
    lessons.into_iter().map(Lesson::duration_hours).sum()
}

pub fn teacher_totals(teacher: &Teacher) -> Totals {
    let total_earned = teacher.total_earned();
    let total_paid = teacher.total_paid();
    Totals {
        total_earned,
        total_paid,
        current_balance: total_earned - total_paid,
    }
}

pub fn monthly_totals(teacher: &Teacher, reference: NaiveDate) -> MonthlyTotals {
    let earned = teacher.total_earned_for_month(reference);
    let paid = teacher.total_paid_for_month(reference);
    MonthlyTotals {
        earned,
        paid,
        balance: earned - paid,
    }
}

pub fn unpaid_summary(teacher: &Teacher) -> UnpaidSummary {
    let unpaid_hours = total_hours(teacher.lessons().iter().filter(|l| !l.is_paid()));
    UnpaidSummary {
        unpaid_hours,
        unpaid_amount: teacher.total_unpaid_salary(),
        paid_amount: teacher.total_paid_salary(),
    }
}

pub fn period_summary(teacher: &Teacher, period: &Period) -> PeriodSummary {
    let lessons: Vec<&Lesson> = teacher
        .lessons()
        .iter()
        .filter(|l| period.contains(l.date()))
        .collect();
    let payments: Vec<Decimal> = teacher
        .payments()
        .iter()
        .filter(|p| period.contains(p.date()))
        .map(|p| p.amount())
        .collect();

    let earned: Decimal = lessons.iter().map(|l| l.cost()).sum();
    let paid: Decimal = payments.iter().copied().sum();
    PeriodSummary {
        earned,
        paid,
        balance: earned - paid,
        hours: total_hours(lessons.iter().copied()),
        lesson_count: lessons.len(),
        payment_count: payments.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LessonCategory, Payment, PaymentMethod, TeacherId};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lesson(d: NaiveDate, hours: &str, rate: &str, paid: bool) -> Lesson {
        let cat = LessonCategory::free_text("Math").unwrap();
        let mut l = Lesson::new(d, dec(hours), cat, dec(rate)).unwrap();
        l.set_paid(paid);
        l
    }

    fn teacher() -> Teacher {
        Teacher::from_parts(
            TeacherId::new(),
            "Olena",
            vec![
                lesson(date(2025, 5, 3), "1.5", "300", false),
                lesson(date(2025, 4, 20), "1", "200", true),
            ],
            vec![Payment::new(date(2025, 5, 10), dec("100"), PaymentMethod::Card, None).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn empty_teacher_has_zero_totals() {
        let t = Teacher::new("Nobody").unwrap();
        let totals = teacher_totals(&t);
        assert!(totals.total_earned.is_zero());
        assert!(totals.total_paid.is_zero());
        assert!(totals.current_balance.is_zero());
        let s = unpaid_summary(&t);
        assert!(s.unpaid_hours.is_zero() && s.unpaid_amount.is_zero() && s.paid_amount.is_zero());
    }

    #[test]
    fn monthly_totals_only_count_the_reference_month() {
        let t = teacher();
        let may = monthly_totals(&t, date(2025, 5, 28));
        assert_eq!(may.earned, dec("450"));
        assert_eq!(may.paid, dec("100"));
        assert_eq!(may.balance, dec("350"));

        let april = monthly_totals(&t, date(2025, 4, 1));
        assert_eq!(april.earned, dec("200"));
        assert!(april.paid.is_zero());
    }

    #[test]
    fn unpaid_summary_partitions_by_flag() {
        let t = teacher();
        let s = unpaid_summary(&t);
        assert_eq!(s.unpaid_hours, dec("1.5"));
        assert_eq!(s.unpaid_amount, dec("450"));
        assert_eq!(s.paid_amount, dec("200"));
        assert_eq!(s.unpaid_amount + s.paid_amount, t.total_earned());
    }

    #[test]
    fn period_summary_over_custom_range() {
        let t = teacher();
        let p = Period::range(date(2025, 4, 15), date(2025, 5, 5)).unwrap();
        let s = period_summary(&t, &p);
        assert_eq!(s.earned, dec("650"));
        assert!(s.paid.is_zero());
        assert_eq!(s.hours, dec("2.5"));
        assert_eq!(s.lesson_count, 2);
        assert_eq!(s.payment_count, 0);
    }
}
