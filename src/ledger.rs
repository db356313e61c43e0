// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The in-memory book: every teacher plus the lesson-type catalog.
//!
//! Commands validate first, mutate second, and hand back the updated record.
//! Nothing here touches storage; callers decide when to persist.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::errors::{Entity, LedgerError, LedgerResult};
use crate::models::{
    Lesson, LessonCategory, LessonEdit, LessonId, LessonType, LessonTypeId, Payment, PaymentEdit,
    PaymentId, PaymentMethod, Teacher, TeacherId,
};
use crate::period::{in_same_month, previous_month};
use crate::registry::LessonTypeRegistry;

/// How a new lesson is categorised before it is resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    Type(LessonTypeId),
    Label(String),
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub date: NaiveDate,
    pub duration_hours: Decimal,
    pub category: CategoryChoice,
    /// Overrides the type's default rate. Required for free-text lessons.
    pub rate: Option<Decimal>,
    pub paid: bool,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    teachers: Vec<Teacher>,
    types: LessonTypeRegistry,
}

impl Ledger {
    pub fn new(teachers: Vec<Teacher>, types: LessonTypeRegistry) -> Self {
        Self { teachers, types }
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn types(&self) -> &LessonTypeRegistry {
        &self.types
    }

    pub fn teacher(&self, id: TeacherId) -> LedgerResult<&Teacher> {
        self.teachers
            .iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(Entity::Teacher, id))
    }

    pub fn find_teacher_by_name(&self, name: &str) -> LedgerResult<&Teacher> {
        let name = name.trim();
        self.teachers
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| LedgerError::not_found(Entity::Teacher, name))
    }

    /// The lesson together with the teacher that owns it.
    pub fn lesson(&self, id: LessonId) -> LedgerResult<(&Teacher, &Lesson)> {
        self.teachers
            .iter()
            .find_map(|t| t.lesson(id).map(|l| (t, l)))
            .ok_or_else(|| LedgerError::not_found(Entity::Lesson, id))
    }

    pub fn payment(&self, id: PaymentId) -> LedgerResult<(&Teacher, &Payment)> {
        self.teachers
            .iter()
            .find_map(|t| t.payment(id).map(|p| (t, p)))
            .ok_or_else(|| LedgerError::not_found(Entity::Payment, id))
    }

    fn teacher_mut(&mut self, id: TeacherId) -> LedgerResult<&mut Teacher> {
        self.teachers
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(Entity::Teacher, id))
    }

    fn owner_of_lesson(&mut self, id: LessonId) -> LedgerResult<&mut Teacher> {
        self.teachers
            .iter_mut()
            .find(|t| t.lesson(id).is_some())
            .ok_or_else(|| LedgerError::not_found(Entity::Lesson, id))
    }

    fn owner_of_payment(&mut self, id: PaymentId) -> LedgerResult<&mut Teacher> {
        self.teachers
            .iter_mut()
            .find(|t| t.payment(id).is_some())
            .ok_or_else(|| LedgerError::not_found(Entity::Payment, id))
    }

    // Teachers

    pub fn add_teacher(&mut self, name: &str) -> LedgerResult<&Teacher> {
        let teacher = Teacher::new(name)?;
        info!(teacher = %teacher.id(), name = teacher.name(), "teacher added");
        self.teachers.push(teacher);
        Ok(&self.teachers[self.teachers.len() - 1])
    }

    pub fn rename_teacher(&mut self, id: TeacherId, name: &str) -> LedgerResult<&Teacher> {
        let teacher = self.teacher_mut(id)?;
        teacher.rename(name)?;
        info!(teacher = %id, name = teacher.name(), "teacher renamed");
        Ok(teacher)
    }

    /// Removes the teacher with every lesson and payment it owns.
    pub fn delete_teacher(&mut self, id: TeacherId) -> LedgerResult<Teacher> {
        let idx = self
            .teachers
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(Entity::Teacher, id))?;
        let removed = self.teachers.remove(idx);
        info!(
            teacher = %id,
            lessons = removed.lessons().len(),
            payments = removed.payments().len(),
            "teacher deleted"
        );
        Ok(removed)
    }

    // Lessons

    /// Resolves a category choice, capturing the type's current name.
    pub fn resolve_category(&self, choice: &CategoryChoice) -> LedgerResult<LessonCategory> {
        match choice {
            CategoryChoice::Type(id) => Ok(LessonCategory::from_type(self.types.require(*id)?)),
            CategoryChoice::Label(label) => LessonCategory::free_text(label),
        }
    }

    /// Rate to pre-fill when a lesson of this type is being written.
    pub fn suggest_rate(&self, type_id: LessonTypeId) -> LedgerResult<Decimal> {
        self.types.default_rate_for(type_id)
    }

    pub fn add_lesson(&mut self, teacher_id: TeacherId, new: NewLesson) -> LedgerResult<&Teacher> {
        let category = self.resolve_category(&new.category)?;
        let rate = match (new.rate, &new.category) {
            (Some(rate), _) => rate,
            (None, CategoryChoice::Type(id)) => self.suggest_rate(*id)?,
            (None, CategoryChoice::Label(_)) => {
                return Err(LedgerError::invalid(
                    "Hourly rate is required for lessons without a lesson type",
                ));
            }
        };
        let mut lesson = Lesson::new(new.date, new.duration_hours, category, rate)?;
        lesson.set_paid(new.paid);

        let teacher = self.teacher_mut(teacher_id)?;
        info!(
            teacher = %teacher_id,
            lesson = %lesson.id(),
            cost = %lesson.cost(),
            "lesson added"
        );
        teacher.lessons_mut().push(lesson);
        Ok(teacher)
    }

    pub fn edit_lesson(&mut self, id: LessonId, edit: LessonEdit) -> LedgerResult<&Teacher> {
        let teacher = self.owner_of_lesson(id)?;
        if let Some(lesson) = teacher.lessons_mut().iter_mut().find(|l| l.id() == id) {
            lesson.apply(edit)?;
            info!(lesson = %id, cost = %lesson.cost(), "lesson edited");
        }
        Ok(teacher)
    }

    pub fn set_lesson_paid(&mut self, id: LessonId, paid: bool) -> LedgerResult<&Teacher> {
        self.edit_lesson(
            id,
            LessonEdit {
                paid: Some(paid),
                ..Default::default()
            },
        )
    }

    pub fn delete_lesson(&mut self, id: LessonId) -> LedgerResult<&Teacher> {
        let teacher = self.owner_of_lesson(id)?;
        teacher.lessons_mut().retain(|l| l.id() != id);
        info!(lesson = %id, "lesson deleted");
        Ok(teacher)
    }

    /// Flags every unpaid lesson from the calendar month before `now` as paid.
    /// Returns how many lessons changed alongside the updated teacher.
    pub fn mark_previous_month_paid(
        &mut self,
        teacher_id: TeacherId,
        now: NaiveDate,
    ) -> LedgerResult<(usize, &Teacher)> {
        let teacher = self.teacher_mut(teacher_id)?;
        let changed = mark_previous_month_paid(teacher, now);
        info!(teacher = %teacher_id, changed, "previous month marked paid");
        Ok((changed, &*teacher))
    }

    // Payments

    pub fn add_payment(&mut self, teacher_id: TeacherId, new: NewPayment) -> LedgerResult<&Teacher> {
        let payment = Payment::new(new.date, new.amount, new.method, new.note)?;
        let teacher = self.teacher_mut(teacher_id)?;
        info!(
            teacher = %teacher_id,
            payment = %payment.id(),
            amount = %payment.amount(),
            method = %payment.method(),
            "payment added"
        );
        teacher.payments_mut().push(payment);
        Ok(teacher)
    }

    pub fn edit_payment(&mut self, id: PaymentId, edit: PaymentEdit) -> LedgerResult<&Teacher> {
        let teacher = self.owner_of_payment(id)?;
        if let Some(payment) = teacher.payments_mut().iter_mut().find(|p| p.id() == id) {
            payment.apply(edit)?;
            info!(payment = %id, amount = %payment.amount(), "payment edited");
        }
        Ok(teacher)
    }

    pub fn delete_payment(&mut self, id: PaymentId) -> LedgerResult<&Teacher> {
        let teacher = self.owner_of_payment(id)?;
        teacher.payments_mut().retain(|p| p.id() != id);
        info!(payment = %id, "payment deleted");
        Ok(teacher)
    }

    // Lesson types

    pub fn add_lesson_type(&mut self, name: &str, default_rate: Decimal) -> LedgerResult<&LessonType> {
        let lesson_type = self.types.add_type(name, default_rate)?;
        info!(lesson_type = %lesson_type.id(), name = lesson_type.name(), "lesson type added");
        Ok(lesson_type)
    }

    pub fn edit_lesson_type(
        &mut self,
        id: LessonTypeId,
        name: Option<&str>,
        default_rate: Option<Decimal>,
    ) -> LedgerResult<&LessonType> {
        let lesson_type = self.types.edit_type(id, name, default_rate)?;
        info!(lesson_type = %id, rate = %lesson_type.default_rate(), "lesson type edited");
        Ok(lesson_type)
    }

    /// Lessons that captured this type keep their label and rate.
    pub fn remove_lesson_type(&mut self, id: LessonTypeId) -> LedgerResult<LessonType> {
        let removed = self.types.remove_type(id)?;
        info!(lesson_type = %id, "lesson type removed");
        Ok(removed)
    }
}

/// Core of the bulk action. The set of lessons to flip is chosen before any
/// flag changes, and flipping cannot fail, so the teacher is never left
/// half-updated.
pub fn mark_previous_month_paid(teacher: &mut Teacher, now: NaiveDate) -> usize {
    let target = previous_month(now);
    let pending: Vec<usize> = teacher
        .lessons()
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.is_paid() && in_same_month(l.date(), target))
        .map(|(pos, _)| pos)
        .collect();
    debug!(teacher = %teacher.id(), pending = pending.len(), month = %target, "lessons to mark paid");

    let lessons = teacher.lessons_mut();
    for &pos in &pending {
        lessons[pos].set_paid(true);
    }
    pending.len()
}
