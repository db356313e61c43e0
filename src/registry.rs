// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::errors::{Entity, LedgerError, LedgerResult};
use crate::models::{LessonType, LessonTypeId};

/// Catalog of lesson types, unique by id. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonTypeRegistry {
    types: Vec<LessonType>,
}

impl LessonTypeRegistry {
    pub fn new(types: Vec<LessonType>) -> Self {
        let mut registry = Self::default();
        for t in types {
            if registry.get(t.id()).is_none() {
                registry.types.push(t);
            }
        }
        registry
    }

    /// Types offered on a fresh install.
    pub fn with_defaults() -> Self {
        let seed = [("ПКО", 450), ("МКА", 330), ("Школа", 220)];
        let types = seed
            .iter()
            .filter_map(|(name, rate)| LessonType::new(name, Decimal::from(*rate)).ok())
            .collect();
        Self::new(types)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LessonType> {
        self.types.iter()
    }

    pub fn as_slice(&self) -> &[LessonType] {
        &self.types
    }

    pub fn sorted_by_name(&self) -> Vec<&LessonType> {
        let mut v: Vec<&LessonType> = self.types.iter().collect();
        v.sort_by(|a, b| a.name().cmp(b.name()));
        v
    }

    pub fn get(&self, id: LessonTypeId) -> Option<&LessonType> {
        self.types.iter().find(|t| t.id() == id)
    }

    pub fn require(&self, id: LessonTypeId) -> LedgerResult<&LessonType> {
        self.get(id)
            .ok_or_else(|| LedgerError::not_found(Entity::LessonType, id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&LessonType> {
        let name = name.trim();
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn add_type(&mut self, name: &str, default_rate: Decimal) -> LedgerResult<&LessonType> {
        let lesson_type = LessonType::new(name, default_rate)?;
        self.types.push(lesson_type);
        Ok(&self.types[self.types.len() - 1])
    }

    pub fn edit_type(
        &mut self,
        id: LessonTypeId,
        name: Option<&str>,
        default_rate: Option<Decimal>,
    ) -> LedgerResult<&LessonType> {
        let lesson_type = self
            .types
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(Entity::LessonType, id))?;
        lesson_type.update(name, default_rate)?;
        Ok(lesson_type)
    }

    pub fn remove_type(&mut self, id: LessonTypeId) -> LedgerResult<LessonType> {
        let idx = self
            .types
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| LedgerError::not_found(Entity::LessonType, id))?;
        Ok(self.types.remove(idx))
    }

    pub fn default_rate_for(&self, id: LessonTypeId) -> LedgerResult<Decimal> {
        self.require(id).map(LessonType::default_rate)
    }
}
