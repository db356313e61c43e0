// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use thiserror::Error;

/// Kind of record an id refers to, used in [`LedgerError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Teacher,
    Lesson,
    Payment,
    LessonType,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Entity::Teacher => "Teacher",
            Entity::Lesson => "Lesson",
            Entity::Payment => "Payment",
            Entity::LessonType => "Lesson type",
        };
        f.write_str(s)
    }
}

/// Failures raised at the mutation boundary of the ledger.
///
/// Aggregations never return these: once a record exists it is valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::InvalidInput(msg.into())
    }

    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
