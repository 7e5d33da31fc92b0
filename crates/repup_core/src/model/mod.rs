//! Domain model for the fitness record store.
//!
//! # Responsibility
//! - Define canonical records shared by stores and callers.
//! - Keep local (storage-free) validation next to the data it guards.
//!
//! # Invariants
//! - Every persisted record is identified by a positive integer id.
//! - A workout owns its entry list; entries never outlive their workout.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod body_part;
pub mod exercise;
pub mod user;
pub mod workout;

/// Record identity as assigned by storage. Valid ids are `>= 1`.
pub type RecordId = i64;

/// Persisted entity kinds, used for error reporting and guard lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    BodyPart,
    Exercise,
    Workout,
    WorkoutExercise,
    User,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BodyPart => "body part",
            Self::Exercise => "exercise",
            Self::Workout => "workout",
            Self::WorkoutExercise => "workout exercise",
            Self::User => "user",
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input rejected before any storage access.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    EmptyField(&'static str),
    /// Id-like field is zero or negative.
    NonPositiveId { field: &'static str, value: i64 },
    /// Set/rep count is zero or negative.
    NonPositiveCount { field: &'static str, value: i64 },
    /// Weight is NaN or infinite.
    NonFiniteWeight,
    /// Referenced record does not exist at write time.
    MissingReference { entity: Entity, id: RecordId },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::NonPositiveId { field, value } => {
                write!(f, "`{field}` must be >= 1, got {value}")
            }
            Self::NonPositiveCount { field, value } => {
                write!(f, "`{field}` must be >= 1, got {value}")
            }
            Self::NonFiniteWeight => write!(f, "`weight` must be a finite number"),
            Self::MissingReference { entity, id } => {
                write!(f, "referenced {entity} {id} does not exist")
            }
        }
    }
}

impl Error for ValidationError {}

/// Rejects ids below 1.
pub fn validate_id(field: &'static str, value: RecordId) -> Result<(), ValidationError> {
    if value < 1 {
        return Err(ValidationError::NonPositiveId { field, value });
    }
    Ok(())
}

pub(crate) fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_id, validate_required, Entity, ValidationError};

    #[test]
    fn ids_below_one_are_rejected() {
        assert!(validate_id("id", 1).is_ok());
        assert_eq!(
            validate_id("id", 0),
            Err(ValidationError::NonPositiveId {
                field: "id",
                value: 0
            })
        );
        assert!(validate_id("id", -4).is_err());
    }

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        assert_eq!(
            validate_required("name", "  \t"),
            Err(ValidationError::EmptyField("name"))
        );
        assert!(validate_required("name", "Chest").is_ok());
    }

    #[test]
    fn missing_reference_message_names_entity() {
        let err = ValidationError::MissingReference {
            entity: Entity::BodyPart,
            id: 9,
        };
        assert_eq!(err.to_string(), "referenced body part 9 does not exist");
    }
}
