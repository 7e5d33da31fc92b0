//! Exercise domain model.

use super::{validate_id, validate_required, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

/// A movement, filed under exactly one body part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Must reference an existing body part whenever the row is written.
    pub body_part_id: RecordId,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body_part_id: RecordId,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            body_part_id,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate_new(&self) -> Result<(), ValidationError> {
        validate_required("name", &self.name)?;
        validate_id("body_part_id", self.body_part_id)
    }

    pub fn validate_existing(&self) -> Result<(), ValidationError> {
        validate_id("id", self.id)?;
        self.validate_new()
    }
}

/// Descriptive exercise fields attached to an enriched workout entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub body_part_id: RecordId,
}
