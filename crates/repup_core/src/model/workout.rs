//! Workout aggregate model.
//!
//! # Invariants
//! - A workout belongs to exactly one user (`user_id >= 1`).
//! - `details` is owned by the workout and is persisted and replaced as a whole.
//! - Entry `sets`/`reps` are strictly positive.
//! - `weight: None` means "not recorded", which is distinct from `Some(0.0)`.

use super::exercise::ExerciseSummary;
use super::{validate_id, validate_required, RecordId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Workout header plus its ordered entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(default)]
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    /// Entries in ascending id order once loaded. Empty for list views.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<WorkoutExercise>,
}

impl Workout {
    pub fn new(user_id: RecordId, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            name: name.into(),
            date,
            notes: String::new(),
            details: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_entry(mut self, entry: WorkoutExercise) -> Self {
        self.details.push(entry);
        self
    }

    /// Checks the header and every entry before an insert.
    pub fn validate_new(&self) -> Result<(), ValidationError> {
        validate_id("user_id", self.user_id)?;
        validate_required("name", &self.name)?;
        for entry in &self.details {
            entry.validate()?;
        }
        Ok(())
    }

    /// Checks the header id as well as everything `validate_new` checks.
    pub fn validate_existing(&self) -> Result<(), ValidationError> {
        validate_id("id", self.id)?;
        self.validate_new()
    }

    /// Distinct exercise ids referenced by the entry list.
    pub fn referenced_exercise_ids(&self) -> BTreeSet<RecordId> {
        self.details.iter().map(|entry| entry.exercise_id).collect()
    }
}

/// One exercise performed within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub workout_id: RecordId,
    pub exercise_id: RecordId,
    pub sets: i64,
    pub reps: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl WorkoutExercise {
    /// Creates an unsaved entry; `id` and `workout_id` are stamped on persist.
    pub fn new(exercise_id: RecordId, sets: i64, reps: i64) -> Self {
        Self {
            id: 0,
            workout_id: 0,
            exercise_id,
            sets,
            reps,
            weight: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("exercise_id", self.exercise_id)?;
        if self.sets < 1 {
            return Err(ValidationError::NonPositiveCount {
                field: "sets",
                value: self.sets,
            });
        }
        if self.reps < 1 {
            return Err(ValidationError::NonPositiveCount {
                field: "reps",
                value: self.reps,
            });
        }
        // SQLite stores NaN as NULL, which would collapse into "no weight".
        if matches!(self.weight, Some(weight) if !weight.is_finite()) {
            return Err(ValidationError::NonFiniteWeight);
        }
        Ok(())
    }
}

/// Workout entry joined with its exercise's descriptive fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExerciseDetail {
    #[serde(flatten)]
    pub entry: WorkoutExercise,
    pub exercise: ExerciseSummary,
}
