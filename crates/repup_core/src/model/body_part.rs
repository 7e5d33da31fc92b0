//! Body part domain model.

use super::{validate_id, validate_required, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

/// Muscle group that exercises are filed under.
///
/// `name` is unique among body parts (exact, case-sensitive match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPart {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    /// Unix epoch milliseconds, assigned by storage.
    #[serde(default)]
    pub created_at: i64,
    /// Unix epoch milliseconds, assigned by storage.
    #[serde(default)]
    pub updated_at: i64,
}

impl BodyPart {
    /// Creates an unsaved body part. `id` stays `0` until persisted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks fields required to insert a new row.
    pub fn validate_new(&self) -> Result<(), ValidationError> {
        validate_required("name", &self.name)
    }

    /// Checks fields required to update an existing row.
    pub fn validate_existing(&self) -> Result<(), ValidationError> {
        validate_id("id", self.id)?;
        self.validate_new()
    }
}

#[cfg(test)]
mod tests {
    use super::BodyPart;

    #[test]
    fn name_only_payload_decodes_as_unsaved() {
        let body_part: BodyPart = serde_json::from_str(r#"{"name":"Chest"}"#).unwrap();
        assert_eq!(body_part, BodyPart::new("Chest"));
        assert!(body_part.validate_existing().is_err());
    }
}
