//! User domain model.

use super::{validate_required, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

/// Account identified by an external OAuth provider.
///
/// `oauth_id` is never serialized; callers identify users by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: RecordId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub oauth_provider: String,
    #[serde(skip_serializing, default)]
    pub oauth_id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        oauth_provider: impl Into<String>,
        oauth_id: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            email: email.into(),
            name: name.into(),
            oauth_provider: oauth_provider.into(),
            oauth_id: oauth_id.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("email", &self.email)?;
        validate_required("oauth_provider", &self.oauth_provider)?;
        validate_required("oauth_id", &self.oauth_id)
    }
}
