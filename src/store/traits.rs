//! The `ProfileStore` trait and the persisted profile record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::flow::fields::ProfileField;

/// Stable opaque identity of a person. Telegram user ids are i64.
pub type UserId = i64;

/// One registered user. A row exists iff the user completed the full
/// registration flow at least once; in-progress values never reach the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: String,
    pub national_id: String,
    pub student_id: String,
    pub phone: String,
    /// Set once at the first successful registration, never updated.
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Read one field by tag.
    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::NationalId => &self.national_id,
            ProfileField::StudentId => &self.student_id,
            ProfileField::Phone => &self.phone,
        }
    }
}

/// Backend-agnostic profile persistence.
///
/// Single-record operations only; each must be atomic on its own. No
/// transactions span identities.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile, `None` if the user never registered.
    async fn get(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Insert a new profile. Fails with `StoreError::Duplicate` if a row
    /// for this user already exists — never silently overwrites.
    async fn insert(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Update exactly one field of an existing profile. Fails with
    /// `StoreError::NotFound` if the user never registered.
    async fn update_field(
        &self,
        user_id: UserId,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError>;
}
