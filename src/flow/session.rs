//! Conversation sessions — ephemeral per-user flow state.
//!
//! A session exists only while a flow is in progress. Terminal states are
//! never stored: the machine signals the end of a flow and the driver drops
//! the session. Sessions never survive a process restart.

use chrono::{DateTime, Utc};

use crate::store::{Profile, UserId};

use super::fields::ProfileField;

/// Values accepted so far during registration, awaiting commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingProfile {
    pub full_name: Option<String>,
    pub national_id: Option<String>,
    pub student_id: Option<String>,
    pub phone: Option<String>,
}

impl PendingProfile {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::FullName => self.full_name.as_deref(),
            ProfileField::NationalId => self.national_id.as_deref(),
            ProfileField::StudentId => self.student_id.as_deref(),
            ProfileField::Phone => self.phone.as_deref(),
        }
    }

    pub fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::FullName => self.full_name = Some(value),
            ProfileField::NationalId => self.national_id = Some(value),
            ProfileField::StudentId => self.student_id = Some(value),
            ProfileField::Phone => self.phone = Some(value),
        }
    }

    pub fn clear(&mut self, field: ProfileField) {
        match field {
            ProfileField::FullName => self.full_name = None,
            ProfileField::NationalId => self.national_id = None,
            ProfileField::StudentId => self.student_id = None,
            ProfileField::Phone => self.phone = None,
        }
    }

    /// Build the committed profile. Returns `None` if any field is still
    /// missing — commit is all-or-nothing.
    pub fn into_profile(self, user_id: UserId, created_at: DateTime<Utc>) -> Option<Profile> {
        Some(Profile {
            user_id,
            full_name: self.full_name?,
            national_id: self.national_id?,
            student_id: self.student_id?,
            phone: self.phone?,
            created_at,
        })
    }
}

/// Registration steps: a collect/confirm pair per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegStep {
    /// Awaiting a value for the field.
    Collect(ProfileField),
    /// Awaiting a yes/no on the echoed value.
    Confirm(ProfileField),
}

/// Edit-flow steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStep {
    /// Awaiting a field selection from the edit menu.
    ChooseField,
    /// Awaiting the new value for the chosen field.
    EnterValue(ProfileField),
}

/// One active conversation. At most one per identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Registration {
        step: RegStep,
        pending: PendingProfile,
    },
    Edit {
        step: EditStep,
    },
}

impl Session {
    /// Fresh registration flow at the first collect step.
    pub fn new_registration() -> Self {
        Self::Registration {
            step: RegStep::Collect(ProfileField::first()),
            pending: PendingProfile::default(),
        }
    }

    /// Fresh edit flow at the field-choice step.
    pub fn new_edit() -> Self {
        Self::Edit {
            step: EditStep::ChooseField,
        }
    }
}
