//! Inbound events, normalized by the dialogue driver.

use super::fields::ProfileField;

/// One event against a conversation, after driver normalization.
///
/// Modeled as a closed enum so that an unexpected event in a given step is
/// an exhaustiveness concern, not a missed string match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// Free-form text message.
    Text(String),
    /// Shared contact payload carrying a phone number, as sent by the
    /// transport (not yet normalized).
    Contact(String),
    /// Inline keyboard press.
    Button(ButtonToken),
    /// Registration entry (`/start`).
    Entry,
    /// Edit trigger (menu button).
    EditEntry,
    /// Explicit cancel / restart request.
    Cancel,
}

/// Inline keyboard tokens.
///
/// Confirm and retry are scoped to a field so that a stale keyboard from an
/// earlier step cannot act on the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonToken {
    Confirm(ProfileField),
    Retry(ProfileField),
    EditField(ProfileField),
    CancelEdit,
}

impl ButtonToken {
    /// Wire form used as Telegram callback data.
    pub fn as_str(&self) -> &'static str {
        use ProfileField::*;
        match self {
            Self::Confirm(FullName) => "confirm_full_name",
            Self::Confirm(NationalId) => "confirm_national_id",
            Self::Confirm(StudentId) => "confirm_student_id",
            Self::Confirm(Phone) => "confirm_phone",
            Self::Retry(FullName) => "retry_full_name",
            Self::Retry(NationalId) => "retry_national_id",
            Self::Retry(StudentId) => "retry_student_id",
            Self::Retry(Phone) => "retry_phone",
            Self::EditField(FullName) => "edit_full_name",
            Self::EditField(NationalId) => "edit_national_id",
            Self::EditField(StudentId) => "edit_student_id",
            Self::EditField(Phone) => "edit_phone",
            Self::CancelEdit => "cancel_edit",
        }
    }

    /// Parse callback data back into a token. Unknown data yields `None`
    /// and is dropped by the transport.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "cancel_edit" {
            return Some(Self::CancelEdit);
        }
        if let Some(rest) = s.strip_prefix("confirm_") {
            return ProfileField::from_name(rest).map(Self::Confirm);
        }
        if let Some(rest) = s.strip_prefix("retry_") {
            return ProfileField::from_name(rest).map(Self::Retry);
        }
        if let Some(rest) = s.strip_prefix("edit_") {
            return ProfileField::from_name(rest).map(Self::EditField);
        }
        None
    }
}

impl std::fmt::Display for ButtonToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
