//! Profile field table.
//!
//! Each field carries its validator, prompts, and store column in one place,
//! so both flows iterate the table instead of duplicating per-field
//! branches.

use serde::{Deserialize, Serialize};

use crate::channels::transport::Keyboard;
use crate::validate;

use super::prompts;

/// The four editable profile fields, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FullName,
    NationalId,
    StudentId,
    Phone,
}

impl ProfileField {
    /// Registration order.
    pub const ORDER: [ProfileField; 4] = [
        Self::FullName,
        Self::NationalId,
        Self::StudentId,
        Self::Phone,
    ];

    /// First field collected during registration.
    pub fn first() -> Self {
        Self::FullName
    }

    /// Next field in registration order; `None` after the last one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::FullName => Some(Self::NationalId),
            Self::NationalId => Some(Self::StudentId),
            Self::StudentId => Some(Self::Phone),
            Self::Phone => None,
        }
    }

    /// Snake-case name, also the store column for this field.
    pub fn name(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::NationalId => "national_id",
            Self::StudentId => "student_id",
            Self::Phone => "phone",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "full_name" => Some(Self::FullName),
            "national_id" => Some(Self::NationalId),
            "student_id" => Some(Self::StudentId),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }

    /// Persian label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "نام کامل",
            Self::NationalId => "کد ملی",
            Self::StudentId => "شماره دانشجویی",
            Self::Phone => "شماره تماس",
        }
    }

    /// Shorter label for the edit menu buttons.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::FullName => "نام",
            other => other.label(),
        }
    }

    /// Validate a submitted value.
    pub fn is_valid(self, value: &str) -> bool {
        match self {
            Self::FullName => validate::is_valid_full_name(value),
            Self::NationalId => validate::is_valid_national_id(value),
            Self::StudentId => validate::is_valid_student_id(value),
            Self::Phone => validate::is_valid_phone(value),
        }
    }

    /// The field's collection prompt.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::FullName => "لطفاً نام کامل خود را به فارسی وارد کنید (مثال: علی محمدی):",
            Self::NationalId => "لطفاً کد ملی 10 رقمی خود را وارد کنید:",
            Self::StudentId => "لطفاً شماره دانشجویی خود را وارد کنید:",
            Self::Phone => "لطفاً شماره تماس خود را وارد کنید یا دکمه زیر را فشار دهید:",
        }
    }

    /// Error note re-prompting after an invalid value.
    pub fn error_prompt(self) -> &'static str {
        match self {
            Self::FullName => {
                "نام کامل باید حداقل 6 کاراکتر با حروف فارسی و شامل یک فاصله باشد. دوباره وارد کنید:"
            }
            Self::NationalId => "کد ملی نامعتبر است. لطفاً کد ملی 10 رقمی معتبر وارد کنید:",
            Self::StudentId => "شماره دانشجویی باید فقط شامل اعداد باشد. دوباره وارد کنید:",
            Self::Phone => "شماره تماس باید 11 رقم و با 09 شروع شود. دوباره وارد کنید:",
        }
    }

    /// Yes/no question echoed with the accepted value.
    pub fn confirm_question(self) -> &'static str {
        match self {
            Self::FullName => "آیا نام زیر درست است؟",
            Self::NationalId => "آیا کد ملی زیر درست است؟",
            Self::StudentId => "آیا شماره دانشجویی زیر درست است؟",
            Self::Phone => "آیا شماره تماس زیر درست است؟",
        }
    }

    /// Keyboard attached to the collection prompt. Only the phone step
    /// offers the contact-share shortcut.
    pub fn prompt_keyboard(self) -> Option<Keyboard> {
        match self {
            Self::Phone => Some(prompts::contact_keyboard()),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
