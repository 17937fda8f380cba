//! User-facing texts and keyboards. All strings are Persian.

use crate::channels::transport::{Keyboard, ReplyButton};
use crate::store::Profile;

use super::event::ButtonToken;
use super::fields::ProfileField;

// ── Entry / menu ────────────────────────────────────────────────────

pub const WELCOME_NEW: &str = "سلام! به ربات جهاد دانشگاهی خوش آمدید. 🌷\n\nبرای استفاده از امکانات ربات، لطفاً ابتدا ثبت‌نام کنید.";

/// Main-menu reply-keyboard labels; the driver maps these back to events.
pub const MENU_EDIT: &str = "ویرایش مشخصات ✏️";
pub const MENU_RESET: &str = "لغو/شروع دوباره 🚪";

pub fn welcome_back(full_name: &str) -> String {
    format!("{full_name} عزیز، به ربات جهاد دانشگاهی خوش آمدید! 🎉")
}

pub fn main_menu() -> Keyboard {
    Keyboard::Reply {
        rows: vec![
            vec![ReplyButton::text(MENU_EDIT)],
            vec![ReplyButton::text(MENU_RESET)],
        ],
        one_time: false,
    }
}

// ── Registration ────────────────────────────────────────────────────

pub const CONFIRM_YES: &str = "بله ✅";
pub const CONFIRM_NO: &str = "خیر ✏️";
pub const SHARE_CONTACT: &str = "ارسال شماره تماس 📱";

pub fn confirm_prompt(field: ProfileField, value: &str) -> String {
    format!("{}\n{value}", field.confirm_question())
}

pub fn confirm_keyboard(field: ProfileField) -> Keyboard {
    Keyboard::Inline(vec![vec![
        (CONFIRM_YES.to_string(), ButtonToken::Confirm(field)),
        (CONFIRM_NO.to_string(), ButtonToken::Retry(field)),
    ]])
}

pub fn contact_keyboard() -> Keyboard {
    Keyboard::Reply {
        rows: vec![vec![ReplyButton::contact(SHARE_CONTACT)]],
        one_time: true,
    }
}

pub const REGISTRATION_SAVED: &str = "پروفایل شما با موفقیت ایجاد شد! ✅";

// ── Edit flow ───────────────────────────────────────────────────────

pub fn edit_overview(profile: &Profile) -> String {
    format!(
        "اطلاعات فعلی شما:\nنام کامل: {}\nکد ملی: {}\nشماره دانشجویی: {}\nشماره تماس: {}",
        profile.full_name, profile.national_id, profile.student_id, profile.phone
    )
}

pub fn edit_menu() -> Keyboard {
    let mut rows: Vec<Vec<(String, ButtonToken)>> = ProfileField::ORDER
        .iter()
        .map(|&field| {
            vec![(
                format!("ویرایش {} ✏️", field.short_label()),
                ButtonToken::EditField(field),
            )]
        })
        .collect();
    rows.push(vec![("لغو 🚫".to_string(), ButtonToken::CancelEdit)]);
    Keyboard::Inline(rows)
}

pub fn edit_value_prompt(field: ProfileField) -> String {
    match field {
        ProfileField::Phone => format!(
            "لطفاً {} جدید را وارد کنید یا دکمه زیر را فشار دهید:",
            field.label()
        ),
        _ => format!("لطفاً {} جدید را وارد کنید:", field.label()),
    }
}

pub const EDIT_SAVED: &str = "پروفایل شما با موفقیت ویرایش شد! ✅";
pub const EDIT_CANCELLED: &str = "ویرایش لغو شد.";

// ── Notices ─────────────────────────────────────────────────────────

pub const REGISTER_FIRST: &str = "ابتدا پروفایل خود را تکمیل کنید! لطفاً /start را بزنید.";
pub const ALREADY_REGISTERED: &str =
    "شما قبلاً ثبت‌نام کرده‌اید. برای تغییر اطلاعات از «ویرایش مشخصات» استفاده کنید.";
pub const SAVE_FAILED: &str = "خطایی در ذخیره اطلاعات رخ داد. لطفاً /start را دوباره بزنید.";
pub const CANCEL_INCOMPLETE: &str = "ثبت‌نام شما کامل نشده است. لطفاً /start را بزنید.";

/// Display name used when no profile exists yet.
pub const FALLBACK_NAME: &str = "کاربر";

pub fn cancelled(full_name: &str) -> String {
    format!("{full_name} عزیز، عملیات لغو شد.")
}
