//! Pure field validators.
//!
//! Every function here is total and side-effect-free: it returns a plain
//! pass/fail and never panics on any input. The state machine calls these
//! synchronously; an invalid value is a re-prompt, not an error.

use std::sync::LazyLock;

use regex::Regex;

static NATIONAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("static regex"));
static STUDENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("static regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09[0-9]{9}$").expect("static regex"));

/// Persian letter range accepted in full names (plus whitespace).
fn is_persian_letter(c: char) -> bool {
    matches!(c, '\u{0622}'..='\u{06CC}')
}

/// Full name: Persian letters and whitespace only, at least 6 characters,
/// and at least one interior space (single-word names are rejected).
pub fn is_valid_full_name(s: &str) -> bool {
    if s.chars().count() < 6 {
        return false;
    }
    if !s.chars().all(|c| is_persian_letter(c) || c.is_whitespace()) {
        return false;
    }
    s.trim().chars().any(char::is_whitespace)
}

/// National ID: exactly 10 ASCII digits with a valid check digit.
///
/// The check digit rule has two branches and they are not interchangeable:
/// with `total = Σ d_i * (10 - i) mod 11` over the first nine digits, the
/// tenth digit must equal `total` when `total < 2`, and `11 - total`
/// otherwise.
pub fn is_valid_national_id(s: &str) -> bool {
    if !NATIONAL_ID_RE.is_match(s) {
        return false;
    }
    let bytes = s.as_bytes();
    let check = u32::from(bytes[9] - b'0');
    let total = bytes[..9]
        .iter()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * (10 - i as u32))
        .sum::<u32>()
        % 11;
    if total < 2 {
        check == total
    } else {
        check == 11 - total
    }
}

/// Student ID: non-empty, ASCII digits only.
pub fn is_valid_student_id(s: &str) -> bool {
    STUDENT_ID_RE.is_match(s)
}

/// Phone: exactly 11 ASCII digits starting with the national mobile
/// prefix `09`.
pub fn is_valid_phone(s: &str) -> bool {
    PHONE_RE.is_match(s)
}

/// Normalize a contact-payload phone number before validation.
///
/// Only the `+98` international prefix is rewritten to the local leading
/// `0`; every other value passes through unchanged.
pub fn normalize_contact_phone(s: &str) -> String {
    match s.strip_prefix("+98") {
        Some(rest) => format!("0{rest}"),
        None => s.to_string(),
    }
}
