//! Phone number presentation helpers.
//!
//! Stored phones are digit streams such as `6474441552`; the only display
//! form is `(647) 444-1552`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Digits required for a displayable phone number.
pub const PHONE_DIGITS: usize = 10;

static PHONE_PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[()\-.\s]+").expect("valid phone punctuation regex"));

/// Phone value that cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneFormatError {
    pub value: String,
}

impl Display for PhoneFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid phone number `{}`; expected a {PHONE_DIGITS} digit stream",
            self.value
        )
    }
}

impl Error for PhoneFormatError {}

/// Formats a ten digit stream as `(AAA) MMM-TTTT`.
///
/// # Errors
/// - Returns `PhoneFormatError` unless the trimmed input is exactly ten ASCII
///   digits.
pub fn digit_stream_to_phone(stream: &str) -> Result<String, PhoneFormatError> {
    let digits = stream.trim();
    if digits.len() != PHONE_DIGITS || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(PhoneFormatError {
            value: stream.to_string(),
        });
    }

    Ok(format!(
        "({}) {}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..]
    ))
}

/// Strips display punctuation from a phone number, leaving its digit stream.
///
/// Leading zeros are preserved. Length is not checked here; partial numbers
/// are valid query values.
///
/// # Errors
/// - Returns `PhoneFormatError` when nothing remains or a non-digit survives.
pub fn phone_to_digit_stream(phone: &str) -> Result<String, PhoneFormatError> {
    let stripped = PHONE_PUNCTUATION_RE.replace_all(phone, "");
    if stripped.is_empty() || !stripped.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(PhoneFormatError {
            value: phone.to_string(),
        });
    }
    Ok(stripped.into_owned())
}
