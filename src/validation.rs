//! Callsign normalization and validation.
//!
//! All storage and comparison of callsigns happens on the upper-cased, trimmed form.
//! [`normalize_callsign`] never fails and is what the store applies to every sender,
//! recipient and user lookup; [`validate_callsign`] is the stricter check applied to
//! callsigns typed by a caller before anything is persisted.

/// Longest accepted callsign, including any `-SSID` or `/portable` suffix.
pub const MAX_CALLSIGN_LEN: usize = 15;

/// Callsign validation errors with caller-facing messages
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CallsignError {
    #[error("Callsign is empty")]
    Empty,

    #[error("Callsign is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Callsign contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },
}

/// Trim and upper-case a callsign.
pub fn normalize_callsign(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize and validate a caller-supplied callsign.
///
/// Accepts ASCII letters, digits, `-` and `/`.
pub fn validate_callsign(raw: &str) -> Result<String, CallsignError> {
    let call = normalize_callsign(raw);
    if call.is_empty() {
        return Err(CallsignError::Empty);
    }
    if call.chars().count() > MAX_CALLSIGN_LEN {
        return Err(CallsignError::TooLong {
            max: MAX_CALLSIGN_LEN,
        });
    }
    let mut bad: Vec<char> = call
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '/'))
        .collect();
    if !bad.is_empty() {
        bad.dedup();
        return Err(CallsignError::InvalidCharacters {
            chars: bad.into_iter().collect(),
        });
    }
    Ok(call)
}
