//! Record key validation.
//!
//! Valid keys:
//! - Must be non-empty
//! - Must be at most [`MAX_KEY_LEN`] bytes long
//! - Must not contain ASCII control characters
//! - Must not start or end with whitespace

use crate::error::{TypesError, TypesResult};

/// Maximum length of a record key, in bytes.
pub const MAX_KEY_LEN: usize = 256;

/// Validate a record key, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use evplan_types::validate_key;
///
/// assert!(validate_key("alice").is_ok());
/// assert!(validate_key("attendee-0042").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key(" bob").is_err());
/// ```
pub fn validate_key(key: &str) -> TypesResult<()> {
    if key.is_empty() {
        return Err(invalid(key, "key must not be empty"));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(invalid(
            key,
            format!("key is {} bytes, maximum is {MAX_KEY_LEN}", key.len()),
        ));
    }

    if let Some(ch) = key.chars().find(|c| c.is_ascii_control()) {
        return Err(invalid(key, format!("contains control character: {ch:?}")));
    }

    if key.starts_with(char::is_whitespace) || key.ends_with(char::is_whitespace) {
        return Err(invalid(key, "must not start or end with whitespace"));
    }

    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> TypesError {
    TypesError::InvalidKey {
        key: key.to_string(),
        reason: reason.into(),
    }
}
