//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen for reasonable dashboard UX; the embedded database
//! has no built-in TEXT length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: restaurant, menu, course, dish, modifier, schedule, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, notes (dish descriptions, order notes, ...)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, coupon codes, slugs, franchise codes
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Hostnames (RFC 1035)
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Passwords and device keys (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a URL-path-safe slug: lowercase letters, digits, hyphens.
pub fn validate_slug(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_SHORT_TEXT_LEN)?;
    let ok = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-');
    if !ok {
        return Err(AppError::validation(format!(
            "{field} must contain only lowercase letters, digits and hyphens"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Lunch", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_slug() {
        assert!(validate_slug("el-rancho-2", "slug").is_ok());
        assert!(validate_slug("El Rancho", "slug").is_err());
        assert!(validate_slug("-leading", "slug").is_err());
    }
}
