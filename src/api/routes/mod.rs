//! API Routes
//!
//! Route handlers organized by functionality.

pub mod auth;
pub mod donations;
pub mod events_news;
pub mod health;
pub mod tickets;
pub mod users;
pub mod volunteers;
pub mod workshops;

use crate::api::error::{ApiError, ApiResult};
use crate::forms::{is_valid_email, MESSAGE_MAX_CHARS};

/// Reject blank required fields
pub(crate) fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> ApiResult<()> {
    if !is_valid_email(value) {
        return Err(ApiError::Validation(format!(
            "'{}' is not a valid email address",
            value.trim()
        )));
    }
    Ok(())
}

/// Free-text bodies: non-empty and bounded
pub(crate) fn require_message(field: &str, value: &str) -> ApiResult<()> {
    require(field, value)?;
    if value.chars().count() > MESSAGE_MAX_CHARS {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters",
            field, MESSAGE_MAX_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators() {
        assert!(require("name", "  ").is_err());
        assert!(require("name", "Ana").is_ok());
        assert!(require_email("ana@example.org").is_ok());
        assert!(require_email("ana@example").is_err());
        assert!(require_message("body", &"x".repeat(MESSAGE_MAX_CHARS + 1)).is_err());
    }
}
