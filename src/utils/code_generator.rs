//! Short code generation and validation utilities.
//!
//! Provides random code generation for allocations without a custom code and
//! validation for user-provided codes.

use crate::error::AppError;
use serde_json::json;
use uuid::Uuid;

/// Length of generated short codes.
///
/// Six hex characters give ~16.7M combinations; the store's atomic
/// set-if-absent check is the correctness backstop for collisions, not the
/// generator's uniqueness.
pub const CODE_LENGTH: usize = 6;

/// Maximum length accepted for custom codes.
const MAX_CUSTOM_CODE_LENGTH: usize = 32;

/// Reserved codes that cannot be used as short links.
///
/// These codes are reserved for system endpoints to prevent routing conflicts.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Generates a random short code.
///
/// Takes the first [`CODE_LENGTH`] characters of a v4 UUID in hex form.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn generate_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..CODE_LENGTH].to_string()
}

/// Validates a user-provided custom short code.
///
/// The allocator itself accepts any non-empty candidate verbatim; these
/// rules protect routing and keep codes URL-safe:
///
/// - Length: 1-32 characters
/// - Allowed characters: letters, digits, hyphens, underscores
/// - Cannot be a reserved system code
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() || code.len() > MAX_CUSTOM_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom code must be 1-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, hyphens, and underscores",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_is_hex() {
        let code = generate_code();
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_code_produces_distinct_codes() {
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            codes.insert(generate_code());
        }

        // A handful of collisions in 1000 draws over 16^6 would be astronomical.
        assert!(codes.len() > 990);
    }

    #[test]
    fn test_validate_simple_code() {
        assert!(validate_custom_code("abc123").is_ok());
    }

    #[test]
    fn test_validate_with_hyphen_and_underscore() {
        assert!(validate_custom_code("my-link_2024").is_ok());
    }

    #[test]
    fn test_validate_single_character() {
        assert!(validate_custom_code("x").is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert!(validate_custom_code("").is_err());
    }

    #[test]
    fn test_validate_too_long() {
        let code = "a".repeat(MAX_CUSTOM_CODE_LENGTH + 1);
        assert!(validate_custom_code(&code).is_err());
    }

    #[test]
    fn test_validate_special_characters() {
        assert!(validate_custom_code("my code").is_err());
        assert!(validate_custom_code("code/123").is_err());
        assert!(validate_custom_code("code?x=1").is_err());
    }

    #[test]
    fn test_validate_all_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(
                validate_custom_code(reserved).is_err(),
                "Reserved code '{}' should be invalid",
                reserved
            );
        }
    }
}
