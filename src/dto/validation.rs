//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_NAME_LENGTH: usize = 24;

/// Validates that a player name is 1–24 word characters.
///
/// Names are embedded into record document ids and URL paths, so anything
/// beyond `[A-Za-z0-9_-]` is rejected up front.
pub fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("user_name_length");
        err.message = Some(
            format!(
                "Player name must be 1 to {} characters (got {})",
                MAX_NAME_LENGTH,
                name.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("user_name_format");
        err.message =
            Some("Player name must contain only letters, digits, `_`, or `-`".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_name_valid() {
        assert!(validate_user_name("ana").is_ok());
        assert!(validate_user_name("Player_1").is_ok());
        assert!(validate_user_name("a-b-c").is_ok());
    }

    #[test]
    fn test_validate_user_name_invalid_length() {
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name(&"x".repeat(25)).is_err());
    }

    #[test]
    fn test_validate_user_name_invalid_format() {
        assert!(validate_user_name("ana maria").is_err()); // space
        assert!(validate_user_name("ana/../x").is_err()); // path characters
        assert!(validate_user_name("añita").is_err()); // non-ascii
    }
}
