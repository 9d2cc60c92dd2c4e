use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ApiError;

/// Fail with one entry per missing field when any value is absent or blank
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> Result<(), ApiError> {
    let missing: BTreeMap<String, String> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| (name.to_string(), "This field is required".to_string()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("All fields are required", missing))
    }
}

/// Usernames are stored lowercase and double as channel handles in URLs
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if username.len() > 30 {
        return Err("Username must be at most 30 characters".to_string());
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err("Username can only contain letters, numbers, dot, underscore, and hyphen".to_string());
    }

    if !username.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    let (local, domain) = email.split_once('@').ok_or_else(|| "Invalid email format".to_string())?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err("Invalid email format".to_string());
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Parse a path id, naming the parameter in the error
pub fn parse_id(value: &str, name: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_fields_lists_every_missing_field() {
        let err = require_fields(&[
            ("username", Some("alice")),
            ("email", Some("  ")),
            ("password", None),
        ])
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "All fields are required");
        let body = err.to_json();
        assert_eq!(body["errors"][0]["field"], "email");
        assert_eq!(body["errors"][1]["field"], "password");
    }

    #[test]
    fn require_fields_passes_when_all_present() {
        assert!(require_fields(&[("fullName", Some("Alice A")), ("email", Some("a@b.co"))]).is_ok());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username_format("alice_01").is_ok());
        assert!(validate_username_format("al").is_err());
        assert!(validate_username_format("_alice").is_err());
        assert!(validate_username_format("alice bob").is_err());
        assert!(validate_username_format(&"a".repeat(31)).is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email_format("alice@example.com").is_ok());
        assert!(validate_email_format("alice@example").is_err());
        assert!(validate_email_format("@example.com").is_err());
        assert!(validate_email_format("alice@@example.com").is_err());
        assert!(validate_email_format("alice @example.com").is_err());
    }

    #[test]
    fn parse_id_names_the_parameter() {
        let err = parse_id("not-a-uuid", "videoId").unwrap_err();
        assert_eq!(err.message(), "Invalid videoId");
        assert!(parse_id(&Uuid::new_v4().to_string(), "videoId").is_ok());
    }
}
