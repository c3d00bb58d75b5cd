/// Request validation shared by the intake and admin handlers.
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest accepted email address, per RFC 5321's path limit.
pub const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    InvalidBody,
    #[error("missing required fields: {0}")]
    MissingRequired(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid value for field {0}")]
    InvalidField(&'static str),
}

/// Check an email address the way the intake forms do: at most 254
/// characters, no whitespace anywhere, a non-empty local part before the
/// first `@`, and a domain with an interior dot and no second `@`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') || !has_interior_dot(domain) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn has_interior_dot(domain: &str) -> bool {
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Pull a required string field out of a request body. Absent, empty, and
/// non-string values all count as missing; `required` names the handler's
/// full required set for the error message.
pub fn required_str(
    body: &Map<String, Value>,
    field: &str,
    required: &'static str,
) -> Result<String, ValidationError> {
    match body.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ValidationError::MissingRequired(required)),
    }
}

/// Optional string field, defaulting to the empty string. Never validated
/// beyond presence; stored verbatim.
pub fn optional_str(body: &Map<String, Value>, field: &str) -> String {
    body.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_ordinary_addresses() {
        for email in [
            "test@example.com",
            "user.name+tag@example.co.uk",
            "firstname-lastname@domain.org",
        ] {
            assert_eq!(validate_email(email), Ok(()), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "plainaddress",
            "@missingdomain.com",
            "missing@.com",
            "nodot@domain",
            "trailingdot@domain.",
            "spaces in@email.com",
            "tab\t@example.com",
            "two@at@signs.com",
        ] {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::InvalidEmail),
                "{email}"
            );
        }
    }

    #[test]
    fn enforces_length_limit() {
        let local = "a".repeat(MAX_EMAIL_LEN - "@example.com".len());
        let at_limit = format!("{local}@example.com");
        assert_eq!(at_limit.len(), MAX_EMAIL_LEN);
        assert_eq!(validate_email(&at_limit), Ok(()));

        let over = format!("a{at_limit}");
        assert_eq!(validate_email(&over), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn required_rejects_missing_empty_and_non_string() {
        let body = json!({ "email": "", "age": 65 });
        let body = body.as_object().unwrap();

        assert_eq!(
            required_str(body, "email", "email"),
            Err(ValidationError::MissingRequired("email"))
        );
        assert_eq!(
            required_str(body, "name", "name"),
            Err(ValidationError::MissingRequired("name"))
        );
        assert_eq!(
            required_str(body, "age", "age"),
            Err(ValidationError::MissingRequired("age"))
        );
    }

    #[test]
    fn optional_defaults_to_empty() {
        let body = json!({ "name": "Test", "age": 65 });
        let body = body.as_object().unwrap();

        assert_eq!(optional_str(body, "name"), "Test");
        assert_eq!(optional_str(body, "missing"), "");
        assert_eq!(optional_str(body, "age"), "");
    }
}
