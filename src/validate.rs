//! Pure input validation. Runs before anything touches storage; a
//! `ValidationError` is always answered locally with a 400.

use url::Url;

use crate::database::ContentType;

const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 100;
const TAG_MAX: usize = 20;
const PASSWORD_MIN: usize = 8;
// bcrypt truncates beyond 72 bytes
const PASSWORD_MAX: usize = 72;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid URL: {0}")]
    InvalidLink(String),
    #[error("unknown content type: {0}")]
    UnknownContentType(String),
    #[error("title must have between {TITLE_MIN} and {TITLE_MAX} characters")]
    TitleLength,
    #[error("tag must be non-empty and have at most {TAG_MAX} characters")]
    TagLength,
    #[error("first name must not be empty")]
    FirstNameEmpty,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must have between {PASSWORD_MIN} and {PASSWORD_MAX} characters")]
    PasswordLength,
}

pub fn link(raw: &str) -> Result<String, ValidationError> {
    let url = Url::parse(raw).map_err(|_| ValidationError::InvalidLink(raw.to_string()))?;
    Ok(url.to_string())
}

pub fn content_type(raw: &str) -> Result<ContentType, ValidationError> {
    ContentType::parse(raw).ok_or_else(|| ValidationError::UnknownContentType(raw.to_string()))
}

pub fn title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        return Err(ValidationError::TitleLength);
    }
    Ok(trimmed.to_string())
}

pub fn tag_names(raw: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > TAG_MAX {
            return Err(ValidationError::TagLength);
        }
        names.push(trimmed.to_string());
    }
    Ok(names)
}

pub fn first_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::FirstNameEmpty);
    }
    Ok(trimmed.to_string())
}

pub fn email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    // Deliberately loose; the uniqueness constraint is the real gate
    let well_formed = trimmed.len() >= 3
        && trimmed.contains('@')
        && !trimmed.starts_with('@')
        && !trimmed.ends_with('@');
    if !well_formed {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed.to_string())
}

pub fn password(raw: &str) -> Result<(), ValidationError> {
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&raw.len()) {
        return Err(ValidationError::PasswordLength);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_requires_a_parseable_url() {
        assert!(link("https://example.com/a").is_ok());
        assert!(matches!(
            link("not a url"),
            Err(ValidationError::InvalidLink(_))
        ));
    }

    #[test]
    fn content_type_rejects_unknown_values() {
        assert_eq!(content_type("tweet").unwrap(), ContentType::Tweet);
        assert!(matches!(
            content_type("audio"),
            Err(ValidationError::UnknownContentType(_))
        ));
    }

    #[test]
    fn title_bounds() {
        assert!(matches!(title("too short"), Err(ValidationError::TitleLength)));
        assert_eq!(title("  Ten Char Title  ").unwrap(), "Ten Char Title");
        assert!(title(&"x".repeat(101)).is_err());
        assert!(title(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn tag_bounds() {
        assert!(tag_names(&["tech".to_string(), "reading".to_string()]).is_ok());
        assert!(matches!(
            tag_names(&["ok-tag".to_string(), "   ".to_string()]),
            Err(ValidationError::TagLength)
        ));
        assert!(tag_names(&["x".repeat(21)]).is_err());
    }

    #[test]
    fn signup_fields() {
        assert_eq!(first_name(" Ada ").unwrap(), "Ada");
        assert!(first_name("   ").is_err());

        assert!(email("ada@example.com").is_ok());
        assert!(email("ada").is_err());
        assert!(email("@example.com").is_err());

        assert!(password("longenough").is_ok());
        assert!(password("short").is_err());
    }
}
