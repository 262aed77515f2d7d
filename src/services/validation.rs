//! Input checks shared by the account, recipe and profile services.
//!
//! Each check returns the cleaned value or a message suitable for a
//! `Validation` error variant.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::domain::MediaType;

pub fn validate_username(username: &str) -> Result<String, String> {
    let trimmed = username.trim();
    if trimmed.chars().count() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(email: &str) -> Result<String, String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

    let trimmed = email.trim();
    if !re.is_match(trimmed) {
        return Err(format!("Invalid email address: {trimmed}"));
    }
    Ok(trimmed.to_lowercase())
}

pub fn validate_password(password: &str) -> Result<&str, String> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }
    Ok(password)
}

/// Blank values count as "not given".
pub fn validate_country(country: Option<&str>) -> Result<Option<String>, String> {
    match country.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(c) if c.chars().count() < 2 => {
            Err("Country must be at least 2 characters".to_string())
        }
        Some(c) => Ok(Some(c.to_string())),
    }
}

pub fn validate_birthdate(birthdate: Option<&str>) -> Result<Option<String>, String> {
    match birthdate.map(str::trim).filter(|b| !b.is_empty()) {
        None => Ok(None),
        Some(b) => NaiveDate::parse_from_str(b, "%Y-%m-%d")
            .map(|d| Some(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| format!("Birthdate must be YYYY-MM-DD, got {b}")),
    }
}

/// Absolute `http`/`https` URL with a host.
pub fn validate_http_url(raw: &str) -> Result<String, String> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| format!("Invalid URL: {e}"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("URL must use http or https, got {}", parsed.scheme()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("URL must include a host".to_string());
    }

    Ok(parsed.to_string())
}

pub fn validate_media_type(raw: &str) -> Result<MediaType, String> {
    raw.parse::<MediaType>()
}

pub fn validate_recipe_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 3 {
        return Err("Recipe name must be at least 3 characters".to_string());
    }
    Ok(trimmed.to_string())
}

pub fn validate_description(description: &str) -> Result<String, String> {
    let trimmed = description.trim();
    if trimmed.chars().count() < 10 {
        return Err("Description must be at least 10 characters".to_string());
    }
    Ok(trimmed.to_string())
}

pub fn validate_minutes(label: &str, minutes: i32) -> Result<i32, String> {
    if minutes < 0 {
        return Err(format!("{label} cannot be negative"));
    }
    Ok(minutes)
}

pub fn validate_servings(servings: i32) -> Result<i32, String> {
    if servings < 1 {
        return Err("Servings must be at least 1".to_string());
    }
    Ok(servings)
}

pub fn validate_step(position: usize, text: &str) -> Result<String, String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < 3 {
        return Err(format!("Step {position} must be at least 3 characters"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" Cook@Example.com ").unwrap(), "cook@example.com");
        assert!(validate_email("cook@example").is_err());
        assert!(validate_email("cook example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert!(validate_username("ab").is_err());
        assert_eq!(validate_username("  abc ").unwrap(), "abc");
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_validate_optional_fields() {
        assert_eq!(validate_country(None).unwrap(), None);
        assert_eq!(validate_country(Some("  ")).unwrap(), None);
        assert!(validate_country(Some("X")).is_err());
        assert_eq!(validate_country(Some("NL")).unwrap().as_deref(), Some("NL"));

        assert_eq!(
            validate_birthdate(Some("1990-02-28")).unwrap().as_deref(),
            Some("1990-02-28")
        );
        assert!(validate_birthdate(Some("1990-02-30")).is_err());
        assert!(validate_birthdate(Some("28/02/1990")).is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://cdn.example.com/me.png").is_ok());
        assert!(validate_http_url("ftp://example.com/me.png").is_err());
        assert!(validate_http_url("not a url").is_err());
        assert!(validate_http_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_validate_recipe_fields() {
        assert!(validate_recipe_name("Pi").is_err());
        assert!(validate_description("too short").is_err());
        assert!(validate_description("long enough text").is_ok());
        assert!(validate_minutes("Prep time", -1).is_err());
        assert!(validate_minutes("Prep time", 0).is_ok());
        assert!(validate_servings(0).is_err());
        assert!(validate_step(1, "Mix").is_ok());
        assert!(validate_step(2, "go").is_err());
        assert!(validate_media_type("gif").is_ok());
        assert!(validate_media_type("audio").is_err());
    }
}
