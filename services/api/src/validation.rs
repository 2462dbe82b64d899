//! Input validation utilities
//!
//! Each validator returns the first violated rule's message.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{NewAccount, NewContactField, NewSocialLink, ProfilePatch};

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.trim().len() < 2 {
        return Err("Name must be at least 2 characters long".to_string());
    }

    if name.len() > 100 {
        return Err("Name must be at most 100 characters long".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a registration payload, name first, then email, then password
pub fn validate_registration(payload: &NewAccount) -> Result<(), String> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    Ok(())
}

/// Validate a custom profile URL slug
pub fn validate_custom_url(custom_url: &str) -> Result<(), String> {
    if custom_url.len() < 3 {
        return Err("Custom URL must be at least 3 characters long".to_string());
    }

    if custom_url.len() > 50 {
        return Err("Custom URL must be at most 50 characters long".to_string());
    }

    static CUSTOM_URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = CUSTOM_URL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("Failed to compile custom URL regex")
    });

    if !regex.is_match(custom_url) {
        return Err(
            "Custom URL can only contain lowercase letters, numbers, and hyphens".to_string(),
        );
    }

    Ok(())
}

/// Validate a partial profile update
pub fn validate_profile_patch(patch: &ProfilePatch) -> Result<(), String> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }

    if let Some(custom_url) = &patch.custom_url {
        if !custom_url.trim().is_empty() {
            validate_custom_url(custom_url)?;
        }
    }

    for (value, label, max) in [
        (&patch.first_name, "First name", 100),
        (&patch.last_name, "Last name", 100),
        (&patch.title, "Title", 100),
        (&patch.company, "Company", 100),
        (&patch.department, "Department", 100),
        (&patch.location, "Location", 200),
    ] {
        if let Some(value) = value {
            if value.len() > max {
                return Err(format!("{} must be at most {} characters long", label, max));
            }
        }
    }

    if let Some(bio) = &patch.bio {
        if bio.len() > 1000 {
            return Err("Bio must be at most 1000 characters long".to_string());
        }
    }

    Ok(())
}

/// Validate a contact-field batch, reporting the first invalid field
pub fn validate_contact_fields(fields: &[NewContactField]) -> Result<(), String> {
    for (index, field) in fields.iter().enumerate() {
        let position = index + 1;

        if field.label.trim().is_empty() {
            return Err(format!("Contact field {}: label is required", position));
        }
        if field.label.len() > 100 {
            return Err(format!(
                "Contact field {}: label must be at most 100 characters long",
                position
            ));
        }
        if field.value.trim().is_empty() {
            return Err(format!("Contact field {}: value is required", position));
        }
        if field.value.len() > 500 {
            return Err(format!(
                "Contact field {}: value must be at most 500 characters long",
                position
            ));
        }
    }

    Ok(())
}

/// Validate a social-link batch, reporting the first invalid link
pub fn validate_social_links(links: &[NewSocialLink]) -> Result<(), String> {
    for (index, link) in links.iter().enumerate() {
        let position = index + 1;

        if link.platform.trim().is_empty() {
            return Err(format!("Social link {}: platform is required", position));
        }
        if link.platform.len() > 50 {
            return Err(format!(
                "Social link {}: platform must be at most 50 characters long",
                position
            ));
        }
        if link.url.trim().is_empty() {
            return Err(format!("Social link {}: url is required", position));
        }
        if link.url.len() > 500 {
            return Err(format!(
                "Social link {}: url must be at most 500 characters long",
                position
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Jane Doe").is_ok());
        assert_eq!(validate_name("").unwrap_err(), "Name is required");
        assert_eq!(
            validate_name("J").unwrap_err(),
            "Name must be at least 2 characters long"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@x.com").is_ok());
        assert!(validate_email("jane.doe+tag@example.co.uk").is_ok());
        assert_eq!(validate_email("").unwrap_err(), "Email is required");
        assert_eq!(
            validate_email("not-an-email").unwrap_err(),
            "Invalid email format"
        );
        assert_eq!(
            validate_email("jane@nodot").unwrap_err(),
            "Invalid email format"
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert_eq!(
            validate_password("short").unwrap_err(),
            "Password must be at least 6 characters long"
        );
        assert_eq!(validate_password("").unwrap_err(), "Password is required");
    }

    #[test]
    fn test_validate_registration_reports_first_violation() {
        let payload = NewAccount {
            name: "J".to_string(),
            email: "bad".to_string(),
            password: "".to_string(),
        };

        // Name is checked first, so its message wins
        assert_eq!(
            validate_registration(&payload).unwrap_err(),
            "Name must be at least 2 characters long"
        );
    }

    #[test]
    fn test_validate_custom_url() {
        assert!(validate_custom_url("jane-doe-42").is_ok());
        assert!(validate_custom_url("ab").is_err());
        assert!(validate_custom_url("Jane-Doe").is_err());
        assert!(validate_custom_url("-jane").is_err());
        assert!(validate_custom_url("jane doe").is_err());
    }

    #[test]
    fn test_validate_contact_fields_reports_first_invalid() {
        let fields = vec![
            NewContactField {
                label: "Email".to_string(),
                value: "jane@x.com".to_string(),
                kind: FieldKind::Email,
                is_public: true,
                order: 1,
            },
            NewContactField {
                label: "".to_string(),
                value: "555-1234".to_string(),
                kind: FieldKind::Phone,
                is_public: true,
                order: 2,
            },
        ];

        assert_eq!(
            validate_contact_fields(&fields).unwrap_err(),
            "Contact field 2: label is required"
        );
    }

    #[test]
    fn test_validate_contact_fields_accepts_valid_batch() {
        let fields = vec![NewContactField {
            label: "Email".to_string(),
            value: "jane@x.com".to_string(),
            kind: FieldKind::Email,
            is_public: true,
            order: 1,
        }];

        assert!(validate_contact_fields(&fields).is_ok());
    }
}
