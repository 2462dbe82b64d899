//! Profile, contact field, and social link models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile entity
///
/// One per account, additionally reachable through its globally unique
/// `custom_url` when the profile is public.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub custom_url: Option<String>,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    /// Object-store key backing `image_url`; not exposed to clients
    #[serde(skip_serializing)]
    pub image_key: Option<String>,
    pub is_public: bool,
    pub allow_download: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed set of contact field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Email,
    Phone,
    Website,
    Text,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Website => "website",
            FieldKind::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(FieldKind::Email),
            "phone" => Some(FieldKind::Phone),
            "website" => Some(FieldKind::Website),
            "text" => Some(FieldKind::Text),
            _ => None,
        }
    }
}

/// Contact field entity, ordered within its profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactField {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub is_public: bool,
    pub order: i32,
}

/// Contact field payload for batch replacement
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactField {
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub order: i32,
}

/// Social link entity, ordered within its profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub platform: String,
    pub url: String,
    pub is_public: bool,
    pub order: i32,
}

/// Social link payload for batch replacement
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSocialLink {
    pub platform: String,
    pub url: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub order: i32,
}

fn default_true() -> bool {
    true
}

/// Partial profile update payload
///
/// Absent properties are left untouched; present text properties set the
/// field, with the empty string clearing it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub custom_url: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_public: Option<bool>,
    pub allow_download: Option<bool>,
}

impl Profile {
    /// Merge a patch into this profile, returning the profile to persist.
    /// Empty strings clear optional text fields.
    pub fn apply(mut self, patch: ProfilePatch) -> Profile {
        if let Some(custom_url) = patch.custom_url {
            self.custom_url = none_if_empty(custom_url);
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = none_if_empty(first_name);
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = none_if_empty(last_name);
        }
        if let Some(title) = patch.title {
            self.title = none_if_empty(title);
        }
        if let Some(company) = patch.company {
            self.company = none_if_empty(company);
        }
        if let Some(department) = patch.department {
            self.department = none_if_empty(department);
        }
        if let Some(bio) = patch.bio {
            self.bio = none_if_empty(bio);
        }
        if let Some(location) = patch.location {
            self.location = none_if_empty(location);
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        if let Some(allow_download) = patch.allow_download {
            self.allow_download = allow_download;
        }
        self
    }
}

fn none_if_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Profile together with its nested collections, as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWithCollections {
    #[serde(flatten)]
    pub profile: Profile,
    pub contact_fields: Vec<ContactField>,
    pub social_links: Vec<SocialLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            custom_url: Some("jane-doe-ab12".to_string()),
            name: "Jane Doe".to_string(),
            first_name: None,
            last_name: None,
            title: Some("Engineer".to_string()),
            company: None,
            department: None,
            bio: None,
            location: None,
            image_url: None,
            image_key: None,
            is_public: true,
            allow_download: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_sets_present_fields_only() {
        let profile = sample_profile();
        let patch = ProfilePatch {
            title: Some("Director".to_string()),
            is_public: Some(false),
            ..Default::default()
        };

        let updated = profile.apply(patch);
        assert_eq!(updated.title.as_deref(), Some("Director"));
        assert!(!updated.is_public);
        // Untouched fields survive
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.custom_url.as_deref(), Some("jane-doe-ab12"));
    }

    #[test]
    fn test_apply_empty_string_clears_optional_field() {
        let profile = sample_profile();
        let patch = ProfilePatch {
            title: Some("".to_string()),
            ..Default::default()
        };

        let updated = profile.apply(patch);
        assert!(updated.title.is_none());
    }

    #[test]
    fn test_field_kind_parse_roundtrip() {
        for kind in [
            FieldKind::Email,
            FieldKind::Phone,
            FieldKind::Website,
            FieldKind::Text,
        ] {
            assert_eq!(FieldKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FieldKind::parse("fax"), None);
    }

    #[test]
    fn test_contact_field_wire_names() {
        let field: NewContactField = serde_json::from_str(
            r#"{"label":"Email","value":"jane@x.com","type":"email","isPublic":true,"order":1}"#,
        )
        .unwrap();

        assert_eq!(field.kind, FieldKind::Email);
        assert!(field.is_public);
        assert_eq!(field.order, 1);
    }
}
