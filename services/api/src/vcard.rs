//! vCard 3.0 rendering
//!
//! `render_vcard` is a pure function of a profile snapshot: the same input
//! always yields byte-identical output. Values are emitted verbatim, so a
//! field containing vCard metacharacters reaches the address book as-is.

use crate::models::{ContactField, FieldKind, Profile, SocialLink};

/// Render a profile as a vCard 3.0 document, lines joined with CRLF
///
/// Contact fields are expected in display order; the first field of each
/// kind supplies the corresponding vCard property.
pub fn render_vcard(profile: &Profile, fields: &[ContactField], links: &[SocialLink]) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("BEGIN:VCARD".to_string());
    lines.push("VERSION:3.0".to_string());

    let (first, last) = structured_name(profile);
    let full_name = format!("{} {}", first, last);
    lines.push(format!("N:{};{};;;", last, first));
    lines.push(format!("FN:{}", full_name.trim()));

    if let Some(title) = non_empty(profile.title.as_deref()) {
        lines.push(format!("TITLE:{}", title));
    }
    if let Some(company) = non_empty(profile.company.as_deref()) {
        lines.push(format!("ORG:{}", company));
    }

    if let Some(phone) = first_of_kind(fields, FieldKind::Phone) {
        lines.push(format!("TEL;TYPE=CELL:{}", phone.value));
    }
    if let Some(email) = first_of_kind(fields, FieldKind::Email) {
        lines.push(format!("EMAIL;TYPE=INTERNET:{}", email.value));
    }
    if let Some(website) = first_of_kind(fields, FieldKind::Website) {
        lines.push(format!("URL:{}", website.value));
    }

    if let Some(location) = non_empty(profile.location.as_deref()) {
        lines.push(format!("ADR;TYPE=WORK:;;{};;;;", location));
    }
    if let Some(bio) = non_empty(profile.bio.as_deref()) {
        lines.push(format!("NOTE:{}", bio));
    }
    if let Some(image_url) = non_empty(profile.image_url.as_deref()) {
        lines.push(format!("PHOTO;VALUE=URL:{}", image_url));
    }

    for link in links {
        lines.push(format!("URL;TYPE={}:{}", link.platform.to_uppercase(), link.url));
    }

    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}

/// Suggested download filename for a profile's vCard
pub fn vcard_filename(name: &str) -> String {
    let mut stem = String::new();
    let mut last_was_underscore = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            stem.push('_');
            last_was_underscore = true;
        }
    }
    let stem = stem.trim_matches('_');
    let stem = if stem.is_empty() { "contact" } else { stem };

    format!("{}.vcf", stem)
}

/// Structured first/last name, falling back to splitting the display name
/// on the first space
fn structured_name(profile: &Profile) -> (String, String) {
    let first = non_empty(profile.first_name.as_deref());
    let last = non_empty(profile.last_name.as_deref());

    if first.is_some() || last.is_some() {
        return (
            first.unwrap_or_default().to_string(),
            last.unwrap_or_default().to_string(),
        );
    }

    let name = profile.name.trim();
    match name.split_once(' ') {
        Some((head, rest)) => (head.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_of_kind(fields: &[ContactField], kind: FieldKind) -> Option<&ContactField> {
    fields.iter().find(|field| field.kind == kind)
}
