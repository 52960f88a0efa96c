//! Slug derivation and validation.
//!
//! Slugs name the generated document's directory and file, so they are
//! restricted to lowercase ASCII letters, digits and hyphens.

use crate::MaterializeError;

/// Derive a slug from a display name.
///
/// Lowercases the name, collapses whitespace runs into a single hyphen and
/// drops every character outside `[a-z0-9-]`. Leading and trailing hyphens
/// are trimmed. The result may be empty for names without any ASCII
/// alphanumeric character; use [`validate_slug`] to reject those.
pub fn normalize_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug.trim_matches('-').to_owned()
}

/// Check that `slug` is usable as a directory and file name.
///
/// A valid slug is non-empty, contains only `[a-z0-9-]` and has at least
/// one letter or digit.
pub fn validate_slug(slug: &str) -> Result<(), MaterializeError> {
    let in_class = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let has_alnum = slug
        .chars()
        .any(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

    if in_class && has_alnum {
        Ok(())
    } else {
        Err(MaterializeError::InvalidSlug(slug.to_owned()))
    }
}

/// Resolve the slug for a new page.
///
/// An explicit slug is validated as given; otherwise one is derived from
/// `name`. Names that normalize to nothing are rejected rather than
/// replaced by a fallback.
pub fn slug_for(name: &str, explicit: Option<&str>) -> Result<String, MaterializeError> {
    let slug = match explicit {
        Some(slug) => slug.to_owned(),
        None => normalize_slug(name),
    };
    validate_slug(&slug)?;
    Ok(slug)
}
