//! Bulk profile updates from the web form

use crate::facade::Directory;
use crate::invalidation::DirectoryWrite;
use crate::ldap::attrs;
use profiles_core::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One editable profile field: the form key and the attribute it writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileField {
    pub form_key: &'static str,
    pub attribute: &'static str,
    /// Optional fields are skipped when the form does not submit them
    pub optional: bool,
}

const fn field(form_key: &'static str, attribute: &'static str) -> ProfileField {
    ProfileField {
        form_key,
        attribute,
        optional: false,
    }
}

const fn optional(form_key: &'static str, attribute: &'static str) -> ProfileField {
    ProfileField {
        form_key,
        attribute,
        optional: true,
    }
}

/// Fields written by [`Directory::update_profile`], in write order
pub const PROFILE_FIELDS: [ProfileField; 15] = [
    field("name", attrs::CN),
    field("birthday", attrs::BIRTHDAY),
    field("phone", attrs::MOBILE),
    field("plex", attrs::PLEX),
    optional("major", attrs::MAJOR),
    optional("minor", attrs::MINOR),
    optional("ritYear", attrs::RIT_YEAR),
    field("website", attrs::HOMEPAGE_URL),
    field("github", attrs::GITHUB),
    field("twitter", attrs::TWITTER_NAME),
    field("blog", attrs::BLOG_URL),
    field("google", attrs::GOOGLE_SCREEN_NAME),
    field("mail", attrs::MAIL),
    field("nickname", attrs::NICKNAME),
    field("shell", attrs::LOGIN_SHELL),
];

/// Form placeholders for "no value" become `None`
pub fn normalize_form_value(value: &str) -> Option<&str> {
    match value {
        "None" | "" => None,
        other => Some(other),
    }
}

impl Directory {
    /// Apply submitted profile fields to a member, writing only the fields
    /// whose value changed. Returns the attributes written.
    pub async fn update_profile(
        &self,
        form: &HashMap<String, String>,
        uid: &str,
    ) -> Result<Vec<&'static str>> {
        if let Some(missing) = PROFILE_FIELDS
            .iter()
            .find(|f| !f.optional && !form.contains_key(f.form_key))
        {
            return Err(Error::MissingField(missing.form_key.to_string()));
        }

        // Compare against the directory, not a cached snapshot
        let mut member = self
            .client()
            .find_member(uid)
            .await?
            .ok_or_else(|| Error::NoSuchMember(uid.to_string()))?;

        let mut written = Vec::new();
        let mut failure = None;
        for field in PROFILE_FIELDS.iter() {
            let Some(submitted) = form.get(field.form_key) else {
                continue;
            };

            let value = normalize_form_value(submitted);
            if value == member.get_attribute(field.attribute) {
                continue;
            }

            if let Err(e) = self
                .client()
                .set_attribute(&member, field.attribute, value)
                .await
            {
                warn!("Writing {} of {} failed: {}", field.attribute, uid, e);
                failure = Some(e);
                break;
            }
            member.apply_attribute(field.attribute, value);
            written.push(field.attribute);
        }

        // Fields written before a failure are already in the directory
        if written.is_empty() {
            debug!("Profile of {} unchanged", uid);
        } else {
            info!("Updated {} profile fields of {}", written.len(), uid);
            self.invalidate_for(written.iter().map(|attr| DirectoryWrite::Attribute(*attr)))
                .await;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_form_value() {
        assert_eq!(normalize_form_value("None"), None);
        assert_eq!(normalize_form_value(""), None);
        assert_eq!(normalize_form_value("none"), Some("none"));
        assert_eq!(normalize_form_value("1990-01-01"), Some("1990-01-01"));
    }

    #[test]
    fn test_optional_fields() {
        let optional: Vec<&str> = PROFILE_FIELDS
            .iter()
            .filter(|f| f.optional)
            .map(|f| f.form_key)
            .collect();
        assert_eq!(optional, vec!["major", "minor", "ritYear"]);
    }

    #[test]
    fn test_shell_writes_login_shell() {
        let shell = PROFILE_FIELDS.iter().find(|f| f.form_key == "shell").unwrap();
        assert_eq!(shell.attribute, "loginShell");
    }
}
