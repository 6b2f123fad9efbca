//! Directory entry and member types
//!
//! A [`Member`] is a snapshot of one account entry. Writes performed through
//! the [`Directory`](crate::Directory) facade patch the snapshot after the
//! directory accepts them, so the caller holding it keeps seeing its own
//! writes without another round trip.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Directory attribute names used by the profiles application
pub mod attrs {
    pub const UID: &str = "uid";
    pub const CN: &str = "cn";
    pub const MEMBER_OF: &str = "memberOf";
    pub const DESCRIPTION: &str = "description";
    pub const HEAD: &str = "head";
    pub const MAIL: &str = "mail";
    pub const NICKNAME: &str = "nickname";
    pub const BIRTHDAY: &str = "birthday";
    pub const MOBILE: &str = "mobile";
    pub const PLEX: &str = "plex";
    pub const MAJOR: &str = "major";
    pub const MINOR: &str = "minor";
    pub const RIT_YEAR: &str = "ritYear";
    pub const HOMEPAGE_URL: &str = "homepageURL";
    pub const GITHUB: &str = "github";
    pub const TWITTER_NAME: &str = "twitterName";
    pub const BLOG_URL: &str = "blogURL";
    pub const GOOGLE_SCREEN_NAME: &str = "googleScreenName";
    pub const LOGIN_SHELL: &str = "loginShell";
    pub const ROOM_NUMBER: &str = "roomNumber";
    pub const HOUSING_POINTS: &str = "housingPoints";
    pub const JPEG_PHOTO: &str = "jpegPhoto";
}

/// Substring identifying DNs that live in the groups subtree
pub const GROUPS_SUBTREE: &str = "cn=groups,cn=accounts";

/// Search scope for raw directory searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    Base,
    OneLevel,
    Subtree,
}

/// One row of a raw directory search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub dn: String,

    #[serde(default)]
    pub attrs: HashMap<String, Vec<String>>,

    #[serde(default, skip_serializing)]
    pub bin_attrs: HashMap<String, Vec<Vec<u8>>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    /// First value of an attribute, matching the name case-insensitively
    pub fn first_attr(&self, name: &str) -> Option<&str> {
        lookup(&self.attrs, name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }
}

/// Member account snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member DN
    pub dn: String,

    /// Unique username
    pub uid: String,

    /// Text attributes
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,

    /// Binary attributes (photos)
    #[serde(default, skip_serializing)]
    pub binary_attributes: HashMap<String, Vec<Vec<u8>>>,
}

impl Member {
    pub fn new(uid: impl Into<String>, dn: impl Into<String>) -> Self {
        let uid = uid.into();
        let mut attributes = HashMap::new();
        attributes.insert(attrs::UID.to_string(), vec![uid.clone()]);

        Self {
            dn: dn.into(),
            uid,
            attributes,
            binary_attributes: HashMap::new(),
        }
    }

    /// Build a member from a search row. Rows without a `uid` are not members.
    pub fn from_entry(entry: DirectoryEntry) -> Option<Self> {
        let uid = entry.first_attr(attrs::UID)?.to_string();

        Some(Self {
            dn: entry.dn,
            uid,
            attributes: entry.attrs,
            binary_attributes: entry.bin_attrs,
        })
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    pub fn with_group(mut self, group_dn: impl Into<String>) -> Self {
        self.add_group_dn(&group_dn.into());
        self
    }

    pub fn with_photo(mut self, photo: Vec<u8>) -> Self {
        self.binary_attributes
            .insert(attrs::JPEG_PHOTO.to_string(), vec![photo]);
        self
    }

    /// Get first value of an attribute
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        lookup(&self.attributes, name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.get_attribute(attrs::CN)
    }

    /// Group DNs from `memberOf`
    pub fn member_of(&self) -> &[String] {
        lookup(&self.attributes, attrs::MEMBER_OF)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// True if any `memberOf` DN's leading component names `group`.
    pub fn is_member_of(&self, group: &str) -> bool {
        self.member_of()
            .iter()
            .any(|dn| leading_rdn_value(dn) == group)
    }

    /// Relative names of every membership under the groups subtree
    pub fn group_names(&self) -> Vec<String> {
        self.member_of()
            .iter()
            .filter(|dn| dn.contains(GROUPS_SUBTREE))
            .map(|dn| leading_rdn_value(dn).to_string())
            .collect()
    }

    pub fn photo(&self) -> Option<&[u8]> {
        if let Some(photo) = lookup(&self.binary_attributes, attrs::JPEG_PHOTO).and_then(|v| v.first())
        {
            return Some(photo.as_slice());
        }

        self.get_attribute(attrs::JPEG_PHOTO).map(|s| s.as_bytes())
    }

    /// Replace an attribute locally; `None` removes it.
    pub(crate) fn apply_attribute(&mut self, name: &str, value: Option<&str>) {
        let key = self
            .attributes
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.to_string());

        match value {
            Some(v) => {
                self.attributes.insert(key, vec![v.to_string()]);
            }
            None => {
                self.attributes.remove(&key);
            }
        }
    }

    pub(crate) fn add_group_dn(&mut self, group_dn: &str) {
        let key = self
            .attributes
            .keys()
            .find(|k| k.eq_ignore_ascii_case(attrs::MEMBER_OF))
            .cloned()
            .unwrap_or_else(|| attrs::MEMBER_OF.to_string());

        let groups = self.attributes.entry(key).or_default();
        if !groups.iter().any(|g| g.eq_ignore_ascii_case(group_dn)) {
            groups.push(group_dn.to_string());
        }
    }

    pub(crate) fn remove_group_dn(&mut self, group_dn: &str) {
        for (name, values) in self.attributes.iter_mut() {
            if name.eq_ignore_ascii_case(attrs::MEMBER_OF) {
                values.retain(|g| !g.eq_ignore_ascii_case(group_dn));
            }
        }
    }
}

/// Value of the leading relative name of a DN, e.g. `active` for
/// `cn=active,cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu`.
pub fn leading_rdn_value(dn: &str) -> &str {
    let rdn = dn.split(',').next().unwrap_or("");
    match rdn.split_once('=') {
        Some((_, value)) => value,
        None => rdn,
    }
}

// LDAP attribute names are case-insensitive; try the exact key first.
fn lookup<'a, V>(map: &'a HashMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: &str = "cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu";

    fn jdoe() -> Member {
        Member::new("jdoe", "uid=jdoe,cn=users,cn=accounts,dc=csh,dc=rit,dc=edu")
    }

    #[test]
    fn test_leading_rdn_value() {
        assert_eq!(leading_rdn_value(&format!("cn=active,{}", GROUPS)), "active");
        assert_eq!(leading_rdn_value("cn=onfloor"), "onfloor");
        assert_eq!(leading_rdn_value("uid=jdoe,dc=csh"), "jdoe");
        assert_eq!(leading_rdn_value(""), "");
    }

    #[test]
    fn test_group_membership_matching() {
        let member = jdoe()
            .with_group(format!("cn=active,{}", GROUPS))
            .with_group(format!("cn=eboard-imps,{}", GROUPS));

        assert!(member.is_member_of("active"));
        assert!(member.is_member_of("eboard-imps"));
        // Exact match only, no prefix matching
        assert!(!member.is_member_of("eboard"));
        assert!(!member.is_member_of("act"));
    }

    #[test]
    fn test_group_names_only_from_groups_subtree() {
        let member = jdoe()
            .with_group(format!("cn=active,{}", GROUPS))
            .with_group("cn=drink,ou=Committees,dc=csh,dc=rit,dc=edu")
            .with_group(format!("cn=rtp,{}", GROUPS));

        assert_eq!(member.group_names(), vec!["active", "rtp"]);
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let mut member = jdoe().with_attribute("roomNumber", "1234");
        assert_eq!(member.get_attribute("roomnumber"), Some("1234"));

        member.apply_attribute("ROOMNUMBER", Some("4321"));
        assert_eq!(member.get_attribute("roomNumber"), Some("4321"));
        assert_eq!(member.attributes.len(), 2);

        member.apply_attribute("roomNumber", None);
        assert_eq!(member.get_attribute("roomNumber"), None);
    }

    #[test]
    fn test_membership_patching() {
        let active = format!("cn=active,{}", GROUPS);
        let mut member = jdoe();

        member.add_group_dn(&active);
        member.add_group_dn(&active);
        assert_eq!(member.member_of().len(), 1);

        member.remove_group_dn(&active);
        assert!(!member.is_member_of("active"));
    }

    #[test]
    fn test_from_entry_requires_uid() {
        let entry = DirectoryEntry::new("cn=active,cn=groups").with_attr("cn", "active");
        assert!(Member::from_entry(entry).is_none());

        let entry = DirectoryEntry::new("uid=jdoe,cn=users").with_attr("uid", "jdoe");
        let member = Member::from_entry(entry).unwrap();
        assert_eq!(member.uid, "jdoe");
        assert_eq!(member.dn, "uid=jdoe,cn=users");
    }

    #[test]
    fn test_photo_prefers_binary_value() {
        let member = jdoe().with_photo(vec![0xff, 0xd8, 0xff]);
        assert_eq!(member.photo(), Some(&[0xff, 0xd8, 0xff][..]));
        assert_eq!(jdoe().photo(), None);
    }

    #[test]
    fn test_photo_not_serialized() {
        let member = jdoe().with_photo(vec![1, 2, 3]);
        let json = serde_json::to_value(&member).unwrap();

        assert_eq!(json["uid"], "jdoe");
        assert!(json.get("binary_attributes").is_none());
    }
}
