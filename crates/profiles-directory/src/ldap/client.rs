//! LDAP client implementation
//!
//! Handles LDAP connections, member and group queries, and attribute writes.
//! Supports LDAP, LDAPS (SSL), and STARTTLS connections. Every call opens a
//! connection, binds with the service account and unbinds when done.

use crate::client::DirectoryClient;
use crate::ldap::types::*;
use async_trait::async_trait;
use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry};
use profiles_core::config::LdapConfigSection;
use profiles_core::{Error, Result};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// LDAP result code for a search base that does not exist
const RC_NO_SUCH_OBJECT: u32 = 32;

/// Attributes requested for member entries. `memberOf` is operational on
/// FreeIPA and has to be asked for explicitly.
const MEMBER_ATTRS: [&str; 2] = ["*", attrs::MEMBER_OF];

/// Directory client backed by a live LDAP server
pub struct LdapDirectory {
    config: LdapConfigSection,
}

impl LdapDirectory {
    /// Create a new LDAP directory client
    pub fn new(config: LdapConfigSection) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LdapConfigSection {
        &self.config
    }

    /// Open a connection and bind with the service account
    async fn connect(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.timeout_seconds))
            .set_starttls(self.config.start_tls);

        debug!("Connecting to LDAP server: {}", self.config.server_url);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.server_url)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to LDAP server: {}", e)))?;

        ldap3::drive!(conn);

        let result = ldap
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .map_err(|e| Error::Connection(format!("Service bind failed: {}", e)))?;

        if result.rc != 0 {
            return Err(Error::Connection(format!(
                "Service account bind failed with code: {}",
                result.rc
            )));
        }

        Ok(ldap)
    }

    fn user_filter(uid: &str) -> String {
        format!("(uid={})", ldap_escape(uid))
    }

    fn roster_filter(&self, group: &str) -> String {
        format!("(memberOf={})", ldap_escape(self.group_dn(group)))
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn find_member(&self, uid: &str) -> Result<Option<Member>> {
        let mut ldap = self.connect().await?;
        let filter = Self::user_filter(uid);

        debug!("Searching for member with filter: {}", filter);

        let entries = search_with(
            &mut ldap,
            &self.config.user_base_dn,
            Scope::Subtree,
            &filter,
            MEMBER_ATTRS.to_vec(),
        )
        .await;
        let _ = ldap.unbind().await;

        Ok(entries?.into_iter().find_map(Member::from_entry))
    }

    async fn find_member_by_dn(&self, dn: &str) -> Result<Option<Member>> {
        let mut ldap = self.connect().await?;
        let member = member_by_dn(&mut ldap, dn).await;
        let _ = ldap.unbind().await;
        member
    }

    async fn group_members(&self, group: &str) -> Result<Vec<Member>> {
        let mut ldap = self.connect().await?;
        let filter = self.roster_filter(group);

        debug!("Searching group roster with filter: {}", filter);

        let entries = search_with(
            &mut ldap,
            &self.config.user_base_dn,
            Scope::Subtree,
            &filter,
            MEMBER_ATTRS.to_vec(),
        )
        .await;
        let _ = ldap.unbind().await;

        let members: Vec<Member> = entries?.into_iter().filter_map(Member::from_entry).collect();
        debug!("Found {} members in group {}", members.len(), group);
        Ok(members)
    }

    async fn add_group_member(&self, group: &str, member: &Member) -> Result<()> {
        let group_dn = self.group_dn(group);
        let mut ldap = self.connect().await?;

        let result = modify_with(
            &mut ldap,
            &group_dn,
            vec![Mod::Add("member", HashSet::from([member.dn.as_str()]))],
        )
        .await;
        let _ = ldap.unbind().await;
        result?;

        info!("Added {} to group {}", member.uid, group);
        Ok(())
    }

    async fn remove_group_member(&self, group: &str, member: &Member) -> Result<()> {
        let group_dn = self.group_dn(group);
        let mut ldap = self.connect().await?;

        let result = modify_with(
            &mut ldap,
            &group_dn,
            vec![Mod::Delete("member", HashSet::from([member.dn.as_str()]))],
        )
        .await;
        let _ = ldap.unbind().await;
        result?;

        info!("Removed {} from group {}", member.uid, group);
        Ok(())
    }

    async fn directorship_heads(&self, directorship: &str) -> Result<Vec<String>> {
        let mut ldap = self.connect().await?;
        let heads = directorship_heads_with(&mut ldap, &self.config, directorship).await;
        let _ = ldap.unbind().await;
        heads
    }

    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<DirectoryEntry>> {
        let mut ldap = self.connect().await?;

        debug!("Searching {} with filter: {}", base_dn, filter);

        let entries = search_with(&mut ldap, base_dn, to_ldap_scope(scope), filter, attrs.to_vec()).await;
        let _ = ldap.unbind().await;
        entries
    }

    async fn set_attribute(&self, member: &Member, attr: &str, value: Option<&str>) -> Result<()> {
        let values: HashSet<&str> = value.into_iter().collect();
        let mut ldap = self.connect().await?;

        // Replace with an empty set removes the attribute
        let result = modify_with(&mut ldap, &member.dn, vec![Mod::Replace(attr, values)]).await;
        let _ = ldap.unbind().await;
        result?;

        info!("Set {} on {}", attr, member.uid);
        Ok(())
    }

    fn base_dn(&self) -> &str {
        &self.config.base_dn
    }

    fn group_base_dn(&self) -> &str {
        &self.config.group_base_dn
    }
}

fn to_ldap_scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

async fn search_with(
    ldap: &mut Ldap,
    base: &str,
    scope: Scope,
    filter: &str,
    attrs: Vec<&str>,
) -> Result<Vec<DirectoryEntry>> {
    let ldap3::SearchResult(rs, res) = ldap
        .search(base, scope, filter, attrs)
        .await
        .map_err(|e| Error::Directory(format!("Search failed: {}", e)))?;

    if res.rc == RC_NO_SUCH_OBJECT {
        debug!("Search base does not exist: {}", base);
        return Ok(Vec::new());
    }

    let (rs, _res) = ldap3::SearchResult(rs, res)
        .success()
        .map_err(|e| Error::Directory(format!("Search error: {}", e)))?;

    Ok(rs
        .into_iter()
        .map(|r| {
            let entry = SearchEntry::construct(r);
            DirectoryEntry {
                dn: entry.dn,
                attrs: entry.attrs,
                bin_attrs: entry.bin_attrs,
            }
        })
        .collect())
}

async fn modify_with(ldap: &mut Ldap, dn: &str, mods: Vec<Mod<&str>>) -> Result<()> {
    ldap.modify(dn, mods)
        .await
        .map_err(|e| Error::Directory(format!("Modify failed: {}", e)))?
        .success()
        .map_err(|e| Error::Directory(format!("Modify of {} rejected: {}", dn, e)))?;

    Ok(())
}

async fn member_by_dn(ldap: &mut Ldap, dn: &str) -> Result<Option<Member>> {
    let entries = search_with(ldap, dn, Scope::Base, "(objectClass=*)", MEMBER_ATTRS.to_vec()).await?;
    Ok(entries.into_iter().find_map(Member::from_entry))
}

async fn directorship_heads_with(
    ldap: &mut Ldap,
    config: &LdapConfigSection,
    directorship: &str,
) -> Result<Vec<String>> {
    let filter = format!("(cn={})", ldap_escape(directorship));

    debug!("Searching directorship with filter: {}", filter);

    let entries = search_with(
        ldap,
        &config.committee_base_dn,
        Scope::Subtree,
        &filter,
        vec![attrs::HEAD],
    )
    .await?;

    let Some(entry) = entries.into_iter().next() else {
        warn!("Directorship not found: {}", directorship);
        return Ok(Vec::new());
    };

    // Only account entries can head a directorship
    let heads: Vec<String> = entry
        .attrs
        .into_iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(attrs::HEAD))
        .flat_map(|(_, values)| values)
        .filter(|dn| dn.starts_with("uid="))
        .collect();

    debug!("Found {} heads for directorship {}", heads.len(), directorship);
    Ok(heads)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LdapConfigSection {
        LdapConfigSection {
            server_url: "ldap://localhost:389".to_string(),
            bind_dn: "uid=profiles,cn=users,cn=accounts,dc=csh,dc=rit,dc=edu".to_string(),
            bind_password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ldap_directory_creation() {
        // Note: actual queries require a running LDAP server
        let directory = LdapDirectory::new(config()).unwrap();
        assert_eq!(directory.base_dn(), "dc=csh,dc=rit,dc=edu");
        assert_eq!(
            directory.group_dn("active"),
            "cn=active,cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LdapConfigSection {
            server_url: "localhost:389".to_string(),
            ..config()
        };
        assert!(LdapDirectory::new(config).is_err());
    }

    #[test]
    fn test_filters_escape_input() {
        let directory = LdapDirectory::new(config()).unwrap();

        assert_eq!(LdapDirectory::user_filter("jdoe"), "(uid=jdoe)");
        assert_eq!(LdapDirectory::user_filter("*)(uid=*"), "(uid=\\2a\\29\\28uid=\\2a)");
        assert_eq!(
            directory.roster_filter("current_student"),
            "(memberOf=cn=current_student,cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu)"
        );
    }

    #[test]
    fn test_scope_mapping() {
        assert!(matches!(to_ldap_scope(SearchScope::Base), Scope::Base));
        assert!(matches!(to_ldap_scope(SearchScope::Subtree), Scope::Subtree));
    }
}
