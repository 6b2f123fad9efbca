//! Directory client contract
//!
//! The facade never speaks LDAP itself. Everything it needs from the
//! directory goes through this trait, implemented by
//! [`LdapDirectory`](crate::LdapDirectory) for a live server and by
//! [`InMemoryDirectory`](crate::InMemoryDirectory) for tests.

use crate::ldap::{DirectoryEntry, Member, SearchScope};
use async_trait::async_trait;
use profiles_core::Result;

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    // ============= Member Lookups =============

    async fn find_member(&self, uid: &str) -> Result<Option<Member>>;
    async fn find_member_by_dn(&self, dn: &str) -> Result<Option<Member>>;

    // ============= Groups =============

    async fn group_members(&self, group: &str) -> Result<Vec<Member>>;
    async fn add_group_member(&self, group: &str, member: &Member) -> Result<()>;
    async fn remove_group_member(&self, group: &str, member: &Member) -> Result<()>;

    /// DNs of the current heads of a directorship, in directory order
    async fn directorship_heads(&self, directorship: &str) -> Result<Vec<String>>;

    // ============= Raw Access =============

    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<DirectoryEntry>>;

    /// Replace one attribute of a member; `None` clears it.
    async fn set_attribute(&self, member: &Member, attr: &str, value: Option<&str>) -> Result<()>;

    /// Root of the directory tree
    fn base_dn(&self) -> &str;

    /// Base DN holding groups
    fn group_base_dn(&self) -> &str;

    fn group_dn(&self, group: &str) -> String {
        format!("cn={},{}", group, self.group_base_dn())
    }
}
