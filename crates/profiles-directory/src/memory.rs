//! In-memory directory
//!
//! A [`DirectoryClient`] that keeps members in process and records every
//! call, for tests of code built on the facade.

use crate::client::DirectoryClient;
use crate::ldap::{attrs, DirectoryEntry, Member, SearchScope};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use profiles_core::{Error, Result};
use std::collections::{HashMap, HashSet};

const BASE_DN: &str = "dc=csh,dc=rit,dc=edu";
const USER_BASE_DN: &str = "cn=users,cn=accounts,dc=csh,dc=rit,dc=edu";
const GROUP_BASE_DN: &str = "cn=groups,cn=accounts,dc=csh,dc=rit,dc=edu";

/// A search issued against the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub base_dn: String,
    pub scope: SearchScope,
    pub filter: String,
    pub attrs: Vec<String>,
}

/// A write applied to the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWrite {
    Attribute {
        uid: String,
        attribute: String,
        value: Option<String>,
    },
    AddMember {
        group: String,
        uid: String,
    },
    RemoveMember {
        group: String,
        uid: String,
    },
}

#[derive(Default)]
struct State {
    // Insertion order is directory order
    members: Vec<Member>,
    heads: HashMap<String, Vec<String>>,
    search_results: HashMap<String, Vec<DirectoryEntry>>,
    failing_attributes: HashSet<String>,
    searches: Vec<RecordedSearch>,
    writes: Vec<RecordedWrite>,
}

pub struct InMemoryDirectory {
    state: RwLock<State>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// DN an account with this uid would have
    pub fn member_dn(uid: &str) -> String {
        format!("uid={},{}", uid, USER_BASE_DN)
    }

    /// A bare member with a DN under the users subtree
    pub fn new_member(uid: &str) -> Member {
        Member::new(uid, Self::member_dn(uid))
    }

    /// Add a member, placing it in the given groups
    pub fn insert_member(&self, member: Member, groups: &[&str]) {
        let mut member = member;
        for group in groups {
            member.add_group_dn(&self.group_dn(group));
        }

        let mut state = self.state.write();
        state.members.retain(|m| m.uid != member.uid);
        state.members.push(member);
    }

    pub fn add_head(&self, directorship: &str, uid: &str) {
        self.state
            .write()
            .heads
            .entry(directorship.to_string())
            .or_default()
            .push(uid.to_string());
    }

    /// Rows returned for searches with exactly this filter
    pub fn insert_search_result(&self, filter: &str, rows: Vec<DirectoryEntry>) {
        self.state
            .write()
            .search_results
            .insert(filter.to_string(), rows);
    }

    pub fn set_group_description(&self, group: &str, description: &str) {
        let row = DirectoryEntry::new(self.group_dn(group))
            .with_attr(attrs::CN, group)
            .with_attr(attrs::DESCRIPTION, description);
        self.insert_search_result(&format!("(cn={})", group), vec![row]);
    }

    /// Reject every later write of `attribute`
    pub fn fail_writes_to(&self, attribute: &str) {
        self.state
            .write()
            .failing_attributes
            .insert(attribute.to_string());
    }

    /// Stored copy of a member, bypassing call counting
    pub fn stored_member(&self, uid: &str) -> Option<Member> {
        self.state.read().members.iter().find(|m| m.uid == uid).cloned()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state.read().writes.clone()
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.state.read().searches.clone()
    }

    fn record_call(&self, operation: &'static str) {
        *self.calls.lock().entry(operation).or_insert(0) += 1;
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn find_member(&self, uid: &str) -> Result<Option<Member>> {
        self.record_call("find_member");
        Ok(self.stored_member(uid))
    }

    async fn find_member_by_dn(&self, dn: &str) -> Result<Option<Member>> {
        self.record_call("find_member_by_dn");
        let state = self.state.read();
        Ok(state
            .members
            .iter()
            .find(|m| m.dn.eq_ignore_ascii_case(dn))
            .cloned())
    }

    async fn group_members(&self, group: &str) -> Result<Vec<Member>> {
        self.record_call("group_members");
        let state = self.state.read();
        Ok(state
            .members
            .iter()
            .filter(|m| m.is_member_of(group))
            .cloned()
            .collect())
    }

    async fn add_group_member(&self, group: &str, member: &Member) -> Result<()> {
        self.record_call("add_group_member");
        let group_dn = self.group_dn(group);
        let mut state = self.state.write();

        let stored = state
            .members
            .iter_mut()
            .find(|m| m.uid == member.uid)
            .ok_or_else(|| Error::NoSuchMember(member.uid.clone()))?;
        stored.add_group_dn(&group_dn);

        state.writes.push(RecordedWrite::AddMember {
            group: group.to_string(),
            uid: member.uid.clone(),
        });
        Ok(())
    }

    async fn remove_group_member(&self, group: &str, member: &Member) -> Result<()> {
        self.record_call("remove_group_member");
        let group_dn = self.group_dn(group);
        let mut state = self.state.write();

        let stored = state
            .members
            .iter_mut()
            .find(|m| m.uid == member.uid)
            .ok_or_else(|| Error::NoSuchMember(member.uid.clone()))?;
        stored.remove_group_dn(&group_dn);

        state.writes.push(RecordedWrite::RemoveMember {
            group: group.to_string(),
            uid: member.uid.clone(),
        });
        Ok(())
    }

    async fn directorship_heads(&self, directorship: &str) -> Result<Vec<String>> {
        self.record_call("directorship_heads");
        let state = self.state.read();
        let heads = match state.heads.get(directorship) {
            Some(uids) => uids.iter().map(|uid| Self::member_dn(uid)).collect(),
            None => Vec::new(),
        };
        Ok(heads)
    }

    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<DirectoryEntry>> {
        self.record_call("search");
        let mut state = self.state.write();

        state.searches.push(RecordedSearch {
            base_dn: base_dn.to_string(),
            scope,
            filter: filter.to_string(),
            attrs: attrs.iter().map(|a| a.to_string()).collect(),
        });

        Ok(state.search_results.get(filter).cloned().unwrap_or_default())
    }

    async fn set_attribute(&self, member: &Member, attr: &str, value: Option<&str>) -> Result<()> {
        self.record_call("set_attribute");
        let mut state = self.state.write();

        if state.failing_attributes.contains(attr) {
            return Err(Error::Directory(format!("write of {} rejected", attr)));
        }

        let stored = state
            .members
            .iter_mut()
            .find(|m| m.uid == member.uid)
            .ok_or_else(|| Error::NoSuchMember(member.uid.clone()))?;
        stored.apply_attribute(attr, value);

        state.writes.push(RecordedWrite::Attribute {
            uid: member.uid.clone(),
            attribute: attr.to_string(),
            value: value.map(str::to_string),
        });
        Ok(())
    }

    fn base_dn(&self) -> &str {
        BASE_DN
    }

    fn group_base_dn(&self) -> &str {
        GROUP_BASE_DN
    }
}
