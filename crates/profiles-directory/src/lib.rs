//! Member directory access for Profiles
//!
//! A caching facade over the LDAP member directory: role predicates,
//! cached rosters and lookups, and profile writes that invalidate the
//! cached answers they affect.

pub mod avatar;
pub mod cache;
pub mod client;
pub mod facade;
pub mod invalidation;
pub mod ldap;
pub mod memory;
pub mod profile;
pub mod roles;

pub use cache::{CachedQuery, DirectoryCache, QueryCache};
pub use client::DirectoryClient;
pub use facade::{member_search_filter, Directory, SEARCH_ATTRIBUTES};
pub use invalidation::{invalidated_by, DirectoryWrite};
pub use ldap::{DirectoryEntry, LdapDirectory, Member, SearchScope};
pub use memory::{InMemoryDirectory, RecordedSearch, RecordedWrite};
pub use profile::{normalize_form_value, ProfileField, PROFILE_FIELDS};
pub use roles::{Directorship, KnownGroup, Roster, EBOARD_GROUPS};
