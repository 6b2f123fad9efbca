//! LDAP directory access
//!
//! Provides:
//! - Member and group lookups against FreeIPA-style account trees
//! - Directorship (committee head) resolution
//! - Attribute and group membership writes
//! - TLS/STARTTLS support

mod client;
mod types;

pub use client::LdapDirectory;
pub use types::*;
