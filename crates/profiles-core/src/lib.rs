//! Profiles Core Library
//!
//! Error and configuration types shared by the profiles directory crates.

pub mod config;
pub mod error;

pub use config::ProfilesConfig;
pub use error::{Error, Result};

/// Profiles version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bound on entries held by each directory query cache
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 1024;

/// Default domain used to synthesize member mail addresses
pub const DEFAULT_MAIL_DOMAIN: &str = "csh.rit.edu";
