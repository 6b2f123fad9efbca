//! CLI command implementations

pub mod avatar;
pub mod config;
pub mod member;
pub mod roster;
pub mod update;

use crate::OutputFormat;
use profiles_directory::{Directory, Member};

/// Context passed to all directory commands
pub struct CommandContext {
    pub directory: Directory,
    pub output_format: OutputFormat,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Resolve a member through the cached lookup
    pub async fn member(&self, uid: &str) -> anyhow::Result<Member> {
        Ok(self.directory.get_member(uid).await?)
    }
}
