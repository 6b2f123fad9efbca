//! check-config command - print the effective configuration

use crate::output::print_json;
use crate::OutputFormat;
use anyhow::Result;
use profiles_core::ProfilesConfig;

const REDACTED: &str = "********";

pub fn execute(config: &ProfilesConfig, format: OutputFormat) -> Result<()> {
    let mut shown = config.clone();
    if !shown.ldap.bind_password.is_empty() {
        shown.ldap.bind_password = REDACTED.to_string();
    }

    match format {
        OutputFormat::Json => print_json(&shown),
        OutputFormat::Text => {
            print!("{}", toml::to_string_pretty(&shown)?);
            Ok(())
        }
    }
}
