//! roster and eboard commands

use super::CommandContext;
use crate::output::{print_json, print_member_row};
use anyhow::Result;
use colored::Colorize;
use profiles_directory::Roster;

pub async fn execute(ctx: &CommandContext, roster: Roster) -> Result<()> {
    let members = ctx.directory.get_roster(roster).await?;

    if ctx.is_json() {
        return print_json(&members);
    }

    println!("{} ({})", roster.to_string().blue().bold(), members.len());
    for member in &members {
        print_member_row(member);
    }
    Ok(())
}
