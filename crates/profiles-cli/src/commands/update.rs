//! Setter commands: status groups, room, housing points and profile fields

use super::CommandContext;
use crate::output::print_json;
use anyhow::{bail, Result};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Active,
    Inactive,
    CurrentStudent,
    NonCurrentStudent,
}

pub async fn set_status(ctx: &CommandContext, uid: &str, status: Status) -> Result<()> {
    let mut member = ctx.member(uid).await?;
    let dir = &ctx.directory;

    match status {
        Status::Active => dir.set_active(&mut member).await?,
        Status::Inactive => dir.set_inactive(&mut member).await?,
        Status::CurrentStudent => dir.set_current_student(&mut member).await?,
        Status::NonCurrentStudent => dir.set_non_current_student(&mut member).await?,
    }

    info!("Set {} to {:?}", uid, status);
    report(ctx, uid, &dir.get_groups_of(&member).await?)
}

pub async fn set_room(ctx: &CommandContext, uid: &str, room: &str) -> Result<()> {
    let mut member = ctx.member(uid).await?;
    ctx.directory.set_room_number(&mut member, room).await?;

    let room = ctx.directory.get_room_number(&member);
    if ctx.is_json() {
        return print_json(&serde_json::json!({ "uid": uid, "room_number": room }));
    }

    if room.is_empty() {
        println!("Cleared room number of {}", uid);
    } else {
        println!("Room number of {} is now {}", uid, room);
    }
    Ok(())
}

pub async fn set_housing_points(ctx: &CommandContext, uid: &str, points: i64) -> Result<()> {
    let mut member = ctx.member(uid).await?;
    ctx.directory.set_housing_points(&mut member, points).await?;

    if ctx.is_json() {
        print_json(&serde_json::json!({ "uid": uid, "housing_points": points }))
    } else {
        println!("Housing points of {} set to {}", uid, points);
        Ok(())
    }
}

pub async fn update_profile(ctx: &CommandContext, uid: &str, fields: &[String]) -> Result<()> {
    let form = parse_fields(fields)?;
    let written = ctx.directory.update_profile(&form, uid).await?;

    if ctx.is_json() {
        return print_json(&serde_json::json!({ "uid": uid, "written": written }));
    }

    if written.is_empty() {
        println!("Profile of {} unchanged", uid);
    } else {
        println!("Updated {}: {}", uid, written.join(", "));
    }
    Ok(())
}

fn report(ctx: &CommandContext, uid: &str, groups: &[String]) -> Result<()> {
    if ctx.is_json() {
        print_json(&serde_json::json!({ "uid": uid, "groups": groups }))
    } else {
        println!("{}: {}", uid, groups.join(", "));
        Ok(())
    }
}

/// Parse `key=value` arguments into a form. Later keys win.
fn parse_fields(fields: &[String]) -> Result<HashMap<String, String>> {
    let mut form = HashMap::new();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            bail!("Expected key=value, got '{}'", field);
        };
        if key.is_empty() {
            bail!("Empty field name in '{}'", field);
        }
        form.insert(key.to_string(), value.to_string());
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_fields() {
        let form = parse_fields(&args(&["name=Jane Doe", "shell=/bin/zsh", "plex="])).unwrap();

        assert_eq!(form["name"], "Jane Doe");
        assert_eq!(form["shell"], "/bin/zsh");
        assert_eq!(form["plex"], "");
    }

    #[test]
    fn test_parse_fields_keeps_equals_in_value() {
        let form = parse_fields(&args(&["website=https://x.org/?a=b"])).unwrap();
        assert_eq!(form["website"], "https://x.org/?a=b");
    }

    #[test]
    fn test_parse_fields_rejects_malformed() {
        assert!(parse_fields(&args(&["name"])).is_err());
        assert!(parse_fields(&args(&["=value"])).is_err());
    }
}
