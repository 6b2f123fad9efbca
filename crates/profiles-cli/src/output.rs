//! Text rendering for directory results

use colored::Colorize;
use profiles_directory::Member;
use serde::Serialize;

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Full member view: identity, then attributes sorted by name
pub fn print_member(member: &Member) {
    let title = match member.display_name() {
        Some(name) => format!("{} ({})", member.uid, name),
        None => member.uid.clone(),
    };
    println!("{}", title.blue().bold());
    println!("  {}: {}", "DN".cyan(), member.dn);

    let mut names: Vec<&String> = member
        .attributes
        .keys()
        .filter(|name| !name.eq_ignore_ascii_case("memberOf"))
        .collect();
    names.sort_by_key(|name| name.to_lowercase());

    for name in names {
        for value in &member.attributes[name] {
            println!("  {}: {}", name.cyan(), value);
        }
    }

    if member.photo().is_some() {
        println!("  {}: yes", "Photo".cyan());
    }
}

/// One line per member: uid and display name
pub fn print_member_row(member: &Member) {
    match member.display_name() {
        Some(name) => println!("{:<16} {}", member.uid.bold(), name),
        None => println!("{}", member.uid.bold()),
    }
}

pub fn print_flag(label: &str, value: bool) {
    let mark = if value { "yes".green() } else { "no".dimmed() };
    println!("  {:<20} {}", label.cyan(), mark);
}
