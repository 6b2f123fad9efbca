//! member, search, groups, describe and roles commands

use super::CommandContext;
use crate::output::{print_flag, print_json, print_member, print_member_row};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct RolesResult {
    uid: String,
    active: bool,
    alumni: bool,
    eboard: bool,
    rtp: bool,
    intro_member: bool,
    onfloor: bool,
    current_student: bool,
    financial_director: bool,
    eval_director: bool,
    chairman: bool,
    history: bool,
    imps: bool,
    social: bool,
    research_director: bool,
}

pub async fn show(ctx: &CommandContext, uid: &str) -> Result<()> {
    let member = ctx.member(uid).await?;

    if ctx.is_json() {
        print_json(&member)
    } else {
        print_member(&member);
        Ok(())
    }
}

pub async fn search(ctx: &CommandContext, query: &str) -> Result<()> {
    let members = ctx.directory.search_members(query).await?;

    if ctx.is_json() {
        return print_json(&members);
    }

    if members.is_empty() {
        println!("No members match '{}'", query);
    }
    for member in &members {
        print_member_row(member);
    }
    Ok(())
}

pub async fn groups(ctx: &CommandContext, uid: &str) -> Result<()> {
    let member = ctx.member(uid).await?;
    let groups = ctx.directory.get_groups_of(&member).await?;

    if ctx.is_json() {
        return print_json(&groups);
    }

    for group in &groups {
        println!("{}", group);
    }
    Ok(())
}

pub async fn describe(ctx: &CommandContext, group: &str) -> Result<()> {
    let description = ctx.directory.get_group_description(group).await?;

    if ctx.is_json() {
        return print_json(&serde_json::json!({
            "group": group,
            "description": description,
        }));
    }

    match description {
        Some(text) => println!("{}: {}", group.bold(), text),
        None => println!("{}: {}", group.bold(), "no description".dimmed()),
    }
    Ok(())
}

pub async fn roles(ctx: &CommandContext, uid: &str) -> Result<()> {
    let member = ctx.member(uid).await?;
    let dir = &ctx.directory;

    let result = RolesResult {
        uid: member.uid.clone(),
        active: dir.is_active(&member),
        alumni: dir.is_alumni(&member),
        eboard: dir.is_eboard(&member),
        rtp: dir.is_rtp(&member),
        intro_member: dir.is_intro_member(&member),
        onfloor: dir.is_onfloor(&member),
        current_student: dir.is_current_student(&member),
        financial_director: dir.is_financial_director(&member).await?,
        eval_director: dir.is_eval_director(&member).await?,
        chairman: dir.is_chairman(&member).await?,
        history: dir.is_history(&member).await?,
        imps: dir.is_imps(&member).await?,
        social: dir.is_social(&member).await?,
        research_director: dir.is_research_director(&member).await?,
    };

    if ctx.is_json() {
        return print_json(&result);
    }

    println!("{}", result.uid.blue().bold());
    print_flag("Active", result.active);
    print_flag("Alumni", result.alumni);
    print_flag("Eboard", result.eboard);
    print_flag("RTP", result.rtp);
    print_flag("Intro member", result.intro_member);
    print_flag("On floor", result.onfloor);
    print_flag("Current student", result.current_student);
    println!();
    print_flag("Financial", result.financial_director);
    print_flag("Evaluations", result.eval_director);
    print_flag("Chairman", result.chairman);
    print_flag("History", result.history);
    print_flag("Imps", result.imps);
    print_flag("Social", result.social);
    print_flag("Research", result.research_director);
    Ok(())
}
