//! Known groups, directorships and rosters
//!
//! Every role the application checks is listed here once, with the name the
//! directory uses for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Groups the application knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownGroup {
    Active,
    IntroMembers,
    OnFloor,
    CurrentStudent,
    Member,
    Eboard,
    Rtp,
    EboardChairman,
    EboardEvaluations,
    EboardFinancial,
    EboardHistory,
    EboardImps,
    EboardOpcomm,
    EboardResearch,
    EboardSocial,
    EboardSecretary,
}

/// Eboard sub-groups, in the order their rosters are concatenated
pub const EBOARD_GROUPS: [KnownGroup; 9] = [
    KnownGroup::EboardChairman,
    KnownGroup::EboardEvaluations,
    KnownGroup::EboardFinancial,
    KnownGroup::EboardHistory,
    KnownGroup::EboardImps,
    KnownGroup::EboardOpcomm,
    KnownGroup::EboardResearch,
    KnownGroup::EboardSocial,
    KnownGroup::EboardSecretary,
];

const GROUP_NAMES: [(KnownGroup, &str); 16] = [
    (KnownGroup::Active, "active"),
    (KnownGroup::IntroMembers, "intromembers"),
    (KnownGroup::OnFloor, "onfloor"),
    (KnownGroup::CurrentStudent, "current_student"),
    (KnownGroup::Member, "member"),
    (KnownGroup::Eboard, "eboard"),
    (KnownGroup::Rtp, "rtp"),
    (KnownGroup::EboardChairman, "eboard-chairman"),
    (KnownGroup::EboardEvaluations, "eboard-evaluations"),
    (KnownGroup::EboardFinancial, "eboard-financial"),
    (KnownGroup::EboardHistory, "eboard-history"),
    (KnownGroup::EboardImps, "eboard-imps"),
    (KnownGroup::EboardOpcomm, "eboard-opcomm"),
    (KnownGroup::EboardResearch, "eboard-research"),
    (KnownGroup::EboardSocial, "eboard-social"),
    (KnownGroup::EboardSecretary, "eboard-secretary"),
];

impl KnownGroup {
    /// Group name in the directory
    pub fn name(self) -> &'static str {
        GROUP_NAMES
            .iter()
            .find(|(group, _)| *group == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        GROUP_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(group, _)| *group)
    }

    /// Cached roster holding this group's members, if it has one
    pub fn roster(self) -> Option<Roster> {
        match self {
            KnownGroup::Active => Some(Roster::Active),
            KnownGroup::IntroMembers => Some(Roster::IntroMembers),
            KnownGroup::OnFloor => Some(Roster::OnFloor),
            KnownGroup::CurrentStudent => Some(Roster::CurrentStudents),
            KnownGroup::Member => Some(Roster::AllMembers),
            _ => None,
        }
    }

    pub fn is_eboard_seat(self) -> bool {
        EBOARD_GROUPS.contains(&self)
    }
}

impl fmt::Display for KnownGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KnownGroup {
    type Err = profiles_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| profiles_core::Error::NoSuchGroup(s.to_string()))
    }
}

/// Directorships whose heads are checked by uid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directorship {
    Financial,
    Evaluations,
    Chairman,
    History,
    Imps,
    Social,
    Research,
}

impl Directorship {
    pub const ALL: [Directorship; 7] = [
        Directorship::Financial,
        Directorship::Evaluations,
        Directorship::Chairman,
        Directorship::History,
        Directorship::Imps,
        Directorship::Social,
        Directorship::Research,
    ];

    /// Committee name in the directory
    pub fn name(self) -> &'static str {
        match self {
            Directorship::Financial => "financial",
            Directorship::Evaluations => "evaluations",
            Directorship::Chairman => "chairman",
            Directorship::History => "history",
            Directorship::Imps => "imps",
            // The committee entry is capitalized in the directory
            Directorship::Social => "Social",
            Directorship::Research => "research",
        }
    }
}

impl fmt::Display for Directorship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cached member rosters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Roster {
    Active,
    IntroMembers,
    OnFloor,
    CurrentStudents,
    AllMembers,
    /// All nine eboard sub-groups, concatenated
    Eboard,
}

impl Roster {
    pub const ALL: [Roster; 6] = [
        Roster::Active,
        Roster::IntroMembers,
        Roster::OnFloor,
        Roster::CurrentStudents,
        Roster::AllMembers,
        Roster::Eboard,
    ];

    /// Backing group, `None` for the composite eboard roster
    pub fn group(self) -> Option<KnownGroup> {
        match self {
            Roster::Active => Some(KnownGroup::Active),
            Roster::IntroMembers => Some(KnownGroup::IntroMembers),
            Roster::OnFloor => Some(KnownGroup::OnFloor),
            Roster::CurrentStudents => Some(KnownGroup::CurrentStudent),
            Roster::AllMembers => Some(KnownGroup::Member),
            Roster::Eboard => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Roster::Active => "active",
            Roster::IntroMembers => "intro",
            Roster::OnFloor => "onfloor",
            Roster::CurrentStudents => "current",
            Roster::AllMembers => "all",
            Roster::Eboard => "eboard",
        }
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Roster {
    type Err = profiles_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Roster::Active),
            "intro" | "intromembers" => Ok(Roster::IntroMembers),
            "onfloor" => Ok(Roster::OnFloor),
            "current" | "current_student" => Ok(Roster::CurrentStudents),
            "all" | "member" => Ok(Roster::AllMembers),
            "eboard" => Ok(Roster::Eboard),
            other => Err(profiles_core::Error::InvalidArgument(format!(
                "unknown roster: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names_round_trip() {
        for (group, name) in GROUP_NAMES {
            assert_eq!(group.name(), name);
            assert_eq!(KnownGroup::from_name(name), Some(group));
        }
        assert_eq!(KnownGroup::from_name("Active"), None);
    }

    #[test]
    fn test_eboard_order() {
        let names: Vec<&str> = EBOARD_GROUPS.iter().map(|g| g.name()).collect();
        assert_eq!(
            names,
            vec![
                "eboard-chairman",
                "eboard-evaluations",
                "eboard-financial",
                "eboard-history",
                "eboard-imps",
                "eboard-opcomm",
                "eboard-research",
                "eboard-social",
                "eboard-secretary",
            ]
        );
        assert!(KnownGroup::EboardImps.is_eboard_seat());
        assert!(!KnownGroup::Eboard.is_eboard_seat());
    }

    #[test]
    fn test_rosters_map_to_groups() {
        for roster in Roster::ALL {
            if let Some(group) = roster.group() {
                assert_eq!(group.roster(), Some(roster));
            }
        }
        assert_eq!(KnownGroup::Rtp.roster(), None);
        assert_eq!("current_student".parse::<Roster>().unwrap(), Roster::CurrentStudents);
        assert!("alumni".parse::<Roster>().is_err());
        for roster in Roster::ALL {
            assert_eq!(roster.to_string().parse::<Roster>().unwrap(), roster);
        }
    }

    #[test]
    fn test_directorship_names() {
        assert_eq!(Directorship::Social.name(), "Social");
        assert_eq!(Directorship::Research.to_string(), "research");
        assert_eq!(Directorship::ALL.len(), 7);
    }
}
