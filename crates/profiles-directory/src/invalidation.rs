//! Which cached queries each kind of directory write can make stale

use crate::cache::CachedQuery;
use crate::ldap::attrs;
use crate::roles::{KnownGroup, Roster};

/// A write made through the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryWrite<'a> {
    /// One member attribute replaced or cleared
    Attribute(&'a str),
    /// A member added to or removed from a group
    Membership(&'a str),
}

/// Housing attributes shown on the current-students roster
const HOUSING_ATTRIBUTES: [&str; 2] = [attrs::HOUSING_POINTS, attrs::ROOM_NUMBER];

/// Cached queries that may hold a stale answer after `write`
pub fn invalidated_by(write: DirectoryWrite<'_>) -> Vec<CachedQuery> {
    match write {
        DirectoryWrite::Attribute(attr) => {
            if HOUSING_ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(attr)) {
                vec![
                    CachedQuery::Roster(Roster::CurrentStudents),
                    CachedQuery::Member,
                ]
            } else {
                // Profile fields are also search terms
                vec![
                    CachedQuery::Member,
                    CachedQuery::Roster(Roster::CurrentStudents),
                    CachedQuery::Search,
                ]
            }
        }
        DirectoryWrite::Membership(group) => {
            let mut queries = Vec::new();
            let known = KnownGroup::from_name(group);

            if let Some(roster) = known.and_then(KnownGroup::roster) {
                queries.push(CachedQuery::Roster(roster));
            }
            if known.is_some_and(KnownGroup::is_eboard_seat) {
                queries.push(CachedQuery::Roster(Roster::Eboard));
            }

            // Search results hold member snapshots, memberOf included
            queries.push(CachedQuery::Member);
            queries.push(CachedQuery::GroupsOf);
            queries.push(CachedQuery::Search);
            queries
        }
    }
}

/// Union of [`invalidated_by`] over several writes, without repeats
pub fn invalidated_by_all<'a>(writes: impl IntoIterator<Item = DirectoryWrite<'a>>) -> Vec<CachedQuery> {
    let mut queries = Vec::new();
    for query in writes.into_iter().flat_map(invalidated_by) {
        if !queries.contains(&query) {
            queries.push(query);
        }
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_housing_writes() {
        let expected = vec![
            CachedQuery::Roster(Roster::CurrentStudents),
            CachedQuery::Member,
        ];
        assert_eq!(invalidated_by(DirectoryWrite::Attribute("housingPoints")), expected);
        assert_eq!(invalidated_by(DirectoryWrite::Attribute("roomNumber")), expected);
    }

    #[test]
    fn test_active_membership() {
        assert_eq!(
            invalidated_by(DirectoryWrite::Membership("active")),
            vec![
                CachedQuery::Roster(Roster::Active),
                CachedQuery::Member,
                CachedQuery::GroupsOf,
                CachedQuery::Search,
            ]
        );
    }

    #[test]
    fn test_current_student_membership() {
        let queries = invalidated_by(DirectoryWrite::Membership("current_student"));
        assert!(queries.contains(&CachedQuery::Roster(Roster::CurrentStudents)));
        assert!(queries.contains(&CachedQuery::Member));
        assert!(!queries.contains(&CachedQuery::Roster(Roster::Active)));
    }

    #[test]
    fn test_eboard_seat_membership() {
        let queries = invalidated_by(DirectoryWrite::Membership("eboard-history"));
        assert_eq!(queries[0], CachedQuery::Roster(Roster::Eboard));
    }

    #[test]
    fn test_unknown_group_membership() {
        assert_eq!(
            invalidated_by(DirectoryWrite::Membership("drink")),
            vec![CachedQuery::Member, CachedQuery::GroupsOf, CachedQuery::Search]
        );
    }

    #[test]
    fn test_profile_writes_deduplicated() {
        let queries = invalidated_by_all([
            DirectoryWrite::Attribute("cn"),
            DirectoryWrite::Attribute("mail"),
            DirectoryWrite::Attribute("roomNumber"),
        ]);
        assert_eq!(
            queries,
            vec![
                CachedQuery::Member,
                CachedQuery::Roster(Roster::CurrentStudents),
                CachedQuery::Search,
            ]
        );
    }
}
