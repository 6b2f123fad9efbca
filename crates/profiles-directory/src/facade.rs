//! Directory facade
//!
//! Role predicates, cached rosters and lookups, and setters that keep the
//! caches consistent with their own writes.

use crate::avatar;
use crate::cache::DirectoryCache;
use crate::client::DirectoryClient;
use crate::invalidation::{invalidated_by_all, DirectoryWrite};
use crate::ldap::{attrs, Member, SearchScope};
use crate::roles::{Directorship, KnownGroup, Roster, EBOARD_GROUPS};
use ldap3::ldap_escape;
use profiles_core::config::AvatarConfig;
use profiles_core::{Error, ProfilesConfig, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Attributes matched by free-text member search
pub const SEARCH_ATTRIBUTES: [&str; 10] = [
    "description",
    "displayName",
    "mail",
    "nickName",
    "plex",
    "sn",
    "uid",
    "mobile",
    "twitterName",
    "github",
];

/// Caching accessor over the member directory
pub struct Directory {
    client: Arc<dyn DirectoryClient>,
    cache: DirectoryCache,
    avatar: AvatarConfig,
}

impl Directory {
    pub fn new(client: Arc<dyn DirectoryClient>, cache: DirectoryCache, avatar: AvatarConfig) -> Self {
        Self {
            client,
            cache,
            avatar,
        }
    }

    pub fn from_config(client: Arc<dyn DirectoryClient>, config: &ProfilesConfig) -> Self {
        Self::new(
            client,
            DirectoryCache::new(config.cache.max_entries),
            config.avatar.clone(),
        )
    }

    pub fn client(&self) -> &Arc<dyn DirectoryClient> {
        &self.client
    }

    pub fn cache(&self) -> &DirectoryCache {
        &self.cache
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Pure check against the member's resolved `memberOf` list
    pub fn is_member_of_group(&self, member: &Member, group: &str) -> bool {
        member.is_member_of(group)
    }

    pub async fn is_member_of_directorship(
        &self,
        member: &Member,
        directorship: Directorship,
    ) -> Result<bool> {
        self.cache
            .directorships
            .get_or_populate((member.uid.clone(), directorship), || async {
                let head_dns = self.client.directorship_heads(directorship.name()).await?;
                for dn in &head_dns {
                    if let Some(head) = self.client.find_member_by_dn(dn).await? {
                        if head.uid == member.uid {
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            })
            .await
    }

    /// Add `member` to `group` unless already a member.
    /// Returns whether the directory was written.
    pub async fn add_member_to_group(&self, member: &mut Member, group: &str) -> Result<bool> {
        if member.is_member_of(group) {
            debug!("{} already in group {}", member.uid, group);
            return Ok(false);
        }

        self.client.add_group_member(group, member).await?;
        member.add_group_dn(&self.client.group_dn(group));
        self.invalidate_for([DirectoryWrite::Membership(group)]).await;

        Ok(true)
    }

    /// Remove `member` from `group` if currently a member.
    /// Returns whether the directory was written.
    pub async fn remove_member_from_group(&self, member: &mut Member, group: &str) -> Result<bool> {
        if !member.is_member_of(group) {
            debug!("{} not in group {}", member.uid, group);
            return Ok(false);
        }

        self.client.remove_group_member(group, member).await?;
        member.remove_group_dn(&self.client.group_dn(group));
        self.invalidate_for([DirectoryWrite::Membership(group)]).await;

        Ok(true)
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub async fn get_member(&self, uid: &str) -> Result<Member> {
        self.cache
            .members
            .get_or_populate(uid.to_string(), || async {
                self.client
                    .find_member(uid)
                    .await?
                    .ok_or_else(|| Error::NoSuchMember(uid.to_string()))
            })
            .await
    }

    pub async fn get_roster(&self, roster: Roster) -> Result<Vec<Member>> {
        self.cache
            .rosters
            .get_or_populate(roster, || self.fetch_roster(roster))
            .await
    }

    pub async fn get_active_members(&self) -> Result<Vec<Member>> {
        self.get_roster(Roster::Active).await
    }

    pub async fn get_intro_members(&self) -> Result<Vec<Member>> {
        self.get_roster(Roster::IntroMembers).await
    }

    pub async fn get_onfloor_members(&self) -> Result<Vec<Member>> {
        self.get_roster(Roster::OnFloor).await
    }

    pub async fn get_current_students(&self) -> Result<Vec<Member>> {
        self.get_roster(Roster::CurrentStudents).await
    }

    pub async fn get_all_members(&self) -> Result<Vec<Member>> {
        self.get_roster(Roster::AllMembers).await
    }

    /// Every eboard sub-group roster concatenated; members holding several
    /// seats appear once per seat.
    pub async fn get_eboard(&self) -> Result<Vec<Member>> {
        self.get_roster(Roster::Eboard).await
    }

    /// Names of the member's groups under the groups subtree
    pub async fn get_groups_of(&self, member: &Member) -> Result<Vec<String>> {
        self.cache
            .groups_of
            .get_or_populate((member.uid.clone(), member.member_of().to_vec()), || async {
                Ok(member.group_names())
            })
            .await
    }

    /// Description of a group, `None` if the group or its description is missing
    pub async fn get_group_description(&self, group: &str) -> Result<Option<String>> {
        self.cache
            .group_descriptions
            .get_or_populate(group.to_string(), || async {
                let filter = format!("(cn={})", ldap_escape(group));
                let rows = self
                    .client
                    .search(
                        self.client.group_base_dn(),
                        SearchScope::Subtree,
                        &filter,
                        &[attrs::DESCRIPTION],
                    )
                    .await?;

                Ok(rows
                    .first()
                    .and_then(|row| row.first_attr(attrs::DESCRIPTION))
                    .map(str::to_string))
            })
            .await
    }

    /// Free-text search over the member-facing attributes. Rows without a
    /// uid are skipped; hits are resolved in result order.
    pub async fn search_members(&self, query: &str) -> Result<Vec<Member>> {
        self.cache
            .searches
            .get_or_populate(query.to_string(), || async {
                let filter = member_search_filter(query);
                let rows = self
                    .client
                    .search(
                        self.client.base_dn(),
                        SearchScope::Subtree,
                        &filter,
                        &[attrs::UID],
                    )
                    .await?;

                let mut members = Vec::with_capacity(rows.len());
                for row in &rows {
                    let Some(uid) = row.first_attr(attrs::UID) else {
                        debug!("Skipping search result without uid: {}", row.dn);
                        continue;
                    };
                    members.push(self.get_member(uid).await?);
                }

                Ok(members)
            })
            .await
    }

    // =========================================================================
    // Status predicates
    // =========================================================================

    pub fn is_active(&self, member: &Member) -> bool {
        member.is_member_of(KnownGroup::Active.name())
    }

    /// Alumni are exactly the members who are not active
    pub fn is_alumni(&self, member: &Member) -> bool {
        !self.is_active(member)
    }

    pub fn is_eboard(&self, member: &Member) -> bool {
        member.is_member_of(KnownGroup::Eboard.name())
    }

    pub fn is_rtp(&self, member: &Member) -> bool {
        member.is_member_of(KnownGroup::Rtp.name())
    }

    pub fn is_intro_member(&self, member: &Member) -> bool {
        member.is_member_of(KnownGroup::IntroMembers.name())
    }

    pub fn is_onfloor(&self, member: &Member) -> bool {
        member.is_member_of(KnownGroup::OnFloor.name())
    }

    pub fn is_current_student(&self, member: &Member) -> bool {
        member.is_member_of(KnownGroup::CurrentStudent.name())
    }

    // =========================================================================
    // Directorship predicates
    // =========================================================================

    pub async fn is_financial_director(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::Financial).await
    }

    pub async fn is_eval_director(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::Evaluations).await
    }

    pub async fn is_chairman(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::Chairman).await
    }

    pub async fn is_history(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::History).await
    }

    pub async fn is_imps(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::Imps).await
    }

    pub async fn is_social(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::Social).await
    }

    pub async fn is_research_director(&self, member: &Member) -> Result<bool> {
        self.is_member_of_directorship(member, Directorship::Research).await
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub async fn set_housing_points(&self, member: &mut Member, points: i64) -> Result<()> {
        let value = points.to_string();
        self.write_attribute(member, attrs::HOUSING_POINTS, Some(&value)).await
    }

    /// An empty room number clears the attribute
    pub async fn set_room_number(&self, member: &mut Member, room: &str) -> Result<()> {
        let value = (!room.is_empty()).then_some(room);
        self.write_attribute(member, attrs::ROOM_NUMBER, value).await
    }

    pub async fn set_active(&self, member: &mut Member) -> Result<()> {
        self.add_member_to_group(member, KnownGroup::Active.name()).await?;
        Ok(())
    }

    pub async fn set_inactive(&self, member: &mut Member) -> Result<()> {
        self.remove_member_from_group(member, KnownGroup::Active.name()).await?;
        Ok(())
    }

    pub async fn set_current_student(&self, member: &mut Member) -> Result<()> {
        self.add_member_to_group(member, KnownGroup::CurrentStudent.name()).await?;
        Ok(())
    }

    pub async fn set_non_current_student(&self, member: &mut Member) -> Result<()> {
        self.remove_member_from_group(member, KnownGroup::CurrentStudent.name()).await?;
        Ok(())
    }

    /// Room number, or an empty string when unset
    pub fn get_room_number(&self, member: &Member) -> String {
        member
            .get_attribute(attrs::ROOM_NUMBER)
            .unwrap_or_default()
            .to_string()
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Raw profile photo, read fresh from the directory on every call
    pub async fn get_image(&self, uid: &str) -> Result<Option<Vec<u8>>> {
        let member = self
            .client
            .find_member(uid)
            .await?
            .ok_or_else(|| Error::NoSuchMember(uid.to_string()))?;

        Ok(member.photo().map(<[u8]>::to_vec))
    }

    pub fn get_gravatar(&self, uid: &str) -> String {
        avatar::gravatar_url(uid, &self.avatar)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch_roster(&self, roster: Roster) -> Result<Vec<Member>> {
        match roster.group() {
            Some(group) => self.client.group_members(group.name()).await,
            None => {
                let mut members = Vec::new();
                for seat in EBOARD_GROUPS {
                    members.extend(self.client.group_members(seat.name()).await?);
                }
                Ok(members)
            }
        }
    }

    pub(crate) async fn write_attribute(
        &self,
        member: &mut Member,
        attr: &str,
        value: Option<&str>,
    ) -> Result<()> {
        self.client.set_attribute(member, attr, value).await?;
        member.apply_attribute(attr, value);
        self.invalidate_for([DirectoryWrite::Attribute(attr)]).await;
        Ok(())
    }

    /// Clear every cached query the given writes can make stale
    pub(crate) async fn invalidate_for<'a>(&self, writes: impl IntoIterator<Item = DirectoryWrite<'a>>) {
        let queries = invalidated_by_all(writes);
        for query in &queries {
            self.cache.invalidate(*query).await;
        }

        info!("Invalidated {} cached queries after directory write", queries.len());
    }
}

/// OR filter matching `query` as a substring of every search attribute
pub fn member_search_filter(query: &str) -> String {
    let escaped = ldap_escape(query);
    let clauses: String = SEARCH_ATTRIBUTES
        .iter()
        .map(|attr| format!("({}=*{}*)", attr, escaped))
        .collect();
    format!("(|{})", clauses)
}
