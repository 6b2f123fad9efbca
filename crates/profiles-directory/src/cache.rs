//! Directory query cache
//!
//! One bounded LRU cache per query family, owned by the facade. Entries never
//! expire on their own; they are dropped by eviction or by a named
//! invalidation after a write.

use crate::ldap::Member;
use crate::roles::{Directorship, Roster};
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use profiles_core::Result;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Names of the cached queries, used to invalidate them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedQuery {
    Roster(Roster),
    Member,
    GroupsOf,
    GroupDescription,
    Directorship,
    Search,
}

/// Memoized results of one query, keyed by its arguments
pub struct QueryCache<K, V> {
    name: &'static str,
    entries: Cache<K, V>,
    // Bumped on every invalidation so an in-flight populate can tell its
    // result predates the write.
    epoch: AtomicU64,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_entries: u64) -> Self {
        let entries = Cache::builder()
            .name(name)
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            name,
            entries,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return the cached value for `key`, or run `populate` and cache its result.
    /// Errors are returned to the caller and never cached.
    pub async fn get_or_populate<F, Fut>(&self, key: K, populate: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.entries.get(&key).await {
            debug!("{} cache hit: {:?}", self.name, key);
            return Ok(value);
        }

        debug!("{} cache miss: {:?}", self.name, key);

        let epoch = self.epoch.load(Ordering::Acquire);
        let value = populate().await?;

        if self.epoch.load(Ordering::Acquire) == epoch {
            self.entries.insert(key.clone(), value.clone()).await;

            // An invalidation may have landed between the check and the insert
            if self.epoch.load(Ordering::Acquire) != epoch {
                self.entries.invalidate(&key).await;
            }
        } else {
            debug!("{} result for {:?} predates an invalidation, not caching", self.name, key);
        }

        Ok(value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub async fn invalidate(&self, key: &K) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate(key).await;
    }

    /// Drop every entry. Keys are removed one by one so an entry written
    /// right after this call is never caught by a lazy invalidation.
    pub async fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);

        let keys: Vec<Arc<K>> = self.entries.iter().map(|(key, _)| key).collect();
        for key in keys {
            self.entries.invalidate(key.as_ref()).await;
        }
    }

    /// Approximate number of live entries
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

/// All query caches used by the facade
pub struct DirectoryCache {
    pub(crate) rosters: QueryCache<Roster, Vec<Member>>,
    pub(crate) members: QueryCache<String, Member>,
    /// Keyed by uid and the snapshot's memberOf list, so an outdated
    /// snapshot can never answer for a newer one
    pub(crate) groups_of: QueryCache<(String, Vec<String>), Vec<String>>,
    pub(crate) group_descriptions: QueryCache<String, Option<String>>,
    pub(crate) directorships: QueryCache<(String, Directorship), bool>,
    pub(crate) searches: QueryCache<String, Vec<Member>>,
}

impl DirectoryCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            rosters: QueryCache::new("rosters", max_entries),
            members: QueryCache::new("members", max_entries),
            groups_of: QueryCache::new("groups_of", max_entries),
            group_descriptions: QueryCache::new("group_descriptions", max_entries),
            directorships: QueryCache::new("directorships", max_entries),
            searches: QueryCache::new("member_search", max_entries),
        }
    }

    pub async fn invalidate(&self, query: CachedQuery) {
        match query {
            CachedQuery::Roster(roster) => self.rosters.invalidate(&roster).await,
            CachedQuery::Member => self.members.invalidate_all().await,
            CachedQuery::GroupsOf => self.groups_of.invalidate_all().await,
            CachedQuery::GroupDescription => self.group_descriptions.invalidate_all().await,
            CachedQuery::Directorship => self.directorships.invalidate_all().await,
            CachedQuery::Search => self.searches.invalidate_all().await,
        }

        debug!("Invalidated cached query: {:?}", query);
    }

    pub async fn clear(&self) {
        self.rosters.invalidate_all().await;
        self.members.invalidate_all().await;
        self.groups_of.invalidate_all().await;
        self.group_descriptions.invalidate_all().await;
        self.directorships.invalidate_all().await;
        self.searches.invalidate_all().await;

        info!("Directory query caches cleared");
    }

    pub fn is_roster_cached(&self, roster: Roster) -> bool {
        self.rosters.contains(&roster)
    }

    pub fn is_member_cached(&self, uid: &str) -> bool {
        self.members.contains(&uid.to_string())
    }
}

impl Default for DirectoryCache {
    fn default() -> Self {
        Self::new(profiles_core::DEFAULT_CACHE_MAX_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles_core::Error;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_populates_once() {
        let cache: QueryCache<String, u32> = QueryCache::new("test", 16);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_populate("answer".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&"answer".to_string()));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: QueryCache<String, u32> = QueryCache::new("test", 16);

        let result = cache
            .get_or_populate("key".to_string(), || async {
                Err(Error::Directory("down".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.contains(&"key".to_string()));

        let value = cache
            .get_or_populate("key".to_string(), || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_repopulate() {
        let cache: QueryCache<String, u32> = QueryCache::new("test", 16);

        cache
            .get_or_populate("key".to_string(), || async { Ok(1) })
            .await
            .unwrap();
        cache.invalidate_all().await;
        assert!(!cache.contains(&"key".to_string()));

        let value = cache
            .get_or_populate("key".to_string(), || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_populate_spanning_invalidation_is_not_stored() {
        let cache: QueryCache<String, u32> = QueryCache::new("test", 16);

        let value = cache
            .get_or_populate("key".to_string(), || async {
                // A write lands while the directory read is in flight
                cache.invalidate_all().await;
                Ok(1)
            })
            .await
            .unwrap();

        assert_eq!(value, 1);
        assert!(!cache.contains(&"key".to_string()));
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache: QueryCache<u32, u32> = QueryCache::new("test", 4);

        for i in 0..32 {
            cache.get_or_populate(i, || async move { Ok(i) }).await.unwrap();
        }

        assert!(cache.entry_count().await <= 4);
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let cache: QueryCache<u32, u32> = QueryCache::new("test", 4);

        for i in 0..4 {
            cache.get_or_populate(i, || async move { Ok(i) }).await.unwrap();
        }
        cache.entries.run_pending_tasks().await;

        // Touch the oldest entry; 1 is now least recently used
        let calls = AtomicUsize::new(0);
        cache
            .get_or_populate(0, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(0)
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        cache.entries.run_pending_tasks().await;

        cache.get_or_populate(4, || async { Ok(4) }).await.unwrap();
        cache.entries.run_pending_tasks().await;

        assert!(cache.contains(&0));
        assert!(!cache.contains(&1));
        assert!(cache.contains(&4));
        assert_eq!(cache.entry_count().await, 4);
    }

    #[tokio::test]
    async fn test_named_roster_invalidation() {
        let cache = DirectoryCache::new(16);

        for roster in [Roster::Active, Roster::CurrentStudents] {
            cache
                .rosters
                .get_or_populate(roster, || async { Ok(Vec::new()) })
                .await
                .unwrap();
        }

        cache.invalidate(CachedQuery::Roster(Roster::Active)).await;

        assert!(!cache.is_roster_cached(Roster::Active));
        assert!(cache.is_roster_cached(Roster::CurrentStudents));
    }

    #[tokio::test]
    async fn test_clear_drops_every_query() {
        let cache = DirectoryCache::new(16);

        cache
            .rosters
            .get_or_populate(Roster::Eboard, || async { Ok(Vec::new()) })
            .await
            .unwrap();
        cache
            .members
            .get_or_populate("jdoe".to_string(), || async {
                Ok(Member::new("jdoe", "uid=jdoe,cn=users"))
            })
            .await
            .unwrap();

        cache.clear().await;

        assert!(!cache.is_roster_cached(Roster::Eboard));
        assert!(!cache.is_member_cached("jdoe"));
    }
}
