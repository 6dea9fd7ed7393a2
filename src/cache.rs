//! Process-local time-to-live caches for the data-access layer.
//!
//! Keys follow the `kind:id:scope` shape so that a write for one owner can
//! drop every entry mentioning that owner with a single [`TtlCache::invalidate`].

use std::{future::Future, sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;

use crate::models::{Profile, Skill, SkillCategory, SkillLibraryItem, SkillWithOwner};

pub const DATA_TTL: Duration = Duration::from_secs(5 * 60);
pub const LIBRARY_TTL: Duration = Duration::from_secs(10 * 60);

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the value stored under `key` if it is younger than the ttl.
    /// Stale entries are evicted on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
        }

        let ttl = self.ttl;
        self.entries
            .remove_if(key, |_, entry| entry.stored_at.elapsed() >= ttl);
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.insert(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry whose key contains `pattern`, returning how many went.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.contains(pattern);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serves `key` from the cache or runs `fetch` and stores its result.
    /// Without a key the cache is bypassed entirely.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: Option<&str>, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(key) = key {
            if let Some(hit) = self.get(key) {
                tracing::trace!(key, "cache hit");
                return Ok(hit);
            }
        }

        let value = fetch().await?;
        if let Some(key) = key {
            self.insert(key, value.clone());
        }
        Ok(value)
    }
}

/// All caches the store reads through, handed to [`crate::store::Store::new`].
#[derive(Clone)]
pub struct Caches {
    pub profiles: Arc<TtlCache<Profile>>,
    pub skills: Arc<TtlCache<Vec<Skill>>>,
    pub skill_search: Arc<TtlCache<Vec<SkillWithOwner>>>,
    pub categories: Arc<TtlCache<Vec<SkillCategory>>>,
    pub library: Arc<TtlCache<Vec<SkillLibraryItem>>>,
}

impl Caches {
    pub fn new(data_ttl: Duration, library_ttl: Duration) -> Self {
        Self {
            profiles: Arc::new(TtlCache::new(data_ttl)),
            skills: Arc::new(TtlCache::new(data_ttl)),
            skill_search: Arc::new(TtlCache::new(data_ttl)),
            categories: Arc::new(TtlCache::new(library_ttl)),
            library: Arc::new(TtlCache::new(library_ttl)),
        }
    }

    /// Drops every profile/skill entry keyed by `owner`.
    pub fn invalidate_owner(&self, owner: &str) {
        let pattern = format!(":{owner}:");
        let removed = self.profiles.invalidate(&pattern) + self.skills.invalidate(&pattern);
        tracing::debug!(owner, removed, "invalidated owner cache entries");
    }

    /// Clears user data caches. The library catalog is shared and stays.
    pub fn clear_data(&self) {
        self.profiles.clear();
        self.skills.clear();
        self.skill_search.clear();
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new(DATA_TTL, LIBRARY_TTL)
    }
}

pub fn cache_key(kind: &str, id: &str, scope: &str) -> String {
    format!("{kind}:{id}:{scope}")
}
