//! Typed query wrappers per entity, reading through the injected caches.

mod library;
mod matches;
mod messages;
mod profiles;
mod schedule;
mod skills;

use sqlx::SqlitePool;

use crate::{cache::Caches, realtime::MessageHub};

pub use library::{LibraryStore, DEFAULT_CATEGORY_LIMIT, DEFAULT_POPULAR_LIMIT, DEFAULT_SEARCH_LIMIT};
pub use matches::MatchStore;
pub use messages::MessageStore;
pub use profiles::ProfileStore;
pub use schedule::SessionStore;
pub use skills::SkillStore;

#[derive(Clone)]
pub struct Store {
    pub caches: Caches,
    pub hub: MessageHub,
    pub profiles: ProfileStore,
    pub skills: SkillStore,
    pub library: LibraryStore,
    pub matches: MatchStore,
    pub messages: MessageStore,
    pub sessions: SessionStore,
}

impl Store {
    pub fn new(pool: SqlitePool, caches: Caches, hub: MessageHub) -> Self {
        Self {
            profiles: ProfileStore::new(pool.clone(), caches.clone()),
            skills: SkillStore::new(pool.clone(), caches.clone()),
            library: LibraryStore::new(pool.clone(), caches.clone()),
            matches: MatchStore::new(pool.clone()),
            messages: MessageStore::new(pool.clone(), hub.clone()),
            sessions: SessionStore::new(pool),
            caches,
            hub,
        }
    }
}

/// `%query%` for a `LIKE … ESCAPE '\'` against a lowercased column.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
