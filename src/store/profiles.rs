use chrono::Utc;
use sqlx::{types::Json, SqlitePool};

use crate::{
    cache::{cache_key, Caches},
    error::DbError,
    models::{NewProfile, Profile, ProfilePatch, DEFAULT_CREDITS, DEFAULT_LANGUAGES},
};

#[derive(Clone)]
pub struct ProfileStore {
    pool: SqlitePool,
    caches: Caches,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool, caches: Caches) -> Self {
        Self { pool, caches }
    }

    /// Profile by user id; [`DbError::NotFound`] when none exists yet.
    pub async fn get(&self, user_id: &str) -> Result<Profile, DbError> {
        let key = cache_key("profile", user_id, "");
        self.caches
            .profiles
            .get_or_fetch(Some(&key), || async {
                sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| DbError::NotFound(format!("profile {user_id}")))
            })
            .await
    }

    /// Inserts `profile`. If another request created the row first, that row
    /// is returned instead.
    pub async fn create(&self, profile: &NewProfile) -> Result<Profile, DbError> {
        let now = Utc::now();
        let inserted = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, display_name, languages, credits, profile_completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.display_name)
        .bind(Json(DEFAULT_LANGUAGES))
        .bind(DEFAULT_CREDITS)
        .bind(profile.profile_completed)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        self.caches.invalidate_owner(&profile.id);
        match inserted {
            Some(row) => {
                tracing::info!(user_id = %profile.id, display_name = %profile.display_name, "created profile");
                Ok(row)
            }
            None => self.get(&profile.id).await,
        }
    }

    pub async fn update(&self, user_id: &str, patch: &ProfilePatch) -> Result<Profile, DbError> {
        let updated = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET display_name = COALESCE(?, display_name),
                avatar_url = COALESCE(?, avatar_url),
                bio = COALESCE(?, bio),
                location = COALESCE(?, location),
                languages = COALESCE(?, languages),
                profile_completed = COALESCE(?, profile_completed),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&patch.display_name)
        .bind(&patch.avatar_url)
        .bind(&patch.bio)
        .bind(&patch.location)
        .bind(patch.languages.as_ref().map(Json))
        .bind(patch.profile_completed)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.caches.invalidate_owner(user_id);
        updated.ok_or_else(|| DbError::NotFound(format!("profile {user_id}")))
    }
}
