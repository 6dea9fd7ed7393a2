use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    cache::{cache_key, Caches},
    error::DbError,
    models::{NewSkill, Skill, SkillPatch, SkillType, SkillWithOwner},
    validation,
};

use super::like_pattern;

const SEARCH_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct SkillStore {
    pool: SqlitePool,
    caches: Caches,
}

impl SkillStore {
    pub fn new(pool: SqlitePool, caches: Caches) -> Self {
        Self { pool, caches }
    }

    /// All skills of `user_id`, newest first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Skill>, DbError> {
        let key = cache_key("skills", user_id, "");
        self.caches
            .skills
            .get_or_fetch(Some(&key), || async {
                let skills = sqlx::query_as::<_, Skill>(
                    "SELECT * FROM skills WHERE user_id = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
                Ok::<_, DbError>(skills)
            })
            .await
    }

    pub async fn get(&self, skill_id: Uuid) -> Result<Skill, DbError> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = ?")
            .bind(skill_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("skill {skill_id}")))
    }

    pub async fn add(&self, user_id: &str, skill: &NewSkill) -> Result<Skill, DbError> {
        let skill_name = validation::skill_name(&skill.skill_name)?;

        let inserted = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (id, user_id, skill_name, skill_name_lower, skill_type, skill_level, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(&skill_name)
        .bind(skill_name.to_lowercase())
        .bind(skill.skill_type)
        .bind(skill.skill_level)
        .bind(&skill.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.invalidate(user_id);
        Ok(inserted)
    }

    /// Updates a skill owned by `user_id`.
    pub async fn update(&self, user_id: &str, skill_id: Uuid, patch: &SkillPatch) -> Result<Skill, DbError> {
        let owner = self.owner_of(skill_id).await?;
        if owner != user_id {
            return Err(DbError::Forbidden(format!("skill {skill_id} belongs to someone else")));
        }
        let skill_name = patch
            .skill_name
            .as_deref()
            .map(validation::skill_name)
            .transpose()?;
        let skill_name_lower = skill_name.as_deref().map(str::to_lowercase);

        let updated = sqlx::query_as::<_, Skill>(
            r#"
            UPDATE skills
            SET skill_name = COALESCE(?, skill_name),
                skill_name_lower = COALESCE(?, skill_name_lower),
                skill_level = COALESCE(?, skill_level),
                description = COALESCE(?, description)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(skill_name)
        .bind(skill_name_lower)
        .bind(patch.skill_level)
        .bind(&patch.description)
        .bind(skill_id)
        .fetch_optional(&self.pool)
        .await?;

        self.invalidate(&owner);
        updated.ok_or_else(|| DbError::NotFound(format!("skill {skill_id}")))
    }

    /// Deletes a skill owned by `user_id`.
    pub async fn remove(&self, user_id: &str, skill_id: Uuid) -> Result<(), DbError> {
        let owner = self.owner_of(skill_id).await?;
        if owner != user_id {
            return Err(DbError::Forbidden(format!("skill {skill_id} belongs to someone else")));
        }

        let result = sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(skill_id)
            .execute(&self.pool)
            .await?;

        self.invalidate(&owner);
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("skill {skill_id}")));
        }
        tracing::debug!(%skill_id, owner, "removed skill");
        Ok(())
    }

    /// Case-insensitive substring search over everyone's skills.
    pub async fn search(&self, query: &str, skill_type: Option<SkillType>) -> Result<Vec<SkillWithOwner>, DbError> {
        let scope = skill_type.map_or("all", |t| t.as_str());
        let key = cache_key("search", &query.trim().to_lowercase(), scope);
        self.caches
            .skill_search
            .get_or_fetch(Some(&key), || async {
                let mut qb = QueryBuilder::<Sqlite>::new(
                    r#"
                    SELECT s.*, p.display_name AS owner_display_name, p.avatar_url AS owner_avatar_url
                    FROM skills s
                    JOIN profiles p ON p.id = s.user_id
                    WHERE s.skill_name_lower LIKE "#,
                );
                qb.push_bind(like_pattern(query)).push(" ESCAPE '\\'");
                if let Some(skill_type) = skill_type {
                    qb.push(" AND s.skill_type = ").push_bind(skill_type);
                }
                qb.push(" ORDER BY s.created_at DESC LIMIT ").push_bind(SEARCH_LIMIT);

                let rows = qb.build_query_as::<SkillWithOwner>().fetch_all(&self.pool).await?;
                Ok::<_, DbError>(rows)
            })
            .await
    }

    async fn owner_of(&self, skill_id: Uuid) -> Result<String, DbError> {
        let owner: Option<(String,)> = sqlx::query_as("SELECT user_id FROM skills WHERE id = ?")
            .bind(skill_id)
            .fetch_optional(&self.pool)
            .await?;
        owner
            .map(|(user_id,)| user_id)
            .ok_or_else(|| DbError::NotFound(format!("skill {skill_id}")))
    }

    fn invalidate(&self, owner: &str) {
        self.caches.invalidate_owner(owner);
        // search results span every owner
        self.caches.skill_search.clear();
    }
}
