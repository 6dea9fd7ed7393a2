use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    cache::{cache_key, Caches},
    error::DbError,
    models::{SkillCategory, SkillLevel, SkillLibraryItem},
};

use super::like_pattern;

pub const DEFAULT_SEARCH_LIMIT: i64 = 20;
pub const DEFAULT_POPULAR_LIMIT: i64 = 12;
pub const DEFAULT_CATEGORY_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

const ITEM_SELECT: &str = r#"
    SELECT l.id, l.name, l.category_id, l.description, l.difficulty_level, l.popularity_score, l.created_at,
           c.name AS category_name, c.description AS category_description,
           c.icon AS category_icon, c.created_at AS category_created_at
    FROM skill_library l
    LEFT JOIN skill_categories c ON c.id = l.category_id
    WHERE 1 = 1"#;

/// Read-only catalog of canonical skill names.
#[derive(Clone)]
pub struct LibraryStore {
    pool: SqlitePool,
    caches: Caches,
}

impl LibraryStore {
    pub fn new(pool: SqlitePool, caches: Caches) -> Self {
        Self { pool, caches }
    }

    pub async fn categories(&self) -> Result<Vec<SkillCategory>, DbError> {
        self.caches
            .categories
            .get_or_fetch(Some("skill_categories:all:"), || async {
                let rows = sqlx::query_as::<_, SkillCategory>("SELECT * FROM skill_categories ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?;
                Ok::<_, DbError>(rows)
            })
            .await
    }

    /// Top `limit` entries by popularity whose name contains `query`
    /// (case-insensitive). A blank query matches everything.
    pub async fn search(&self, query: &str, category_id: Option<Uuid>, limit: i64) -> Result<Vec<SkillLibraryItem>, DbError> {
        let query = query.trim();
        let limit = limit.clamp(1, MAX_LIMIT);
        let category = category_id.map_or_else(|| "all".to_owned(), |id| id.to_string());
        let key = cache_key("library", &query.to_lowercase(), &format!("{category}_{limit}"));
        self.fetch_items(&key, Some(query).filter(|q| !q.is_empty()), category_id, limit)
            .await
    }

    pub async fn popular(&self, limit: i64) -> Result<Vec<SkillLibraryItem>, DbError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        let key = cache_key("popular_skills", "all", &limit.to_string());
        self.fetch_items(&key, None, None, limit).await
    }

    pub async fn by_category(&self, category_id: Uuid, limit: i64) -> Result<Vec<SkillLibraryItem>, DbError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        let key = cache_key("category_skills", &category_id.to_string(), &limit.to_string());
        self.fetch_items(&key, None, Some(category_id), limit).await
    }

    pub fn clear_cache(&self) {
        self.caches.categories.clear();
        self.caches.library.clear();
    }

    async fn fetch_items(
        &self,
        key: &str,
        query: Option<&str>,
        category_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<SkillLibraryItem>, DbError> {
        self.caches
            .library
            .get_or_fetch(Some(key), || async {
                let mut qb = QueryBuilder::<Sqlite>::new(ITEM_SELECT);
                if let Some(query) = query {
                    qb.push(" AND l.name_lower LIKE ")
                        .push_bind(like_pattern(query))
                        .push(" ESCAPE '\\'");
                }
                if let Some(category_id) = category_id {
                    qb.push(" AND l.category_id = ").push_bind(category_id);
                }
                qb.push(" ORDER BY l.popularity_score DESC, l.name ASC LIMIT ")
                    .push_bind(limit);

                let items = qb.build_query_as::<SkillLibraryItem>().fetch_all(&self.pool).await?;
                Ok::<_, DbError>(items)
            })
            .await
    }

    pub async fn add_category(&self, name: &str, description: Option<&str>, icon: Option<&str>) -> Result<SkillCategory, DbError> {
        let category = sqlx::query_as::<_, SkillCategory>(
            "INSERT INTO skill_categories (id, name, description, icon, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        self.clear_cache();
        Ok(category)
    }

    pub async fn add_item(
        &self,
        name: &str,
        category_id: Option<Uuid>,
        difficulty_level: Option<SkillLevel>,
        popularity_score: i64,
    ) -> Result<Uuid, DbError> {
        let id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO skill_library (id, name, name_lower, category_id, difficulty_level, popularity_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(name.to_lowercase())
        .bind(category_id)
        .bind(difficulty_level)
        .bind(popularity_score.max(0))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        self.clear_cache();
        Ok(id)
    }

    /// Fills an empty catalog with the default categories and skills.
    pub async fn seed_if_empty(&self) -> Result<bool, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM skill_library")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        let mut categories: HashMap<&str, Uuid> = HashMap::new();
        let mut score = DEFAULT_LIBRARY.len() as i64 * 10;
        for &(category, icon, name, level) in DEFAULT_LIBRARY {
            let category_id = match categories.get(category) {
                Some(id) => *id,
                None => {
                    let id = self.add_category(category, None, Some(icon)).await?.id;
                    categories.insert(category, id);
                    id
                }
            };
            self.add_item(name, Some(category_id), Some(level), score).await?;
            score -= 10;
        }
        tracing::info!(skills = DEFAULT_LIBRARY.len(), categories = categories.len(), "seeded skill library");
        Ok(true)
    }
}

/// (category, icon, skill, difficulty), most popular first.
const DEFAULT_LIBRARY: &[(&str, &str, &str, SkillLevel)] = &[
    ("Technology", "code", "Python", SkillLevel::Beginner),
    ("Technology", "code", "JavaScript", SkillLevel::Beginner),
    ("Technology", "code", "React", SkillLevel::Intermediate),
    ("Technology", "code", "Node.js", SkillLevel::Intermediate),
    ("Arts & Design", "palette", "UI/UX Design", SkillLevel::Intermediate),
    ("Music", "music", "Guitar", SkillLevel::Beginner),
    ("Music", "music", "Piano", SkillLevel::Beginner),
    ("Languages", "globe", "Spanish", SkillLevel::Beginner),
    ("Languages", "globe", "French", SkillLevel::Beginner),
    ("Languages", "globe", "German", SkillLevel::Beginner),
    ("Arts & Design", "palette", "Photography", SkillLevel::Beginner),
    ("Arts & Design", "palette", "Video Editing", SkillLevel::Intermediate),
    ("Arts & Design", "palette", "Graphic Design", SkillLevel::Intermediate),
    ("Business", "briefcase", "Marketing", SkillLevel::Intermediate),
    ("Technology", "code", "Data Science", SkillLevel::Advanced),
    ("Technology", "code", "Machine Learning", SkillLevel::Advanced),
    ("Lifestyle", "heart", "Cooking", SkillLevel::Beginner),
    ("Lifestyle", "heart", "Yoga", SkillLevel::Beginner),
    ("Business", "briefcase", "Public Speaking", SkillLevel::Intermediate),
    ("Business", "briefcase", "Writing", SkillLevel::Beginner),
    ("Arts & Design", "palette", "Drawing", SkillLevel::Beginner),
    ("Arts & Design", "palette", "Painting", SkillLevel::Beginner),
];
