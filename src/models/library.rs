use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use uuid::Uuid;

use super::SkillLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SkillCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Canonical catalog entry used for search suggestions and trending lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLibraryItem {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub difficulty_level: Option<SkillLevel>,
    pub popularity_score: i64,
    pub created_at: DateTime<Utc>,
    pub category: Option<SkillCategory>,
}

impl<'r> FromRow<'r, SqliteRow> for SkillLibraryItem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let category_id: Option<Uuid> = row.try_get("category_id")?;
        let category_name: Option<String> = row.try_get("category_name")?;
        let category = match (category_id, category_name) {
            (Some(id), Some(name)) => Some(SkillCategory {
                id,
                name,
                description: row.try_get("category_description")?,
                icon: row.try_get("category_icon")?,
                created_at: row.try_get("category_created_at")?,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category_id,
            description: row.try_get("description")?,
            difficulty_level: row.try_get("difficulty_level")?,
            popularity_score: row.try_get("popularity_score")?,
            created_at: row.try_get("created_at")?,
            category,
        })
    }
}
