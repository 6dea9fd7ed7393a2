use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SkillType {
    Teach,
    Learn,
}

impl SkillType {
    pub fn as_str(&self) -> &'static str {
        use SkillType::*;
        match self {
            Teach => "teach",
            Learn => "learn",
        }
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        use SkillLevel::*;
        match self {
            Beginner => "beginner",
            Intermediate => "intermediate",
            Advanced => "advanced",
            Expert => "expert",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub user_id: String,
    pub skill_name: String,
    pub skill_type: SkillType,
    pub skill_level: SkillLevel,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSkill {
    pub skill_name: String,
    pub skill_type: SkillType,
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillPatch {
    pub skill_name: Option<String>,
    pub skill_level: Option<SkillLevel>,
    pub description: Option<String>,
}

/// A user skill as returned by skill search, with its owner's public card.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SkillWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub skill: Skill,
    pub owner_display_name: Option<String>,
    pub owner_avatar_url: Option<String>,
}
