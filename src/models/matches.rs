use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use uuid::Uuid;

use crate::error::DbError;

use super::SkillLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl MatchStatus {
    /// Every legal status change. Anything not listed is rejected.
    pub const TRANSITIONS: &'static [(MatchStatus, MatchStatus)] = &[
        (MatchStatus::Pending, MatchStatus::Accepted),
        (MatchStatus::Pending, MatchStatus::Rejected),
        (MatchStatus::Accepted, MatchStatus::Completed),
    ];

    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        Self::TRANSITIONS.contains(&(self, next))
    }

    pub fn transition_to(self, next: MatchStatus) -> Result<MatchStatus, DbError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DbError::IllegalTransition { from: self, to: next })
        }
    }

    pub fn as_str(&self) -> &'static str {
        use MatchStatus::*;
        match self {
            Pending => "pending",
            Accepted => "accepted",
            Rejected => "rejected",
            Completed => "completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: Uuid,
    pub teacher_id: String,
    pub learner_id: String,
    pub teacher_skill_id: Uuid,
    pub learner_skill_id: Uuid,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.teacher_id == user_id || self.learner_id == user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
    pub teacher_skill_id: Uuid,
    pub learner_skill_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSummary {
    pub skill_name: String,
    pub skill_level: SkillLevel,
}

/// A match joined with both participants' profiles and skills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetails {
    #[serde(flatten)]
    pub record: Match,
    pub teacher_profile: ProfileSummary,
    pub learner_profile: ProfileSummary,
    pub teacher_skill: Option<SkillSummary>,
    pub learner_skill: Option<SkillSummary>,
}

fn skill_summary(row: &SqliteRow, prefix: &str) -> Result<Option<SkillSummary>, sqlx::Error> {
    let name: Option<String> = row.try_get(format!("{prefix}_skill_name").as_str())?;
    let level: Option<SkillLevel> = row.try_get(format!("{prefix}_skill_level").as_str())?;
    Ok(name.zip(level).map(|(skill_name, skill_level)| SkillSummary { skill_name, skill_level }))
}

impl<'r> FromRow<'r, SqliteRow> for MatchDetails {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            record: Match::from_row(row)?,
            teacher_profile: ProfileSummary {
                display_name: row.try_get("teacher_display_name")?,
                avatar_url: row.try_get("teacher_avatar_url")?,
            },
            learner_profile: ProfileSummary {
                display_name: row.try_get("learner_display_name")?,
                avatar_url: row.try_get("learner_avatar_url")?,
            },
            teacher_skill: skill_summary(row, "teacher")?,
            learner_skill: skill_summary(row, "learner")?,
        })
    }
}
