use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::DbError,
    models::{Match, MatchDetails, MatchStatus, NewMatch, Skill, SkillType},
};

#[derive(Clone)]
pub struct MatchStore {
    pool: SqlitePool,
}

impl MatchStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, match_id: Uuid) -> Result<Match, DbError> {
        sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = ?")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("match {match_id}")))
    }

    /// Matches where `user_id` is either side, newest first, with both
    /// profiles and skills joined in.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<MatchDetails>, DbError> {
        let rows = sqlx::query_as::<_, MatchDetails>(
            r#"
            SELECT m.*,
                   tp.display_name AS teacher_display_name, tp.avatar_url AS teacher_avatar_url,
                   lp.display_name AS learner_display_name, lp.avatar_url AS learner_avatar_url,
                   ts.skill_name AS teacher_skill_name, ts.skill_level AS teacher_skill_level,
                   ls.skill_name AS learner_skill_name, ls.skill_level AS learner_skill_level
            FROM matches m
            LEFT JOIN profiles tp ON tp.id = m.teacher_id
            LEFT JOIN profiles lp ON lp.id = m.learner_id
            LEFT JOIN skills ts ON ts.id = m.teacher_skill_id
            LEFT JOIN skills ls ON ls.id = m.learner_skill_id
            WHERE m.teacher_id = ?1 OR m.learner_id = ?1
            ORDER BY m.created_at DESC, m.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Pairs a teach skill with a learn skill owned by someone else. New
    /// matches start out pending.
    pub async fn create(&self, new: &NewMatch) -> Result<Match, DbError> {
        let teacher_skill = self.skill(new.teacher_skill_id).await?;
        let learner_skill = self.skill(new.learner_skill_id).await?;

        if teacher_skill.skill_type != SkillType::Teach {
            return Err(DbError::Forbidden(format!("skill {} is not a teach skill", teacher_skill.id)));
        }
        if learner_skill.skill_type != SkillType::Learn {
            return Err(DbError::Forbidden(format!("skill {} is not a learn skill", learner_skill.id)));
        }
        if teacher_skill.user_id == learner_skill.user_id {
            return Err(DbError::Forbidden("a match needs two different people".to_owned()));
        }

        let now = Utc::now();
        let created = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (id, teacher_id, learner_id, teacher_skill_id, learner_skill_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&teacher_skill.user_id)
        .bind(&learner_skill.user_id)
        .bind(teacher_skill.id)
        .bind(learner_skill.id)
        .bind(MatchStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(match_id = %created.id, teacher = %created.teacher_id, learner = %created.learner_id, "created match");
        Ok(created)
    }

    /// Moves a match along the status table on behalf of one participant.
    pub async fn update_status(&self, user_id: &str, match_id: Uuid, next: MatchStatus) -> Result<Match, DbError> {
        let current = self.get(match_id).await?;
        if !current.is_participant(user_id) {
            return Err(DbError::Forbidden(format!("not a participant of match {match_id}")));
        }
        self.transition(match_id, current.status, next).await
    }

    /// Writes `from -> next` only if the row still has status `from`. When
    /// both sides race, the loser gets [`DbError::IllegalTransition`] against
    /// whatever status won.
    pub async fn transition(&self, match_id: Uuid, from: MatchStatus, next: MatchStatus) -> Result<Match, DbError> {
        from.transition_to(next)?;

        let updated = sqlx::query_as::<_, Match>(
            "UPDATE matches SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(match_id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(updated) => {
                tracing::info!(%match_id, %from, to = %next, "match status changed");
                Ok(updated)
            }
            None => {
                let latest = self.get(match_id).await?;
                tracing::debug!(%match_id, %from, actual = %latest.status, "match status changed underneath");
                Err(DbError::IllegalTransition { from: latest.status, to: next })
            }
        }
    }

    async fn skill(&self, skill_id: Uuid) -> Result<Skill, DbError> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = ?")
            .bind(skill_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("skill {skill_id}")))
    }
}
