use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::DbError,
    models::{LearningSession, Match, NewSession, SessionPatch, SessionStatus, DEFAULT_SESSION_MINUTES},
    validation,
};

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Sessions where `user_id` teaches or learns, soonest first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<LearningSession>, DbError> {
        let rows = sqlx::query_as::<_, LearningSession>(
            r#"
            SELECT * FROM sessions
            WHERE teacher_id = ?1 OR learner_id = ?1
            ORDER BY scheduled_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, session_id: Uuid) -> Result<LearningSession, DbError> {
        sqlx::query_as::<_, LearningSession>("SELECT * FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("session {session_id}")))
    }

    /// Schedules a session for a match `user_id` belongs to. Teacher and
    /// learner are taken from the match.
    pub async fn create(&self, user_id: &str, new: &NewSession) -> Result<LearningSession, DbError> {
        let title = validation::session_title(&new.title)?;
        validation::session_description(new.description.as_deref())?;
        let duration = validation::duration_minutes(new.duration_minutes.unwrap_or(DEFAULT_SESSION_MINUTES))?;

        let pairing = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = ?")
            .bind(new.match_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("match {}", new.match_id)))?;
        if !pairing.is_participant(user_id) {
            return Err(DbError::Forbidden(format!("not a participant of match {}", new.match_id)));
        }

        let now = Utc::now();
        let session = sqlx::query_as::<_, LearningSession>(
            r#"
            INSERT INTO sessions (id, match_id, teacher_id, learner_id, title, description, scheduled_at,
                                  duration_minutes, status, meeting_link, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(pairing.id)
        .bind(&pairing.teacher_id)
        .bind(&pairing.learner_id)
        .bind(&title)
        .bind(&new.description)
        .bind(new.scheduled_at)
        .bind(duration)
        .bind(SessionStatus::Scheduled)
        .bind(&new.meeting_link)
        .bind(&new.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(session_id = %session.id, match_id = %pairing.id, "scheduled session");
        Ok(session)
    }

    /// Applies `patch` and always stamps a fresh `updated_at`.
    pub async fn update(&self, user_id: &str, session_id: Uuid, patch: &SessionPatch) -> Result<LearningSession, DbError> {
        let current = self.get(session_id).await?;
        if !current.is_participant(user_id) {
            return Err(DbError::Forbidden(format!("not a participant of session {session_id}")));
        }
        let title = patch.title.as_deref().map(validation::session_title).transpose()?;
        validation::session_description(patch.description.as_deref())?;
        let duration = patch.duration_minutes.map(validation::duration_minutes).transpose()?;

        let updated = sqlx::query_as::<_, LearningSession>(
            r#"
            UPDATE sessions
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                scheduled_at = COALESCE(?, scheduled_at),
                duration_minutes = COALESCE(?, duration_minutes),
                status = COALESCE(?, status),
                meeting_link = COALESCE(?, meeting_link),
                notes = COALESCE(?, notes),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(&patch.description)
        .bind(patch.scheduled_at)
        .bind(duration)
        .bind(patch.status)
        .bind(&patch.meeting_link)
        .bind(&patch.notes)
        .bind(Utc::now())
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::NotFound(format!("session {session_id}")))
    }
}
