use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::DbError,
    models::{Conversation, Match, MatchStatus, Message, NewMessage},
    realtime::MessageHub,
    validation,
};

#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
    hub: MessageHub,
}

impl MessageStore {
    pub fn new(pool: SqlitePool, hub: MessageHub) -> Self {
        Self { pool, hub }
    }

    /// Thread of `match_id`, oldest first.
    pub async fn for_match(&self, match_id: Uuid) -> Result<Vec<Message>, DbError> {
        let rows = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE match_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Appends a message to an accepted match and publishes the stored row.
    pub async fn send(&self, sender_id: &str, match_id: Uuid, message: &NewMessage) -> Result<Message, DbError> {
        let content = validation::message_content(&message.content)?;

        let thread = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = ?")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("match {match_id}")))?;
        if !thread.is_participant(sender_id) {
            return Err(DbError::Forbidden(format!("not a participant of match {match_id}")));
        }
        if thread.status != MatchStatus::Accepted {
            return Err(DbError::Forbidden(format!("match {match_id} is {}", thread.status)));
        }

        let stored = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, match_id, sender_id, content, message_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(match_id)
        .bind(sender_id)
        .bind(&content)
        .bind(message.message_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.hub.publish(&stored, [thread.teacher_id.as_str(), thread.learner_id.as_str()]);
        Ok(stored)
    }

    /// Stamps `read_at` unless `reader_id` wrote the message. Returns whether
    /// a row changed.
    pub async fn mark_as_read(&self, reader_id: &str, message_id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE messages SET read_at = ? WHERE id = ? AND sender_id <> ? AND read_at IS NULL",
        )
        .bind(Utc::now())
        .bind(message_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, message_id: Uuid) -> Result<Message, DbError> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("message {message_id}")))
    }

    /// One summary per accepted match of `user_id`: counterpart, latest
    /// message and how many of the counterpart's messages are still unread.
    pub async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, DbError> {
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT m.id AS match_id,
                   p.id AS other_id, p.display_name AS other_display_name, p.avatar_url AS other_avatar_url,
                   lm.id AS last_id, lm.sender_id AS last_sender_id, lm.content AS last_content,
                   lm.message_type AS last_message_type, lm.read_at AS last_read_at,
                   lm.created_at AS last_created_at,
                   (SELECT COUNT(*) FROM messages u
                     WHERE u.match_id = m.id AND u.sender_id <> ?1 AND u.read_at IS NULL) AS unread_count
            FROM matches m
            JOIN profiles p
              ON p.id = CASE WHEN m.teacher_id = ?1 THEN m.learner_id ELSE m.teacher_id END
            LEFT JOIN messages lm
              ON lm.id = (SELECT x.id FROM messages x
                           WHERE x.match_id = m.id
                           ORDER BY x.created_at DESC, x.id DESC
                           LIMIT 1)
            WHERE (m.teacher_id = ?1 OR m.learner_id = ?1) AND m.status = 'accepted'
            ORDER BY COALESCE(lm.created_at, m.updated_at) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
