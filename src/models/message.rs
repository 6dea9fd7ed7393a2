use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationPeer {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Summary of one accepted match's thread, as seen by one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub match_id: Uuid,
    pub other_user: ConversationPeer,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Conversation {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let match_id: Uuid = row.try_get("match_id")?;
        let last_id: Option<Uuid> = row.try_get("last_id")?;
        let last_message = match last_id {
            Some(id) => Some(Message {
                id,
                match_id,
                sender_id: row.try_get("last_sender_id")?,
                content: row.try_get("last_content")?,
                message_type: row.try_get("last_message_type")?,
                read_at: row.try_get("last_read_at")?,
                created_at: row.try_get("last_created_at")?,
            }),
            None => None,
        };

        Ok(Self {
            match_id,
            other_user: ConversationPeer {
                id: row.try_get("other_id")?,
                display_name: row.try_get("other_display_name")?,
                avatar_url: row.try_get("other_avatar_url")?,
            },
            last_message,
            unread_count: row.try_get("unread_count")?,
        })
    }
}
