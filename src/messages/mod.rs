mod msg;
mod ws;

use axum::{routing::{get, post}, Router};
use uuid::Uuid;

use crate::{error::DbError, models::Match, store::Store, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(msg::conversations))
        .route("/matches/{id}/messages", get(msg::history).post(msg::send))
        .route("/matches/{id}/ws", get(ws::match_ws))
        .route("/messages/{id}/read", post(msg::mark_read))
}

/// The match, provided `user_id` is one of its two sides.
pub(crate) async fn participant_match(store: &Store, user_id: &str, match_id: Uuid) -> Result<Match, DbError> {
    let pairing = store.matches.get(match_id).await?;
    if !pairing.is_participant(user_id) {
        return Err(DbError::Forbidden(format!("not a participant of match {match_id}")));
    }
    Ok(pairing)
}
