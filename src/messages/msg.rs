use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    models::{Conversation, Message, NewMessage},
    state::MessageState,
    store::Store,
    AppResult, AppState,
};

use super::participant_match;

#[derive(Serialize)]
pub(crate) struct ReadReceipt {
    updated: bool,
}

#[debug_handler(state = AppState)]
pub(crate) async fn conversations(
    State(store): State<Store>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Conversation>>> {
    let mut state = MessageState::new(store, user, None);
    state.load_conversations().await?;
    Ok(Json(state.conversations))
}

#[debug_handler(state = AppState)]
pub(crate) async fn history(
    State(store): State<Store>,
    user: CurrentUser,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<Vec<Message>>> {
    participant_match(&store, &user.id, match_id).await?;
    let mut state = MessageState::new(store, user, Some(match_id));
    state.load_messages().await?;
    Ok(Json(state.messages().to_vec()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(store): State<Store>,
    user: CurrentUser,
    Path(match_id): Path<Uuid>,
    Json(NewMessage { content, message_type }): Json<NewMessage>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let mut state = MessageState::new(store, user, Some(match_id));
    let sent = state.send_message(match_id, &content, message_type).await?;
    Ok((StatusCode::CREATED, Json(sent)))
}

/// `updated` is false for the caller's own messages and ones already read.
#[debug_handler(state = AppState)]
pub(crate) async fn mark_read(
    State(store): State<Store>,
    user: CurrentUser,
    Path(message_id): Path<Uuid>,
) -> AppResult<Json<ReadReceipt>> {
    let message = store.messages.get(message_id).await?;
    participant_match(&store, &user.id, message.match_id).await?;

    let mut state = MessageState::new(store, user, Some(message.match_id));
    let updated = state.mark_as_read(message_id).await?;
    Ok(Json(ReadReceipt { updated }))
}
