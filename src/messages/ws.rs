use axum::{
    debug_handler,
    extract::{ws::{Message as Frame, WebSocket}, Path, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::{auth::CurrentUser, models::NewMessage, store::Store, AppResult, AppState};

use super::participant_match;

/// Live feed of one match. Every message stored for the match is pushed as
/// JSON; text frames from the client are sent as new messages.
#[debug_handler(state = AppState)]
pub(crate) async fn match_ws(
    Path(match_id): Path<Uuid>,
    State(store): State<Store>,
    user: CurrentUser,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    participant_match(&store, &user.id, match_id).await?;

    Ok(ws.on_upgrade(move |stream| serve(stream, store, user, match_id)).into_response())
}

async fn serve(stream: WebSocket, store: Store, user: CurrentUser, match_id: Uuid) {
    let mut subscription = store.hub.subscribe(&user.id, Some(match_id));
    let (mut sender, mut receiver) = stream.split();
    tracing::debug!(%match_id, user_id = %user.id, "socket opened");

    let mut broadcast_task = tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, message_id = %message.id, "encoding message failed");
                    continue;
                }
            };
            if sender.send(Frame::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            let Frame::Text(text) = frame else {
                continue;
            };
            let Ok(new) = serde_json::from_str::<NewMessage>(text.as_str()) else {
                tracing::debug!(%match_id, "ignoring malformed frame");
                continue;
            };

            if let Err(e) = store.messages.send(&user.id, match_id, &new).await {
                tracing::warn!(error = %e, %match_id, "sending message over socket failed");
            }
        }
    });

    tokio::select! {
        _ = &mut broadcast_task => receive_task.abort(),
        _ = &mut receive_task => broadcast_task.abort(),
    };
    tracing::debug!(%match_id, "socket closed");
}
