use axum::{debug_handler, extract::{Path, State}, http::StatusCode, routing::{get, patch}, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    models::{Match, MatchDetails, MatchStatus, NewMatch},
    state::MatchState,
    store::Store,
    AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/matches", get(list).post(propose))
        .route("/matches/{id}", patch(update_status))
}

#[derive(Deserialize)]
pub(crate) struct StatusUpdate {
    status: MatchStatus,
}

#[debug_handler(state = AppState)]
async fn list(
    State(store): State<Store>,
    user: CurrentUser,
) -> AppResult<Json<Vec<MatchDetails>>> {
    let state = MatchState::load(store, user).await?;
    Ok(Json(state.matches))
}

#[debug_handler(state = AppState)]
async fn propose(
    State(store): State<Store>,
    user: CurrentUser,
    Json(new): Json<NewMatch>,
) -> AppResult<(StatusCode, Json<Match>)> {
    let created = MatchState::new(store, user).propose(&new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Illegal moves come back as 409 with the status the match is really in.
#[debug_handler(state = AppState)]
async fn update_status(
    State(store): State<Store>,
    user: CurrentUser,
    Path(match_id): Path<Uuid>,
    Json(StatusUpdate { status }): Json<StatusUpdate>,
) -> AppResult<Json<Match>> {
    let updated = MatchState::new(store, user).update_match_status(match_id, status).await?;
    Ok(Json(updated))
}
