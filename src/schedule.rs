use axum::{debug_handler, extract::{Path, Query, State}, http::StatusCode, routing::{get, patch}, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    models::{LearningSession, NewSession, SessionPatch},
    state::SessionState,
    store::Store,
    AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list).post(create))
        .route("/sessions/{id}", patch(update))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SessionView {
    Upcoming,
    Completed,
}

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    view: Option<SessionView>,
}

#[debug_handler(state = AppState)]
async fn list(
    State(store): State<Store>,
    user: CurrentUser,
    Query(ListQuery { view }): Query<ListQuery>,
) -> AppResult<Json<Vec<LearningSession>>> {
    let state = SessionState::load(store, user).await?;
    let sessions = match view {
        None => state.sessions,
        Some(SessionView::Upcoming) => state.upcoming_sessions(Utc::now()).cloned().collect(),
        Some(SessionView::Completed) => state.completed_sessions().cloned().collect(),
    };
    Ok(Json(sessions))
}

#[debug_handler(state = AppState)]
async fn create(
    State(store): State<Store>,
    user: CurrentUser,
    Json(new): Json<NewSession>,
) -> AppResult<(StatusCode, Json<LearningSession>)> {
    let mut state = SessionState::new(store, user);
    let created = state.create_session(&new).await?;
    Ok((StatusCode::CREATED, Json(created.clone())))
}

#[debug_handler(state = AppState)]
async fn update(
    State(store): State<Store>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
    Json(patch): Json<SessionPatch>,
) -> AppResult<Json<LearningSession>> {
    let mut state = SessionState::new(store, user);
    let updated = state.update_session(session_id, &patch).await?;
    Ok(Json(updated.clone()))
}
