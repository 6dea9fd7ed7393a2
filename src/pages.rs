//! Server-rendered pages: the public ones and the guarded app shell.

use axum::{debug_handler, response::{Html, IntoResponse, Redirect, Response}, routing::get, Router};
use tower_sessions::Session;

use crate::{auth::CurrentUser, include_res, res, session::USER_ID, AppResult, AppState, Markdown};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/about", get(about))
        .route("/terms", get(terms))
        .route("/privacy", get(privacy))
        .route("/style.css", get(res::stylesheet))
        .route("/dashboard", get(app_shell))
        .route("/profile", get(app_shell))
        .route("/profile-setup", get(app_shell))
        .route("/matches", get(app_shell))
        .route("/messages", get(app_shell))
        .route("/messages/{match_id}", get(app_shell))
        .route("/sessions", get(app_shell))
}

/// Signed-in visitors go straight to their dashboard.
#[debug_handler]
async fn landing(session: Session) -> AppResult<Response> {
    if session.get::<String>(USER_ID).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(Html(include_res!(str, "/pages/landing.html")).into_response())
}

#[debug_handler]
async fn about() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/about.md"))
}

#[debug_handler]
async fn terms() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/terms.md"))
}

#[debug_handler]
async fn privacy() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/privacy.md"))
}

#[debug_handler]
async fn app_shell(user: CurrentUser) -> impl IntoResponse {
    tracing::trace!(user_id = %user.id, "serving app shell");
    Html(include_res!(str, "/pages/app.html"))
}
