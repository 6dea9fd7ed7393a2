use axum::{debug_handler, extract::{Query, State}, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{store::Store, AppResult};

use super::safe_return_url;

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

/// Ends the session and drops cached data along with it.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    State(store): State<Store>,
    session: Session
) -> AppResult<Redirect> {
    session.flush().await?;
    store.caches.clear_data();
    Ok(Redirect::to(safe_return_url(return_url).as_deref().unwrap_or("/")))
}
