use axum::{debug_handler, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{
    auth::CurrentUser,
    session::{SEARCH_QUERY, SELECTED_SKILL},
    validation, AppResult,
};

/// A library skill picked on one page and carried over to profile setup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Selection {
    #[serde(default)]
    pub(crate) selected_skill: Option<String>,
    #[serde(default)]
    pub(crate) search_query: Option<String>,
}

impl Selection {
    pub(crate) async fn load(session: &Session) -> AppResult<Self> {
        Ok(Self {
            selected_skill: session.get(SELECTED_SKILL).await?,
            search_query: session.get(SEARCH_QUERY).await?,
        })
    }

    /// Reads and forgets the selection.
    pub(crate) async fn take(session: &Session) -> AppResult<Self> {
        Ok(Self {
            selected_skill: session.remove(SELECTED_SKILL).await?,
            search_query: session.remove(SEARCH_QUERY).await?,
        })
    }
}

#[debug_handler]
pub(crate) async fn selection(_user: CurrentUser, session: Session) -> AppResult<Json<Selection>> {
    Ok(Json(Selection::load(&session).await?))
}

#[debug_handler]
pub(crate) async fn select(
    _user: CurrentUser,
    session: Session,
    Json(selection): Json<Selection>,
) -> AppResult<Json<Selection>> {
    if let Some(skill) = &selection.selected_skill {
        session.insert(SELECTED_SKILL, validation::skill_name(skill)?).await?;
    }
    if let Some(query) = &selection.search_query {
        session.insert(SEARCH_QUERY, query.trim()).await?;
    }
    Ok(Json(Selection::load(&session).await?))
}

#[debug_handler]
pub(crate) async fn clear(_user: CurrentUser, session: Session) -> AppResult<StatusCode> {
    Selection::take(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
