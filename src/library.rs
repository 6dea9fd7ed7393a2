//! Skill catalog lookups. Open to anyone, signed in or not.

use axum::{debug_handler, extract::{Path, Query, State}, routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::{SkillCategory, SkillLibraryItem},
    store::{Store, DEFAULT_CATEGORY_LIMIT, DEFAULT_POPULAR_LIMIT, DEFAULT_SEARCH_LIMIT},
    AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/library/search", get(search))
        .route("/library/browse", get(browse))
        .route("/library/popular", get(popular))
        .route("/library/categories", get(categories))
        .route("/library/categories/{id}", get(by_category))
}

#[derive(Deserialize)]
pub(crate) struct LibraryQuery {
    #[serde(default)]
    q: String,
    category: Option<Uuid>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub(crate) struct LimitQuery {
    limit: Option<i64>,
}

/// Search bar suggestions: nothing until something is typed.
#[debug_handler(state = AppState)]
async fn search(
    State(store): State<Store>,
    Query(LibraryQuery { q, category, limit }): Query<LibraryQuery>,
) -> AppResult<Json<Vec<SkillLibraryItem>>> {
    if q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Ok(Json(store.library.search(&q, category, limit).await?))
}

/// Browsing: a blank query lists the most popular entries.
#[debug_handler(state = AppState)]
async fn browse(
    State(store): State<Store>,
    Query(LibraryQuery { q, category, limit }): Query<LibraryQuery>,
) -> AppResult<Json<Vec<SkillLibraryItem>>> {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Ok(Json(store.library.search(&q, category, limit).await?))
}

#[debug_handler(state = AppState)]
async fn popular(
    State(store): State<Store>,
    Query(LimitQuery { limit }): Query<LimitQuery>,
) -> AppResult<Json<Vec<SkillLibraryItem>>> {
    Ok(Json(store.library.popular(limit.unwrap_or(DEFAULT_POPULAR_LIMIT)).await?))
}

#[debug_handler(state = AppState)]
async fn categories(State(store): State<Store>) -> AppResult<Json<Vec<SkillCategory>>> {
    Ok(Json(store.library.categories().await?))
}

#[debug_handler(state = AppState)]
async fn by_category(
    State(store): State<Store>,
    Path(category_id): Path<Uuid>,
    Query(LimitQuery { limit }): Query<LimitQuery>,
) -> AppResult<Json<Vec<SkillLibraryItem>>> {
    let limit = limit.unwrap_or(DEFAULT_CATEGORY_LIMIT);
    Ok(Json(store.library.by_category(category_id, limit).await?))
}
