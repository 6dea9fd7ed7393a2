use axum::{debug_handler, extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    models::{NewSkill, Skill, SkillPatch, SkillType, SkillWithOwner},
    state::ProfileState,
    store::Store,
    AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct SkillSearchQuery {
    #[serde(default)]
    q: String,
    #[serde(rename = "type")]
    skill_type: Option<SkillType>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(store): State<Store>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Skill>>> {
    Ok(Json(store.skills.for_user(&user.id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn add(
    State(store): State<Store>,
    user: CurrentUser,
    Json(new): Json<NewSkill>,
) -> AppResult<(StatusCode, Json<Skill>)> {
    let mut state = ProfileState::new(store, user);
    let added = state.add_skill(&new).await?;
    Ok((StatusCode::CREATED, Json(added.clone())))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    State(store): State<Store>,
    user: CurrentUser,
    Path(skill_id): Path<Uuid>,
    Json(patch): Json<SkillPatch>,
) -> AppResult<Json<Skill>> {
    Ok(Json(store.skills.update(&user.id, skill_id, &patch).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn remove(
    State(store): State<Store>,
    user: CurrentUser,
    Path(skill_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ProfileState::new(store, user).remove_skill(skill_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Everyone's skills whose name contains `q`, optionally of one type.
#[debug_handler(state = AppState)]
pub(crate) async fn search(
    State(store): State<Store>,
    _user: CurrentUser,
    Query(SkillSearchQuery { q, skill_type }): Query<SkillSearchQuery>,
) -> AppResult<Json<Vec<SkillWithOwner>>> {
    Ok(Json(store.skills.search(&q, skill_type).await?))
}
