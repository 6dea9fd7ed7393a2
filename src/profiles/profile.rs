use axum::{debug_handler, extract::State, Json};
use serde::Serialize;

use crate::{
    auth::CurrentUser,
    models::{Profile, ProfilePatch, Skill},
    state::ProfileState,
    store::Store,
    AppResult, AppState,
};

#[derive(Serialize)]
pub(crate) struct ProfileView {
    profile: Option<Profile>,
    skills: Vec<Skill>,
}

impl From<ProfileState> for ProfileView {
    fn from(state: ProfileState) -> Self {
        Self {
            profile: state.profile,
            skills: state.skills,
        }
    }
}

#[debug_handler]
pub(crate) async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// Loads the caller's profile, creating a minimal one on first visit.
#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(store): State<Store>,
    user: CurrentUser,
) -> AppResult<Json<ProfileView>> {
    let state = ProfileState::load(store, user).await?;
    Ok(Json(state.into()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(store): State<Store>,
    user: CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<Profile>> {
    let mut state = ProfileState::new(store, user);
    let updated = state.update_profile(&patch).await?;
    Ok(Json(updated.clone()))
}
