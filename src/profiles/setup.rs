use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    auth::CurrentUser,
    state::{ProfileState, SetupSkill},
    store::Store,
    AppResult, AppState,
};

use super::{profile::ProfileView, selection::Selection};

#[derive(Deserialize)]
pub(crate) struct SetupForm {
    display_name: String,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    skills: Vec<SetupSkill>,
}

/// Finishes onboarding. Any skill selection carried over from the landing
/// page is consumed here.
#[debug_handler(state = AppState)]
pub(crate) async fn complete_setup(
    State(store): State<Store>,
    user: CurrentUser,
    session: Session,
    Json(SetupForm { display_name, bio, skills }): Json<SetupForm>,
) -> AppResult<Json<ProfileView>> {
    let mut state = ProfileState::load(store, user).await?;
    state.complete_setup(&display_name, bio.as_deref(), &skills).await?;

    let selection = Selection::take(&session).await?;
    tracing::debug!(selected = ?selection.selected_skill, "profile setup completed");
    Ok(Json(state.into()))
}
