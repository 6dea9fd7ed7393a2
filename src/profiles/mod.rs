mod dashboard;
mod profile;
mod selection;
mod setup;
mod skills;

use axum::{routing::{get, patch, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile::me))
        .route("/profile", get(profile::profile).patch(profile::update_profile))
        .route("/profile/setup", post(setup::complete_setup))
        .route("/skills", get(skills::list).post(skills::add))
        .route("/skills/search", get(skills::search))
        .route("/skills/{id}", patch(skills::update).delete(skills::remove))
        .route("/selection", get(selection::selection).put(selection::select).delete(selection::clear))
        .route("/dashboard", get(dashboard::dashboard))
}
