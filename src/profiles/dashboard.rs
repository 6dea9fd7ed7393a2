use axum::{debug_handler, extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::{
    auth::CurrentUser,
    models::{LearningSession, MatchDetails, Profile, Skill},
    state::{MatchState, MessageState, ProfileState, SessionState},
    store::Store,
    AppResult, AppState,
};

#[derive(Serialize)]
pub(crate) struct Dashboard {
    profile: Option<Profile>,
    teach_skills: Vec<Skill>,
    learn_skills: Vec<Skill>,
    pending_matches: Vec<MatchDetails>,
    accepted_matches: Vec<MatchDetails>,
    upcoming_sessions: Vec<LearningSession>,
    completed_sessions: usize,
    unread_messages: i64,
}

#[debug_handler(state = AppState)]
pub(crate) async fn dashboard(
    State(store): State<Store>,
    user: CurrentUser,
) -> AppResult<Json<Dashboard>> {
    let mut messages = MessageState::new(store.clone(), user.clone(), None);
    let (profile, matches, sessions, ()) = tokio::try_join!(
        ProfileState::load(store.clone(), user.clone()),
        MatchState::load(store.clone(), user.clone()),
        SessionState::load(store, user),
        messages.load_conversations(),
    )?;

    let now = Utc::now();
    Ok(Json(Dashboard {
        teach_skills: profile.teach_skills().cloned().collect(),
        learn_skills: profile.learn_skills().cloned().collect(),
        profile: profile.profile,
        pending_matches: matches.pending_matches().cloned().collect(),
        accepted_matches: matches.accepted_matches().cloned().collect(),
        upcoming_sessions: sessions.upcoming_sessions(now).cloned().collect(),
        completed_sessions: sessions.completed_sessions().count(),
        unread_messages: messages.conversations.iter().map(|c| c.unread_count).sum(),
    }))
}
