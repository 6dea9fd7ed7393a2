use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::DbError,
    models::{LearningSession, NewSession, SessionPatch, SessionStatus},
    store::Store,
};

use super::LoadStatus;

pub struct SessionState {
    store: Store,
    user: CurrentUser,
    pub sessions: Vec<LearningSession>,
    pub status: LoadStatus,
}

impl SessionState {
    pub fn new(store: Store, user: CurrentUser) -> Self {
        Self {
            store,
            user,
            sessions: Vec::new(),
            status: LoadStatus::default(),
        }
    }

    pub async fn load(store: Store, user: CurrentUser) -> Result<Self, DbError> {
        let mut state = Self::new(store, user);
        state.refetch().await?;
        Ok(state)
    }

    pub async fn refetch(&mut self) -> Result<(), DbError> {
        self.status.begin();
        let result = self.store.sessions.for_user(&self.user.id).await;
        self.status.finish(&result, "sessions");
        self.sessions = result?;
        Ok(())
    }

    /// Still scheduled and not yet started as of `now`.
    pub fn upcoming_sessions(&self, now: DateTime<Utc>) -> impl Iterator<Item = &LearningSession> {
        self.sessions.iter().filter(move |s| s.is_upcoming(now))
    }

    pub fn completed_sessions(&self) -> impl Iterator<Item = &LearningSession> {
        self.sessions.iter().filter(|s| s.status == SessionStatus::Completed)
    }

    pub async fn create_session(&mut self, new: &NewSession) -> Result<&LearningSession, DbError> {
        let created = self
            .store
            .sessions
            .create(&self.user.id, new)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, match_id = %new.match_id, "scheduling session failed"))?;

        let at = self.sessions.partition_point(|s| s.scheduled_at <= created.scheduled_at);
        self.sessions.insert(at, created);
        Ok(&self.sessions[at])
    }

    pub async fn update_session(&mut self, session_id: Uuid, patch: &SessionPatch) -> Result<&LearningSession, DbError> {
        let updated = self
            .store
            .sessions
            .update(&self.user.id, session_id, patch)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %session_id, "session update failed"))?;

        self.sessions.retain(|s| s.id != session_id);
        let at = self.sessions.partition_point(|s| s.scheduled_at <= updated.scheduled_at);
        self.sessions.insert(at, updated);
        Ok(&self.sessions[at])
    }
}
