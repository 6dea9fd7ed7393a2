use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::DbError,
    models::{Match, MatchDetails, MatchStatus, NewMatch},
    store::Store,
};

use super::LoadStatus;

pub struct MatchState {
    store: Store,
    user: CurrentUser,
    pub matches: Vec<MatchDetails>,
    pub status: LoadStatus,
}

impl MatchState {
    pub fn new(store: Store, user: CurrentUser) -> Self {
        Self {
            store,
            user,
            matches: Vec::new(),
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
        let result = self.store.matches.for_user(&self.user.id).await;
        self.status.finish(&result, "matches");
        self.matches = result?;
        Ok(())
    }

    fn with_status(&self, status: MatchStatus) -> impl Iterator<Item = &MatchDetails> {
        self.matches.iter().filter(move |m| m.record.status == status)
    }

    pub fn pending_matches(&self) -> impl Iterator<Item = &MatchDetails> {
        self.with_status(MatchStatus::Pending)
    }

    pub fn accepted_matches(&self) -> impl Iterator<Item = &MatchDetails> {
        self.with_status(MatchStatus::Accepted)
    }

    /// Writes the transition remotely, then patches status and `updated_at`
    /// of the local record. Nothing changes locally on failure.
    pub async fn update_match_status(&mut self, match_id: Uuid, status: MatchStatus) -> Result<Match, DbError> {
        let updated = self
            .store
            .matches
            .update_status(&self.user.id, match_id, status)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %match_id, %status, "match update failed"))?;

        if let Some(local) = self.matches.iter_mut().find(|m| m.record.id == match_id) {
            local.record.status = updated.status;
            local.record.updated_at = updated.updated_at;
        }
        Ok(updated)
    }

    /// Proposes a new pending match; the caller must own one of the two skills.
    pub async fn propose(&mut self, new: &NewMatch) -> Result<Match, DbError> {
        let teacher_skill = self.store.skills.get(new.teacher_skill_id).await?;
        let learner_skill = self.store.skills.get(new.learner_skill_id).await?;
        if teacher_skill.user_id != self.user.id && learner_skill.user_id != self.user.id {
            return Err(DbError::Forbidden("neither skill belongs to you".to_owned()));
        }

        let created = self.store.matches.create(new).await?;
        self.refetch().await?;
        Ok(created)
    }
}
