//! Per-user state containers over the store: loaded data, derived views and
//! mutations that patch local state once the remote write is confirmed.

mod matches;
mod messages;
mod profile;
mod schedule;

pub use matches::MatchState;
pub use messages::MessageState;
pub use profile::{ProfileState, SetupSkill};
pub use schedule::SessionState;

/// Loading/error bookkeeping shared by every state container.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LoadStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl LoadStatus {
    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish<T, E: std::fmt::Display>(&mut self, result: &Result<T, E>, what: &str) {
        self.loading = false;
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to load {what}");
            self.error = Some(e.to_string());
        }
    }
}
