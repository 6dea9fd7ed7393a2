use thiserror::Error;

use crate::{models::MatchStatus, validation::ValidationError};

/// Failure of any data-access operation.
///
/// Backend failures are flattened into [`DbError::Database`]; the
/// only structured case callers may branch on is [`DbError::NotFound`].
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal match transition from {from} to {to}")]
    IllegalTransition { from: MatchStatus, to: MatchStatus },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("row".to_owned()),
            e => DbError::Database(e.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Database(err.to_string())
    }
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}
