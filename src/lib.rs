pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod matches;
pub mod messages;
pub mod models;
pub mod pages;
pub mod profiles;
pub mod realtime;
pub mod res;
pub mod schedule;
pub mod session;
pub mod state;
pub mod store;
pub mod validation;

use std::ops::Deref;

use axum::{extract::FromRef, http::StatusCode, response::{Html, IntoResponse, Response}, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use crate::{auth::IdentityError, error::DbError, store::Store, validation::ValidationError};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub clients: auth::Clients,
}

/// Every page and API route, before state and layers are attached.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(profiles::router())
        .merge(library::router())
        .merge(matches::router())
        .merge(messages::router())
        .merge(schedule::router());

    Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .nest("/api", api)
}

/// Cookie sessions kept in memory, expiring after `idle` of inactivity.
pub fn session_layer(idle: time::Duration) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(idle))
}

pub fn app(state: AppState, session_idle: time::Duration) -> Router {
    routes()
        .with_state(state)
        .layer(session_layer(session_idle))
        .layer(TraceLayer::new_for_http())
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(format!("expected {field} in {self}"))?
            .as_str()
            .ok_or(format!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        self.get(field)
        .ok_or(format!("expected {field} in {self}").into())
    }
}


pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<DbError>() {
            return match e {
                DbError::Invalid(_) => StatusCode::BAD_REQUEST,
                DbError::Forbidden(_) => StatusCode::FORBIDDEN,
                DbError::NotFound(_) => StatusCode::NOT_FOUND,
                DbError::IllegalTransition { .. } => StatusCode::CONFLICT,
                DbError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if self.0.is::<ValidationError>() {
            return StatusCode::BAD_REQUEST;
        }
        if let Some(e) = self.0.downcast_ref::<IdentityError>() {
            return match e {
                IdentityError::NotConfigured(_) => StatusCode::NOT_FOUND,
                IdentityError::BadCallback(_) => StatusCode::BAD_REQUEST,
                IdentityError::Rejected(_) => StatusCode::UNAUTHORIZED,
            };
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Rendered as the `{ title, description }` notification the client shows.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }

        (
            status,
            Json(json!({ "title": "Error", "description": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(reqwest::Error);
apperr_impl!(oauth2::url::ParseError);
apperr_impl!(DbError);
apperr_impl!(ValidationError);
apperr_impl!(IdentityError);

impl<E: core::error::Error + Send + Sync + 'static, R: oauth2::ErrorResponse + Send + Sync + 'static> From<oauth2::RequestTokenError<E, R>> for AppError {
    fn from(err: oauth2::RequestTokenError<E, R>) -> Self {
        Self(anyhow::Error::from(err))
    }
}

pub struct Markdown<T>(pub T);

impl<T> IntoResponse for Markdown<T>
where
    T: Deref<Target = str>
{
    fn into_response(self) -> axum::response::Response {
        use pulldown_cmark::{Parser, Options};

        let parser = Parser::new_ext(&self.0, Options::ENABLE_TABLES | Options::ENABLE_HEADING_ATTRIBUTES);

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        Html(crate::res::page_shell(&html_output)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;

    #[test]
    fn errors_map_to_status() {
        let cases = [
            (AppError::from(ValidationError::InvalidEmail), StatusCode::BAD_REQUEST),
            (AppError::from(DbError::NotFound("match".into())), StatusCode::NOT_FOUND),
            (AppError::from(DbError::Forbidden("no".into())), StatusCode::FORBIDDEN),
            (
                AppError::from(DbError::IllegalTransition { from: MatchStatus::Completed, to: MatchStatus::Pending }),
                StatusCode::CONFLICT,
            ),
            (AppError::from(DbError::Invalid(ValidationError::PasswordTooShort)), StatusCode::BAD_REQUEST),
            (AppError::from(IdentityError::Rejected("EMAIL_NOT_FOUND".into())), StatusCode::UNAUTHORIZED),
            (AppError::from("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{}", err.0);
        }
    }
}
