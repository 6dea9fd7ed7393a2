use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use oauth2::url::form_urlencoded;
use serde::Serialize;
use tower_sessions::Session;

use crate::{
    session::{USER_EMAIL, USER_ID},
    AppError,
};

/// The signed-in user. Extracting it on a request without a session sends
/// the client to `/login`, remembering where it was headed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user_id = session
            .get::<String>(USER_ID)
            .await
            .map_err(|e| AppError::from(e).into_response())?;
        let Some(id) = user_id else {
            // nested routers see a stripped uri
            let uri = parts.extensions.get::<OriginalUri>().map_or(&parts.uri, |o| &o.0);
            let target = uri.path_and_query().map_or("/", |p| p.as_str());
            return Err(Redirect::to(&login_redirect(target)).into_response());
        };

        let email = session
            .get::<String>(USER_EMAIL)
            .await
            .map_err(|e| AppError::from(e).into_response())?;
        Ok(CurrentUser { id, email })
    }
}

pub(crate) fn login_redirect(return_url: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(return_url.as_bytes()).collect();
    format!("/login?return_url={encoded}")
}
