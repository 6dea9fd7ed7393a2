use axum::{debug_handler, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::{models::ProfilePatch, store::Store, validation, AppResult, AppState};

use super::Clients;

#[derive(Deserialize)]
pub(crate) struct Credentials {
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ResetRequest {
    email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SignedIn {
    redirect: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn sign_in(
    State(store): State<Store>,
    State(clients): State<Clients>,
    session: Session,
    Json(Credentials { email, password, .. }): Json<Credentials>,
) -> AppResult<Json<SignedIn>> {
    let email = validation::email(&email)?;
    validation::password(&password)?;

    let identity = clients.identity_user("signInWithPassword", &PasswordRequest {
        email: &email,
        password: &password,
        return_secure_token: true,
    }).await?;

    let redirect = super::sign_in(&session, &store, identity).await?;
    Ok(Json(SignedIn { redirect }))
}

/// Creates the account, signs it in and names the fresh profile when a
/// display name came along.
#[debug_handler(state = AppState)]
pub(crate) async fn sign_up(
    State(store): State<Store>,
    State(clients): State<Clients>,
    session: Session,
    Json(Credentials { email, password, display_name }): Json<Credentials>,
) -> AppResult<Json<SignedIn>> {
    let email = validation::email(&email)?;
    validation::password(&password)?;
    let display_name = display_name
        .filter(|n| !n.trim().is_empty())
        .map(|n| validation::display_name(&n))
        .transpose()?;

    let identity = clients.identity_user("signUp", &PasswordRequest {
        email: &email,
        password: &password,
        return_secure_token: true,
    }).await?;
    let user_id = identity.id.clone();

    let redirect = super::sign_in(&session, &store, identity).await?;
    if display_name.is_some() {
        let patch = ProfilePatch { display_name, ..Default::default() };
        store.profiles.update(&user_id, &patch).await?;
    }
    Ok(Json(SignedIn { redirect }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reset_password(
    State(clients): State<Clients>,
    Json(ResetRequest { email }): Json<ResetRequest>,
) -> AppResult<Json<Value>> {
    let email = validation::email(&email)?;
    clients.identity_call("sendOobCode", &OobRequest {
        request_type: "PASSWORD_RESET",
        email: &email,
    }).await?;

    Ok(Json(json!({
        "title": "Check your email",
        "description": "We sent you a password reset link.",
    })))
}
