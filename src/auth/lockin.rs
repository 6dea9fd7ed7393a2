use axum::{debug_handler, extract::{Path, Query, State}, response::{IntoResponse, Redirect}};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier, TokenResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{session::{CSRF_STATE, PKCE_VERIFIER}, store::Store, AppResult, AppState};

use super::{clients::{ClientProvider, IdentityError}, Clients};

#[derive(Deserialize)]
pub struct LockinQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[derive(Serialize)]
struct IdpRequest {
    post_body: String,
    request_uri: String,
    return_idp_credential: bool,
    return_secure_token: bool,
}

/// Provider callback: checks the CSRF state, swaps the code for a token and
/// federates it through `signInWithIdp`.
#[debug_handler(state = AppState)]
pub(crate) async fn lockin(
    Path(provider): Path<ClientProvider>,
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(store): State<Store>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = CsrfToken::new(state.ok_or(IdentityError::BadCallback("without state"))?);
    let code = AuthorizationCode::new(code.ok_or(IdentityError::BadCallback("without code"))?);

    let Some(stored_state) = session.remove::<String>(CSRF_STATE).await? else {
        return Err(IdentityError::BadCallback("no csrf_state").into());
    };

    if state.secret().as_str() != stored_state.as_str() {
        return Err(IdentityError::BadCallback("csrf tokens don't match").into());
    }

    let Some(pkce_verifier) = session.remove::<String>(PKCE_VERIFIER).await? else {
        return Err(IdentityError::BadCallback("no pkce_verifier").into());
    };

    let client = clients.get_client(provider)?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(clients.http())
        .await?;

    let access_token = token_result.access_token().secret();
    let identity = clients.identity_user("signInWithIdp", &IdpRequest {
        post_body: format!("access_token={access_token}&providerId={}", provider.id()),
        request_uri: "http://localhost/".to_owned(),
        return_idp_credential: true,
        return_secure_token: true,
    }).await?;

    let next = super::sign_in(&session, &store, identity).await?;
    Ok(Redirect::to(&next))
}
