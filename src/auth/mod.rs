mod clients;
mod guard;
mod login;
mod lockin;
mod logout;
mod password;

use axum::{routing::{get, post}, Router};
use tower_sessions::Session;

use crate::{
    session::{RETURN_URL, USER_EMAIL, USER_ID},
    state::ProfileState,
    store::Store,
    AppResult, AppState,
};

pub use clients::{ClientProvider, Clients, IdentityError, IdentityUser};
pub use guard::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page))
        .route("/login/{provider}", get(login::login))
        .route("/lockin/{provider}", get(lockin::lockin))
        .route("/auth/signin", post(password::sign_in))
        .route("/auth/signup", post(password::sign_up))
        .route("/auth/reset", post(password::reset_password))
        .route("/logout", get(logout::logout))
}

/// Only same-site paths are followed after login.
pub(crate) fn safe_return_url(url: Option<String>) -> Option<String> {
    url.filter(|u| u.starts_with('/') && !u.starts_with("//"))
}

/// Stores the signed-in identity in the session, provisions the profile and
/// picks where to go next: the remembered return URL, else the dashboard for
/// completed profiles and the setup page for everyone else.
pub(crate) async fn sign_in(session: &Session, store: &Store, identity: IdentityUser) -> AppResult<String> {
    session.cycle_id().await?;
    session.insert(USER_ID, &identity.id).await?;
    if let Some(email) = &identity.email {
        session.insert(USER_EMAIL, email).await?;
    }

    let user = CurrentUser {
        id: identity.id,
        email: identity.email,
    };
    let profile = ProfileState::load(store.clone(), user.clone()).await?;
    tracing::info!(user_id = %user.id, "signed in");

    let return_url = safe_return_url(session.remove::<String>(RETURN_URL).await?);
    let completed = profile.profile.as_ref().is_some_and(|p| p.profile_completed);
    Ok(return_url.unwrap_or_else(|| {
        if completed { "/dashboard" } else { "/profile-setup" }.to_owned()
    }))
}

#[cfg(test)]
mod tests {
    use super::safe_return_url;

    #[test]
    fn only_local_return_urls_survive() {
        assert_eq!(safe_return_url(Some("/matches".into())), Some("/matches".into()));
        assert_eq!(safe_return_url(Some("//evil.example".into())), None);
        assert_eq!(safe_return_url(Some("https://evil.example".into())), None);
        assert_eq!(safe_return_url(None), None);
    }
}
