use std::fmt;

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

const IDENTITY_TOOLKIT: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    pub fn id(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google.com",
            Github => "github.com",
        }
    }

    fn slug(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google",
            Github => "github",
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Failures reported by, or on the way to, the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("OAuth provider {0} keys not supplied")]
    NotConfigured(ClientProvider),

    #[error("OAuth: {0}")]
    BadCallback(&'static str),

    #[error("{0}")]
    Rejected(String),
}

/// Who the identity provider says signed in.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct Clients {
    firebase_apikey: String,
    http: reqwest::Client,
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Reads provider keys from the secrets file contents. `public_url` is
    /// where the providers send users back to.
    pub fn from_json(json: Value, public_url: &str) -> AppResult<Clients> {
        let firebase_apikey = json.get_obj_field("firebase")?.get_str_field("apikey")?;
        let public_url = public_url.trim_end_matches('/');

        let oauth_client = |provider: ClientProvider, auth_url: &str, token_url: &str| -> AppResult<Option<HappyClient>> {
            let Some(json) = json.get(provider.slug()) else {
                return Ok(None);
            };
            let client_id = ClientId::new(json.get_str_field("client_id")?);
            let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

            let auth_url = AuthUrl::new(auth_url.to_owned())?;
            let token_url = TokenUrl::new(token_url.to_owned())?;
            let redirect_url = RedirectUrl::new(format!("{public_url}/lockin/{}", provider.slug()))?;

            Ok(Some(
                BasicClient::new(client_id)
                .set_client_secret(client_secret)
                .set_auth_uri(auth_url)
                .set_token_uri(token_url)
                .set_redirect_uri(redirect_url)
            ))
        };

        let google_client = oauth_client(
            ClientProvider::Google,
            "https://accounts.google.com/o/oauth2/auth",
            "https://oauth2.googleapis.com/token",
        )?;
        let github_client = oauth_client(
            ClientProvider::Github,
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
        )?;

        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(
            Clients {
                firebase_apikey,
                http,
                google_client,
                github_client,
            }
        )
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }.ok_or(IdentityError::NotConfigured(provider).into())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn identity_url(&self, method: &str) -> String {
        format!("{IDENTITY_TOOLKIT}:{method}?key={}", self.firebase_apikey)
    }

    /// Posts `body` to one identity toolkit method, turning a provider error
    /// payload into [`IdentityError::Rejected`].
    pub(crate) async fn identity_call<B: Serialize>(&self, method: &str, body: &B) -> AppResult<Value> {
        let response = self.http.post(self.identity_url(method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let reason = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("identity provider rejected the request");
            tracing::warn!(method, %status, reason, "identity call rejected");
            return Err(IdentityError::Rejected(reason.to_owned()).into());
        }
        Ok(body)
    }

    pub(crate) async fn identity_user<B: Serialize>(&self, method: &str, body: &B) -> AppResult<IdentityUser> {
        let body = self.identity_call(method, body).await?;
        Ok(IdentityUser {
            id: body.get_str_field("localId")?,
            email: body.get("email").and_then(Value::as_str).map(str::to_owned),
        })
    }
}
