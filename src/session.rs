//! Keys stored in the cookie session.

pub const USER_ID: &str = "user_id";
pub const USER_EMAIL: &str = "user_email";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";
pub const SELECTED_SKILL: &str = "selected_skill";
pub const SEARCH_QUERY: &str = "search_query";
