use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREDITS: i64 = 10;
pub const DEFAULT_LANGUAGES: &[&str] = &["English"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[sqlx(json)]
    pub languages: Vec<String>,
    pub credits: i64,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: String,
    pub display_name: String,
    pub profile_completed: bool,
}

impl NewProfile {
    /// Minimal profile for a user seen for the first time. The display name is
    /// the local part of their email address.
    pub fn for_first_login(user_id: &str, email: Option<&str>) -> Self {
        let display_name = email
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_owned();

        Self {
            id: user_id.to_owned(),
            display_name,
            profile_completed: false,
        }
    }
}

/// Partial profile update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub languages: Option<Vec<String>>,
    pub profile_completed: Option<bool>,
}
