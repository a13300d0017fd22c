use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Volunteer,
    Participant,
}

impl Role {
    /// Console landing page for the role after sign-in.
    pub fn redirect_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Volunteer => "/volunteer",
            Self::Participant => "/participant",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Id,
}

/// Row in the `users` table, one-to-one with an auth identity.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    pub id: String,
    pub role: Role,
    pub preferred_language: Language,
    pub full_name: Option<String>,
    /// Normalized digits, unique across profiles.
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Insert payload for the `users` table.
#[derive(Debug, Serialize)]
pub struct NewUserProfile {
    pub id: String,
    pub role: Role,
    pub preferred_language: Language,
    pub phone: String,
    pub full_name: String,
}
