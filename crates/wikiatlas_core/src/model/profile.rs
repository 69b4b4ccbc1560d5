//! Public user profile model.

use serde::{Deserialize, Serialize};

/// Username shown when a profile cannot be loaded.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// Profile row as served by `/api/profiles/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Blue-tick status.
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub donation_link: Option<String>,
}

impl Profile {
    /// Placeholder used by the read-path fallback.
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: Some(ANONYMOUS_USERNAME.to_string()),
            bio: None,
            avatar_url: None,
            updated_at: None,
            is_verified: false,
            donation_link: None,
        }
    }
}

/// Partial profile update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_link: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.donation_link.is_none()
    }
}
