//! Authenticated identity passed explicitly into operations.
//!
//! The backend keeps the session in an HTTP-only cookie; this value is the
//! caller-side view of who that session belongs to.

use serde::{Deserialize, Serialize};

/// Backend-assigned user identifier.
pub type UserId = String;

/// Authenticated user as reported by `/api/auth/{login,register,me}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            username: None,
        }
    }

    /// Display name: explicit username, else the local part of the email.
    pub fn display_name(&self) -> &str {
        match self.username.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or_default(),
        }
    }
}
