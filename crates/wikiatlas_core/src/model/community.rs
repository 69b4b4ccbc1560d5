//! Community model and creation rules.
//!
//! # Invariants
//! - `slug` is the unique human-readable key: lowercase ASCII words joined by
//!   single dashes.
//! - Communities are never mutated by this crate after creation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Who can see and join a community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityVisibility {
    #[default]
    Public,
    Private,
    Invite,
}

/// Community row as served by `/api/communities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub members_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub visibility: CommunityVisibility,
}

/// Fields submitted when creating a community.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub visibility: CommunityVisibility,
}

impl CommunityDraft {
    /// Creates a draft whose slug is derived from `name`.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slug: normalize_slug(&name),
            name,
            description: description.into(),
            cover_url: None,
            tags: Vec::new(),
            category: String::new(),
            visibility: CommunityVisibility::default(),
        }
    }

    /// Returns a copy with trimmed name and normalized slug, or the first
    /// rule it violates.
    pub fn normalized(&self) -> Result<Self, CommunityValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CommunityValidationError::EmptyName);
        }
        let slug = normalize_slug(&self.slug);
        if slug.is_empty() {
            return Err(CommunityValidationError::InvalidSlug(self.slug.clone()));
        }

        let mut normalized = self.clone();
        normalized.name = name.to_string();
        normalized.slug = slug;
        normalized.tags = self
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        Ok(normalized)
    }
}

/// Community draft rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityValidationError {
    EmptyName,
    InvalidSlug(String),
}

impl Display for CommunityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "community name cannot be empty"),
            Self::InvalidSlug(value) => write!(f, "invalid community slug: `{value}`"),
        }
    }
}

impl Error for CommunityValidationError {}

/// Lowercases and collapses every run of non-alphanumeric ASCII into one dash.
pub fn normalize_slug(value: &str) -> String {
    let lowered = value.trim().to_ascii_lowercase();
    SLUG_SEPARATOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
