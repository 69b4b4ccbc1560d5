//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical article record surfaced to search, filters and UI.
//! - Define the editable draft shape and its validation rules.
//! - Derive read-only projections (`excerpt`, `reading_time`).
//!
//! # Invariants
//! - `Article::id` is never empty.
//! - `excerpt` and `reading_time` are always derived from `content`.
//! - A draft is persisted only after `ArticleDraft::validate()` succeeds.

use crate::model::comment::ArticleComment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend-assigned article identifier.
///
/// Kept as a type alias: identifiers are opaque strings issued by the backend
/// (`"art-1"`, UUIDs, numeric keys coerced to text).
pub type ArticleId = String;

/// Category assigned when the author does not pick one.
pub const DEFAULT_CATEGORY: &str = "Boshqa";
/// Maximum number of source citations attached to one article.
pub const MAX_SOURCES: usize = 100;

const EXCERPT_CHARS: usize = 150;
const WORDS_PER_MINUTE: usize = 200;

/// Content language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Uz,
    En,
    Ru,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uz => "uz",
            Self::En => "en",
            Self::Ru => "ru",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uz" => Some(Self::Uz),
            "en" => Some(Self::En),
            "ru" => Some(Self::Ru),
            _ => None,
        }
    }
}

/// Publication lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Work in progress, written by auto-save or "save draft".
    Draft,
    /// Publicly listed.
    #[default]
    Published,
    /// Waiting for moderation.
    Review,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Review => "review",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "review" => Some(Self::Review),
            _ => None,
        }
    }
}

/// Who can open an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    /// Reachable only by direct link, hidden from listings.
    LinkOnly,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::LinkOnly => "link-only",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "link-only" => Some(Self::LinkOnly),
            _ => None,
        }
    }
}

/// Kind of a source citation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Reference,
    Opinion,
    Scientific,
    #[default]
    Other,
}

impl SourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reference" => Some(Self::Reference),
            "opinion" => Some(Self::Opinion),
            "scientific" => Some(Self::Scientific),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// One citation attached to an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
}

/// Canonical article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Derived from `content`, see [`derive_excerpt`].
    pub excerpt: String,
    pub category: String,
    pub language: Language,
    pub status: ArticleStatus,
    pub visibility: Visibility,
    pub audience_tags: Vec<String>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub image_url: Option<String>,
    /// Free-form age band such as `"7-12"`, `"18+"` or `"All"`.
    pub target_age: Option<String>,
    pub sources: Vec<Source>,
    /// ISO-8601 timestamp as issued by the backend.
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Estimated minutes, never below 1.
    pub reading_time: u32,
}

impl Article {
    /// Builds a published article with derived projections filled in.
    ///
    /// Used by the built-in mock archive and by tests; backend rows go
    /// through `ArticleRecord::reconcile` instead.
    pub fn new(
        id: impl Into<ArticleId>,
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            title: title.into(),
            excerpt: derive_excerpt(&content),
            reading_time: reading_time_minutes(&content),
            content,
            category: category.into(),
            language: Language::default(),
            status: ArticleStatus::default(),
            visibility: Visibility::default(),
            audience_tags: Vec::new(),
            author_id: None,
            author_name: None,
            author_email: None,
            image_url: None,
            target_age: None,
            sources: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Article page payload: the article plus its comment thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDetail {
    pub article: Article,
    /// Oldest first.
    pub comments: Vec<ArticleComment>,
}

/// Editable article fields as submitted by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub audience_tags: Vec<String>,
    #[serde(default)]
    pub language: Language,
    pub status: ArticleStatus,
}

impl Default for ArticleDraft {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl ArticleDraft {
    /// Creates a draft-status article with default category and visibility.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: DEFAULT_CATEGORY.to_string(),
            image_url: None,
            sources: Vec::new(),
            target_age: None,
            visibility: Visibility::default(),
            audience_tags: Vec::new(),
            language: Language::default(),
            status: ArticleStatus::Draft,
        }
    }

    /// Returns whether both title and body carry non-whitespace text.
    pub fn has_required_text(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    /// Validates fields required before any network call.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyContent` when the field is blank.
    /// - `TooManySources` when more than [`MAX_SOURCES`] citations are attached.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        if self.title.trim().is_empty() {
            return Err(DraftValidationError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(DraftValidationError::EmptyContent);
        }
        if self.sources.len() > MAX_SOURCES {
            return Err(DraftValidationError::TooManySources {
                count: self.sources.len(),
                max: MAX_SOURCES,
            });
        }
        Ok(())
    }
}

/// Draft rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftValidationError {
    EmptyTitle,
    EmptyContent,
    TooManySources { count: usize, max: usize },
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "article title cannot be empty"),
            Self::EmptyContent => write!(f, "article content cannot be empty"),
            Self::TooManySources { count, max } => {
                write!(f, "article has {count} sources; at most {max} are allowed")
            }
        }
    }
}

impl Error for DraftValidationError {}

/// Derives the list-card excerpt: first 150 characters plus an ellipsis.
///
/// Returns an empty string for empty content.
pub fn derive_excerpt(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let mut excerpt = content.chars().take(EXCERPT_CHARS).collect::<String>();
    excerpt.push_str("...");
    excerpt
}

/// Estimates reading time at 200 words per minute, never below one minute.
pub fn reading_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_empty_for_empty_content() {
        assert_eq!(derive_excerpt(""), "");
    }

    #[test]
    fn excerpt_truncates_by_chars_and_appends_ellipsis() {
        let content = "o'".repeat(100);
        let excerpt = derive_excerpt(&content);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 153);

        assert_eq!(derive_excerpt("short"), "short...");
    }

    #[test]
    fn reading_time_rounds_up_and_never_drops_below_one() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes("one two three"), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
    }

    #[test]
    fn draft_validation_rejects_blank_fields() {
        assert_eq!(
            ArticleDraft::new("  ", "body").validate(),
            Err(DraftValidationError::EmptyTitle)
        );
        assert_eq!(
            ArticleDraft::new("Title", "\n\t").validate(),
            Err(DraftValidationError::EmptyContent)
        );
        assert!(ArticleDraft::new("Title", "body").validate().is_ok());
    }

    #[test]
    fn draft_validation_caps_sources() {
        let mut draft = ArticleDraft::new("Title", "body");
        draft.sources = (0..=MAX_SOURCES)
            .map(|idx| Source {
                title: format!("source {idx}"),
                url: None,
                description: None,
                kind: SourceKind::Reference,
            })
            .collect();
        assert!(matches!(
            draft.validate(),
            Err(DraftValidationError::TooManySources { count: 101, max: 100 })
        ));
    }

    #[test]
    fn visibility_serializes_kebab_case() {
        let json = serde_json::to_string(&Visibility::LinkOnly).expect("serialize");
        assert_eq!(json, "\"link-only\"");
        assert_eq!(Visibility::parse("LINK-ONLY"), Some(Visibility::LinkOnly));
    }
}
