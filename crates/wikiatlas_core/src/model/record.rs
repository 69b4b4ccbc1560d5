//! Reconciliation of loosely typed backend rows.
//!
//! # Responsibility
//! - Read backend JSON without trusting its schema.
//! - Coerce rows into `Article` / `ArticleComment`, defaulting what is missing.
//!
//! # Invariants
//! - Non-object rows never produce a record.
//! - Rows without an identifier never produce an `Article`.
//! - Numbers are accepted where text is expected; other types count as absent.

use crate::model::article::{
    derive_excerpt, reading_time_minutes, Article, ArticleStatus, Language, Source, SourceKind,
    Visibility,
};
use crate::model::comment::{ArticleComment, UNKNOWN_COMMENTER};
use log::{debug, error, warn};
use serde_json::{Map, Value};

/// Author name shown when neither the profile join nor the row names one.
pub const UNKNOWN_AUTHOR: &str = "Noma'lum muallif";

/// Article row as received from the backend, before reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub audience_tags: Vec<String>,
    pub user_id: Option<String>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    /// `profiles.username` from the optional profile join.
    pub profile_username: Option<String>,
    pub image_url: Option<String>,
    pub target_age: Option<String>,
    pub sources: Vec<Source>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ArticleRecord {
    /// Reads one row; returns `None` when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let row = value.as_object()?;
        Some(Self {
            id: text_field(row, "id"),
            title: text_field(row, "title"),
            content: text_field(row, "content"),
            category: text_field(row, "category"),
            language: text_field(row, "language"),
            status: text_field(row, "status"),
            visibility: text_field(row, "visibility"),
            audience_tags: text_list_field(row, "audience_tags"),
            user_id: text_field(row, "user_id"),
            author_id: text_field(row, "author_id"),
            author_name: text_field(row, "author_name"),
            author_email: text_field(row, "author_email"),
            profile_username: row
                .get("profiles")
                .and_then(Value::as_object)
                .and_then(|profile| text_field(profile, "username")),
            image_url: text_field(row, "image_url"),
            target_age: text_field(row, "target_age"),
            sources: sources_field(row),
            created_at: text_field(row, "created_at"),
            updated_at: text_field(row, "updated_at"),
        })
    }

    /// Reads an article list body.
    ///
    /// A body that is not an array is logged and treated as empty; malformed
    /// rows are logged and dropped.
    pub fn from_list_body(body: &Value) -> Vec<Self> {
        let Some(rows) = body.as_array() else {
            error!(
                "event=reconcile_list module=model status=error error_code=not_an_array kind={}",
                json_kind(body)
            );
            return Vec::new();
        };

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match Self::from_value(row) {
                Some(record) => records.push(record),
                None => warn!(
                    "event=reconcile_row module=model status=skipped index={} kind={}",
                    index,
                    json_kind(row)
                ),
            }
        }
        records
    }

    /// Coerces the row into a strict `Article`.
    ///
    /// Returns `None` when the row has no usable identifier.
    pub fn reconcile(self) -> Option<Article> {
        let id = self.id.filter(|id| !id.trim().is_empty())?;
        let content = self.content.unwrap_or_default();

        let language = parse_or_default(self.language.as_deref(), Language::parse, "language");
        let status = parse_or_default(self.status.as_deref(), ArticleStatus::parse, "status");
        let visibility =
            parse_or_default(self.visibility.as_deref(), Visibility::parse, "visibility");

        let author_name = self
            .profile_username
            .or(self.author_name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        Some(Article {
            id,
            title: self.title.unwrap_or_default(),
            excerpt: derive_excerpt(&content),
            reading_time: reading_time_minutes(&content),
            content,
            category: self.category.unwrap_or_default(),
            language,
            status,
            visibility,
            audience_tags: self.audience_tags,
            author_id: self.author_id.or(self.user_id),
            author_name: Some(author_name),
            author_email: self.author_email,
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            target_age: self.target_age,
            sources: self.sources,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Reads one article body (list row or detail payload) straight into an
/// `Article`.
pub fn reconcile_article(value: &Value) -> Option<Article> {
    ArticleRecord::from_value(value)?.reconcile()
}

/// Reads one comment row; returns `None` without an identifier.
pub fn reconcile_comment(value: &Value) -> Option<ArticleComment> {
    let row = value.as_object()?;
    let id = text_field(row, "id").filter(|id| !id.trim().is_empty())?;
    let author_name = row
        .get("profiles")
        .and_then(Value::as_object)
        .and_then(|profile| text_field(profile, "username"))
        .or_else(|| text_field(row, "author_name"))
        .unwrap_or_else(|| UNKNOWN_COMMENTER.to_string());

    Some(ArticleComment {
        id,
        article_id: text_field(row, "article_id").unwrap_or_default(),
        author_id: text_field(row, "author_id").unwrap_or_default(),
        author_name,
        content: text_field(row, "content").unwrap_or_default(),
        created_at: text_field(row, "created_at"),
        is_flagged: row
            .get("is_flagged")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn text_field(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn text_list_field(row: &Map<String, Value>, key: &str) -> Vec<String> {
    row.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn sources_field(row: &Map<String, Value>) -> Vec<Source> {
    let Some(items) = row.get("sources").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|source| Source {
            title: text_field(source, "title").unwrap_or_default(),
            url: text_field(source, "url"),
            description: text_field(source, "description"),
            kind: text_field(source, "type")
                .and_then(|kind| SourceKind::parse(&kind))
                .unwrap_or_default(),
        })
        .collect()
}

fn parse_or_default<T: Default>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    field: &str,
) -> T {
    match value {
        None => T::default(),
        Some(raw) => parse(raw).unwrap_or_else(|| {
            debug!("event=reconcile_field module=model status=defaulted field={field} value={raw}");
            T::default()
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reconcile_fills_defaults_for_missing_fields() {
        let article = reconcile_article(&json!({ "id": "art-9" })).expect("has id");
        assert_eq!(article.title, "");
        assert_eq!(article.content, "");
        assert_eq!(article.excerpt, "");
        assert_eq!(article.category, "");
        assert_eq!(article.language, Language::Uz);
        assert_eq!(article.status, ArticleStatus::Published);
        assert_eq!(article.visibility, Visibility::Public);
        assert_eq!(article.reading_time, 1);
        assert_eq!(article.author_name.as_deref(), Some(UNKNOWN_AUTHOR));
    }

    #[test]
    fn reconcile_coerces_numeric_ids_and_ignores_wrong_types() {
        let article = reconcile_article(&json!({
            "id": 42,
            "title": ["not", "text"],
            "audience_tags": "students",
            "status": "archived",
            "visibility": "link-only",
        }))
        .expect("numeric id is usable");
        assert_eq!(article.id, "42");
        assert_eq!(article.title, "");
        assert!(article.audience_tags.is_empty());
        assert_eq!(article.status, ArticleStatus::Published);
        assert_eq!(article.visibility, Visibility::LinkOnly);
    }

    #[test]
    fn reconcile_prefers_profile_join_for_author_name() {
        let article = reconcile_article(&json!({
            "id": "a",
            "user_id": "u-1",
            "author_name": "row name",
            "profiles": { "username": "joined" },
        }))
        .expect("has id");
        assert_eq!(article.author_name.as_deref(), Some("joined"));
        assert_eq!(article.author_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn rows_without_id_do_not_reconcile() {
        assert!(reconcile_article(&json!({ "title": "orphan" })).is_none());
        assert!(reconcile_article(&json!({ "id": "   " })).is_none());
        assert!(reconcile_article(&json!("art-1")).is_none());
    }

    #[test]
    fn list_body_that_is_not_an_array_is_empty() {
        assert!(ArticleRecord::from_list_body(&json!({ "error": "boom" })).is_empty());
        let records = ArticleRecord::from_list_body(&json!([{ "id": "a" }, 7, null]));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn comments_take_author_from_profile_join() {
        let comment = reconcile_comment(&json!({
            "id": "c-1",
            "article_id": "art-1",
            "author_id": "u-1",
            "content": "Ajoyib maqola",
            "profiles": { "username": "olim" },
        }))
        .expect("has id");
        assert_eq!(comment.author_name, "olim");
        assert!(!comment.is_flagged);

        let anonymous = reconcile_comment(&json!({ "id": "c-2" })).expect("has id");
        assert_eq!(anonymous.author_name, UNKNOWN_COMMENTER);
    }
}
