//! Article comment model.

use serde::{Deserialize, Serialize};

/// Author name shown when a comment's profile join is missing.
pub const UNKNOWN_COMMENTER: &str = "Noma'lum";

/// One comment under an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleComment {
    pub id: String,
    pub article_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: Option<String>,
    pub is_flagged: bool,
}
