//! Semantic-match capability contract.
//!
//! The matcher is an opaque external collaborator: it receives the query and
//! compact per-article metadata and answers with an unordered set of ids.

use crate::model::article::{Article, ArticleId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CANDIDATE_EXCERPT_CHARS: usize = 100;

pub type SemanticResult<T> = Result<T, SemanticError>;

/// Failure reported by a semantic matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Matcher is misconfigured (missing key, bad base url).
    Config(String),
    /// Request never reached the service.
    Network(String),
    /// Service answered with a non-success status.
    Api { status: u16, message: String },
    /// Service answer could not be read.
    Parse(String),
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "semantic matcher configuration error: {message}"),
            Self::Network(message) => write!(f, "semantic matcher network error: {message}"),
            Self::Api { status, message } => {
                write!(f, "semantic matcher api error ({status}): {message}")
            }
            Self::Parse(message) => write!(f, "semantic matcher parse error: {message}"),
        }
    }
}

impl Error for SemanticError {}

/// Lightweight metadata sent to the matcher for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticCandidate {
    pub id: ArticleId,
    pub title: String,
    /// Excerpt truncated to 100 characters.
    pub excerpt: String,
}

impl SemanticCandidate {
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            excerpt: article.excerpt.chars().take(CANDIDATE_EXCERPT_CHARS).collect(),
        }
    }
}

/// External capability ranking articles by meaning rather than substrings.
#[async_trait]
pub trait SemanticMatcher: Send + Sync {
    /// Returns ids of candidates relevant to `query`, in no particular order.
    ///
    /// An empty vector means "no matches".
    async fn match_ids(
        &self,
        query: &str,
        candidates: &[SemanticCandidate],
    ) -> SemanticResult<Vec<ArticleId>>;
}
