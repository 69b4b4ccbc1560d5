//! Search engine combining the lexical pass and the semantic fallback.

use crate::model::article::{Article, ArticleId};
use crate::search::lexical::{lexical_matches, tokenize_query};
use crate::search::semantic::{SemanticCandidate, SemanticMatcher};
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Which pass produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Lexical,
    Semantic,
    /// Neither pass produced anything.
    NoMatch,
}

impl MatchStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
            Self::NoMatch => "none",
        }
    }
}

/// Transient result set for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<'a> {
    /// Matches in original collection order.
    pub hits: Vec<&'a Article>,
    pub stage: MatchStage,
}

impl<'a> SearchOutcome<'a> {
    fn empty() -> Self {
        Self {
            hits: Vec::new(),
            stage: MatchStage::NoMatch,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns owned copies of the matched articles.
    pub fn into_owned(self) -> Vec<Article> {
        self.hits.into_iter().cloned().collect()
    }
}

/// Local search over an in-memory collection.
#[derive(Clone, Default)]
pub struct SearchEngine {
    matcher: Option<Arc<dyn SemanticMatcher>>,
}

impl SearchEngine {
    /// Engine without a semantic fallback.
    pub fn lexical_only() -> Self {
        Self { matcher: None }
    }

    pub fn with_matcher(matcher: Arc<dyn SemanticMatcher>) -> Self {
        Self {
            matcher: Some(matcher),
        }
    }

    pub fn has_semantic_fallback(&self) -> bool {
        self.matcher.is_some()
    }

    /// Searches `articles` for `query`.
    ///
    /// A blank query returns no matches without touching the matcher.
    pub async fn search<'a>(&self, query: &str, articles: &'a [Article]) -> SearchOutcome<'a> {
        if query.trim().is_empty() {
            return SearchOutcome::empty();
        }
        let started_at = Instant::now();

        let tokens = tokenize_query(query);
        let lexical = lexical_matches(&tokens, articles);
        let outcome = if !lexical.is_empty() {
            SearchOutcome {
                hits: lexical,
                stage: MatchStage::Lexical,
            }
        } else {
            self.semantic_fallback(query, articles).await
        };

        info!(
            "event=search module=search status=ok stage={} tokens={} hits={} duration_ms={}",
            outcome.stage.as_str(),
            tokens.len(),
            outcome.hits.len(),
            started_at.elapsed().as_millis()
        );
        outcome
    }

    async fn semantic_fallback<'a>(&self, query: &str, articles: &'a [Article]) -> SearchOutcome<'a> {
        let Some(matcher) = self.matcher.as_ref() else {
            return SearchOutcome::empty();
        };
        if articles.is_empty() {
            return SearchOutcome::empty();
        }

        let candidates = articles
            .iter()
            .map(SemanticCandidate::from_article)
            .collect::<Vec<_>>();
        let ids = match matcher.match_ids(query, &candidates).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(
                    "event=semantic_match module=search status=error candidates={} error={}",
                    candidates.len(),
                    err
                );
                return SearchOutcome::empty();
            }
        };

        let hits = filter_by_ids(articles, &ids);
        if hits.is_empty() {
            return SearchOutcome::empty();
        }
        SearchOutcome {
            hits,
            stage: MatchStage::Semantic,
        }
    }
}

fn filter_by_ids<'a>(articles: &'a [Article], ids: &[ArticleId]) -> Vec<&'a Article> {
    let wanted = ids.iter().map(String::as_str).collect::<HashSet<_>>();
    articles
        .iter()
        .filter(|article| wanted.contains(article.id.as_str()))
        .collect()
}
