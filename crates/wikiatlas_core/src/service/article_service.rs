//! Article use-case service.
//!
//! # Responsibility
//! - Fetch, sanitize and reconcile the article list; keep the archive fresh.
//! - Serve pagination, related articles and search from that list.
//! - Validate drafts and comments before forwarding writes.
//! - Sweep garbage articles from the backend.
//!
//! # Invariants
//! - `list_articles` always returns a list: backend, else archive, else
//!   built-in articles.
//! - `save_article` never reaches the gateway with an invalid draft.

use crate::filter::cleanup::find_garbage;
use crate::filter::dedup::dedup_records;
use crate::gateway::{ArticleGateway, GatewayError};
use crate::model::article::{Article, ArticleDetail, ArticleDraft, ArticleId, DraftValidationError};
use crate::model::comment::ArticleComment;
use crate::model::identity::Identity;
use crate::model::record::ArticleRecord;
use crate::repo::ArchiveRepository;
use crate::search::engine::SearchEngine;
use crate::service::builtin::builtin_articles;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_PAGE_LIMIT: usize = 6;
pub const RELATED_LIMIT: usize = 3;

/// Service error for article write use-cases.
#[derive(Debug)]
pub enum ArticleServiceError {
    /// Draft rejected locally; nothing was sent.
    InvalidDraft(DraftValidationError),
    /// Comment body is blank; nothing was sent.
    EmptyComment,
    Gateway(GatewayError),
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDraft(err) => write!(f, "{err}"),
            Self::EmptyComment => write!(f, "comment content cannot be empty"),
            Self::Gateway(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDraft(err) => Some(err),
            Self::EmptyComment => None,
            Self::Gateway(err) => Some(err),
        }
    }
}

impl From<DraftValidationError> for ArticleServiceError {
    fn from(value: DraftValidationError) -> Self {
        Self::InvalidDraft(value)
    }
}

impl From<GatewayError> for ArticleServiceError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrigin {
    Backend,
    /// Backend unreachable; last archived list.
    Archive,
    /// Backend unreachable and archive empty.
    Builtin,
}

impl ListingOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Archive => "archive",
            Self::Builtin => "builtin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListing {
    pub articles: Vec<Article>,
    pub origin: ListingOrigin,
}

impl ArticleListing {
    /// Zero-based page window; `limit` defaults to [`DEFAULT_PAGE_LIMIT`].
    pub fn page(&self, page: usize, limit: Option<usize>) -> &[Article] {
        let limit = limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_PAGE_LIMIT);
        let start = page.saturating_mul(limit).min(self.articles.len());
        let end = start.saturating_add(limit).min(self.articles.len());
        &self.articles[start..end]
    }
}

/// Result of one cleanup sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub dry_run: bool,
    /// Ids that matched the garbage heuristic.
    pub matched: Vec<ArticleId>,
    pub deleted: Vec<ArticleId>,
    /// Ids whose delete call failed.
    pub failed: Vec<ArticleId>,
}

/// Article service facade over a gateway and an archive.
pub struct ArticleService<G: ArticleGateway, A: ArchiveRepository> {
    gateway: G,
    archive: A,
    engine: SearchEngine,
}

impl<G: ArticleGateway, A: ArchiveRepository> ArticleService<G, A> {
    /// Creates a service with lexical-only search.
    pub fn new(gateway: G, archive: A) -> Self {
        Self {
            gateway,
            archive,
            engine: SearchEngine::lexical_only(),
        }
    }

    pub fn with_search_engine(mut self, engine: SearchEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// Loads the article list, degrading when the backend fails.
    pub async fn list_articles(&self) -> ArticleListing {
        match self.gateway.list_articles().await {
            Ok(records) => {
                let articles = sanitize(records);
                if let Err(err) = self.archive.replace_articles(&articles) {
                    warn!("event=archive_refresh module=service status=error error={err}");
                }
                ArticleListing {
                    articles,
                    origin: ListingOrigin::Backend,
                }
            }
            Err(err) => {
                warn!("event=list_articles module=service status=degraded error={err}");
                self.offline_listing()
            }
        }
    }

    fn offline_listing(&self) -> ArticleListing {
        match self.archive.list_articles() {
            Ok(articles) if !articles.is_empty() => {
                let archived_at = self.archive.archived_at().ok().flatten();
                info!(
                    "event=archive_serve module=service status=ok articles={} archived_at_ms={}",
                    articles.len(),
                    archived_at.map_or_else(|| "unknown".to_string(), |ms| ms.to_string())
                );
                ArticleListing {
                    articles,
                    origin: ListingOrigin::Archive,
                }
            }
            Ok(_) => ArticleListing {
                articles: builtin_articles(),
                origin: ListingOrigin::Builtin,
            },
            Err(err) => {
                warn!("event=archive_read module=service status=error error={err}");
                ArticleListing {
                    articles: builtin_articles(),
                    origin: ListingOrigin::Builtin,
                }
            }
        }
    }

    pub async fn article_count(&self) -> usize {
        self.list_articles().await.articles.len()
    }

    /// Returns page `page` (zero-based); `limit` defaults to six.
    pub async fn articles_page(&self, page: usize, limit: Option<usize>) -> Vec<Article> {
        self.list_articles().await.page(page, limit).to_vec()
    }

    /// Up to three other articles in `category`.
    pub async fn related_articles(&self, category: &str, exclude_id: &str) -> Vec<Article> {
        self.list_articles()
            .await
            .articles
            .into_iter()
            .filter(|article| article.category == category && article.id != exclude_id)
            .take(RELATED_LIMIT)
            .collect()
    }

    /// Article with comments; `None` on any failure.
    pub async fn get_article(&self, id: &str) -> Option<ArticleDetail> {
        match self.gateway.get_article(id).await {
            Ok(detail) => Some(detail),
            Err(err) => {
                warn!(
                    "event=get_article module=service status=degraded not_found={} error={}",
                    matches!(err, GatewayError::NotFound(_)),
                    err
                );
                None
            }
        }
    }

    /// Lexical search with semantic fallback over the current listing.
    pub async fn search(&self, query: &str) -> Vec<Article> {
        let listing = self.list_articles().await;
        self.engine.search(query, &listing.articles).await.into_owned()
    }

    /// Creates (`article_id == None`) or updates an article.
    ///
    /// # Errors
    /// - `InvalidDraft` before any network call.
    /// - `Gateway` when the backend rejects or cannot be reached.
    pub async fn save_article(
        &self,
        identity: &Identity,
        article_id: Option<&str>,
        draft: &ArticleDraft,
    ) -> Result<Article, ArticleServiceError> {
        draft.validate()?;
        let saved = match article_id {
            Some(id) => self.gateway.update_article(identity, id, draft).await?,
            None => self.gateway.create_article(identity, draft).await?,
        };
        info!(
            "event=save_article module=service status=ok mode={} article_id={}",
            if article_id.is_some() { "update" } else { "create" },
            saved.id
        );
        Ok(saved)
    }

    pub async fn delete_article(&self, id: &str) -> Result<(), ArticleServiceError> {
        self.gateway.delete_article(id).await?;
        Ok(())
    }

    /// Posts a comment; blank content is rejected locally.
    pub async fn add_comment(
        &self,
        article_id: &str,
        content: &str,
    ) -> Result<ArticleComment, ArticleServiceError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ArticleServiceError::EmptyComment);
        }
        Ok(self.gateway.post_comment(article_id, content).await?)
    }

    /// Finds garbage articles on the backend and deletes them unless `dry_run`.
    ///
    /// Works on raw backend rows, before deduplication, so duplicated garbage
    /// is swept too. Each matched id is deleted once. Individual delete
    /// failures are collected, not fatal.
    ///
    /// # Errors
    /// - `Gateway` when the article list cannot be fetched.
    pub async fn cleanup_sweep(&self, dry_run: bool) -> Result<CleanupReport, ArticleServiceError> {
        let records = self.gateway.list_articles().await?;
        let articles = records
            .into_iter()
            .filter_map(ArticleRecord::reconcile)
            .collect::<Vec<_>>();
        let mut seen = HashSet::new();
        let matched = find_garbage(&articles)
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect::<Vec<_>>();

        let mut report = CleanupReport {
            dry_run,
            matched: matched.clone(),
            ..CleanupReport::default()
        };
        if !dry_run {
            for id in matched {
                match self.gateway.delete_article(&id).await {
                    Ok(()) => report.deleted.push(id),
                    Err(err) => {
                        warn!("event=cleanup_delete module=service status=error article_id={id} error={err}");
                        report.failed.push(id);
                    }
                }
            }
        }

        info!(
            "event=cleanup_sweep module=service status=ok dry_run={} matched={} deleted={} failed={}",
            dry_run,
            report.matched.len(),
            report.deleted.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

/// Dedups raw rows, then reconciles the survivors.
fn sanitize(records: Vec<ArticleRecord>) -> Vec<Article> {
    dedup_records(records)
        .into_iter()
        .filter_map(ArticleRecord::reconcile)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ArticleListing, ListingOrigin};
    use crate::model::article::Article;

    fn listing(count: usize) -> ArticleListing {
        ArticleListing {
            articles: (0..count)
                .map(|i| Article::new(format!("a{i}"), format!("Maqola {i}"), "matn", "Fan"))
                .collect(),
            origin: ListingOrigin::Backend,
        }
    }

    fn ids(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn page_windows_default_to_six_and_run_out() {
        let listing = listing(8);
        assert_eq!(listing.page(0, None).len(), 6);
        assert_eq!(ids(listing.page(1, None)), vec!["a6", "a7"]);
        assert!(listing.page(2, None).is_empty());
        assert_eq!(ids(listing.page(1, Some(3))), vec!["a3", "a4", "a5"]);
        assert_eq!(listing.page(0, Some(0)).len(), 6);
        assert!(listing.page(usize::MAX, None).is_empty());
    }
}
