//! Persistence seam used by the auto-save coordinator.

use crate::gateway::{ArticleGateway, GatewayResult};
use crate::model::article::{Article, ArticleDraft};
use crate::model::identity::Identity;
use async_trait::async_trait;

/// Writes one draft snapshot.
#[async_trait]
pub trait DraftPersister: Send + Sync {
    /// Creates when `article_id` is `None`, otherwise updates that article.
    async fn persist(
        &self,
        author: &Identity,
        article_id: Option<&str>,
        draft: &ArticleDraft,
    ) -> GatewayResult<Article>;
}

/// Adapts any [`ArticleGateway`] into a [`DraftPersister`].
pub struct GatewayPersister<G: ArticleGateway> {
    gateway: G,
}

impl<G: ArticleGateway> GatewayPersister<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: ArticleGateway> DraftPersister for GatewayPersister<G> {
    async fn persist(
        &self,
        author: &Identity,
        article_id: Option<&str>,
        draft: &ArticleDraft,
    ) -> GatewayResult<Article> {
        match article_id {
            Some(id) => self.gateway.update_article(author, id, draft).await,
            None => self.gateway.create_article(author, draft).await,
        }
    }
}
