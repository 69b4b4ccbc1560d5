//! Remote data gateway: one call per backend endpoint.
//!
//! # Responsibility
//! - Define the async contracts services and auto-save depend on.
//! - Provide the `reqwest` implementation over the backend's `/api` routes.
//!
//! # Invariants
//! - Gateways are stateless apart from the session cookie store.
//! - Gateways never apply fallback policy; services decide how to degrade.
//! - Backend rows are reconciled before leaving the gateway.

use crate::model::article::{Article, ArticleDetail, ArticleDraft};
use crate::model::comment::ArticleComment;
use crate::model::community::{Community, CommunityDraft};
use crate::model::identity::Identity;
use crate::model::profile::{Profile, ProfileUpdate};
use crate::model::record::ArticleRecord;
use async_trait::async_trait;

pub mod client;
pub mod error;

pub use client::BackendClient;
pub use error::{GatewayError, GatewayResult};

/// Article, draft and comment endpoints.
#[async_trait]
pub trait ArticleGateway: Send + Sync {
    /// `GET /api/articles`; rows are returned unsanitized.
    async fn list_articles(&self) -> GatewayResult<Vec<ArticleRecord>>;
    /// `GET /api/articles/:id`.
    async fn get_article(&self, id: &str) -> GatewayResult<ArticleDetail>;
    /// `POST /api/articles`.
    async fn create_article(&self, author: &Identity, draft: &ArticleDraft)
        -> GatewayResult<Article>;
    /// `PUT /api/articles/:id`.
    async fn update_article(
        &self,
        author: &Identity,
        id: &str,
        draft: &ArticleDraft,
    ) -> GatewayResult<Article>;
    /// `DELETE /api/articles/:id`.
    async fn delete_article(&self, id: &str) -> GatewayResult<()>;
    /// `POST /api/articles/:id/comments`.
    async fn post_comment(&self, article_id: &str, content: &str) -> GatewayResult<ArticleComment>;
}

/// Community and profile endpoints.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// `GET /api/communities`.
    async fn list_communities(&self) -> GatewayResult<Vec<Community>>;
    /// `POST /api/communities`.
    async fn create_community(&self, draft: &CommunityDraft) -> GatewayResult<Community>;
    /// `GET /api/profiles/:id`.
    async fn get_profile(&self, user_id: &str) -> GatewayResult<Profile>;
    /// `PUT /api/profiles/:id`.
    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> GatewayResult<()>;
}
