//! `reqwest` implementation of the gateway contracts.
//!
//! # Invariants
//! - Every request goes to `<base_url>/api/...`; ids are percent-encoded as
//!   single path segments.
//! - The session travels only in the cookie store, never in bodies.
//! - Each call logs one `gateway_call` event with op, status and duration.

use crate::config::ClientConfig;
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::{ArticleGateway, DirectoryGateway};
use crate::model::article::{Article, ArticleDetail, ArticleDraft};
use crate::model::comment::ArticleComment;
use crate::model::community::{Community, CommunityDraft};
use crate::model::identity::Identity;
use crate::model::profile::{Profile, ProfileUpdate};
use crate::model::record::{reconcile_article, reconcile_comment, ArticleRecord};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

const LIST_ARTICLES_FAILED: &str = "Maqolalarni yuklashda xatolik yuz berdi.";
const GET_ARTICLE_FAILED: &str = "Maqola topilmadi yoki xatolik yuz berdi.";
const SAVE_ARTICLE_FAILED: &str = "Atlas sync failed. Please check network connection.";
const DELETE_ARTICLE_FAILED: &str = "Maqolani o'chirishda xatolik.";
const POST_COMMENT_FAILED: &str = "Failed to create comment";
const LIST_COMMUNITIES_FAILED: &str = "Failed to fetch communities";
const CREATE_COMMUNITY_FAILED: &str = "Failed to create community";
const GET_PROFILE_FAILED: &str = "Failed to load profile";
const UPDATE_PROFILE_FAILED: &str = "Failed to update profile";
const REGISTER_FAILED: &str = "Failed to register";
const LOGIN_FAILED: &str = "Invalid credentials";
const LOGOUT_FAILED: &str = "Failed to log out";
const SESSION_FAILED: &str = "Unauthorized";

/// HTTP client for the backend's `/api` routes.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates a client with a cookie store and the given request timeout.
    ///
    /// # Errors
    /// - `InvalidBaseUrl` when `base_url` is not an absolute http(s) url.
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| GatewayError::InvalidBaseUrl(format!("`{base_url}`: {err}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::InvalidBaseUrl(err.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> GatewayResult<Self> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /api/auth/register`.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> GatewayResult<Identity> {
        let body = Credentials {
            email,
            password,
            username: Some(username),
        };
        let request = self.request(Method::POST, &["auth", "register"])?.json(&body);
        let envelope: UserEnvelope = self.call_as("register", request, REGISTER_FAILED).await?;
        Ok(envelope.user)
    }

    /// `POST /api/auth/login`; stores the session cookie on success.
    pub async fn login(&self, email: &str, password: &str) -> GatewayResult<Identity> {
        let body = Credentials {
            email,
            password,
            username: None,
        };
        let request = self.request(Method::POST, &["auth", "login"])?.json(&body);
        let envelope: UserEnvelope = self.call_as("login", request, LOGIN_FAILED).await?;
        Ok(envelope.user)
    }

    /// `POST /api/auth/logout`.
    pub async fn logout(&self) -> GatewayResult<()> {
        let request = self.request(Method::POST, &["auth", "logout"])?;
        self.call("logout", request, LOGOUT_FAILED).await?;
        Ok(())
    }

    /// `GET /api/auth/me`: identity behind the current session cookie.
    pub async fn current_identity(&self) -> GatewayResult<Identity> {
        let request = self.request(Method::GET, &["auth", "me"])?;
        let envelope: UserEnvelope = self.call_as("me", request, SESSION_FAILED).await?;
        Ok(envelope.user)
    }

    fn request(&self, method: Method, segments: &[&str]) -> GatewayResult<RequestBuilder> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(self.http.request(method, url))
    }

    async fn call(
        &self,
        op: &'static str,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> GatewayResult<Value> {
        let started_at = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=gateway_call module=gateway op={} status=error error_code=network duration_ms={} error={}",
                    op,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(GatewayError::Network {
                    message: fallback.to_string(),
                    cause: err.to_string(),
                });
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|err| GatewayError::Network {
            message: fallback.to_string(),
            cause: err.to_string(),
        })?;

        if !status.is_success() {
            let message = server_message(&body).unwrap_or_else(|| fallback.to_string());
            warn!(
                "event=gateway_call module=gateway op={} status=error http_status={} duration_ms={} error={}",
                op,
                status.as_u16(),
                started_at.elapsed().as_millis(),
                message
            );
            return Err(GatewayError::from_status(status.as_u16(), message));
        }

        info!(
            "event=gateway_call module=gateway op={} status=ok http_status={} duration_ms={}",
            op,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|err| GatewayError::Decode(format!("{op}: invalid json body: {err}")))
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        op: &'static str,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> GatewayResult<T> {
        let value = self.call(op, request, fallback).await?;
        serde_json::from_value(value)
            .map_err(|err| GatewayError::Decode(format!("{op}: unexpected shape: {err}")))
    }

    fn reconcile_saved(op: &'static str, value: &Value) -> GatewayResult<Article> {
        reconcile_article(value)
            .ok_or_else(|| GatewayError::Decode(format!("{op}: saved article has no id")))
    }
}

#[async_trait]
impl ArticleGateway for BackendClient {
    async fn list_articles(&self) -> GatewayResult<Vec<ArticleRecord>> {
        let request = self.request(Method::GET, &["articles"])?;
        let body = self.call("list_articles", request, LIST_ARTICLES_FAILED).await?;
        Ok(ArticleRecord::from_list_body(&body))
    }

    async fn get_article(&self, id: &str) -> GatewayResult<ArticleDetail> {
        let request = self.request(Method::GET, &["articles", id])?;
        let body = self.call("get_article", request, GET_ARTICLE_FAILED).await?;
        let article = reconcile_article(&body)
            .ok_or_else(|| GatewayError::Decode(format!("get_article: `{id}` has no id")))?;
        let comments = body
            .get("comments")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(reconcile_comment).collect())
            .unwrap_or_default();
        Ok(ArticleDetail { article, comments })
    }

    async fn create_article(
        &self,
        author: &Identity,
        draft: &ArticleDraft,
    ) -> GatewayResult<Article> {
        let payload = ArticlePayload {
            draft,
            user_id: &author.id,
        };
        let request = self.request(Method::POST, &["articles"])?.json(&payload);
        let body = self.call("create_article", request, SAVE_ARTICLE_FAILED).await?;
        Self::reconcile_saved("create_article", &body)
    }

    async fn update_article(
        &self,
        author: &Identity,
        id: &str,
        draft: &ArticleDraft,
    ) -> GatewayResult<Article> {
        let payload = ArticlePayload {
            draft,
            user_id: &author.id,
        };
        let request = self.request(Method::PUT, &["articles", id])?.json(&payload);
        let body = self.call("update_article", request, SAVE_ARTICLE_FAILED).await?;
        Self::reconcile_saved("update_article", &body)
    }

    async fn delete_article(&self, id: &str) -> GatewayResult<()> {
        let request = self.request(Method::DELETE, &["articles", id])?;
        self.call("delete_article", request, DELETE_ARTICLE_FAILED)
            .await?;
        Ok(())
    }

    async fn post_comment(&self, article_id: &str, content: &str) -> GatewayResult<ArticleComment> {
        let request = self
            .request(Method::POST, &["articles", article_id, "comments"])?
            .json(&CommentPayload { content });
        let body = self.call("post_comment", request, POST_COMMENT_FAILED).await?;
        reconcile_comment(&body)
            .ok_or_else(|| GatewayError::Decode("post_comment: comment has no id".to_string()))
    }
}

#[async_trait]
impl DirectoryGateway for BackendClient {
    async fn list_communities(&self) -> GatewayResult<Vec<Community>> {
        let request = self.request(Method::GET, &["communities"])?;
        let body = self
            .call("list_communities", request, LIST_COMMUNITIES_FAILED)
            .await?;
        let Some(rows) = body.as_array() else {
            return Ok(Vec::new());
        };
        let mut communities = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<Community>(row.clone()) {
                Ok(community) => communities.push(community),
                Err(err) => warn!(
                    "event=reconcile_row module=gateway op=list_communities status=skipped error={err}"
                ),
            }
        }
        Ok(communities)
    }

    async fn create_community(&self, draft: &CommunityDraft) -> GatewayResult<Community> {
        let request = self.request(Method::POST, &["communities"])?.json(draft);
        self.call_as("create_community", request, CREATE_COMMUNITY_FAILED)
            .await
    }

    async fn get_profile(&self, user_id: &str) -> GatewayResult<Profile> {
        let request = self.request(Method::GET, &["profiles", user_id])?;
        self.call_as("get_profile", request, GET_PROFILE_FAILED).await
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> GatewayResult<()> {
        let request = self.request(Method::PUT, &["profiles", user_id])?.json(update);
        self.call("update_profile", request, UPDATE_PROFILE_FAILED)
            .await?;
        Ok(())
    }
}

/// Extracts `details`, then `error`, from a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["details", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

#[derive(Serialize)]
struct ArticlePayload<'a> {
    #[serde(flatten)]
    draft: &'a ArticleDraft,
    user_id: &'a str,
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: Identity,
}
