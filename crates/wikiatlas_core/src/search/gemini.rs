//! Semantic matcher backed by the Gemini `generateContent` REST endpoint.

use crate::config::ClientConfig;
use crate::model::article::ArticleId;
use crate::search::semantic::{SemanticCandidate, SemanticError, SemanticMatcher, SemanticResult};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Gemini-backed implementation of [`SemanticMatcher`].
#[derive(Clone)]
pub struct GeminiMatcher {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiMatcher {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    /// Builds a matcher from config; `None` when no API key is configured.
    pub fn from_config(config: &ClientConfig) -> Option<Self> {
        let Some(api_key) = config.gemini_api_key.clone() else {
            warn!("event=semantic_config module=search status=disabled reason=missing_api_key");
            return None;
        };
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("event=semantic_config module=search status=degraded error={err}");
                Client::new()
            });
        Some(Self {
            http,
            api_key,
            model: config.gemini_model.clone(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        })
    }

    /// Overrides the API root (proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> SemanticResult<Self> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SemanticError::Config(err.to_string()))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: String) -> SemanticResult<String> {
        let started_at = Instant::now();
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| SemanticError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SemanticError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| SemanticError::Parse(err.to_string()))?;

        debug!(
            "event=semantic_generate module=search status=ok model={} duration_ms={}",
            self.model,
            started_at.elapsed().as_millis()
        );
        Ok(body.text())
    }
}

#[async_trait]
impl SemanticMatcher for GeminiMatcher {
    async fn match_ids(
        &self,
        query: &str,
        candidates: &[SemanticCandidate],
    ) -> SemanticResult<Vec<ArticleId>> {
        if query.trim().is_empty() || candidates.is_empty() {
            return Ok(Vec::new());
        }
        let reply = self.generate(build_prompt(query, candidates)).await?;
        Ok(parse_id_list(&reply))
    }
}

fn build_prompt(query: &str, candidates: &[SemanticCandidate]) -> String {
    let metadata = candidates
        .iter()
        .map(|c| format!("ID:{} | Title:{} | Excerpt:{}", c.id, c.title, c.excerpt))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Analyze the intent behind the query: \"{query}\"\n\
         Find the most meaningful articles from the list below.\n\
         Return ONLY a comma-separated list of IDs.\n\n\
         Articles:\n{metadata}"
    )
}

/// Parses a comma-separated id reply, tolerating `ID:` prefixes and blanks.
pub fn parse_id_list(reply: &str) -> Vec<ArticleId> {
    reply
        .split(',')
        .map(|entry| entry.replace("ID:", "").trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_list_strips_prefixes_and_blanks() {
        assert_eq!(
            parse_id_list("ID:art-1, art-2 ,, ID: art-3\n"),
            vec!["art-1".to_string(), "art-2".to_string(), "art-3".to_string()]
        );
        assert!(parse_id_list("").is_empty());
        assert!(parse_id_list(" , ").is_empty());
    }

    #[test]
    fn prompt_lists_every_candidate() {
        let candidates = vec![
            SemanticCandidate {
                id: "a".to_string(),
                title: "Bobur".to_string(),
                excerpt: "Shoir".to_string(),
            },
            SemanticCandidate {
                id: "b".to_string(),
                title: "Kvant".to_string(),
                excerpt: "Fizika".to_string(),
            },
        ];
        let prompt = build_prompt("shoirlar", &candidates);
        assert!(prompt.contains("\"shoirlar\""));
        assert!(prompt.contains("ID:a | Title:Bobur | Excerpt:Shoir"));
        assert!(prompt.contains("ID:b | Title:Kvant | Excerpt:Fizika"));
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"art-1,"},{"text":"art-2"}]}}]}"#,
        )
        .expect("valid response");
        assert_eq!(body.text(), "art-1,art-2");

        let empty: GenerateResponse = serde_json::from_str("{}").expect("valid response");
        assert_eq!(empty.text(), "");
    }

    #[tokio::test]
    async fn empty_candidates_short_circuit_without_network() {
        let matcher = GeminiMatcher::new("key", DEFAULT_GEMINI_MODEL)
            .with_base_url("http://127.0.0.1:9");
        let ids = matcher.match_ids("query", &[]).await.expect("no network call");
        assert!(ids.is_empty());
    }
}
