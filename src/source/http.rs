// HTTP client for the incident data service REST API.
//
// Thin reqwest wrapper: one generic GET/POST helper plus one method per
// endpoint. All domain logic stays in the lineage core; this module only
// moves JSON.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::PostSource;
use crate::models::{Comment, Incident, Post, Severity};

/// Default API base when LINEAGE_API_URL is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Upper bound on a single request, connect through body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response from `GET /posts/{id}/diff`. The service also returns its own
/// opcode list; the core recomputes diffs locally, so only the posts are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDiffResponse {
    pub post: Post,
    pub parent: Option<Post>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest<'a> {
    is_credible: bool,
    voter: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    author: &'a str,
    content: &'a str,
}

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Like `new`, with a custom per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("lineage/0.1 (mutation-tracking)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GET {} returned {}: {}", path, status, body);
        }

        let value = response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {path}"))?;
        Ok(Some(value))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("POST {} returned {}: {}", path, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {path}"))
    }

    /// The service's view of a post and its parent.
    pub async fn get_post_diff(&self, post_id: &str) -> Result<Option<PostDiffResponse>> {
        self.get(&format!("/posts/{post_id}/diff")).await
    }
}

#[async_trait]
impl PostSource for HttpSource {
    async fn list_incidents(&self, severity: Option<Severity>) -> Result<Vec<Incident>> {
        let path = match severity {
            Some(severity) => format!("/incidents?severity={}", severity.as_str()),
            None => "/incidents".to_string(),
        };
        Ok(self
            .get::<Vec<Incident>>(&path)
            .await?
            .unwrap_or_default())
    }

    async fn list_posts(&self, incident_id: &str) -> Result<Vec<Post>> {
        let posts: Option<Vec<Post>> = self.get(&format!("/incidents/{incident_id}/posts")).await?;
        posts.with_context(|| format!("Incident {incident_id} not found"))
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        Ok(self.get_post_diff(post_id).await?.map(|d| d.post))
    }

    async fn get_parent(&self, post: &Post) -> Result<Option<Post>> {
        if post.is_root() {
            return Ok(None);
        }
        Ok(self.get_post_diff(&post.id).await?.and_then(|d| d.parent))
    }

    async fn record_vote(&self, post_id: &str, voter: &str, is_credible: bool) -> Result<Post> {
        self.post(
            &format!("/posts/{post_id}/vote"),
            &VoteRequest { is_credible, voter },
        )
        .await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        Ok(self
            .get::<Vec<Comment>>(&format!("/posts/{post_id}/comments"))
            .await?
            .unwrap_or_default())
    }

    async fn create_comment(
        &self,
        post_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Comment> {
        self.post(
            &format!("/posts/{post_id}/comments"),
            &CommentRequest { author, content },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let source = HttpSource::new("http://localhost:8000/api/").unwrap();
        assert_eq!(source.base_url(), "http://localhost:8000/api");
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let source =
            HttpSource::with_timeout(&format!("http://{addr}/api"), Duration::from_millis(200))
                .unwrap();
        let started = std::time::Instant::now();
        let result = source.list_posts("dam-07").await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[test]
    fn test_vote_request_uses_camel_case() {
        let json = serde_json::to_string(&VoteRequest {
            is_credible: true,
            voter: "cli",
        })
        .unwrap();
        assert_eq!(json, r#"{"isCredible":true,"voter":"cli"}"#);
    }
}
