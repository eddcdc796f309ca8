// MemorySource — an in-process PostSource backed by a JSON snapshot.
//
// The snapshot is held behind tokio::sync::Mutex; every trait method locks,
// works on plain data and returns. Nothing is written back to disk: votes
// and comments live only as long as the source does.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::traits::PostSource;
use crate::models::{select_incidents, Comment, Incident, Post, Severity};
use crate::scoring::credibility::VoteTally;

/// On-disk snapshot format. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse snapshot JSON")
    }
}

const COMMENT_ID_PREFIX: &str = "comment-";

struct State {
    snapshot: Snapshot,
    /// (post id, voter) pairs that have already voted.
    voters: HashSet<(String, String)>,
    /// Numeric suffix for the next created comment id, above every
    /// `comment-N` already in the snapshot.
    next_comment: u64,
}

pub struct MemorySource {
    state: Mutex<State>,
}

impl MemorySource {
    pub fn new(snapshot: Snapshot) -> Self {
        let next_comment = snapshot
            .comments
            .iter()
            .filter_map(|c| c.id.strip_prefix(COMMENT_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            state: Mutex::new(State {
                snapshot,
                voters: HashSet::new(),
                next_comment,
            }),
        }
    }

    /// Load a snapshot file.
    pub fn open(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Snapshot::from_json(&json)?;
        info!(
            path = %path.display(),
            incidents = snapshot.incidents.len(),
            posts = snapshot.posts.len(),
            "Loaded snapshot"
        );
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl PostSource for MemorySource {
    async fn list_incidents(&self, severity: Option<Severity>) -> Result<Vec<Incident>> {
        let state = self.state.lock().await;
        Ok(select_incidents(&state.snapshot.incidents, severity))
    }

    async fn list_posts(&self, incident_id: &str) -> Result<Vec<Post>> {
        let state = self.state.lock().await;
        let mut posts: Vec<Post> = state
            .snapshot
            .posts
            .iter()
            .filter(|p| p.incident_id == incident_id)
            .cloned()
            .collect();
        // Stable sort keeps file order for equal timestamps
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        let state = self.state.lock().await;
        Ok(state.snapshot.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn record_vote(&self, post_id: &str, voter: &str, is_credible: bool) -> Result<Post> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let post = state
            .snapshot
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .with_context(|| format!("Post {post_id} not found"))?;

        if state
            .voters
            .insert((post_id.to_string(), voter.to_string()))
        {
            let tally = VoteTally::of(post).record(is_credible);
            post.credible_votes = tally.credible;
            post.total_votes = tally.total;
        } else {
            debug!(post_id, voter, "Ignoring repeat vote");
        }

        Ok(post.clone())
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let state = self.state.lock().await;
        let mut comments: Vec<Comment> = state
            .snapshot
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn create_comment(
        &self,
        post_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Comment> {
        let mut state = self.state.lock().await;
        if !state.snapshot.posts.iter().any(|p| p.id == post_id) {
            anyhow::bail!("Post {post_id} not found");
        }

        let comment = Comment {
            id: format!("{COMMENT_ID_PREFIX}{}", state.next_comment),
            post_id: post_id.to_string(),
            author: author.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.next_comment += 1;
        state.snapshot.comments.push(comment.clone());
        Ok(comment)
    }
}
