// PostSource trait — the boundary to the incident data service.
//
// Implementors: HttpSource (the REST API), MemorySource (snapshot files and
// tests). The lineage core never sees this trait; callers fetch a snapshot
// through it and hand plain `Post` values to the core.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Comment, Incident, Post, Severity};

#[async_trait]
pub trait PostSource: Send + Sync {
    /// Known incidents, optionally only one severity. Critical incidents
    /// come first, newest first within a severity.
    async fn list_incidents(&self, severity: Option<Severity>) -> Result<Vec<Incident>>;

    /// Full snapshot of one incident's posts.
    async fn list_posts(&self, incident_id: &str) -> Result<Vec<Post>>;

    /// A single post by id.
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>>;

    /// Resolve a post's parent reference. `None` for roots and for parents
    /// the service does not know.
    async fn get_parent(&self, post: &Post) -> Result<Option<Post>> {
        match post.parent_id.as_deref() {
            Some(parent_id) => self.get_post(parent_id).await,
            None => Ok(None),
        }
    }

    /// Record one credibility vote and return the post with its new tally.
    /// The source enforces one vote per voter per post.
    async fn record_vote(&self, post_id: &str, voter: &str, is_credible: bool) -> Result<Post>;

    /// Comments on a post, newest first.
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>>;

    async fn create_comment(&self, post_id: &str, author: &str, content: &str)
        -> Result<Comment>;
}
