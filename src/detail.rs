// Single-post detail view: what changed relative to the parent, how severe
// the change is, and what the community thinks of the result.

use serde::Serialize;

use crate::diff::{self, DiffOperation, Granularity};
use crate::lineage::Forest;
use crate::models::Post;
use crate::scoring::credibility::{CredibilityVerdict, VoteTally};
use crate::scoring::mutation::MutationTier;

/// Diff against the parent, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "operations", rename_all = "snake_case")]
pub enum DiffView {
    /// Root post, or its parent is not available. Render raw content.
    NoParent,
    Changes(Vec<DiffOperation>),
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub parent: Option<Post>,
    pub diff: DiffView,
    pub tier: MutationTier,
    pub credibility: CredibilityVerdict,
}

impl PostDetail {
    /// Assemble the detail view for `post` given its resolved parent.
    pub fn build(post: &Post, parent: Option<&Post>, granularity: Granularity) -> Self {
        let diff = match parent {
            Some(parent) if !post.is_root() => DiffView::Changes(diff::diff_with(
                &parent.content,
                &post.content,
                granularity,
            )),
            _ => DiffView::NoParent,
        };

        Self {
            post: post.clone(),
            parent: parent.filter(|_| !post.is_root()).cloned(),
            diff,
            tier: post.mutation_tier(),
            credibility: VoteTally::of(post).verdict(),
        }
    }

    /// Detail view for a post in `forest`, resolving the parent locally.
    /// `None` if the post id is not in the forest.
    pub fn from_forest(forest: &Forest, post_id: &str, granularity: Granularity) -> Option<Self> {
        let node = forest.get(post_id)?;
        Some(Self::build(
            &node.post,
            forest.parent_of(post_id),
            granularity,
        ))
    }
}
