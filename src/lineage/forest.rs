// Forest construction from a flat post list.
//
// The forest owns every post in a single Vec; parent and child links are
// `NodeId` indices into it, never references, so there are no ownership
// cycles and the structure can be dropped and rebuilt per snapshot.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::anomaly::StructuralAnomaly;
use crate::models::Post;

/// Index of a node within its `Forest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub post: Post,
    /// Resolved parent. `None` for roots, including promoted orphans.
    pub parent: Option<NodeId>,
    /// Children in input order.
    pub children: Vec<NodeId>,
    /// Distance from this node's root.
    pub depth: usize,
}

/// The lineage forest for one incident snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    #[serde(skip)]
    index: HashMap<String, NodeId>,
    anomalies: Vec<StructuralAnomaly>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    OnPath,
    Done,
}

impl Forest {
    /// Link `posts` into a forest.
    ///
    /// Never fails: dangling and cross-incident parents are promoted to
    /// roots, cycles are cut, duplicate ids keep their first occurrence.
    /// Each recovery is recorded in `anomalies()`.
    pub fn build(posts: Vec<Post>) -> Self {
        let mut forest = Forest::default();

        for post in posts {
            if forest.index.contains_key(&post.id) {
                forest.record(StructuralAnomaly::DuplicatePost {
                    post_id: post.id.clone(),
                });
                continue;
            }
            let id = NodeId(forest.nodes.len());
            forest.index.insert(post.id.clone(), id);
            forest.nodes.push(TreeNode {
                post,
                parent: None,
                children: Vec::new(),
                depth: 0,
            });
        }

        let mut parents = forest.resolve_parents();
        forest.break_cycles(&mut parents);

        for (i, parent) in parents.iter().enumerate() {
            let id = NodeId(i);
            forest.nodes[i].parent = *parent;
            match parent {
                Some(p) => forest.nodes[p.0].children.push(id),
                None => forest.roots.push(id),
            }
        }

        let order: Vec<(NodeId, usize)> = forest.preorder().collect();
        for (id, depth) in order {
            forest.nodes[id.0].depth = depth;
        }

        debug!(
            nodes = forest.nodes.len(),
            roots = forest.roots.len(),
            anomalies = forest.anomalies.len(),
            "Built lineage forest"
        );
        forest
    }

    /// Look up each post's parent id, demoting unresolvable references.
    fn resolve_parents(&mut self) -> Vec<Option<NodeId>> {
        let mut parents = Vec::with_capacity(self.nodes.len());
        let mut found = Vec::new();

        for node in &self.nodes {
            let Some(parent_id) = node.post.parent_id.as_deref() else {
                parents.push(None);
                continue;
            };
            match self.index.get(parent_id) {
                None => {
                    found.push(StructuralAnomaly::DanglingParent {
                        post_id: node.post.id.clone(),
                        parent_id: parent_id.to_string(),
                    });
                    parents.push(None);
                }
                Some(&p) if self.nodes[p.0].post.incident_id != node.post.incident_id => {
                    found.push(StructuralAnomaly::ForeignParent {
                        post_id: node.post.id.clone(),
                        parent_id: parent_id.to_string(),
                        parent_incident: self.nodes[p.0].post.incident_id.clone(),
                    });
                    parents.push(None);
                }
                Some(&p) => parents.push(Some(p)),
            }
        }

        for anomaly in found {
            self.record(anomaly);
        }
        parents
    }

    /// Walk each parent chain in input order, cutting the link that closes
    /// a loop back onto the current path.
    fn break_cycles(&mut self, parents: &mut [Option<NodeId>]) {
        let mut state = vec![Visit::Unseen; parents.len()];
        let mut path: Vec<usize> = Vec::new();

        for start in 0..parents.len() {
            let mut current = Some(start);
            while let Some(node) = current {
                match state[node] {
                    Visit::Done => break,
                    Visit::OnPath => {
                        // The last node walked points back onto the path
                        if let Some(&last) = path.last() {
                            parents[last] = None;
                            self.record(StructuralAnomaly::Cycle {
                                post_id: self.nodes[last].post.id.clone(),
                                parent_id: self.nodes[node].post.id.clone(),
                            });
                        }
                        break;
                    }
                    Visit::Unseen => {
                        state[node] = Visit::OnPath;
                        path.push(node);
                        current = parents[node].map(|p| p.0);
                    }
                }
            }
            for node in path.drain(..) {
                state[node] = Visit::Done;
            }
        }
    }

    fn record(&mut self, anomaly: StructuralAnomaly) {
        warn!(post_id = anomaly.post_id(), "{anomaly}");
        self.anomalies.push(anomaly);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn anomalies(&self) -> &[StructuralAnomaly] {
        &self.anomalies
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Node id for a post id.
    pub fn find(&self, post_id: &str) -> Option<NodeId> {
        self.index.get(post_id).copied()
    }

    /// Node for a post id.
    pub fn get(&self, post_id: &str) -> Option<&TreeNode> {
        self.find(post_id).map(|id| self.node(id))
    }

    /// The resolved parent post, if the post has one in this forest.
    pub fn parent_of(&self, post_id: &str) -> Option<&Post> {
        let parent = self.get(post_id)?.parent?;
        Some(&self.node(parent).post)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Depth-first pre-order over every tree, roots in forest order,
    /// children in input order. Yields `(node, depth)`.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            forest: self,
            stack: self.roots.iter().rev().map(|&r| (r, 0)).collect(),
        }
    }
}

/// Iterator returned by [`Forest::preorder`]. Uses an explicit stack, so
/// long repost chains cannot overflow the call stack.
pub struct Preorder<'a> {
    forest: &'a Forest,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Preorder<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        self.stack.extend(
            self.forest
                .children(id)
                .iter()
                .rev()
                .map(|&c| (c, depth + 1)),
        );
        Some((id, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(id: &str, parent: Option<&str>) -> Post {
        Post {
            id: id.to_string(),
            content: format!("content of {id}"),
            author: "tester".to_string(),
            created_at: Utc::now(),
            incident_id: "inc-1".to_string(),
            parent_id: parent.map(str::to_string),
            mutation_score: parent.map(|_| 5.0),
            mutation_type: None,
            credible_votes: 0,
            total_votes: 0,
        }
    }

    #[test]
    fn test_children_keep_input_order() {
        let forest = Forest::build(vec![
            post("a", None),
            post("c", Some("a")),
            post("b", Some("a")),
        ]);
        let root = forest.find("a").unwrap();
        let kids: Vec<&str> = forest
            .children(root)
            .iter()
            .map(|&c| forest.node(c).post.id.as_str())
            .collect();
        assert_eq!(kids, vec!["c", "b"]);
    }

    #[test]
    fn test_child_before_parent_in_input() {
        let forest = Forest::build(vec![post("b", Some("a")), post("a", None)]);
        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.get("b").unwrap().depth, 1);
        assert!(forest.anomalies().is_empty());
    }

    #[test]
    fn test_self_parent_is_cut() {
        let forest = Forest::build(vec![post("a", Some("a"))]);
        assert_eq!(forest.roots(), &[NodeId(0)]);
        assert_eq!(
            forest.anomalies(),
            &[StructuralAnomaly::Cycle {
                post_id: "a".to_string(),
                parent_id: "a".to_string(),
            }]
        );
    }

    #[test]
    fn test_preorder_depths() {
        let forest = Forest::build(vec![
            post("a", None),
            post("b", Some("a")),
            post("c", Some("b")),
            post("d", Some("a")),
        ]);
        let order: Vec<(&str, usize)> = forest
            .preorder()
            .map(|(id, d)| (forest.node(id).post.id.as_str(), d))
            .collect();
        assert_eq!(order, vec![("a", 0), ("b", 1), ("c", 2), ("d", 1)]);
    }
}
