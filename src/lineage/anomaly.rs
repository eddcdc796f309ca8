// Structural anomalies found while linking posts into a forest.
//
// None of these stop the forest from being built. Each one records how the
// builder recovered, so the caller can surface it without losing content.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralAnomaly {
    /// `parent_id` names a post that is not in the snapshot. Promoted to root.
    DanglingParent { post_id: String, parent_id: String },
    /// `parent_id` names a post from another incident. Promoted to root.
    ForeignParent {
        post_id: String,
        parent_id: String,
        parent_incident: String,
    },
    /// Following parents from `post_id` leads back to it. The link from
    /// `post_id` to `parent_id` was cut and `post_id` became a root.
    Cycle { post_id: String, parent_id: String },
    /// A second post arrived with an id already seen. The later copy is skipped.
    DuplicatePost { post_id: String },
}

impl StructuralAnomaly {
    /// The post the anomaly is about.
    pub fn post_id(&self) -> &str {
        match self {
            StructuralAnomaly::DanglingParent { post_id, .. }
            | StructuralAnomaly::ForeignParent { post_id, .. }
            | StructuralAnomaly::Cycle { post_id, .. }
            | StructuralAnomaly::DuplicatePost { post_id } => post_id,
        }
    }
}

impl std::fmt::Display for StructuralAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralAnomaly::DanglingParent { post_id, parent_id } => write!(
                f,
                "post {post_id} references missing parent {parent_id}; shown as a root"
            ),
            StructuralAnomaly::ForeignParent {
                post_id,
                parent_id,
                parent_incident,
            } => write!(
                f,
                "post {post_id} references parent {parent_id} from incident {parent_incident}; shown as a root"
            ),
            StructuralAnomaly::Cycle { post_id, parent_id } => write!(
                f,
                "parent chain of post {post_id} loops back through {parent_id}; link cut"
            ),
            StructuralAnomaly::DuplicatePost { post_id } => {
                write!(f, "post {post_id} appears more than once; later copy skipped")
            }
        }
    }
}
