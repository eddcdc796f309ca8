// Lineage reconstruction — turns a flat incident snapshot into a forest of
// repost trees and reports whatever structural damage it had to repair.

pub mod anomaly;
pub mod forest;

pub use anomaly::StructuralAnomaly;
pub use forest::{Forest, NodeId, TreeNode};
