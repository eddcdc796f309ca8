// Mutation severity classification.
//
// The tier thresholds live here and nowhere else: layout edge colors, node
// borders and the detail view all derive from `MutationTier`, so they can
// never disagree about what counts as "modified" or "fabricated".

use serde::{Deserialize, Serialize};

use crate::diff::{self, Granularity};

/// Scores below this are considered faithful reposts.
pub const VERIFIED_CEILING: f64 = 10.0;
/// Scores at or above this are considered fabrications.
pub const FABRICATED_FLOOR: f64 = 40.0;

/// Presentation tier of a post's mutation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationTier {
    /// No score: the post is an origin, not a mutation.
    Root,
    Verified,
    Modified,
    Fabricated,
}

/// Edge stroke tier for a parent -> child link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeColor {
    Tier1,
    Tier2,
    Tier3,
}

impl EdgeColor {
    pub fn hex(&self) -> &'static str {
        match self {
            EdgeColor::Tier1 => "#22c55e",
            EdgeColor::Tier2 => "#eab308",
            EdgeColor::Tier3 => "#ef4444",
        }
    }
}

impl MutationTier {
    /// Classify an already-computed mutation score.
    ///
    /// Total over `[0, 100]` and absence. NaN fails both threshold
    /// comparisons and lands in `Verified`.
    pub fn classify(score: Option<f64>) -> Self {
        match score {
            None => MutationTier::Root,
            Some(s) if s >= FABRICATED_FLOOR => MutationTier::Fabricated,
            Some(s) if s >= VERIFIED_CEILING => MutationTier::Modified,
            Some(_) => MutationTier::Verified,
        }
    }

    /// Stroke for an edge pointing at a node of this tier. Roots never have
    /// an incoming edge, so they have no stroke.
    pub fn edge_color(&self) -> Option<EdgeColor> {
        match self {
            MutationTier::Root => None,
            MutationTier::Verified => Some(EdgeColor::Tier1),
            MutationTier::Modified => Some(EdgeColor::Tier2),
            MutationTier::Fabricated => Some(EdgeColor::Tier3),
        }
    }

    /// Node border color; roots get the neutral slate border.
    pub fn border_color(&self) -> &'static str {
        match self.edge_color() {
            Some(color) => color.hex(),
            None => "#334155",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationTier::Root => "root",
            MutationTier::Verified => "verified",
            MutationTier::Modified => "modified",
            MutationTier::Fabricated => "fabricated",
        }
    }

    /// One-line summary shown next to the diff.
    pub fn explanation(&self) -> &'static str {
        match self {
            MutationTier::Root => "Original post. Nothing to compare against.",
            MutationTier::Verified => {
                "Content matches its source. No significant mutations detected."
            }
            MutationTier::Modified => {
                "Content was reworded in transit. Check for emotional framing."
            }
            MutationTier::Fabricated => {
                "Content diverges heavily from its source and likely contains fabrication."
            }
        }
    }
}

impl std::fmt::Display for MutationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Indel-distance dissimilarity between two texts, scaled to 0-100.
///
/// `0` means identical, `100` means nothing in common. Either side empty
/// scores `100`, matching what ingestion attaches to such reposts. This is
/// a preview of the ingestion-side score; the classifier never calls it.
pub fn mutation_score(parent: &str, child: &str) -> f64 {
    if parent.is_empty() || child.is_empty() {
        return 100.0;
    }

    let parent_len = parent.chars().count();
    let child_len = child.chars().count();
    let common = diff::lcs_len(parent, child, Granularity::Char);

    let similarity = (2 * common) as f64 / (parent_len + child_len) as f64;
    ((1.0 - similarity) * 100.0).clamp(0.0, 100.0)
}
