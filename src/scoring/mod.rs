// Scoring — mutation severity tiers and community credibility.

pub mod credibility;
pub mod mutation;
