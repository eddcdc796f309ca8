// Community credibility aggregation.
//
// Reduces a post's vote tally to a percentage and a display tier. The tally
// supplied by the data service is authoritative: this module never counts
// votes itself, it only interprets the counts it is given.

use serde::{Deserialize, Serialize};

use crate::models::Post;

/// Below this percentage a post is flagged as low credibility.
pub const FLAG_BELOW_PERCENT: f64 = 20.0;
/// At or above this percentage a post reads as highly credible.
pub const HIGH_FROM_PERCENT: f64 = 60.0;

/// Raw community vote counts. Credible votes are counted in `total` too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub credible: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityTier {
    High,
    Medium,
    Low,
}

impl CredibilityTier {
    pub fn from_percent(percent: f64) -> Self {
        match percent {
            p if p >= HIGH_FROM_PERCENT => CredibilityTier::High,
            p if p >= FLAG_BELOW_PERCENT => CredibilityTier::Medium,
            _ => CredibilityTier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredibilityTier::High => "High",
            CredibilityTier::Medium => "Medium",
            CredibilityTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for CredibilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the community thinks of a post.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredibilityVerdict {
    /// Nobody has voted yet. Distinct from 0%.
    NoVotes,
    Rated {
        percent: f64,
        tier: CredibilityTier,
        flagged: bool,
    },
}

impl CredibilityVerdict {
    pub fn is_flagged(&self) -> bool {
        matches!(self, CredibilityVerdict::Rated { flagged: true, .. })
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            CredibilityVerdict::NoVotes => None,
            CredibilityVerdict::Rated { percent, .. } => Some(*percent),
        }
    }
}

impl VoteTally {
    pub fn new(credible: u32, total: u32) -> Self {
        Self { credible, total }
    }

    pub fn of(post: &Post) -> Self {
        Self::new(post.credible_votes, post.total_votes)
    }

    /// The tally after one more vote.
    pub fn record(self, is_credible: bool) -> Self {
        Self {
            credible: self.credible.saturating_add(u32::from(is_credible)),
            total: self.total.saturating_add(1),
        }
    }

    /// `None` when no votes have been cast.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        // A tally claiming more credible than total votes is capped at 100%
        let credible = self.credible.min(self.total);
        Some(f64::from(credible) / f64::from(self.total) * 100.0)
    }

    pub fn verdict(&self) -> CredibilityVerdict {
        match self.percent() {
            None => CredibilityVerdict::NoVotes,
            Some(percent) => CredibilityVerdict::Rated {
                percent,
                tier: CredibilityTier::from_percent(percent),
                flagged: percent < FLAG_BELOW_PERCENT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_votes_is_not_flagged() {
        let verdict = VoteTally::new(0, 0).verdict();
        assert_eq!(verdict, CredibilityVerdict::NoVotes);
        assert!(!verdict.is_flagged());
        assert_eq!(verdict.percent(), None);
    }

    #[test]
    fn test_zero_percent_is_flagged() {
        let verdict = VoteTally::new(0, 4).verdict();
        assert!(verdict.is_flagged());
        assert_eq!(verdict.percent(), Some(0.0));
    }

    #[test]
    fn test_inconsistent_tally_caps_at_hundred() {
        assert_eq!(VoteTally::new(7, 5).percent(), Some(100.0));
    }

    #[test]
    fn test_record_counts_credible_in_both() {
        let tally = VoteTally::default().record(true).record(false);
        assert_eq!(tally, VoteTally::new(1, 2));
    }
}
