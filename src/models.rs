// Data models — the records that flow between the data service and the core.
//
// Field names follow the data service's camelCase JSON so snapshots and API
// responses deserialize directly. The core only ever reads these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::mutation::MutationTier;

/// The kind of divergence a repost introduced, as labelled at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationType {
    Emotional,
    Factual,
    Fabrication,
}

impl MutationType {
    /// The ingestion heuristic: minor edits read as factual tweaks, moderate
    /// ones as emotional reframing, anything larger as fabrication.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 10.0 => MutationType::Factual,
            s if s < 40.0 => MutationType::Emotional,
            _ => MutationType::Fabrication,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationType::Emotional => "EMOTIONAL",
            MutationType::Factual => "FACTUAL",
            MutationType::Fabrication => "FABRICATION",
        }
    }
}

impl std::fmt::Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single post (original or repost) within an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author: String,
    /// The data service calls this `timestamp` on the wire.
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub incident_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_type: Option<MutationType>,
    #[serde(default)]
    pub credible_votes: u32,
    #[serde(default)]
    pub total_votes: u32,
}

impl Post {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Severity tier for this post. Posts without a parent reference are
    /// always `Root`, even if the service attached a score to them.
    pub fn mutation_tier(&self) -> MutationTier {
        if self.is_root() {
            MutationTier::Root
        } else {
            MutationTier::classify(self.mutation_score)
        }
    }
}

/// Incident severity as reported by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
        }
    }

    /// Listing priority: lower sorts first.
    fn priority(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "WARNING" => Ok(Severity::Warning),
            other => Err(format!("unknown severity {other:?} (expected CRITICAL or WARNING)")),
        }
    }
}

/// A misinformation event grouping related posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub location: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment attached to a post. Supplementary detail-view data only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Keep incidents matching `severity` (all when `None`), critical first and
/// newest first within a severity.
pub fn select_incidents(incidents: &[Incident], severity: Option<Severity>) -> Vec<Incident> {
    let mut selected: Vec<Incident> = incidents
        .iter()
        .filter(|i| severity.map_or(true, |s| i.severity == s))
        .cloned()
        .collect();
    selected.sort_by(|a, b| {
        a.severity
            .priority()
            .cmp(&b.severity.priority())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    selected
}
