use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::LayoutConfig;

/// Central configuration loaded from environment variables.
///
/// Everything has a default, so the tool runs against a local data service
/// with no .env file at all. The .env file is loaded automatically at
/// startup via dotenvy.
pub struct Config {
    /// Base URL of the incident data service REST API.
    pub api_url: String,
    /// How often `watch` pulls a fresh snapshot.
    pub poll_interval: Duration,
    /// While this file exists, `watch` skips its polls.
    pub pause_file: PathBuf,
    /// Voter identity sent with credibility votes.
    pub voter: String,
    /// Node geometry for the lineage layout.
    pub layout: LayoutConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Numeric variables that are set but unparseable are an error rather
    /// than silently falling back to the default.
    pub fn load() -> Result<Self> {
        let defaults = LayoutConfig::default();

        let poll_secs = parse_var("LINEAGE_POLL_SECS", 3u64)?;
        if poll_secs == 0 {
            anyhow::bail!("LINEAGE_POLL_SECS must be at least 1");
        }

        let layout = LayoutConfig {
            node_width: parse_var("LINEAGE_NODE_WIDTH", defaults.node_width)?,
            node_height: parse_var("LINEAGE_NODE_HEIGHT", defaults.node_height)?,
            horizontal_gap: parse_var("LINEAGE_H_GAP", defaults.horizontal_gap)?,
            vertical_gap: parse_var("LINEAGE_V_GAP", defaults.vertical_gap)?,
        };
        check_layout(&layout)?;

        Ok(Self {
            api_url: env::var("LINEAGE_API_URL")
                .unwrap_or_else(|_| crate::source::http::DEFAULT_API_URL.to_string()),
            poll_interval: Duration::from_secs(poll_secs),
            pause_file: env::var("LINEAGE_PAUSE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./lineage.pause")),
            voter: env::var("LINEAGE_VOTER").unwrap_or_else(|_| "cli".to_string()),
            layout,
        })
    }
}

/// Reject node geometry that would stack nodes on top of each other.
///
/// Node sizes must be finite and positive, gaps finite and non-negative.
pub fn check_layout(layout: &LayoutConfig) -> Result<()> {
    let sizes = [
        ("LINEAGE_NODE_WIDTH", layout.node_width),
        ("LINEAGE_NODE_HEIGHT", layout.node_height),
    ];
    for (name, value) in sizes {
        if !value.is_finite() || value <= 0.0 {
            anyhow::bail!("{name} must be a positive number, got {value}");
        }
    }

    let gaps = [
        ("LINEAGE_H_GAP", layout.horizontal_gap),
        ("LINEAGE_V_GAP", layout.vertical_gap),
    ];
    for (name, value) in gaps {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("{name} must be zero or a positive number, got {value}");
        }
    }
    Ok(())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} is not a valid number: {raw:?}")),
        Err(_) => Ok(default),
    }
}
