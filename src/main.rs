use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info, warn};

use lineage::config::Config;
use lineage::detail::PostDetail;
use lineage::diff::Granularity;
use lineage::layout::{layout, LayoutResult};
use lineage::lineage::Forest;
use lineage::models::{MutationType, Post, Severity};
use lineage::output::terminal;
use lineage::scoring::credibility::VoteTally;
use lineage::scoring::mutation::{mutation_score, MutationTier};
use lineage::source::{self, PostSource};

/// Lineage: track how content mutates as it is reposted.
///
/// Rebuilds the repost tree of an incident, diffs every repost against its
/// parent, and shows how credible the community finds each version.
#[derive(Parser)]
#[command(name = "lineage", version, about)]
struct Cli {
    /// Read from a snapshot JSON file instead of the data service
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List incidents, critical first
    Incidents {
        /// Only show incidents of this severity (CRITICAL or WARNING)
        #[arg(long)]
        severity: Option<Severity>,
    },

    /// Show the lineage tree of an incident
    Tree {
        /// Incident id
        incident: String,

        /// Print the layout and anomalies as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Show how a post differs from its parent
    Diff {
        /// Post id
        post: String,

        /// Compare whole words instead of characters
        #[arg(long)]
        words: bool,
    },

    /// Vote on a post's credibility
    Vote {
        /// Post id
        post: String,

        /// Vote the post credible
        #[arg(long, conflicts_with = "not_credible", required_unless_present = "not_credible")]
        credible: bool,

        /// Vote the post not credible
        #[arg(long)]
        not_credible: bool,

        /// Voter identity (defaults to LINEAGE_VOTER)
        #[arg(long)]
        voter: Option<String>,
    },

    /// List comments on a post
    Comments {
        /// Post id
        post: String,
    },

    /// Add a comment to a post
    Comment {
        /// Post id
        post: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        content: String,
    },

    /// Score how far a child text has drifted from its parent
    Score {
        /// Parent text
        parent: String,
        /// Child text
        child: String,
    },

    /// Re-render an incident's tree whenever its posts change
    Watch {
        /// Incident id
        incident: String,

        /// Seconds between polls (defaults to LINEAGE_POLL_SECS)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lineage=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Score { parent, child } => {
            let score = mutation_score(&parent, &child);
            let tier = MutationTier::classify(Some(score));
            println!("Mutation score: {score:.1}/100");
            println!("Tier: {tier}");
            println!("Type: {}", MutationType::from_score(score));
            println!("{}", tier.explanation().dimmed());
        }

        Commands::Incidents { severity } => {
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            let incidents = source.list_incidents(severity).await?;
            terminal::display_incidents(&incidents);
        }

        Commands::Tree { incident, json } => {
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            let posts = source.list_posts(&incident).await?;
            let (forest, result) = render_input(posts, &config);

            if json {
                let out = serde_json::json!({
                    "incidentId": incident,
                    "layout": result,
                    "anomalies": forest.anomalies(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                terminal::display_forest(&forest, &result);
            }
        }

        Commands::Diff { post, words } => {
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            let target = source
                .get_post(&post)
                .await?
                .with_context(|| format!("Post {post} not found"))?;
            let parent = source.get_parent(&target).await?;

            let granularity = if words {
                Granularity::Word
            } else {
                Granularity::Char
            };
            let detail = PostDetail::build(&target, parent.as_ref(), granularity);
            terminal::display_detail(&detail);
        }

        Commands::Vote {
            post,
            credible,
            not_credible: _,
            voter,
        } => {
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            let voter = voter.unwrap_or_else(|| config.voter.clone());
            let updated = source.record_vote(&post, &voter, credible).await?;

            info!(
                post_id = %updated.id,
                credible_votes = updated.credible_votes,
                total_votes = updated.total_votes,
                "Vote recorded"
            );
            println!("Vote recorded for post {}.", updated.id);
            terminal::display_verdict(&updated, &VoteTally::of(&updated).verdict());
        }

        Commands::Comments { post } => {
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            let comments = source.list_comments(&post).await?;
            terminal::display_comments(&comments);
        }

        Commands::Comment {
            post,
            author,
            content,
        } => {
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            let comment = source.create_comment(&post, &author, &content).await?;
            println!("Comment {} added to post {}.", comment.id, comment.post_id);
        }

        Commands::Watch { incident, interval } => {
            if let Some(secs) = interval {
                if secs == 0 {
                    anyhow::bail!("--interval must be at least 1 second");
                }
                config.poll_interval = std::time::Duration::from_secs(secs);
            }
            let source = source::open(cli.snapshot.as_deref(), &config.api_url)?;
            watch(source, &incident, &config).await?;
        }
    }

    Ok(())
}

/// Build the forest and its layout for one snapshot.
fn render_input(posts: Vec<Post>, config: &Config) -> (Forest, LayoutResult) {
    let forest = Forest::build(posts);
    let result = layout(&forest, &config.layout);
    (forest, result)
}

/// Pull a fresh snapshot every poll interval and re-render when it changes.
///
/// Each snapshot is processed to completion before the next poll, so the
/// screen always shows the newest snapshot and nothing queues up.
async fn watch(source: Arc<dyn PostSource>, incident: &str, config: &Config) -> Result<()> {
    println!(
        "Watching incident {} every {}s (Ctrl-C to stop, touch {} to pause)",
        incident,
        config.poll_interval.as_secs(),
        config.pause_file.display()
    );

    let mut ticker = tokio::time::interval(config.poll_interval);
    let mut last: Option<Vec<Post>> = None;

    let stop = tokio::signal::ctrl_c();
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        if config.pause_file.exists() {
            debug!(pause_file = %config.pause_file.display(), "Paused, skipping poll");
            continue;
        }

        // A stalled fetch must not hold off Ctrl-C
        let fetched = tokio::select! {
            _ = &mut stop => break,
            fetched = source.list_posts(incident) => fetched,
        };
        let posts = match fetched {
            Ok(posts) => posts,
            Err(e) => {
                warn!(error = %e, "Poll failed, keeping previous view");
                continue;
            }
        };

        if last.as_ref() == Some(&posts) {
            continue;
        }

        info!(posts = posts.len(), "Snapshot changed");
        let (forest, result) = render_input(posts.clone(), config);
        terminal::display_forest(&forest, &result);
        last = Some(posts);
    }

    println!("\nStopped watching.");
    Ok(())
}
