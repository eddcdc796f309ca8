// Colored terminal output for lineage trees and post details.
//
// All color decisions come from the scoring tiers, so the terminal agrees
// with the layout edge colors about what is verified and what is fabricated.

use colored::Colorize;

use super::{single_line, truncate_chars};
use crate::detail::{DiffView, PostDetail};
use crate::diff::OpKind;
use crate::layout::LayoutResult;
use crate::lineage::{Forest, NodeId};
use crate::models::{Comment, Incident, Post, Severity};
use crate::scoring::credibility::{CredibilityTier, CredibilityVerdict, VoteTally};
use crate::scoring::mutation::MutationTier;

const CONTENT_WIDTH: usize = 72;

/// Display the incident list.
pub fn display_incidents(incidents: &[Incident]) {
    if incidents.is_empty() {
        println!("No incidents found.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Incidents ({}) ===", incidents.len()).bold()
    );
    for incident in incidents {
        let severity = incident.severity.to_string();
        let severity = match incident.severity {
            Severity::Critical => severity.red().bold(),
            Severity::Warning => severity.yellow(),
        };
        println!(
            "  {:<12} {:<9} {} ({}, {})",
            incident.id,
            severity,
            incident.title,
            incident.location,
            incident.status.dimmed(),
        );
    }
}

/// Display a lineage forest as an indented tree.
pub fn display_forest(forest: &Forest, layout: &LayoutResult) {
    if forest.is_empty() {
        println!("No posts in this incident yet.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Lineage ({} posts, {} roots) ===",
            forest.len(),
            forest.roots().len()
        )
        .bold()
    );

    // (node, prefix for its children, connector for itself)
    let mut stack: Vec<(NodeId, String, &'static str)> = forest
        .roots()
        .iter()
        .rev()
        .map(|&r| (r, String::new(), ""))
        .collect();

    while let Some((id, prefix, connector)) = stack.pop() {
        let post = &forest.node(id).post;
        let rank = layout.node(&post.id).map(|n| n.rank).unwrap_or(0);
        println!(
            "  {}{}{} {}",
            prefix.dimmed(),
            connector.dimmed(),
            post_summary(post),
            format!("r{rank}").dimmed(),
        );
        println!(
            "  {}{}    {}",
            prefix.dimmed(),
            continuation(connector).dimmed(),
            truncate_chars(&single_line(&post.content), CONTENT_WIDTH).italic(),
        );

        let child_prefix = format!("{prefix}{}", continuation(connector));
        let children = forest.children(id);
        for (i, &child) in children.iter().enumerate().rev() {
            let connector = if i + 1 == children.len() {
                "└── "
            } else {
                "├── "
            };
            stack.push((child, child_prefix.clone(), connector));
        }
    }

    display_summary(forest);
}

fn continuation(connector: &str) -> &'static str {
    match connector {
        "├── " => "│   ",
        "└── " => "    ",
        _ => "",
    }
}

fn post_summary(post: &Post) -> String {
    let tier = post.mutation_tier();
    let score = match post.mutation_score {
        Some(s) if !post.is_root() => format!(" {s:.1}%"),
        _ => String::new(),
    };
    let kind = match post.mutation_type {
        Some(t) if !post.is_root() => format!(" {}", t.as_str().to_lowercase()),
        _ => String::new(),
    };
    format!(
        "{} @{} [{}{}{}] {}",
        post.id.bold(),
        post.author,
        colorize_tier(tier),
        score,
        kind,
        colorize_verdict(&VoteTally::of(post).verdict()),
    )
}

fn display_summary(forest: &Forest) {
    let count = |tier: MutationTier| {
        forest
            .nodes()
            .filter(|(_, n)| n.post.mutation_tier() == tier)
            .count()
    };

    println!();
    let fabricated = count(MutationTier::Fabricated);
    let modified = count(MutationTier::Modified);
    if fabricated > 0 {
        println!("  {} {} fabricated reposts", "!!".red().bold(), fabricated);
    }
    if modified > 0 {
        println!("  {} {} modified reposts", "~".yellow(), modified);
    }

    let anomalies = forest.anomalies();
    if !anomalies.is_empty() {
        println!("\n  {}", "Structural anomalies:".yellow().bold());
        for anomaly in anomalies {
            println!("    {} {}", "-".yellow(), anomaly);
        }
    }
}

/// Display the detail view for one post.
pub fn display_detail(detail: &PostDetail) {
    let post = &detail.post;
    println!(
        "\n{}",
        format!("=== Post {} by @{} ===", post.id, post.author).bold()
    );
    println!("  Posted: {}", post.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Tier: {}", colorize_tier(detail.tier));
    if let (Some(score), false) = (post.mutation_score, post.is_root()) {
        println!("  Mutation score: {score:.1}/100");
    }
    if let Some(kind) = post.mutation_type.filter(|_| !post.is_root()) {
        println!("  Mutation type: {kind}");
    }
    println!("  {}", detail.tier.explanation().dimmed());

    match (&detail.diff, &detail.parent) {
        (DiffView::Changes(ops), Some(parent)) => {
            println!("\n  {}", "PARENT".dimmed());
            println!("    {}", parent.content);
            println!("\n  {}", "CHILD".dimmed());
            let mut rendered = String::new();
            for op in ops {
                let old = op.parent_text(&parent.content);
                let new = op.child_text(&post.content);
                let piece = match op.kind {
                    OpKind::Equal => new.normal().to_string(),
                    OpKind::Delete => old.red().strikethrough().to_string(),
                    OpKind::Insert => new.green().underline().to_string(),
                    OpKind::Replace => format!(
                        "{}{}",
                        old.red().strikethrough(),
                        new.green().underline()
                    ),
                };
                rendered.push_str(&piece);
            }
            println!("    {rendered}");
        }
        _ => {
            println!("\n  {}", "No parent to compare against.".dimmed());
            println!("    {}", post.content);
        }
    }

    println!("\n  {}", "COMMUNITY CREDIBILITY".dimmed());
    display_verdict(post, &detail.credibility);
}

/// Credibility block shared by the detail view and the vote command.
pub fn display_verdict(post: &Post, verdict: &CredibilityVerdict) {
    match verdict {
        CredibilityVerdict::NoVotes => {
            println!("    No votes yet.");
        }
        CredibilityVerdict::Rated { flagged, .. } => {
            println!(
                "    Credibility: {} ({} credible / {} total votes)",
                colorize_verdict(verdict),
                post.credible_votes,
                post.total_votes
            );
            if *flagged {
                println!(
                    "    {} {}",
                    "!!".red().bold(),
                    "Low credibility: community flagged as potentially unreliable".red()
                );
            }
        }
    }
}

/// Display comments, newest first.
pub fn display_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("No comments yet.");
        return;
    }
    for comment in comments {
        println!(
            "  @{} {}",
            comment.author.bold(),
            comment.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        println!("    {}", comment.content);
    }
}

fn colorize_tier(tier: MutationTier) -> colored::ColoredString {
    let label = tier.as_str();
    match tier {
        MutationTier::Fabricated => label.red().bold(),
        MutationTier::Modified => label.yellow(),
        MutationTier::Verified => label.green(),
        MutationTier::Root => label.dimmed(),
    }
}

fn colorize_verdict(verdict: &CredibilityVerdict) -> colored::ColoredString {
    match verdict {
        CredibilityVerdict::NoVotes => "no votes".dimmed(),
        CredibilityVerdict::Rated { percent, tier, .. } => {
            let label = format!("{percent:.0}%");
            match tier {
                CredibilityTier::High => label.green(),
                CredibilityTier::Medium => label.yellow(),
                CredibilityTier::Low => label.red().bold(),
            }
        }
    }
}
