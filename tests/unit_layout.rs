// Unit tests for the hierarchical layout.
//
// Checks the structural guarantees renderers rely on: distinct coordinates,
// children strictly below parents, non-overlapping sibling subtrees, edge
// colors from mutation tiers, and identical output for identical input.

use chrono::{TimeZone, Utc};
use lineage::layout::{layout, LayoutConfig, LayoutResult};
use lineage::lineage::Forest;
use lineage::models::Post;
use lineage::scoring::mutation::{EdgeColor, MutationTier};

fn post(id: &str, parent: Option<&str>, score: Option<f64>) -> Post {
    Post {
        id: id.to_string(),
        content: format!("post {id}"),
        author: "reporter".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        incident_id: "flood-01".to_string(),
        parent_id: parent.map(str::to_string),
        mutation_score: score,
        mutation_type: None,
        credible_votes: 0,
        total_votes: 0,
    }
}

fn bushy_posts() -> Vec<Post> {
    vec![
        post("r1", None, None),
        post("a", Some("r1"), Some(3.0)),
        post("b", Some("r1"), Some(22.0)),
        post("a1", Some("a"), Some(41.0)),
        post("a2", Some("a"), Some(9.0)),
        post("a3", Some("a"), Some(10.0)),
        post("b1", Some("b"), Some(80.0)),
        post("r2", None, None),
        post("c", Some("r2"), Some(0.0)),
        post("orphan", Some("missing"), Some(55.0)),
        post("d", Some("c"), Some(39.9)),
    ]
}

fn run(posts: Vec<Post>) -> (Forest, LayoutResult) {
    let forest = Forest::build(posts);
    let result = layout(&forest, &LayoutConfig::default());
    (forest, result)
}

// ============================================================
// Worked example
// ============================================================

#[test]
fn root_with_two_children_example() {
    let (_, result) = run(vec![
        post("A", None, None),
        post("B", Some("A"), Some(5.0)),
        post("C", Some("A"), Some(45.0)),
    ]);

    let a = result.node("A").unwrap();
    let b = result.node("B").unwrap();
    let c = result.node("C").unwrap();
    assert_eq!(a.rank, 0);
    assert_eq!((b.rank, c.rank), (1, 1));
    assert_ne!(b.x, c.x);
    assert_eq!(b.y, c.y);

    assert_eq!(result.edges.len(), 2);
    assert!(result.edges.iter().all(|e| e.source == "A"));
    assert_eq!(result.edge_to("B").unwrap().color, EdgeColor::Tier1);
    assert_eq!(result.edge_to("C").unwrap().color, EdgeColor::Tier3);
    assert!(result.edge_to("A").is_none());

    assert_eq!(a.tier, MutationTier::Root);
    assert_eq!(c.border_color, "#ef4444");
}

// ============================================================
// Structural guarantees
// ============================================================

#[test]
fn no_two_nodes_share_coordinates() {
    let (_, result) = run(bushy_posts());
    for (i, a) in result.nodes.iter().enumerate() {
        for b in &result.nodes[i + 1..] {
            assert!(
                (a.x, a.y) != (b.x, b.y),
                "{} and {} share ({}, {})",
                a.id,
                b.id,
                a.x,
                a.y
            );
        }
    }
}

#[test]
fn children_sit_strictly_below_parents() {
    let (forest, result) = run(bushy_posts());
    for edge in &result.edges {
        let parent = result.node(&edge.source).unwrap();
        let child = result.node(&edge.target).unwrap();
        assert!(child.rank > parent.rank);
        assert!(child.y > parent.y);
    }
    assert_eq!(result.edges.len(), forest.len() - forest.roots().len());
}

#[test]
fn same_rank_nodes_do_not_overlap() {
    let config = LayoutConfig::default();
    let (_, result) = run(bushy_posts());
    for (i, a) in result.nodes.iter().enumerate() {
        for b in &result.nodes[i + 1..] {
            if a.rank == b.rank {
                assert!(
                    (a.x - b.x).abs() >= config.node_width,
                    "{} and {} overlap horizontally",
                    a.id,
                    b.id
                );
            }
        }
    }
}

#[test]
fn sibling_subtrees_occupy_disjoint_bands() {
    let (forest, result) = run(bushy_posts());
    // Horizontal extent of each root's subtree
    let extent = |root: &str| {
        let root_id = forest.find(root).unwrap();
        let mut xs = Vec::new();
        let mut stack = vec![root_id];
        while let Some(id) = stack.pop() {
            xs.push(result.node(&forest.node(id).post.id).unwrap().x);
            stack.extend(forest.children(id));
        }
        let min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    };

    let (_, a_max) = extent("a");
    let (b_min, _) = extent("b");
    assert!(a_max < b_min, "subtree a must sit left of subtree b");

    let (_, r1_max) = extent("r1");
    let (r2_min, _) = extent("r2");
    assert!(r1_max < r2_min, "roots are laid out left to right");
}

#[test]
fn orphan_is_laid_out_as_root() {
    let (_, result) = run(bushy_posts());
    let orphan = result.node("orphan").unwrap();
    assert_eq!(orphan.rank, 0);
    assert_eq!(orphan.y, 0.0);
    assert!(result.edge_to("orphan").is_none());
    // Still colored by its own score
    assert_eq!(orphan.tier, MutationTier::Fabricated);
}

#[test]
fn edge_colors_follow_target_scores() {
    let (_, result) = run(bushy_posts());
    let color = |id: &str| result.edge_to(id).unwrap().color;
    assert_eq!(color("a2"), EdgeColor::Tier1);
    assert_eq!(color("a3"), EdgeColor::Tier2);
    assert_eq!(color("d"), EdgeColor::Tier2);
    assert_eq!(color("a1"), EdgeColor::Tier3);
    assert_eq!(color("c"), EdgeColor::Tier1);
}

#[test]
fn canvas_covers_all_nodes() {
    let config = LayoutConfig::default();
    let (_, result) = run(bushy_posts());
    for node in &result.nodes {
        assert!(node.x >= 0.0 && node.x + config.node_width <= result.width);
        assert!(node.y >= 0.0 && node.y + config.node_height <= result.height);
    }
}

#[test]
fn custom_geometry_scales_rows() {
    let forest = Forest::build(vec![post("A", None, None), post("B", Some("A"), Some(1.0))]);
    let config = LayoutConfig {
        node_width: 100.0,
        node_height: 40.0,
        horizontal_gap: 10.0,
        vertical_gap: 20.0,
    };
    let result = layout(&forest, &config);
    assert_eq!(result.position("B"), Some((0.0, 60.0)));
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn identical_input_identical_layout() {
    let (_, first) = run(bushy_posts());
    let (_, second) = run(bushy_posts());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn long_chain_does_not_overflow() {
    let mut posts = vec![post("p0", None, None)];
    for i in 1..3000 {
        posts.push(post(&format!("p{i}"), Some(&format!("p{}", i - 1)), Some(12.0)));
    }
    let (_, result) = run(posts);
    assert_eq!(result.node("p2999").unwrap().rank, 2999);
    assert_eq!(result.edges.len(), 2999);
}
