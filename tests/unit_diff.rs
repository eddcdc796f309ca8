// Unit tests for the diff engine.
//
// Covers the edge-case contracts (empty sides, identical texts), the
// coverage invariant (ops are contiguous and span both texts), the round-trip
// law (replaying ops over the parent rebuilds the child), determinism, and
// word granularity. Pseudo-random cases come from a fixed-seed generator so
// failures are reproducible.

use lineage::diff::{apply, diff, diff_with, lcs_len, DiffOperation, Granularity, OpKind};
use lineage::scoring::mutation::{mutation_score, MutationTier};

/// Tiny fixed-seed LCG so generated cases are identical on every run.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn text(&mut self, alphabet: &[&str], max_len: u64) -> String {
        let len = self.next() % (max_len + 1);
        (0..len)
            .map(|_| alphabet[(self.next() % alphabet.len() as u64) as usize])
            .collect()
    }
}

fn assert_covers(parent: &str, child: &str, ops: &[DiffOperation]) {
    let (mut p, mut c) = (0, 0);
    for op in ops {
        assert_eq!(op.parent_start, p, "gap in parent coverage: {ops:?}");
        assert_eq!(op.child_start, c, "gap in child coverage: {ops:?}");
        assert!(
            op.parent_end > op.parent_start || op.child_end > op.child_start,
            "zero-width op: {op:?}"
        );
        match op.kind {
            OpKind::Equal => {
                assert_eq!(op.parent_text(parent), op.child_text(child));
            }
            OpKind::Replace => {
                assert!(op.parent_end > op.parent_start && op.child_end > op.child_start);
            }
            OpKind::Delete => assert_eq!(op.child_start, op.child_end),
            OpKind::Insert => assert_eq!(op.parent_start, op.parent_end),
        }
        p = op.parent_end;
        c = op.child_end;
    }
    assert_eq!(p, parent.chars().count());
    assert_eq!(c, child.chars().count());
}

fn assert_no_adjacent_changes(ops: &[DiffOperation]) {
    for pair in ops.windows(2) {
        assert!(
            pair[0].kind == OpKind::Equal || pair[1].kind == OpKind::Equal,
            "two change ops in a row should have merged: {pair:?}"
        );
    }
}

// ============================================================
// Worked examples
// ============================================================

#[test]
fn cat_to_dog() {
    let parent = "the cat sat";
    let child = "the dog sat";
    let ops = diff(parent, child);
    let parts: Vec<(OpKind, &str, &str)> = ops
        .iter()
        .map(|op| (op.kind, op.parent_text(parent), op.child_text(child)))
        .collect();
    assert_eq!(
        parts,
        vec![
            (OpKind::Equal, "the ", "the "),
            (OpKind::Replace, "cat", "dog"),
            (OpKind::Equal, " sat", " sat"),
        ]
    );
}

#[test]
fn cat_to_dog_by_words() {
    let ops = diff_with("the cat sat", "the dog sat", Granularity::Word);
    let kinds: Vec<OpKind> = ops.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![OpKind::Equal, OpKind::Replace, OpKind::Equal]);
    assert_eq!(ops[1].parent_start, 4);
    assert_eq!(ops[1].parent_end, 7);
}

#[test]
fn pure_insertion_in_middle() {
    let ops = diff("dam failed", "dam has failed");
    let kinds: Vec<OpKind> = ops.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![OpKind::Equal, OpKind::Insert, OpKind::Equal]);
    assert_eq!(ops[1].child_text("dam has failed"), "has ");
}

#[test]
fn pure_deletion_at_end() {
    let ops = diff("officials confirm", "officials");
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[1].kind, OpKind::Delete);
    assert_eq!(ops[1].parent_text("officials confirm"), " confirm");
}

#[test]
fn offsets_are_characters_not_bytes() {
    let parent = "café ouvert";
    let child = "café fermé";
    let ops = diff(parent, child);
    assert_covers(parent, child, &ops);
    assert_eq!(ops.last().unwrap().child_end, 10);
    assert_eq!(apply(parent, child, &ops), child);
}

// ============================================================
// Edge cases
// ============================================================

#[test]
fn empty_parent_single_insert() {
    let ops = diff("", "new claim");
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, OpKind::Insert);
    assert_eq!((ops[0].child_start, ops[0].child_end), (0, 9));
}

#[test]
fn empty_child_single_delete() {
    let ops = diff("old claim", "");
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, OpKind::Delete);
    assert_eq!((ops[0].parent_start, ops[0].parent_end), (0, 9));
}

#[test]
fn identical_single_equal() {
    for granularity in [Granularity::Char, Granularity::Word] {
        let ops = diff_with("no change here", "no change here", granularity);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OpKind::Equal);
    }
}

#[test]
fn both_empty_no_ops() {
    assert!(diff("", "").is_empty());
    assert_eq!(apply("", "", &[]), "");
}

#[test]
fn completely_different_single_replace() {
    let ops = diff("abc", "xyz");
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, OpKind::Replace);
}

// ============================================================
// Laws over generated inputs
// ============================================================

#[test]
fn round_trip_reconstructs_child() {
    let mut rng = Lcg(7);
    let alphabet = ["a", "b", "c", " ", "é", "🔥"];
    for _ in 0..300 {
        let parent = rng.text(&alphabet, 24);
        let child = rng.text(&alphabet, 24);
        for granularity in [Granularity::Char, Granularity::Word] {
            let ops = diff_with(&parent, &child, granularity);
            assert_eq!(
                apply(&parent, &child, &ops),
                child,
                "round trip failed for {parent:?} -> {child:?}"
            );
            assert_covers(&parent, &child, &ops);
            assert_no_adjacent_changes(&ops);
        }
    }
}

#[test]
fn diff_is_deterministic() {
    let mut rng = Lcg(99);
    let alphabet = ["x", "y", "z", " "];
    for _ in 0..100 {
        let parent = rng.text(&alphabet, 30);
        let child = rng.text(&alphabet, 30);
        assert_eq!(diff(&parent, &child), diff(&parent, &child));
    }
}

#[test]
fn equal_spans_sum_to_lcs() {
    let mut rng = Lcg(3);
    let alphabet = ["a", "b", "c", "d"];
    for _ in 0..200 {
        let parent = rng.text(&alphabet, 16);
        let child = rng.text(&alphabet, 16);
        let equal: usize = diff(&parent, &child)
            .iter()
            .filter(|op| op.kind == OpKind::Equal)
            .map(|op| op.parent_end - op.parent_start)
            .sum();
        assert_eq!(equal, lcs_len(&parent, &child, Granularity::Char));
    }
}

#[test]
fn lcs_len_stays_exact_past_alignment_cap() {
    // 5200 x 5200 chars after trimming, beyond what diff will align
    let parent = "ab".repeat(2600);
    let child = "ba".repeat(2600);
    assert_eq!(lcs_len(&parent, &child, Granularity::Char), 5199);

    let score = mutation_score(&parent, &child);
    assert!(score < 0.1, "near-identical texts scored {score}");
    assert_eq!(MutationTier::classify(Some(score)), MutationTier::Verified);
}

#[test]
fn operations_serialize_camel_case() {
    let json = serde_json::to_value(diff("a", "b")).unwrap();
    assert_eq!(json[0]["kind"], "replace");
    assert_eq!(json[0]["parentStart"], 0);
    assert_eq!(json[0]["childEnd"], 1);
}
