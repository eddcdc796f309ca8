// Text diffing between a post and its parent.
//
// Produces an ordered edit script of `DiffOperation`s. The operations are
// contiguous and cover both texts exactly once, so a renderer can walk them
// left to right without bookkeeping. Changed spans that sit between the same
// pair of equal runs are always reported as a single `replace`.

mod lcs;
mod tokens;

use serde::{Deserialize, Serialize};

use lcs::Step;
use tokens::{tokenize, Token};

/// Unit of comparison. Offsets are character offsets either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Char,
    /// Whitespace runs and non-whitespace runs are compared whole.
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Equal => "equal",
            OpKind::Replace => "replace",
            OpKind::Delete => "delete",
            OpKind::Insert => "insert",
        }
    }
}

/// One edit operation. `parent_*` index into the parent text and `child_*`
/// into the child text, as half-open character ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOperation {
    pub kind: OpKind,
    pub parent_start: usize,
    pub parent_end: usize,
    pub child_start: usize,
    pub child_end: usize,
}

impl DiffOperation {
    pub fn parent_text<'a>(&self, parent: &'a str) -> &'a str {
        char_slice(parent, self.parent_start, self.parent_end)
    }

    pub fn child_text<'a>(&self, child: &'a str) -> &'a str {
        char_slice(child, self.child_start, self.child_end)
    }
}

/// Character-level diff of `parent` into `child`.
pub fn diff(parent: &str, child: &str) -> Vec<DiffOperation> {
    diff_with(parent, child, Granularity::Char)
}

/// Diff at the given granularity.
///
/// Empty parent yields one `insert`, empty child one `delete`, identical
/// texts one `equal`. Two empty texts yield no operations at all.
pub fn diff_with(parent: &str, child: &str, granularity: Granularity) -> Vec<DiffOperation> {
    let a = tokenize(parent, granularity);
    let b = tokenize(child, granularity);
    let alignment = lcs::align(&a, &b);

    let a_bounds = boundaries(&a, parent);
    let b_bounds = boundaries(&b, child);

    let mut ops = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    let steps = &alignment.steps;
    let mut k = 0;

    while k < steps.len() {
        let (i0, j0) = (i, j);
        let keep = steps[k] == Step::Keep;
        while k < steps.len() && (steps[k] == Step::Keep) == keep {
            match steps[k] {
                Step::Keep => {
                    i += 1;
                    j += 1;
                }
                Step::Drop => i += 1,
                Step::Add => j += 1,
            }
            k += 1;
        }

        let kind = if keep {
            OpKind::Equal
        } else {
            match (i - i0, j - j0) {
                (0, _) => OpKind::Insert,
                (_, 0) => OpKind::Delete,
                _ => OpKind::Replace,
            }
        };

        ops.push(DiffOperation {
            kind,
            parent_start: a_bounds[i0],
            parent_end: a_bounds[i],
            child_start: b_bounds[j0],
            child_end: b_bounds[j],
        });
    }

    ops
}

/// Length of the longest common subsequence, in tokens. Exact for any
/// input size, including texts too large for `diff` to align.
pub fn lcs_len(parent: &str, child: &str, granularity: Granularity) -> usize {
    let a = tokenize(parent, granularity);
    let b = tokenize(child, granularity);
    lcs::common_len(&a, &b)
}

/// Replay an edit script over `parent`. Equal spans are taken from the
/// parent, replace and insert spans from the child, delete spans are dropped.
/// For a script produced by `diff(parent, child)` the result is `child`.
pub fn apply(parent: &str, child: &str, ops: &[DiffOperation]) -> String {
    let mut out = String::with_capacity(child.len());
    for op in ops {
        match op.kind {
            OpKind::Equal => out.push_str(op.parent_text(parent)),
            OpKind::Replace | OpKind::Insert => out.push_str(op.child_text(child)),
            OpKind::Delete => {}
        }
    }
    out
}

/// Character offset of each token start, plus the total length at the end.
fn boundaries(toks: &[Token<'_>], text: &str) -> Vec<usize> {
    let mut bounds: Vec<usize> = toks.iter().map(|t| t.start).collect();
    bounds.push(text.chars().count());
    bounds
}

/// Slice `text` by character offsets. Out-of-range offsets clamp to the end.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let mut offsets = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()));
    let from = offsets.nth(start).unwrap_or(text.len());
    let to = if end > start {
        offsets.nth(end - start - 1).unwrap_or(text.len())
    } else {
        from
    };
    &text[from..to]
}
