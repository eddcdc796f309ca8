// Longest-common-subsequence alignment over token sequences.
//
// The common prefix and suffix are peeled off first, so the quadratic table
// only covers the region that actually changed. Reposts usually share most
// of their text with the parent, which keeps the table small in practice.

use tracing::debug;

use super::tokens::Token;

/// Upper bound on LCS table cells (~100 MB of u32). Beyond this the changed
/// region is reported as one block instead of being aligned.
const MAX_TABLE_CELLS: usize = 25_000_000;

/// One step of an edit script, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Token present in both sequences.
    Keep,
    /// Token only in the parent.
    Drop,
    /// Token only in the child.
    Add,
}

/// Result of aligning two token sequences.
pub(crate) struct Alignment {
    pub steps: Vec<Step>,
    pub common: usize,
}

pub(crate) fn align(a: &[Token<'_>], b: &[Token<'_>]) -> Alignment {
    let prefix = a
        .iter()
        .zip(b.iter())
        .take_while(|(x, y)| x.text == y.text)
        .count();

    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x.text == y.text)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut steps = Vec::with_capacity(a.len().max(b.len()));
    steps.extend(std::iter::repeat(Step::Keep).take(prefix));
    let middle_common = align_middle(mid_a, mid_b, &mut steps);
    steps.extend(std::iter::repeat(Step::Keep).take(suffix));

    Alignment {
        steps,
        common: prefix + middle_common + suffix,
    }
}

/// Longest common subsequence length, without an edit script.
///
/// Keeps two rows over the shorter side, so memory stays linear and no
/// region is too large to measure.
pub(crate) fn common_len(a: &[Token<'_>], b: &[Token<'_>]) -> usize {
    let prefix = a
        .iter()
        .zip(b.iter())
        .take_while(|(x, y)| x.text == y.text)
        .count();
    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x.text == y.text)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];
    let (long, short) = if mid_a.len() >= mid_b.len() {
        (mid_a, mid_b)
    } else {
        (mid_b, mid_a)
    };

    let mut prev = vec![0usize; short.len() + 1];
    let mut row = vec![0usize; short.len() + 1];
    for x in long {
        for (j, y) in short.iter().enumerate() {
            row[j + 1] = if x.text == y.text {
                prev[j] + 1
            } else {
                prev[j + 1].max(row[j])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prefix + prev[short.len()] + suffix
}

/// Align the changed region, pushing its steps. Returns the LCS length.
fn align_middle(a: &[Token<'_>], b: &[Token<'_>], steps: &mut Vec<Step>) -> usize {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        steps.extend(std::iter::repeat(Step::Drop).take(n));
        steps.extend(std::iter::repeat(Step::Add).take(m));
        return 0;
    }

    let width = m + 1;
    let cells = (n + 1).saturating_mul(width);
    if cells > MAX_TABLE_CELLS {
        debug!(
            parent_tokens = n,
            child_tokens = m,
            "Changed region too large to align, reporting as one block"
        );
        steps.extend(std::iter::repeat(Step::Drop).take(n));
        steps.extend(std::iter::repeat(Step::Add).take(m));
        return 0;
    }

    // table[i * width + j] = LCS length of a[i..] and b[j..]
    let mut table = vec![0u32; cells];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i].text == b[j].text {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i].text == b[j].text {
            steps.push(Step::Keep);
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            // Ties drop from the parent first
            steps.push(Step::Drop);
            i += 1;
        } else {
            steps.push(Step::Add);
            j += 1;
        }
    }
    steps.extend(std::iter::repeat(Step::Drop).take(n - i));
    steps.extend(std::iter::repeat(Step::Add).take(m - j));

    table[0] as usize
}
