//! Edit-distance oracle and overlap stretching (SPEC_FULL.md §4.8).
//!
//! The oracle is a deliberately narrow trait seam: a faster implementation
//! (e.g. Myers' bit-parallel algorithm) can be swapped in later without
//! touching the stretching math below.

/// Computes edit distance between two strings, or bails out past a budget.
pub trait EditDistanceOracle {
    /// Returns the edit distance, or `None` if it provably exceeds
    /// `max_allowed` (callers treat `None` as "too dissimilar to matter").
    fn edit_distance(&self, query: &str, reference: &str, max_allowed: usize) -> Option<usize>;
}

/// Classic O(nm) DP, banded to `max_allowed` so a query/reference pair that
/// clearly can't fit the budget bails out row by row instead of filling the
/// whole matrix.
#[derive(Debug, Default, Clone, Copy)]
pub struct BandedOracle;

impl EditDistanceOracle for BandedOracle {
    fn edit_distance(&self, query: &str, reference: &str, max_allowed: usize) -> Option<usize> {
        let q: Vec<u8> = query.bytes().collect();
        let r: Vec<u8> = reference.bytes().collect();
        if q.len().abs_diff(r.len()) > max_allowed {
            return None;
        }
        if q.is_empty() {
            return (r.len() <= max_allowed).then_some(r.len());
        }
        if r.is_empty() {
            return (q.len() <= max_allowed).then_some(q.len());
        }

        let sentinel = max_allowed + 1;
        let mut prev: Vec<usize> = (0..=r.len()).collect();
        let mut cur = vec![0usize; r.len() + 1];

        for i in 1..=q.len() {
            cur[0] = i;
            let band_lo = i.saturating_sub(max_allowed).max(1);
            let band_hi = (i + max_allowed).min(r.len());
            let mut row_min = cur[0];
            for j in 1..=r.len() {
                if j < band_lo || j > band_hi {
                    cur[j] = sentinel;
                    continue;
                }
                let cost = if q[i - 1] == r[j - 1] { 0 } else { 1 };
                cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
                row_min = row_min.min(cur[j]);
            }
            if row_min > max_allowed {
                return None;
            }
            std::mem::swap(&mut prev, &mut cur);
        }

        let dist = prev[r.len()];
        (dist <= max_allowed).then_some(dist)
    }
}

/// Result of stretching an interval-form overlap to the nearer read end.
pub struct Stretched {
    pub a_lo: u32,
    pub a_hi: u32,
    pub b_lo: u32,
    pub b_hi: u32,
    pub err_rate: f64,
}

/// Extends an interval-form overlap to whichever read's end is reached
/// first (the "nearer end"), using semi-global edit distance with free
/// gaps past the query's own end, and derives `err_rate` from the edit
/// distance spent on the extension.
#[allow(clippy::too_many_arguments)]
pub fn stretch_overlap(
    oracle: &impl EditDistanceOracle,
    a_seq: &str,
    b_seq: &str,
    a_lo: u32,
    a_hi: u32,
    a_len: u32,
    b_lo: u32,
    b_hi: u32,
    b_len: u32,
    orig_edit_distance: usize,
) -> Stretched {
    let left = a_lo.min(b_lo) as usize;
    let right = (a_len - a_hi).min(b_len - b_hi) as usize;

    let mut added = 0usize;

    if left > 0 {
        let a_region = &a_seq[(a_lo as usize - left)..a_lo as usize];
        let b_region = &b_seq[(b_lo as usize - left)..b_lo as usize];
        let budget = a_region.len().max(b_region.len());
        added += oracle.edit_distance(a_region, b_region, budget).unwrap_or(budget);
    }
    if right > 0 {
        let a_region = &a_seq[a_hi as usize..(a_hi as usize + right)];
        let b_region = &b_seq[b_hi as usize..(b_hi as usize + right)];
        let budget = a_region.len().max(b_region.len());
        added += oracle.edit_distance(a_region, b_region, budget).unwrap_or(budget);
    }

    let new_a_lo = a_lo - left as u32;
    let new_a_hi = a_hi + right as u32;
    let new_b_lo = b_lo - left as u32;
    let new_b_hi = b_hi + right as u32;

    let mean_len = ((new_a_hi - new_a_lo) as f64 + (new_b_hi - new_b_lo) as f64) / 2.0;
    let err_rate = if mean_len > 0.0 { (orig_edit_distance + added) as f64 / mean_len } else { 0.0 };

    Stretched { a_lo: new_a_lo, a_hi: new_a_hi, b_lo: new_b_lo, b_hi: new_b_hi, err_rate }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_have_zero_distance() {
        let oracle = BandedOracle;
        assert_eq!(oracle.edit_distance("ACGT", "ACGT", 2), Some(0));
    }

    #[test]
    fn single_substitution_counts_one() {
        let oracle = BandedOracle;
        assert_eq!(oracle.edit_distance("ACGT", "ACCT", 2), Some(1));
    }

    #[test]
    fn bails_out_past_budget() {
        let oracle = BandedOracle;
        assert_eq!(oracle.edit_distance("AAAA", "TTTT", 1), None);
    }

    #[test]
    fn stretch_extends_to_nearer_end() {
        let oracle = BandedOracle;
        // a_lo=3 (left slack 3), b_lo=2 (left slack 2) -> nearer end caps
        // the left extension at 2. a_len-a_hi=2, b_len-b_hi=3 -> right
        // extension caps at 2.
        let a_seq = "AAACGTGGTT";
        let b_seq = "TTCGTGGAAA";
        let result = stretch_overlap(&oracle, a_seq, b_seq, 3, 8, 10, 2, 7, 10, 0);
        assert_eq!((result.a_lo, result.a_hi), (1, 10));
        assert_eq!((result.b_lo, result.b_hi), (0, 9));
        assert!(result.err_rate >= 0.0);
    }
}
