//! Containment removal and transitive-edge reduction over a flat overlap
//! list (SPEC_FULL.md §4.4).

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::overlap::{within_tolerance, Overlap};
use crate::read::ReadId;

/// Drops overlaps where either endpoint is contained in the other, under
/// the forced-hang rule. Returns the surviving overlaps and the set of
/// contained read ids.
pub fn remove_contained(overlaps: &[Overlap], read_lens: &[u32]) -> (Vec<Overlap>, HashSet<ReadId>) {
    let mut contained = HashSet::new();
    for o in overlaps {
        let a_len = read_lens[o.a as usize];
        let b_len = read_lens[o.b as usize];
        if o.a_contained_in_b(a_len, b_len) {
            contained.insert(o.a);
        } else if o.b_contained_in_a(a_len, b_len) {
            contained.insert(o.b);
        }
    }

    let kept: Vec<Overlap> = overlaps
        .iter()
        .filter(|o| !contained.contains(&o.a) && !contained.contains(&o.b))
        .copied()
        .collect();

    tracing::info!(contained = contained.len(), kept = kept.len(), "containment filter complete");
    (kept, contained)
}

/// Reduces transitive edges via the Myers-style triangle predicate. Returns
/// the overlaps that should be kept (non-transitive), with `confirmations`
/// updated on the overlaps that participated in eliminating a neighbor.
pub fn reduce_transitive(overlaps: &[Overlap], read_lens: &[u32]) -> Vec<Overlap> {
    let mut adjacency: HashMap<ReadId, Vec<usize>> = HashMap::new();
    for (idx, o) in overlaps.iter().enumerate() {
        adjacency.entry(o.a).or_default().push(idx);
        adjacency.entry(o.b).or_default().push(idx);
    }
    for list in adjacency.values_mut() {
        list.sort_by_key(|&idx| other_end(&overlaps[idx], overlaps[idx].a));
    }

    // Detection is parallel (each index only reads `overlaps`); confirming
    // o2/o3 mutates, so that pass runs sequentially afterward.
    let verdicts: Vec<Option<(usize, usize)>> = (0..overlaps.len())
        .into_par_iter()
        .map(|idx| is_transitive(idx, overlaps, &adjacency, read_lens))
        .collect();

    let mut confirmed: Vec<Overlap> = overlaps.to_vec();
    for verdict in verdicts.iter().flatten() {
        let &(o2_idx, o3_idx) = verdict;
        confirmed[o2_idx].add_confirmation();
        confirmed[o3_idx].add_confirmation();
    }

    let kept: Vec<Overlap> = confirmed
        .into_iter()
        .zip(verdicts.iter())
        .filter(|(_, v)| v.is_none())
        .map(|(o, _)| o)
        .collect();

    tracing::info!(
        total = overlaps.len(),
        transitive = verdicts.iter().filter(|v| v.is_some()).count(),
        kept = kept.len(),
        "transitive edge reduction complete"
    );
    kept
}

fn other_end(o: &Overlap, from: ReadId) -> ReadId {
    if o.a == from { o.b } else { o.a }
}

/// Tests whether `overlaps[idx]` (`o1`, between `a` and `b`) is transitive
/// given some common neighbor `c`. Returns the indices of the confirming
/// `o2 = (a, c)` and `o3 = (b, c)` overlaps on success.
fn is_transitive(
    idx: usize,
    overlaps: &[Overlap],
    adjacency: &HashMap<ReadId, Vec<usize>>,
    read_lens: &[u32],
) -> Option<(usize, usize)> {
    let o1 = &overlaps[idx];
    let a = o1.a;
    let b = o1.b;
    let a_len = read_lens[a as usize];
    let b_len = read_lens[b as usize];
    let (a1_hang, b1_hang) = o1.forced_hangs(a_len, b_len);
    let tol = o1.transitive_tolerance();

    let adj_a = adjacency.get(&a)?;
    let adj_b = adjacency.get(&b)?;

    let mut pi = 0usize;
    let mut pj = 0usize;
    while pi < adj_a.len() && pj < adj_b.len() {
        let o2_idx = adj_a[pi];
        let o3_idx = adj_b[pj];
        if o2_idx == idx {
            pi += 1;
            continue;
        }
        if o3_idx == idx {
            pj += 1;
            continue;
        }
        let c_from_a = other_end(&overlaps[o2_idx], a);
        let c_from_b = other_end(&overlaps[o3_idx], b);

        match c_from_a.cmp(&c_from_b) {
            std::cmp::Ordering::Less => pi += 1,
            std::cmp::Ordering::Greater => pj += 1,
            std::cmp::Ordering::Equal => {
                let c = c_from_a;
                let o2 = &overlaps[o2_idx];
                let o3 = &overlaps[o3_idx];
                let c_len = read_lens[c as usize];

                // o1/o2 must agree on which end of `a` is used, o1/o3 on
                // which end of `b`, and o2/o3 must use opposite ends of the
                // shared neighbor `c` (one prefix, one suffix) — otherwise
                // the triangle doesn't actually chain a-c-b.
                let ends_agree = o1.is_using_suffix(a) == o2.is_using_suffix(a)
                    && o1.is_using_suffix(b) == o3.is_using_suffix(b)
                    && o2.is_using_suffix(c) != o3.is_using_suffix(c);
                if !ends_agree {
                    pi += 1;
                    pj += 1;
                    continue;
                }

                let (a2_hang, _) = if o2.a == a { o2.forced_hangs(a_len, c_len) } else {
                    let (x, y) = o2.forced_hangs(c_len, a_len);
                    (y, x)
                };
                let (_, b3_hang) = if o3.a == b { o3.forced_hangs(b_len, c_len) } else {
                    let (x, y) = o3.forced_hangs(c_len, b_len);
                    (y, x)
                };

                if within_tolerance(a2_hang as f64 + b3_hang as f64, (a1_hang + b1_hang) as f64, tol) {
                    return Some((o2_idx, o3_idx));
                }
                pi += 1;
                pj += 1;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_removes_short_read() {
        // R2 (len 4) fully inside R1 (len 10).
        let o = Overlap::from_interval(0, 3, 7, false, 1, 0, 4, false, 0.0);
        let (kept, contained) = remove_contained(&[o], &[10, 4]);
        assert!(contained.contains(&1));
        assert!(kept.is_empty());
    }

    #[test]
    fn chain_reduces_transitive_edge() {
        // R1-R2 (hang 2,2), R2-R3 (1,1), R1-R3 (3,3): the R1-R3 edge is
        // transitive given the other two.
        let r1_len = 4u32; // CGGT
        let r2_len = 4u32; // GTCC
        let r3_len = 4u32; // TCCC
        let o12 = Overlap::from_dovetail(0, r1_len, 1, r2_len, 2, 2, false, 0.0);
        let o23 = Overlap::from_dovetail(1, r2_len, 2, r3_len, 1, 1, false, 0.0);
        let o13 = Overlap::from_dovetail(0, r1_len, 2, r3_len, 3, 3, false, 0.0);
        let overlaps = vec![o12, o23, o13];
        let kept = reduce_transitive(&overlaps, &[r1_len, r2_len, r3_len]);
        assert!(kept.iter().all(|o| !(o.a == 0 && o.b == 2)));
    }
}
