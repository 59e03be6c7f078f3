//! Enhanced suffix array: suffix array + LCP table + child table, supporting
//! O(1) interval navigation and O(|P|) pattern search.

use serde::{Deserialize, Serialize};

use crate::error::{RaocError, Result};

/// Hard ceiling on indexed text length so offsets fit comfortably below
/// `u32::MAX` with room for sentinel/placeholder bytes.
pub const MAX_TEXT_LEN: usize = (1usize << 31) - 3;

const NONE: u32 = u32::MAX;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuffixIndex {
    text: Vec<u8>,
    suftab: Vec<u32>,
    lcptab: Vec<u32>,
    childtab: Vec<u32>,
}

impl SuffixIndex {
    pub fn build(text: Vec<u8>) -> Result<Self> {
        let n = text.len();
        if n == 0 {
            return Err(RaocError::invalid_input("suffix_index", "cannot index empty text"));
        }
        if n > MAX_TEXT_LEN {
            return Err(RaocError::size_limit(
                "suffix_index",
                format!("text of length {n} exceeds the {MAX_TEXT_LEN} byte limit"),
            ));
        }

        let suftab = build_suffix_array(&text);
        let lcptab = build_lcp_table(&text, &suftab);
        let childtab = build_child_table(&lcptab);

        Ok(SuffixIndex { text, suftab, lcptab, childtab })
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn suffix(&self, i: usize) -> usize {
        self.suftab[i] as usize
    }

    pub fn lcp(&self, i: usize) -> u32 {
        self.lcptab[i]
    }

    /// O(1) lcp of the whole `[i, j]` interval, using the child table's
    /// `down`/`nextlIndex` encoding at the interval's own bounds.
    pub fn interval_lcp_len(&self, i: usize, j: usize) -> usize {
        if i == j {
            return self.len() - self.suffix(i);
        }
        let child = self.child_of(i, j);
        self.lcptab[child] as usize
    }

    /// Returns the minimal lcp-interval whose suffixes agree with `[i, j]`
    /// on the next character `c`, or `None`.
    pub fn interval_sub_interval(&self, i: usize, j: usize, c: u8, depth: usize) -> Option<(usize, usize)> {
        let mut bounds = self.child_intervals(i, j, depth);
        bounds.find(|&(s, e)| self.char_at(s, depth) == Some(c)).map(|(s, e)| (s, e))
    }

    /// Full pattern search: returns the lcp-interval over suffixes that
    /// start with `pattern`, or `None` if no suffix matches.
    pub fn find_interval(&self, pattern: &[u8]) -> Option<(usize, usize)> {
        if pattern.is_empty() || self.is_empty() {
            return None;
        }

        let mut lo = 0usize;
        let mut hi = self.suftab.len() - 1;
        let mut depth = 0usize;

        while depth < pattern.len() {
            let c = pattern[depth];
            let (s, e) = if lo == hi {
                (lo, hi)
            } else {
                self.interval_sub_interval(lo, hi, c, depth)?
            };
            if self.char_at(s, depth) != Some(c) {
                return None;
            }
            lo = s;
            hi = e;
            let matched = self.interval_lcp_len(lo, hi).min(pattern.len());
            depth = matched.max(depth + 1);
            if lo == hi {
                let suf = self.suffix(lo);
                if self.text[suf..].len() < pattern.len() || &self.text[suf..suf + pattern.len()] != pattern {
                    return None;
                }
                return Some((lo, hi));
            }
        }

        Some((lo, hi))
    }

    fn char_at(&self, suftab_index: usize, depth: usize) -> Option<u8> {
        let pos = self.suffix(suftab_index) + depth;
        self.text.get(pos).copied()
    }

    /// Returns the index in `childtab` holding the lcp of `[i, j]`: `down`
    /// of `i` if it falls strictly inside `(i, j]`, else `up` of `j` stored
    /// at `childtab[j-1]`'s slot via the AKO convention — but since we keep
    /// a single multiplexed array, both resolve to one of `childtab[i]`
    /// (down) or `childtab[i]` read through the `up`-at-`i-1` convention.
    fn child_of(&self, i: usize, j: usize) -> usize {
        // up(j) is stored at childtab[j-1]; down(i) is stored at childtab[i].
        let down_i = self.childtab[i];
        if down_i != NONE && (down_i as usize) > i && (down_i as usize) <= j {
            down_i as usize
        } else if j > 0 {
            self.childtab[j - 1] as usize
        } else {
            i
        }
    }

    /// Enumerates the child intervals of `[i, j]` at the given depth, in
    /// left-to-right order, by repeatedly following `nextlIndex`.
    fn child_intervals(&self, i: usize, j: usize, _depth: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut first = self.child_of(i, j);
        if !(first > i && first <= j) {
            first = i + 1;
        }
        let mut cur = Some((i, first.saturating_sub(1).max(i)));
        let mut next_start = first;
        let last = j;
        std::iter::from_fn(move || {
            if let Some(pair) = cur.take() {
                return Some(pair);
            }
            if next_start > last {
                return None;
            }
            let nxt = self.childtab[next_start];
            let end = if nxt != NONE && (nxt as usize) > next_start && (nxt as usize) <= last {
                nxt as usize - 1
            } else {
                last
            };
            let out = (next_start, end);
            next_start = end + 1;
            Some(out)
        })
    }
}

fn build_suffix_array(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    let mut sa: Vec<u32> = (0..n as u32).collect();
    let mut rank: Vec<i64> = text.iter().map(|&b| b as i64).collect();
    let mut tmp = vec![0i64; n];

    let mut k = 1usize;
    while k < n {
        let key = |i: u32| -> (i64, i64) {
            let i = i as usize;
            let r2 = if i + k < n { rank[i + k] } else { -1 };
            (rank[i], r2)
        };
        sa.sort_by(|&a, &b| key(a).cmp(&key(b)));

        tmp[sa[0] as usize] = 0;
        for idx in 1..n {
            tmp[sa[idx] as usize] = tmp[sa[idx - 1] as usize]
                + if key(sa[idx - 1]) < key(sa[idx]) { 1 } else { 0 };
        }
        rank.copy_from_slice(&tmp);

        if rank[sa[n - 1] as usize] as usize == n - 1 {
            break;
        }
        k *= 2;
    }

    sa
}

fn build_lcp_table(text: &[u8], sa: &[u32]) -> Vec<u32> {
    let n = text.len();
    let mut rank = vec![0u32; n];
    for (i, &s) in sa.iter().enumerate() {
        rank[s as usize] = i as u32;
    }

    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for i in 0..n {
        let r = rank[i] as usize;
        if r == 0 {
            h = 0;
            continue;
        }
        let j = sa[r - 1] as usize;
        while i + h < n && j + h < n && text[i + h] == text[j + h] {
            h += 1;
        }
        lcp[r] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// Two-stack construction of the multiplexed `up`/`down`/`nextlIndex`
/// child table (Abouelhoda-Kurtz-Ohlebusch encoding).
fn build_child_table(lcp: &[u32]) -> Vec<u32> {
    let n = lcp.len();
    let mut child = vec![NONE; n];
    if n == 0 {
        return child;
    }

    // up / down pass
    let mut stack = vec![0usize];
    let mut last_index: Option<usize> = None;
    for i in 1..n {
        while lcp[i] < lcp[*stack.last().unwrap()] {
            last_index = stack.pop();
            let top = *stack.last().unwrap();
            if lcp[i] <= lcp[top] && lcp[top] != lcp[last_index.unwrap()] {
                child[top] = last_index.unwrap() as u32;
            }
        }
        if let Some(li) = last_index.take() {
            child[i - 1] = li as u32;
        }
        stack.push(i);
    }

    // nextlIndex pass
    let mut stack = vec![0usize];
    for i in 1..n {
        while lcp[i] < lcp[*stack.last().unwrap()] {
            stack.pop();
        }
        if lcp[i] == lcp[*stack.last().unwrap()] {
            let last = stack.pop().unwrap();
            child[last] = i as u32;
        }
        stack.push(i);
    }

    child
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_over_small_text() {
        let idx = SuffixIndex::build(b"banana".to_vec()).unwrap();
        assert_eq!(idx.len(), 6);
    }

    #[test]
    fn finds_known_substring() {
        let idx = SuffixIndex::build(b"banana".to_vec()).unwrap();
        let interval = idx.find_interval(b"ana");
        assert!(interval.is_some());
        let (s, e) = interval.unwrap();
        for k in s..=e {
            let suf = idx.suffix(k);
            assert_eq!(&idx.text()[suf..suf + 3], b"ana");
        }
    }

    #[test]
    fn rejects_missing_substring() {
        let idx = SuffixIndex::build(b"banana".to_vec()).unwrap();
        assert!(idx.find_interval(b"xyz").is_none());
    }

    #[test]
    fn rejects_empty_text() {
        assert!(SuffixIndex::build(Vec::new()).is_err());
    }
}
