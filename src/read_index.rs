//! Shards a set of reads into one or more `SuffixIndex` fragments and
//! answers duplicate / prefix-suffix queries across all of them.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::read::{Read, ReadId};
use crate::suffix_index::{SuffixIndex, MAX_TEXT_LEN};

const START_SENTINEL: u8 = b'%';
const END_SENTINEL: u8 = b'#';
const ID_BYTES: usize = 4;

/// One shard: the built index plus the byte offset of each read's id-tagged
/// record, so matches can be mapped back to a `ReadId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fragment {
    index: SuffixIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadIndex {
    fragments: Vec<Fragment>,
}

/// A single prefix-suffix match: the other read and the overlap length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixSuffixMatch {
    pub other_read: ReadId,
    pub overlap_len: usize,
}

impl ReadIndex {
    /// Builds the index over `reads`, using `rc` to select each read's
    /// reverse complement instead of its forward sequence.
    pub fn build(reads: &[Read], rc: bool) -> Result<Self> {
        let mut fragments = Vec::new();
        let mut current: Vec<u8> = Vec::new();
        let mut current_ids: Vec<(usize, ReadId)> = Vec::new(); // (offset of id bytes, id)

        for read in reads {
            let seq = read.strand(rc);
            let record_len = 1 + seq.len() + 1 + ID_BYTES;
            if !current.is_empty() && current.len() + record_len > MAX_TEXT_LEN {
                fragments.push(Self::finish_fragment(std::mem::take(&mut current), &current_ids)?);
                current_ids.clear();
            }

            current.push(START_SENTINEL);
            current.extend_from_slice(seq.as_bytes());
            current.push(END_SENTINEL);
            let id_offset = current.len();
            current.extend_from_slice(&[0u8; ID_BYTES]);
            current_ids.push((id_offset, read.id()));
        }

        if !current.is_empty() {
            fragments.push(Self::finish_fragment(current, &current_ids)?);
        }

        Ok(ReadIndex { fragments })
    }

    fn finish_fragment(mut text: Vec<u8>, ids: &[(usize, ReadId)]) -> Result<Fragment> {
        for &(offset, id) in ids {
            text[offset..offset + ID_BYTES].copy_from_slice(&id.to_le_bytes());
        }
        Ok(Fragment { index: SuffixIndex::build(text)? })
    }

    pub fn number_of_occurrences(&self, pattern: &[u8]) -> u64 {
        self.fragments
            .iter()
            .filter_map(|f| f.index.find_interval(pattern))
            .map(|(s, e)| (e - s + 1) as u64)
            .sum()
    }

    fn read_id_after_match(index: &SuffixIndex, match_end: usize) -> Option<ReadId> {
        let text = index.text();
        if match_end + ID_BYTES > text.len() {
            return None;
        }
        let bytes: [u8; ID_BYTES] = text[match_end..match_end + ID_BYTES].try_into().ok()?;
        Some(ReadId::from_le_bytes(bytes))
    }

    /// Returns the ids of every read whose record equals `%<sequence>#`.
    pub fn read_duplicates(&self, read: &Read) -> Vec<ReadId> {
        let mut pattern = Vec::with_capacity(read.len() + 2);
        pattern.push(START_SENTINEL);
        pattern.extend_from_slice(read.sequence().as_bytes());
        pattern.push(END_SENTINEL);

        let mut out = Vec::new();
        for fragment in &self.fragments {
            if let Some((s, e)) = fragment.index.find_interval(&pattern) {
                for k in s..=e {
                    let suf = fragment.index.suffix(k);
                    let match_end = suf + pattern.len();
                    if let Some(id) = Self::read_id_after_match(&fragment.index, match_end) {
                        if id != read.id() {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out
    }

    /// Central OverlapEngine primitive: every other read whose record has a
    /// prefix matching a suffix of `query` (on the strand selected by
    /// `use_rc`) of length at least `min_len`.
    pub fn prefix_suffix_matches(&self, query: &Read, use_rc: bool, min_len: usize) -> Vec<PrefixSuffixMatch> {
        let seq = query.strand(use_rc);
        let seq = seq.as_bytes();
        let mut out = Vec::new();

        if seq.len() < min_len {
            return out;
        }

        // Try progressively shorter suffixes of `query`, descending the ESA
        // for each; an interval collapsing onto a `#` boundary yields a match.
        for start in 0..=(seq.len().saturating_sub(min_len)) {
            let suffix = &seq[start..];
            let match_len = seq.len() - start;
            for fragment in &self.fragments {
                if let Some((s, e)) = fragment.index.find_interval(suffix) {
                    for k in s..=e {
                        let suf = fragment.index.suffix(k);
                        let match_end = suf + suffix.len();
                        if fragment.index.text().get(match_end) == Some(&END_SENTINEL) {
                            if let Some(other) = Self::read_id_after_match(&fragment.index, match_end + 1) {
                                if other != query.id() || use_rc {
                                    out.push(PrefixSuffixMatch { other_read: other, overlap_len: match_len });
                                }
                            }
                        }
                    }
                }
            }
        }

        // Keep only the longest match per (other_read), per §4.3's
        // "greatest length, ties to later position" rule; since we scan
        // from the longest suffix first, the first entry we see per id wins.
        let mut seen = std::collections::HashSet::new();
        out.retain(|m| seen.insert(m.other_read));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::Read;

    #[test]
    fn finds_prefix_suffix_match() {
        let r1 = Read::new(0, "r1", "AAACGT").unwrap();
        let r2 = Read::new(1, "r2", "CGTTTT").unwrap();
        let idx = ReadIndex::build(&[r1.clone(), r2], false).unwrap();
        let matches = idx.prefix_suffix_matches(&r1, false, 3);
        assert!(matches.iter().any(|m| m.other_read == 1 && m.overlap_len >= 3));
    }

    #[test]
    fn duplicate_detection() {
        let r1 = Read::new(0, "r1", "ACGTACGT").unwrap();
        let r2 = Read::new(1, "r2", "ACGTACGT").unwrap();
        let idx = ReadIndex::build(&[r1.clone(), r2], false).unwrap();
        let dups = idx.read_duplicates(&r1);
        assert_eq!(dups, vec![1]);
    }
}
