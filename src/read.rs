//! Reads and the store that owns them.

use serde::{Deserialize, Serialize};

use crate::error::{RaocError, Result};

pub type ReadId = u32;

/// A single sequencing read. `id` is dense and immutable once assigned;
/// `reverse_complement` is computed on first access and cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Read {
    id: ReadId,
    name: String,
    sequence: String,
    quality: Option<String>,
    coverage: f64,
    #[serde(skip)]
    reverse_complement: Option<String>,
}

fn clean_sequence(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| match c.to_ascii_uppercase() {
            b @ ('A' | 'C' | 'G' | 'T') => b,
            _ => 'N',
        })
        .collect()
}

pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            'T' => 'A',
            _ => 'N',
        })
        .collect()
}

impl Read {
    pub fn new(id: ReadId, name: impl Into<String>, sequence: impl AsRef<str>) -> Result<Self> {
        let sequence = clean_sequence(sequence.as_ref());
        if sequence.is_empty() {
            return Err(RaocError::invalid_input("read", format!("read {id} has empty sequence")));
        }
        Ok(Read { id, name: name.into(), sequence, quality: None, coverage: 1.0, reverse_complement: None })
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn id(&self) -> ReadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn quality(&self) -> Option<&str> {
        self.quality.as_deref()
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn add_coverage(&mut self, delta: f64) {
        self.coverage += delta;
    }

    /// Returns the cached reverse complement, computing it on first use.
    pub fn rc(&mut self) -> &str {
        if self.reverse_complement.is_none() {
            self.reverse_complement = Some(reverse_complement(&self.sequence));
        }
        self.reverse_complement.as_deref().unwrap()
    }

    /// Side-selected sequence, for callers that already hold an immutable
    /// reference and can tolerate recomputation (no caching).
    pub fn strand(&self, rc: bool) -> std::borrow::Cow<'_, str> {
        if rc {
            std::borrow::Cow::Owned(reverse_complement(&self.sequence))
        } else {
            std::borrow::Cow::Borrowed(&self.sequence)
        }
    }
}

/// Owns all reads for a process. Exclusive ownership; everything downstream
/// holds stable `ReadId`s rather than references.
#[derive(Debug, Default)]
pub struct ReadStore {
    reads: Vec<Read>,
}

impl ReadStore {
    pub fn new() -> Self {
        ReadStore { reads: Vec::new() }
    }

    pub fn push(&mut self, read: Read) -> Result<ReadId> {
        let expected = self.reads.len() as ReadId;
        if read.id() != expected {
            return Err(RaocError::invalid_input(
                "read_store",
                format!("read id {} is not dense (expected {})", read.id(), expected),
            ));
        }
        self.reads.push(read);
        Ok(expected)
    }

    pub fn get(&self, id: ReadId) -> Option<&Read> {
        self.reads.get(id as usize)
    }

    pub fn get_mut(&mut self, id: ReadId) -> Option<&mut Read> {
        self.reads.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Read> {
        self.reads.iter()
    }

    pub fn as_slice(&self) -> &[Read] {
        &self.reads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_and_uppercases_sequence() {
        let r = Read::new(0, "r1", "acgt-nX\nACGT").unwrap();
        assert_eq!(r.sequence(), "ACGTNNACGT");
    }

    #[test]
    fn rejects_empty_sequence() {
        assert!(Read::new(0, "r1", "---").is_err());
    }

    #[test]
    fn rc_round_trips() {
        assert_eq!(reverse_complement("ACGT"), "ACGT");
        assert_eq!(reverse_complement("AAACGT"), "ACGTTT");
    }

    #[test]
    fn store_enforces_dense_ids() {
        let mut store = ReadStore::new();
        store.push(Read::new(0, "a", "ACGT").unwrap()).unwrap();
        let err = store.push(Read::new(5, "b", "ACGT").unwrap());
        assert!(err.is_err());
    }
}
