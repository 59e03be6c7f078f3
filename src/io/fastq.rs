//! FASTQ read ingestion: four-line records, name taken from the `@` line.

use std::io::BufRead;

use crate::error::{RaocError, Result};
use crate::read::Read;

pub fn read_fastq(reader: impl BufRead) -> Result<Vec<Read>> {
    let mut reads = Vec::new();
    let mut lines = reader.lines();
    let mut next_id = 0u32;

    loop {
        let Some(header) = lines.next() else { break };
        let header = header?;
        if header.is_empty() {
            continue;
        }
        let name = header
            .strip_prefix('@')
            .ok_or_else(|| RaocError::invalid_input("io::fastq", format!("expected '@' header, got {header:?}")))?
            .to_string();

        let seq = lines
            .next()
            .ok_or_else(|| RaocError::invalid_input("io::fastq", "truncated record (missing sequence)"))??;
        let plus = lines
            .next()
            .ok_or_else(|| RaocError::invalid_input("io::fastq", "truncated record (missing '+' line)"))??;
        if !plus.starts_with('+') {
            return Err(RaocError::invalid_input("io::fastq", format!("expected '+' line, got {plus:?}")));
        }
        let qual = lines
            .next()
            .ok_or_else(|| RaocError::invalid_input("io::fastq", "truncated record (missing quality)"))??;

        let read = Read::new(next_id, name, &seq)?.with_quality(qual);
        reads.push(read);
        next_id += 1;
    }

    if reads.is_empty() {
        return Err(RaocError::invalid_input("io::fastq", "no records found"));
    }
    Ok(reads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_record() {
        let data = b"@r1\nACGT\n+\nIIII\n".as_slice();
        let reads = read_fastq(data).unwrap();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].quality(), Some("IIII"));
    }
}
