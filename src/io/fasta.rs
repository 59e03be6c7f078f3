//! FASTA read ingestion and contig output.

use std::io::{BufRead, Write};

use crate::error::{RaocError, Result};
use crate::read::Read;

/// Parses `>name\n<sequence>\n` records, assigning ids in file order from 0.
pub fn read_fasta(reader: impl BufRead) -> Result<Vec<Read>> {
    let mut reads = Vec::new();
    let mut name: Option<String> = None;
    let mut seq = String::new();
    let mut next_id = 0u32;

    for line in reader.lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix('>') {
            if let Some(n) = name.take() {
                reads.push(Read::new(next_id, n, &seq)?);
                next_id += 1;
                seq.clear();
            }
            name = Some(rest.trim().to_string());
        } else {
            seq.push_str(line.trim());
        }
    }
    if let Some(n) = name {
        reads.push(Read::new(next_id, n, &seq)?);
    }

    if reads.is_empty() {
        return Err(RaocError::invalid_input("io::fasta", "no records found"));
    }
    Ok(reads)
}

/// Writes one `>seq<i>|len:<n>` record per contig sequence.
pub fn write_contigs(mut writer: impl Write, contigs: &[(usize, String)]) -> Result<()> {
    for (i, seq) in contigs {
        writeln!(writer, ">seq{}|len:{}", i, seq.len())?;
        writeln!(writer, "{seq}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_records() {
        let data = b">r1\nACGT\n>r2\nTTTT\n".as_slice();
        let reads = read_fasta(data).unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].name(), "r1");
        assert_eq!(reads[1].sequence(), "TTTT");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(read_fasta(b"".as_slice()).is_err());
    }
}
