//! AFG-format read/overlap ingestion and contig-layout output.
//!
//! Reads: `{RED iid: eid: seq: qlt: cvg: clr:lo,hi }`.
//! Overlaps: `{OVL rds:a,b adj:{N|I} ahg: bhg: scr: }`.
//! Contigs: `{LAY {TLE clr:lo,hi off: src: rvc: } }`.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::error::{RaocError, Result};
use crate::extractor::{ContigPart, Walk};
use crate::overlap::Overlap;
use crate::read::Read;
use crate::string_graph::StringGraph;

fn block_fields(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Result<HashMap<String, String>> {
    let mut fields = HashMap::new();
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line == "}" {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(fields)
}

pub fn read_reads(reader: impl BufRead) -> Result<Vec<Read>> {
    let mut reads = Vec::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next() {
        let line = line?;
        if !line.trim().starts_with("{RED") {
            continue;
        }
        let fields = block_fields(&mut lines)?;
        let iid: u32 = fields
            .get("iid")
            .ok_or_else(|| RaocError::invalid_input("io::afg", "RED block missing iid"))?
            .parse()
            .map_err(|_| RaocError::invalid_input("io::afg", "non-numeric iid"))?;
        let eid = fields.get("eid").cloned().unwrap_or_else(|| iid.to_string());
        let seq = fields.get("seq").cloned().unwrap_or_default();
        let mut read = Read::new(iid, eid, &seq)?;
        if let Some(qlt) = fields.get("qlt") {
            read = read.with_quality(qlt.clone());
        }
        if let Some(cvg) = fields.get("cvg") {
            if let Ok(c) = cvg.parse::<f64>() {
                read.add_coverage(c - read.coverage());
            }
        }
        reads.push(read);
    }

    if reads.is_empty() {
        return Err(RaocError::invalid_input("io::afg", "no RED blocks found"));
    }
    reads.sort_by_key(|r| r.id());
    Ok(reads)
}

pub fn read_overlaps(reader: impl BufRead, read_lens: &HashMap<u32, u32>) -> Result<Vec<Overlap>> {
    let mut overlaps = Vec::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next() {
        let line = line?;
        if !line.trim().starts_with("{OVL") {
            continue;
        }
        let fields = block_fields(&mut lines)?;
        let rds = fields.get("rds").ok_or_else(|| RaocError::invalid_input("io::afg", "OVL missing rds"))?;
        let (a_str, b_str) = rds
            .split_once(',')
            .ok_or_else(|| RaocError::invalid_input("io::afg", "rds must be 'a,b'"))?;
        let a: u32 = a_str.trim().parse().map_err(|_| RaocError::invalid_input("io::afg", "bad rds a"))?;
        let b: u32 = b_str.trim().parse().map_err(|_| RaocError::invalid_input("io::afg", "bad rds b"))?;
        let is_innie = fields.get("adj").map(|s| s.trim() == "I").unwrap_or(false);
        let ahg: i64 = fields.get("ahg").and_then(|s| s.parse().ok()).unwrap_or(0);
        let bhg: i64 = fields.get("bhg").and_then(|s| s.parse().ok()).unwrap_or(0);

        let a_len = *read_lens
            .get(&a)
            .ok_or_else(|| RaocError::invalid_input("io::afg", format!("unknown read id {a}")))?;
        let b_len = *read_lens
            .get(&b)
            .ok_or_else(|| RaocError::invalid_input("io::afg", format!("unknown read id {b}")))?;

        overlaps.push(Overlap::from_dovetail(a, a_len, b, b_len, ahg, bhg, is_innie, 0.0));
    }

    Ok(overlaps)
}

/// Writes one `{OVL ...}` block per overlap.
pub fn write_overlaps(mut writer: impl Write, overlaps: &[Overlap]) -> Result<()> {
    for o in overlaps {
        writeln!(writer, "{{OVL")?;
        writeln!(writer, "rds:{},{}", o.a, o.b)?;
        writeln!(writer, "adj:{}", if o.is_innie() { "I" } else { "N" })?;
        writeln!(writer, "ahg:{}", o.a_lo as i64 - o.b_lo as i64)?;
        writeln!(writer, "bhg:{}", (o.b_hi as i64 - o.a_hi as i64))?;
        writeln!(writer, "scr:{}", o.err_rate)?;
        writeln!(writer, "}}")?;
    }
    Ok(())
}

/// Writes one `{LAY {TLE ...} }` block per extracted walk.
pub fn write_layout(mut writer: impl Write, graph: &StringGraph, walks: &[Walk]) -> Result<()> {
    for walk in walks {
        writeln!(writer, "{{LAY")?;
        let mut offset = 0i64;
        for ContigPart { vertex, reverse, .. } in &walk.parts {
            let v = graph.vertex(*vertex);
            writeln!(writer, "{{TLE")?;
            writeln!(writer, "clr:0,{}", v.read_len)?;
            writeln!(writer, "off:{offset}")?;
            writeln!(writer, "src:{}", v.read)?;
            writeln!(writer, "rvc:{}", if *reverse { 1 } else { 0 })?;
            writeln!(writer, "}}")?;
            offset += v.read_len as i64;
        }
        writeln!(writer, "}}")?;
    }
    Ok(())
}
