//! DOT graph output: one undirected edge per overlap, arrowheads encoding
//! which end of each read the overlap uses.

use std::io::Write;

use crate::error::Result;
use crate::overlap::Overlap;
use crate::read::ReadId;

fn arrow_style(uses_prefix: bool, uses_suffix: bool) -> &'static str {
    match (uses_prefix, uses_suffix) {
        (true, true) => "box",
        (true, false) => "dot",
        (false, true) => "odot",
        (false, false) => "none",
    }
}

pub fn write_overlap_graph(mut writer: impl Write, overlaps: &[Overlap]) -> Result<()> {
    writeln!(writer, "graph overlaps {{")?;
    for o in overlaps {
        let a_style = arrow_style(o.is_using_prefix(o.a), o.is_using_suffix(o.a));
        let b_style = arrow_style(o.is_using_prefix(o.b), o.is_using_suffix(o.b));
        writeln!(
            writer,
            "  {} -- {} [label=\"{:.3}\", arrowhead={}, arrowtail={}, dir=both];",
            node_name(o.a),
            node_name(o.b),
            o.err_rate,
            b_style,
            a_style,
        )?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

fn node_name(id: ReadId) -> String {
    format!("r{id}")
}
