//! Unitig extraction and longest-walk contig extraction over a simplified
//! `StringGraph` (SPEC_FULL.md §4.7).

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::config::Config;
use crate::string_graph::{EdgeId, StringGraph, VertexId};

#[derive(Debug, Clone)]
pub struct ContigPart {
    pub vertex: VertexId,
    pub reverse: bool,
    /// The edge this part was reached by; `None` for the walk's first part.
    pub via: Option<EdgeId>,
}

#[derive(Debug, Clone)]
pub struct Walk {
    pub parts: Vec<ContigPart>,
    pub length: i64,
}

impl Walk {
    /// Materializes the walk's DNA sequence: the first read in full,
    /// orientation-adjusted, followed by each subsequent edge's label
    /// (the unused tail its overlap contributes).
    pub fn sequence(&self, graph: &StringGraph, sequences: &[&str]) -> String {
        let mut out = String::new();
        for part in &self.parts {
            let full = sequences[part.vertex.0 as usize];
            let oriented = if part.reverse { crate::read::reverse_complement(full) } else { full.to_string() };
            match part.via {
                None => out.push_str(&oriented),
                Some(edge) => {
                    let label_len = graph.edge_label_length(edge) as usize;
                    let start = oriented.len().saturating_sub(label_len);
                    out.push_str(&oriented[start..]);
                }
            }
        }
        out
    }
}

/// Maximal walks along mutually-best overlap edges. Every vertex belongs to
/// at most one unitig.
pub fn extract_unitigs(graph: &StringGraph) -> Vec<Walk> {
    let best = best_edges(graph);
    let mut assigned: HashSet<VertexId> = HashSet::new();
    let mut unitigs = Vec::new();

    for v in graph.vertex_ids() {
        if graph.is_vertex_marked(v) || assigned.contains(&v) {
            continue;
        }
        let walk = extend_unitig(graph, &best, v, &mut assigned);
        unitigs.push(walk);
    }

    unitigs
}

fn best_edges(graph: &StringGraph) -> HashMap<(VertexId, bool), EdgeId> {
    let mut best = HashMap::new();
    for v in graph.vertex_ids() {
        if graph.is_vertex_marked(v) {
            continue;
        }
        for &side in &[true, false] {
            if let Some(&e) = graph.vertex(v).side(side).iter().max_by_key(|&&e| graph.edge_overlap_len(e)) {
                best.insert((v, side), e);
            }
        }
    }
    best
}

fn is_mutual_best(graph: &StringGraph, best: &HashMap<(VertexId, bool), EdgeId>, v: VertexId, side: bool, e: EdgeId) -> bool {
    let dst = graph.edge(e).dst;
    let paired = graph.edge(e).paired_edge;
    for &dst_side in &[true, false] {
        if graph.vertex(dst).side(dst_side).contains(&paired) {
            return best.get(&(dst, dst_side)) == Some(&paired);
        }
    }
    let _ = v;
    false
}

fn extend_unitig(
    graph: &StringGraph,
    best: &HashMap<(VertexId, bool), EdgeId>,
    start: VertexId,
    assigned: &mut HashSet<VertexId>,
) -> Walk {
    let mut parts = vec![ContigPart { vertex: start, reverse: false, via: None }];
    assigned.insert(start);
    let mut length = graph.vertex(start).read_len as i64;

    for initial_side in [true, false] {
        let mut cur = start;
        let mut side = initial_side;
        loop {
            let Some(&e) = best.get(&(cur, side)) else { break };
            if !is_mutual_best(graph, best, cur, side, e) {
                break;
            }
            let dst = graph.edge(e).dst;
            if assigned.contains(&dst) {
                break;
            }
            length += graph.edge_label_length(e) as i64;
            assigned.insert(dst);
            let entering_side = !graph.edge(e).overlap.is_using_suffix(graph.vertex(dst).read);
            if initial_side {
                parts.push(ContigPart { vertex: dst, reverse: false, via: Some(e) });
            } else {
                // `cur` is always parts[0] on entry to a backward step; its
                // predecessor is about to become `dst`, so the edge moves
                // onto it, and the new front part has no predecessor yet.
                parts[0].via = Some(e);
                parts.insert(0, ContigPart { vertex: dst, reverse: false, via: None });
            }
            cur = dst;
            side = !entering_side;
        }
    }

    Walk { parts, length }
}

/// Weakly connected components as vertex-id sets.
pub fn connected_components(graph: &StringGraph) -> Vec<Vec<VertexId>> {
    let mut visited: HashSet<VertexId> = HashSet::new();
    let mut components = Vec::new();

    for v in graph.vertex_ids() {
        if graph.is_vertex_marked(v) || visited.contains(&v) {
            continue;
        }
        let mut stack = vec![v];
        let mut component = Vec::new();
        visited.insert(v);
        while let Some(cur) = stack.pop() {
            component.push(cur);
            let vertex = graph.vertex(cur);
            for &e in vertex.edges_begin.iter().chain(vertex.edges_end.iter()) {
                let dst = graph.edge(e).dst;
                if !graph.is_vertex_marked(dst) && visited.insert(dst) {
                    stack.push(dst);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Memoized longest-path DFS, mirroring the original `longestPath`: a
/// vertex visited earlier in the current recursion contributes 0 (cycle),
/// and the cache key is `(vertex, entering_as_begin)`.
fn longest_path(
    graph: &StringGraph,
    vertex: VertexId,
    as_begin: bool,
    cache: &mut HashMap<(VertexId, bool), i64>,
    visiting: &mut HashSet<VertexId>,
) -> i64 {
    if let Some(&v) = cache.get(&(vertex, as_begin)) {
        return v;
    }
    if visiting.contains(&vertex) {
        return 0;
    }
    visiting.insert(vertex);

    let v = graph.vertex(vertex);
    let edges = v.side(as_begin).to_vec();
    let mut max_len = v.read_len as i64;

    for e in edges {
        let next_as_begin = as_begin ^ graph.edge(e).overlap.is_innie();
        let next_vertex = graph.edge(e).dst;
        let next_len = graph.vertex(next_vertex).read_len as i64;
        let sub = longest_path(graph, next_vertex, next_as_begin, cache, visiting);
        let candidate = sub + v.read_len as i64 + graph.edge_label_length(e) as i64 - next_len;
        max_len = max_len.max(candidate);
    }

    visiting.remove(&vertex);
    cache.insert((vertex, as_begin), max_len);
    max_len
}

/// Extracts the single longest walk per connected component, exploring the
/// top `max_start_nodes` candidate starts in parallel.
pub fn extract_longest_walks(graph: &StringGraph, config: &Config) -> Vec<Walk> {
    let components = connected_components(graph);

    components
        .par_iter()
        .filter_map(|component| extract_component_walk(graph, component, config))
        .collect()
}

fn extract_component_walk(graph: &StringGraph, component: &[VertexId], config: &Config) -> Option<Walk> {
    if component.is_empty() {
        return None;
    }

    let mut candidates: Vec<(VertexId, bool)> = component
        .iter()
        .flat_map(|&v| {
            let vertex = graph.vertex(v);
            let mut out = Vec::new();
            if vertex.edges_begin.len() <= 1 && vertex.edges_end.len() <= 1 {
                out.push((v, true));
            }
            if vertex.edges_begin.len() > 1 || vertex.edges_end.len() > 1 {
                out.push((v, true));
                out.push((v, false));
            }
            out
        })
        .collect();

    if candidates.is_empty() {
        candidates.push((component[0], true));
    }

    let mut cache = HashMap::new();
    let mut visiting = HashSet::new();
    candidates.sort_by_key(|&(v, as_begin)| {
        std::cmp::Reverse(longest_path(graph, v, as_begin, &mut cache, &mut visiting))
    });
    candidates.truncate(config.max_start_nodes);

    let best = candidates.into_iter().max_by_key(|&(v, as_begin)| {
        let mut cache = HashMap::new();
        let mut visiting = HashSet::new();
        longest_path(graph, v, as_begin, &mut cache, &mut visiting)
    })?;

    Some(materialize_walk(graph, best.0, best.1, config))
}

/// Greedily walks from `(start, as_begin)` following the highest-scoring
/// edge at each step (branch budget bounded by `max_branches`), turning the
/// abstract longest-path length into a concrete sequence of vertices.
fn materialize_walk(graph: &StringGraph, start: VertexId, as_begin: bool, config: &Config) -> Walk {
    let mut parts = vec![ContigPart { vertex: start, reverse: !as_begin, via: None }];
    let mut length = graph.vertex(start).read_len as i64;
    let mut cur = start;
    let mut cur_as_begin = as_begin;
    let mut visited: HashSet<VertexId> = HashSet::from([start]);
    let mut branches_left = config.max_branches;

    loop {
        let edges = graph.vertex(cur).side(cur_as_begin).to_vec();
        let candidates: Vec<EdgeId> = edges.into_iter().filter(|&e| !visited.contains(&graph.edge(e).dst)).collect();
        if candidates.is_empty() {
            break;
        }

        let best_score = candidates
            .iter()
            .map(|&e| overlap_score(graph, e))
            .fold(f64::MIN, f64::max);
        let threshold = (1.0 - config.quality_threshold) * best_score;
        let viable: Vec<EdgeId> = candidates.into_iter().filter(|&e| overlap_score(graph, e) >= threshold).collect();

        if viable.len() > 1 {
            if branches_left == 0 {
                break;
            }
            branches_left -= 1;
        }

        let chosen = *viable
            .iter()
            .max_by(|&&a, &&b| overlap_score(graph, a).partial_cmp(&overlap_score(graph, b)).unwrap())
            .unwrap();

        let dst = graph.edge(chosen).dst;
        let next_as_begin = cur_as_begin ^ graph.edge(chosen).overlap.is_innie();
        length += graph.edge_label_length(chosen) as i64;
        visited.insert(dst);
        parts.push(ContigPart { vertex: dst, reverse: !next_as_begin, via: Some(chosen) });
        cur = dst;
        cur_as_begin = next_as_begin;
    }

    Walk { parts, length }
}

fn overlap_score(graph: &StringGraph, e: EdgeId) -> f64 {
    let info = graph.edge_info(e);
    let a_len = graph.vertex(graph.edge(e).src).read_len.max(1) as f64;
    let b_len = graph.vertex(graph.edge(e).dst).read_len.max(1) as f64;
    let covered = (info.overlap_len as f64 / a_len) + (info.overlap_len as f64 / b_len);
    covered * (1.0 - info.err_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::Overlap;

    #[test]
    fn single_chain_yields_one_component() {
        let lens = vec![4u32, 4u32, 4u32];
        let o1 = Overlap::from_dovetail(0, 4, 1, 4, 2, 2, false, 0.0);
        let o2 = Overlap::from_dovetail(1, 4, 2, 4, 1, 1, false, 0.0);
        let g = StringGraph::build(&lens, &[o1, o2]);
        let comps = connected_components(&g);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].len(), 3);
    }
}
