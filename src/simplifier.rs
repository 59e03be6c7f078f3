//! Tip trimming, bubble popping, and best-buddy reduction over a
//! `StringGraph` (SPEC_FULL.md §4.6).

use std::collections::HashMap;

use crate::config::Config;
use crate::edit_distance::{BandedOracle, EditDistanceOracle};
use crate::string_graph::{EdgeId, StringGraph, VertexId};

/// Runs trim/pop rounds until neither vertex nor edge count changes.
/// `sequences` is indexed by `VertexId` (one read per vertex), used by
/// bubble popping to compare losing walks against the survivor.
pub fn simplify(graph: &mut StringGraph, config: &Config, sequences: &[&str]) {
    loop {
        let before = (graph.num_vertices() - marked_vertex_count(graph), graph.num_edges());
        trim_tips(graph, config);
        pop_bubbles(graph, config, sequences);
        reduce_best_buddies(graph);
        graph.sweep();
        let after = (graph.num_vertices() - marked_vertex_count(graph), graph.num_edges());
        if before == after {
            break;
        }
    }
}

fn marked_vertex_count(graph: &StringGraph) -> usize {
    graph.vertex_ids().filter(|&v| graph.is_vertex_marked(v)).count()
}

/// Iterates tip removal to a fixed point.
pub fn trim_tips(graph: &mut StringGraph, config: &Config) {
    loop {
        let mut removed_any = false;
        for v in graph.vertex_ids() {
            if graph.is_vertex_marked(v) {
                continue;
            }
            let vertex = graph.vertex(v);
            if vertex.read_len > config.read_len_threshold {
                continue;
            }
            if vertex.is_disconnected() {
                graph.mark_vertex(v);
                removed_any = true;
                continue;
            }
            if vertex.is_tip_candidate() && is_removable_tip(graph, v, config) {
                for &e in vertex.side(true).iter().chain(vertex.side(false).iter()) {
                    graph.mark_edge(e);
                }
                graph.mark_vertex(v);
                removed_any = true;
            }
        }
        graph.sweep();
        if !removed_any {
            break;
        }
    }
}

fn populated_side(graph: &StringGraph, v: VertexId) -> Option<bool> {
    let vertex = graph.vertex(v);
    if !vertex.edges_end.is_empty() {
        Some(true)
    } else if !vertex.edges_begin.is_empty() {
        Some(false)
    } else {
        None
    }
}

fn is_removable_tip(graph: &StringGraph, v: VertexId, config: &Config) -> bool {
    let Some(side) = populated_side(graph, v) else { return false };
    let edges: Vec<EdgeId> = graph.vertex(v).side(side).to_vec();

    // "Dead leaf": every neighbor reached from our populated side has other
    // non-tip edges of its own (i.e. we are not its only connection out).
    let dead_leaf = edges.iter().all(|&e| {
        let dst = graph.edge(e).dst;
        let dst_vertex = graph.vertex(dst);
        dst_vertex.edges_begin.len() + dst_vertex.edges_end.len() > 1
    });
    if dead_leaf {
        return true;
    }

    // "Long tip": walk the singular chain starting at v; trim if the chain
    // is short and encounters at most one extra fork within the depth bound.
    let (chain_len, forks) = walk_chain(graph, v, side, config.max_depth_without_extra_fork as usize);
    chain_len <= config.max_reads_in_tip as usize && forks <= 1
}

fn walk_chain(graph: &StringGraph, start: VertexId, side: bool, max_depth: usize) -> (usize, usize) {
    let mut cur = start;
    let mut cur_side = side;
    let mut len = 1usize;
    let mut forks = 0usize;

    for _ in 0..max_depth {
        let edges = graph.vertex(cur).side(cur_side);
        if edges.len() != 1 {
            if edges.len() > 1 {
                forks += 1;
            }
            break;
        }
        let e = edges[0];
        let next = graph.edge(e).dst;
        if next == cur {
            break;
        }
        let next_vertex = graph.vertex(next);
        let entering_side = !graph.edge(e).overlap.is_using_suffix(next_vertex.read);
        let opposite_side = next_vertex.side(entering_side);
        if opposite_side.len() != 1 {
            forks += opposite_side.len().saturating_sub(1).min(1);
        }
        cur = next;
        cur_side = !entering_side;
        len += 1;
    }

    (len, forks)
}

/// Round-robin BFS bubble detection and resolution.
pub fn pop_bubbles(graph: &mut StringGraph, config: &Config, sequences: &[&str]) {
    for v in graph.vertex_ids().collect::<Vec<_>>() {
        if graph.is_vertex_marked(v) {
            continue;
        }
        for &side in &[true, false] {
            if graph.vertex(v).side(side).len() > 1 {
                try_pop_bubble(graph, v, side, config, sequences);
            }
        }
    }
}

/// Materializes a walk's DNA starting from `root`, following `path`,
/// reverse-complementing on each edge whose overlap is innie — the same
/// orientation-tracking idiom as `extractor::Walk::sequence`.
fn walk_dna(graph: &StringGraph, sequences: &[&str], root: VertexId, path: &[EdgeId]) -> String {
    let mut out = String::new();
    out.push_str(sequences[root.0 as usize]);
    let mut reverse = false;
    for &e in path {
        let edge = graph.edge(e);
        reverse ^= edge.overlap.is_innie();
        let full = sequences[edge.dst.0 as usize];
        let oriented = if reverse { crate::read::reverse_complement(full) } else { full.to_string() };
        let label_len = graph.edge_label_length(e) as usize;
        let start = oriented.len().saturating_sub(label_len);
        out.push_str(&oriented[start..]);
    }
    out
}

#[derive(Clone)]
struct Walk {
    root: usize,
    vertex: VertexId,
    side: bool,
    err_rate_sum: f64,
    coverage_sum: f64,
    path: Vec<EdgeId>,
}

fn expand(graph: &StringGraph, w: &Walk) -> Vec<Walk> {
    graph
        .vertex(w.vertex)
        .side(w.side)
        .iter()
        .map(|&e| {
            let dst = graph.edge(e).dst;
            let info = graph.edge_info(e);
            let entering_side = !graph.edge(e).overlap.is_using_suffix(graph.vertex(dst).read);
            let mut path = w.path.clone();
            path.push(e);
            Walk {
                root: w.root,
                vertex: dst,
                side: !entering_side,
                err_rate_sum: w.err_rate_sum + info.err_rate,
                coverage_sum: w.coverage_sum + info.overlap_len as f64,
                path,
            }
        })
        .collect()
}

/// Finds a round-robin bubble rooted at `(root, root_side)` and, if one
/// exists within `max_nodes`, scores every surviving walk and marks the
/// losers' edges for removal (keeping any edge still used by the winner).
fn try_pop_bubble(graph: &mut StringGraph, root: VertexId, root_side: bool, config: &Config, sequences: &[&str]) {
    let initial_edges = graph.vertex(root).side(root_side).to_vec();
    let want = initial_edges.len();
    if want < 2 {
        return;
    }

    let mut walks: Vec<Walk> = initial_edges
        .iter()
        .enumerate()
        .flat_map(|(root_idx, &e)| {
            let dst = graph.edge(e).dst;
            let info = graph.edge_info(e);
            let entering_side = !graph.edge(e).overlap.is_using_suffix(graph.vertex(dst).read);
            Some(Walk {
                root: root_idx,
                vertex: dst,
                side: !entering_side,
                err_rate_sum: info.err_rate,
                coverage_sum: info.overlap_len as f64,
                path: vec![e],
            })
        })
        .collect();

    let mut nodes_explored = 0usize;

    let junction_walks: Vec<Walk> = loop {
        nodes_explored += walks.len();
        if nodes_explored > config.max_nodes {
            return;
        }

        let mut by_vertex: HashMap<VertexId, Vec<usize>> = HashMap::new();
        for (i, w) in walks.iter().enumerate() {
            by_vertex.entry(w.vertex).or_default().push(i);
        }

        let junction = by_vertex.iter().find_map(|(_, idxs)| {
            let mut seen = std::collections::HashSet::new();
            let mut chosen = Vec::new();
            for &i in idxs {
                if seen.insert(walks[i].root) {
                    chosen.push(i);
                }
            }
            (chosen.len() == want).then_some(chosen)
        });

        if let Some(chosen) = junction {
            break chosen.into_iter().map(|i| walks[i].clone()).collect();
        }

        let mut next = Vec::new();
        for w in &walks {
            next.extend(expand(graph, w));
        }
        if next.is_empty() {
            return;
        }
        walks = next;
    };

    let survivor_idx = junction_walks
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| score(a).partial_cmp(&score(b)).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap();

    let survivor_edges: std::collections::HashSet<EdgeId> =
        junction_walks[survivor_idx].path.iter().copied().collect();
    let survivor_seq = walk_dna(graph, sequences, root, &junction_walks[survivor_idx].path);
    let oracle = BandedOracle;

    for (i, w) in junction_walks.iter().enumerate() {
        if i == survivor_idx {
            continue;
        }

        // Only collapse walks that are plausibly the same variant as the
        // survivor: close enough in length, and within edit-distance
        // budget once aligned. A fork that happens to satisfy the hang
        // tolerance but diverges in content is a real branch, not a bubble.
        let candidate_seq = walk_dna(graph, sequences, root, &w.path);
        let len_diff = (candidate_seq.len() as f64 - survivor_seq.len() as f64).abs();
        if len_diff > config.max_difference * survivor_seq.len() as f64 {
            continue;
        }
        let max_allowed = (config.max_difference * survivor_seq.len() as f64) as usize;
        if oracle.edit_distance(&candidate_seq, &survivor_seq, max_allowed).is_none() {
            continue;
        }

        for &e in &w.path {
            if !survivor_edges.contains(&e) {
                graph.mark_edge(e);
            }
        }
    }
}

fn score(w: &Walk) -> f64 {
    let mean_err_rate = w.err_rate_sum / w.path.len().max(1) as f64;
    (1.0 - mean_err_rate) * w.coverage_sum
}

/// Best-buddy reduction: mutual best-overlap pairs keep only their shared
/// edge on both sides.
pub fn reduce_best_buddies(graph: &mut StringGraph) {
    let mut best: HashMap<(VertexId, bool), EdgeId> = HashMap::new();

    for v in graph.vertex_ids() {
        if graph.is_vertex_marked(v) {
            continue;
        }
        for &side in &[true, false] {
            if let Some(&e) = graph
                .vertex(v)
                .side(side)
                .iter()
                .max_by_key(|&&e| graph.edge_overlap_len(e))
            {
                best.insert((v, side), e);
            }
        }
    }

    let mut to_mark = Vec::new();
    for (&(v, side), &e) in &best {
        let dst = graph.edge(e).dst;
        let paired = graph.edge(e).paired_edge;
        let dst_side = graph
            .vertex(dst)
            .edges_begin
            .contains(&paired)
            .then_some(false)
            .or_else(|| graph.vertex(dst).edges_end.contains(&paired).then_some(true));
        let Some(dst_side) = dst_side else { continue };
        if best.get(&(dst, dst_side)) == Some(&paired) {
            for &other in graph.vertex(v).side(side) {
                if other != e {
                    to_mark.push(other);
                }
            }
        }
    }

    for e in to_mark {
        graph.mark_edge(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::Overlap;

    #[test]
    fn disconnected_vertex_trimmed() {
        let lens = vec![4u32, 4u32, 4u32];
        let o = Overlap::from_dovetail(0, 4, 1, 4, 2, 2, false, 0.0);
        let mut g = StringGraph::build(&lens, &[o]);
        let config = Config::default();
        trim_tips(&mut g, &config);
        assert!(g.is_vertex_marked(VertexId(2)));
        assert!(!g.is_vertex_marked(VertexId(0)));
    }
}
