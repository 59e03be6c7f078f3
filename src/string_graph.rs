//! The bidirected overlap graph: an arena of vertices (one per read) and an
//! arena of edges, linked by stable indices rather than owning pointers
//! (SPEC_FULL.md's Design Notes, §9: "Cyclic graphs & bidirectedness").

use crate::overlap::Overlap;
use crate::read::ReadId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

#[derive(Debug, Clone)]
pub struct Vertex {
    pub read: ReadId,
    pub read_len: u32,
    pub marked: bool,
    /// Edges filed under this read's "begin" (prefix) side.
    pub edges_begin: Vec<EdgeId>,
    /// Edges filed under this read's "end" (suffix) side.
    pub edges_end: Vec<EdgeId>,
}

impl Vertex {
    pub fn is_disconnected(&self) -> bool {
        self.edges_begin.is_empty() && self.edges_end.is_empty()
    }

    /// A tip candidate has exactly one side populated and the other empty.
    pub fn is_tip_candidate(&self) -> bool {
        self.edges_begin.is_empty() != self.edges_end.is_empty()
    }

    pub fn side(&self, end: bool) -> &[EdgeId] {
        if end { &self.edges_end } else { &self.edges_begin }
    }

    pub fn side_mut(&mut self, end: bool) -> &mut Vec<EdgeId> {
        if end { &mut self.edges_end } else { &mut self.edges_begin }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub src: VertexId,
    pub dst: VertexId,
    pub overlap: Overlap,
    /// The reverse-direction edge created from the same overlap.
    pub paired_edge: EdgeId,
    pub marked: bool,
}


#[derive(Debug, Clone, Copy)]
pub struct EdgeInfo {
    pub overlap_len: u32,
    pub err_rate: f64,
}

#[derive(Debug, Default)]
pub struct StringGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl StringGraph {
    pub fn new() -> Self {
        StringGraph::default()
    }

    /// Builds the graph from reads (by length, indexed by `ReadId`) and the
    /// filtered overlap set. Each overlap contributes two cross-paired edges.
    pub fn build(read_lens: &[u32], overlaps: &[Overlap]) -> Self {
        let mut vertices: Vec<Vertex> = read_lens
            .iter()
            .enumerate()
            .map(|(id, &len)| Vertex {
                read: id as ReadId,
                read_len: len,
                marked: false,
                edges_begin: Vec::new(),
                edges_end: Vec::new(),
            })
            .collect();

        let mut edges: Vec<Edge> = Vec::with_capacity(overlaps.len() * 2);

        for o in overlaps {
            let src_a = VertexId(o.a);
            let src_b = VertexId(o.b);
            let id_ab = EdgeId(edges.len() as u32);
            let id_ba = EdgeId(edges.len() as u32 + 1);

            edges.push(Edge { src: src_a, dst: src_b, overlap: *o, paired_edge: id_ba, marked: false });
            edges.push(Edge { src: src_b, dst: src_a, overlap: *o, paired_edge: id_ab, marked: false });

            let a_end = o.is_using_suffix(o.a);
            vertices[o.a as usize].side_mut(a_end).push(id_ab);
            let b_end = o.is_using_suffix(o.b);
            vertices[o.b as usize].side_mut(b_end).push(id_ba);
        }

        StringGraph { vertices, edges }
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0 as usize]
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.0 as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0 as usize]
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.iter().filter(|e| !e.marked).count()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len() as u32).map(VertexId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len() as u32).map(EdgeId)
    }

    /// Marks `edge` and its pair for removal.
    pub fn mark_edge(&mut self, id: EdgeId) {
        self.edges[id.0 as usize].marked = true;
        let pair = self.edges[id.0 as usize].paired_edge;
        self.edges[pair.0 as usize].marked = true;
    }

    pub fn mark_vertex(&mut self, id: VertexId) {
        self.vertices[id.0 as usize].marked = true;
    }

    /// Sweeps marked edges out of vertex side-lists, then drops marked
    /// vertices. Stable indices are preserved (marked slots stay but are
    /// excluded by `num_edges`/iteration helpers).
    pub fn sweep(&mut self) {
        for v in &mut self.vertices {
            v.edges_begin.retain(|e| !self.edges[e.0 as usize].marked);
            v.edges_end.retain(|e| !self.edges[e.0 as usize].marked);
        }
    }

    pub fn is_edge_marked(&self, id: EdgeId) -> bool {
        self.edges[id.0 as usize].marked
    }

    pub fn is_vertex_marked(&self, id: VertexId) -> bool {
        self.vertices[id.0 as usize].marked
    }

    /// Overlap length this edge contributes, from the destination's side.
    pub fn edge_overlap_len(&self, id: EdgeId) -> u32 {
        let e = &self.edges[id.0 as usize];
        e.overlap.length(self.vertex(e.dst).read)
    }

    pub fn edge_info(&self, id: EdgeId) -> EdgeInfo {
        let e = &self.edges[id.0 as usize];
        EdgeInfo { overlap_len: self.edge_overlap_len(id), err_rate: e.overlap.err_rate }
    }

    /// Length (bases) of the destination read's unused tail this edge
    /// would splice in when walked.
    pub fn edge_label_length(&self, id: EdgeId) -> u32 {
        let e = &self.edges[id.0 as usize];
        let dst = self.vertex(e.dst);
        e.overlap.hanging_length(dst.read, dst.read_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_pairs_edges() {
        let lens = vec![4u32, 4u32];
        let o = Overlap::from_dovetail(0, 4, 1, 4, 2, 2, false, 0.0);
        let g = StringGraph::build(&lens, &[o]);
        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.num_edges(), 2);
        let e0 = EdgeId(0);
        let e1 = g.edge(e0).paired_edge;
        assert_eq!(g.edge(e1).paired_edge, e0);
        assert_eq!(g.edge(e1).src, g.edge(e0).dst);
    }

    #[test]
    fn mark_edge_marks_pair() {
        let lens = vec![4u32, 4u32];
        let o = Overlap::from_dovetail(0, 4, 1, 4, 2, 2, false, 0.0);
        let mut g = StringGraph::build(&lens, &[o]);
        g.mark_edge(EdgeId(0));
        assert!(g.is_edge_marked(EdgeId(0)));
        assert!(g.is_edge_marked(EdgeId(1)));
    }
}
