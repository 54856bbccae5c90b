//! The public Reeb graph.
//!
//! [`ReebGraph`] is built either by streaming simplices one at a time and
//! closing the stream, or in one call from a [`SimplicialMesh`] and one of
//! its point fields. Once closed it can be simplified any number of times;
//! the external [`SuperGraph`] is kept current after every call.
//!
//! ```
//! use reeb_graph::prelude::*;
//!
//! let mut g = ReebGraph::new();
//! g.stream_triangle([(0, 0.0), (1, 1.0), (2, 0.5)])?;
//! g.close_stream()?;
//! assert_eq!(g.number_of_nodes(), 2);
//! assert_eq!(g.number_of_arcs(), 1);
//! assert_eq!(g.super_graph().arcs()[0].interior, vec![2]);
//! # Ok::<(), ReebGraphError>(())
//! ```

use std::fmt;

use hashbrown::HashMap;

use crate::algs::ingest::{Corner, StreamState};
use crate::algs::metric::SimplificationMetric;
use crate::data::mesh::{FieldArray, FieldSelector, SimplicialMesh, validate_mesh};
use crate::debug_invariants::{DebugInvariants, violation};
use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, NodeId, VertexId};
use crate::topology::storage::ReebStorage;
use crate::topology::super_graph::SuperGraph;

/// Construction options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReebGraphOpts {
    /// Initial size of the vertex-stream tables.
    pub initial_stream_capacity: usize,
    /// When building from a mesh, count every vertex's incident cells first
    /// so vertices are finalized (and collapsed if regular) as soon as
    /// their last cell is streamed instead of when the stream closes.
    pub eager_finalization: bool,
}

impl Default for ReebGraphOpts {
    fn default() -> Self {
        Self {
            initial_stream_capacity: 1000,
            eager_finalization: false,
        }
    }
}

/// Reeb graph of a scalar field on a simplicial mesh.
#[derive(Clone, Debug)]
pub struct ReebGraph {
    opts: ReebGraphOpts,
    storage: ReebStorage,
    stream: StreamState,
    node_cursor: Option<NodeId>,
    arc_cursor: Option<ArcId>,
}

impl Default for ReebGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ReebGraph {
    pub fn new() -> Self {
        Self::with_opts(ReebGraphOpts::default())
    }

    pub fn with_opts(opts: ReebGraphOpts) -> Self {
        ReebGraph {
            opts,
            storage: ReebStorage::new(),
            stream: StreamState::with_capacity(opts.initial_stream_capacity),
            node_cursor: None,
            arc_cursor: None,
        }
    }

    pub fn opts(&self) -> &ReebGraphOpts {
        &self.opts
    }

    /// True once [`close_stream`](Self::close_stream) has run.
    pub fn is_closed(&self) -> bool {
        self.stream.is_closed()
    }

    // -------------------------------------------------------------------------
    // Streaming
    // -------------------------------------------------------------------------

    /// Feed one triangle, given as `(vertex id, scalar)` corners in any order.
    ///
    /// A vertex keeps the scalar it was first streamed with. The structure
    /// is validated after every simplex only under `strict-invariants`;
    /// otherwise once, when the stream closes.
    ///
    /// # Errors
    /// [`ReebGraphError::StreamClosed`] after `close_stream`,
    /// [`ReebGraphError::DegenerateSimplex`] when a vertex repeats.
    pub fn stream_triangle(&mut self, corners: [(VertexId, f64); 3]) -> Result<(), ReebGraphError> {
        let corners = self.admit(corners)?;
        self.storage.add_mesh_triangle(&mut self.stream, corners)?;
        #[cfg(feature = "strict-invariants")]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Feed one tetrahedron, given as `(vertex id, scalar)` corners in any
    /// order.
    ///
    /// # Errors
    /// Same as [`stream_triangle`](Self::stream_triangle).
    pub fn stream_tetrahedron(&mut self, corners: [(VertexId, f64); 4]) -> Result<(), ReebGraphError> {
        let corners = self.admit(corners)?;
        self.storage.add_mesh_tetrahedron(&mut self.stream, corners)?;
        #[cfg(feature = "strict-invariants")]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Check a simplex and resolve its corners, adding unseen vertices.
    fn admit<const N: usize>(
        &mut self,
        corners: [(VertexId, f64); N],
    ) -> Result<[Corner; N], ReebGraphError> {
        if self.stream.is_closed() {
            return Err(ReebGraphError::StreamClosed);
        }
        for (i, (v, _)) in corners.iter().enumerate() {
            if corners[..i].iter().any(|(w, _)| w == v) {
                return Err(ReebGraphError::DegenerateSimplex(*v));
            }
        }
        let mut resolved = Vec::with_capacity(N);
        for (v, f) in corners {
            resolved.push(self.stream.corner(&mut self.storage, v, f)?);
        }
        <[Corner; N]>::try_from(resolved).map_err(|_| violation!("unresolved simplex corner"))
    }

    /// Finish ingestion: derive the super-arcs, finalize every remaining
    /// vertex, drop all labels, and count loops and components.
    ///
    /// # Errors
    /// [`ReebGraphError::StreamClosed`] when called twice.
    pub fn close_stream(&mut self) -> Result<(), ReebGraphError> {
        if self.stream.is_closed() {
            return Err(ReebGraphError::StreamClosed);
        }
        let sketches = self.storage.chain_super_arcs();

        let pending: Vec<NodeId> = self
            .storage
            .nodes
            .iter()
            .filter(|(_, node)| !node.is_finalized)
            .map(|(n, _)| n)
            .collect();
        for n in pending {
            self.storage.end_vertex(n);
        }
        self.storage.forget_absorbed();
        self.storage.flush_labels();
        self.storage.install_super_graph(sketches);
        self.storage.find_loops();
        self.stream.close();

        log::debug!(
            "closed stream of {} vertices: {} nodes, {} arcs, {} loop(s), {} component(s)",
            self.stream.len(),
            self.number_of_nodes(),
            self.number_of_arcs(),
            self.number_of_loops(),
            self.number_of_connected_components()
        );
        self.debug_assert_invariants();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Bulk build
    // -------------------------------------------------------------------------

    /// Build from `mesh` and the point field picked by `selector`, then close
    /// the stream.
    ///
    /// Every cell and the field are checked before anything is streamed, so
    /// on error the graph is left as it was.
    pub fn build<M>(&mut self, mesh: &M, selector: FieldSelector) -> Result<(), ReebGraphError>
    where
        M: SimplicialMesh + ?Sized,
    {
        let field = mesh.point_data().select(&selector)?;
        self.build_with_field(mesh, field)
    }

    /// Build from `mesh` with an explicit scalar array, then close the
    /// stream.
    pub fn build_with_field<M>(&mut self, mesh: &M, field: &FieldArray) -> Result<(), ReebGraphError>
    where
        M: SimplicialMesh + ?Sized,
    {
        if self.stream.is_closed() {
            return Err(ReebGraphError::StreamClosed);
        }
        validate_mesh(mesh, field)?;

        if self.opts.eager_finalization {
            let mut incidence: HashMap<VertexId, i64> = HashMap::new();
            for cell in 0..mesh.num_cells() {
                for &v in mesh.cell_point_ids(cell) {
                    *incidence.entry(v).or_insert(0) += 1;
                }
            }
            for (v, count) in incidence {
                self.stream.declare_incidence(v, count);
            }
        }

        for cell in 0..mesh.num_cells() {
            match *mesh.cell_point_ids(cell) {
                [a, b, c] => self.stream_triangle([
                    (a, field.try_scalar(a)?),
                    (b, field.try_scalar(b)?),
                    (c, field.try_scalar(c)?),
                ])?,
                [a, b, c, d] => self.stream_tetrahedron([
                    (a, field.try_scalar(a)?),
                    (b, field.try_scalar(b)?),
                    (c, field.try_scalar(c)?),
                    (d, field.try_scalar(d)?),
                ])?,
                ref other => {
                    return Err(ReebGraphError::NotASimplicialMesh {
                        cell,
                        points: other.len(),
                        expected: mesh.kind().cell_type(),
                    });
                }
            }
        }
        self.close_stream()
    }

    // -------------------------------------------------------------------------
    // Simplification
    // -------------------------------------------------------------------------

    /// Cancel every feature cheaper than `threshold`, a fraction of the
    /// scalar range under the default persistence cost. Returns the number
    /// of arcs removed; a zero threshold does nothing.
    ///
    /// An open stream is closed first.
    pub fn simplify(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Result<usize, ReebGraphError> {
        if !self.stream.is_closed() {
            self.close_stream()?;
        }
        if threshold == 0.0 {
            return Ok(0);
        }
        log::debug!(
            "simplifying {} arcs below {threshold} ({})",
            self.number_of_arcs(),
            if metric.is_some() { "custom metric" } else { "persistence" }
        );
        let removed = self.storage.simplify(threshold, metric)?;
        log::debug!(
            "simplification removed {removed} arc(s): {} nodes, {} arcs, {} loop(s) left",
            self.number_of_nodes(),
            self.number_of_arcs(),
            self.number_of_loops()
        );
        self.debug_assert_invariants();
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn number_of_nodes(&self) -> usize {
        self.storage.nodes.len()
    }

    pub fn number_of_arcs(&self) -> usize {
        self.storage.arcs.len()
    }

    /// Independent cycles, as of the last close or simplification.
    pub fn number_of_loops(&self) -> usize {
        self.storage.loop_arcs.len()
    }

    pub fn number_of_connected_components(&self) -> usize {
        self.storage.connected_components
    }

    pub fn node_vertex_id(&self, n: NodeId) -> Option<VertexId> {
        self.storage.nodes.get(n).map(|node| node.vertex_id)
    }

    pub fn node_scalar_value(&self, n: NodeId) -> Option<f64> {
        self.storage.nodes.get(n).map(|node| node.value)
    }

    pub fn arc_down_node_id(&self, a: ArcId) -> Option<NodeId> {
        self.storage.arcs.get(a).map(|arc| arc.node0)
    }

    pub fn arc_up_node_id(&self, a: ArcId) -> Option<NodeId> {
        self.storage.arcs.get(a).map(|arc| arc.node1)
    }

    /// Scalar a vertex was streamed with.
    pub fn vertex_scalar(&self, v: VertexId) -> Option<f64> {
        self.storage.scalars.get(&v).copied()
    }

    /// `(min, max)` over every streamed vertex.
    pub fn scalar_range(&self) -> Option<(f64, f64)> {
        self.storage.scalar_range
    }

    /// Fill `out` with the arcs entering `n` from below.
    pub fn node_down_arc_ids(&self, n: NodeId, out: &mut Vec<ArcId>) {
        out.clear();
        if self.storage.nodes.is_live(n) {
            out.extend(self.storage.down_arcs(n));
        }
    }

    /// Fill `out` with the arcs leaving `n` upward.
    pub fn node_up_arc_ids(&self, n: NodeId, out: &mut Vec<ArcId>) {
        out.clear();
        if self.storage.nodes.is_live(n) {
            out.extend(self.storage.up_arcs(n));
        }
    }

    /// Live nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.storage.nodes.iter().map(|(n, _)| n)
    }

    /// Live arcs in id order.
    pub fn arcs(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.storage.arcs.iter().map(|(a, _)| a)
    }

    /// The external graph: surviving vertices and super-arcs with their
    /// absorbed vertices.
    pub fn super_graph(&self) -> &SuperGraph {
        &self.storage.super_graph
    }

    // -------------------------------------------------------------------------
    // Cursors
    // -------------------------------------------------------------------------

    /// Advance the node cursor to the next live node. At the last node the
    /// cursor stays put and that node is returned again.
    pub fn next_node_id(&mut self) -> Option<NodeId> {
        if let Some(n) = self.storage.nodes.next_live(self.node_cursor) {
            self.node_cursor = Some(n);
        }
        self.node_cursor
    }

    /// Move the node cursor back. Before first use this yields the first
    /// live node.
    pub fn previous_node_id(&mut self) -> Option<NodeId> {
        if self.node_cursor.is_none() {
            return self.next_node_id();
        }
        if let Some(n) = self.storage.nodes.previous_live(self.node_cursor) {
            self.node_cursor = Some(n);
        }
        self.node_cursor
    }

    pub fn next_arc_id(&mut self) -> Option<ArcId> {
        if let Some(a) = self.storage.arcs.next_live(self.arc_cursor) {
            self.arc_cursor = Some(a);
        }
        self.arc_cursor
    }

    pub fn previous_arc_id(&mut self) -> Option<ArcId> {
        if self.arc_cursor.is_none() {
            return self.next_arc_id();
        }
        if let Some(a) = self.storage.arcs.previous_live(self.arc_cursor) {
            self.arc_cursor = Some(a);
        }
        self.arc_cursor
    }

    /// Replace this graph with a copy of `src`, tables and cursors included.
    pub fn deep_copy(&mut self, src: &ReebGraph) {
        self.clone_from(src);
    }
}

impl fmt::Display for ReebGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reeb graph general statistics:")?;
        writeln!(f, "  Number Of Node(s): {}", self.number_of_nodes())?;
        writeln!(f, "  Number Of Arc(s): {}", self.number_of_arcs())?;
        writeln!(
            f,
            "  Number Of Connected Component(s): {}",
            self.number_of_connected_components()
        )?;
        write!(f, "  Number Of Loop(s): {}", self.number_of_loops())
    }
}

impl DebugInvariants for ReebGraph {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "reeb graph");
    }

    fn validate_invariants(&self) -> Result<(), ReebGraphError> {
        self.storage.validate_invariants()?;
        if self.stream.is_closed() {
            if !self.storage.labels.is_empty() {
                return Err(violation!(
                    "{} label(s) survived closing the stream",
                    self.storage.labels.len()
                ));
            }
            if let Some((n, _)) = self.storage.nodes.iter().find(|(_, node)| !node.is_finalized) {
                return Err(violation!("node {n} is not finalized after closing the stream"));
            }
            if let Some((a, _)) = self.storage.arcs.iter().find(|(_, arc)| !arc.absorbed.is_empty()) {
                return Err(violation!("arc {a} still holds absorbed vertices after closing the stream"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_triangle() -> ReebGraph {
        let mut g = ReebGraph::new();
        g.stream_triangle([(0, 0.0), (1, 1.0), (2, 0.5)]).unwrap();
        g.close_stream().unwrap();
        g
    }

    #[test]
    fn streaming_after_close_is_rejected() {
        let mut g = closed_triangle();
        let err = g.stream_triangle([(3, 0.0), (4, 1.0), (5, 2.0)]).unwrap_err();
        assert_eq!(err, ReebGraphError::StreamClosed);
        assert_eq!(g.close_stream(), Err(ReebGraphError::StreamClosed));
        assert_eq!(g.number_of_nodes(), 2);
    }

    #[test]
    fn repeated_vertex_is_rejected_without_side_effects() {
        let mut g = ReebGraph::new();
        let err = g.stream_tetrahedron([(0, 0.0), (1, 1.0), (0, 0.0), (2, 2.0)]).unwrap_err();
        assert_eq!(err, ReebGraphError::DegenerateSimplex(0));
        assert_eq!(g.number_of_nodes(), 0);
        assert_eq!(g.scalar_range(), None);
    }

    #[test]
    fn cursors_clamp_at_both_ends() {
        let mut g = closed_triangle();
        let nodes: Vec<_> = g.nodes().collect();
        assert_eq!(nodes.len(), 2);

        assert_eq!(g.previous_node_id(), Some(nodes[0]));
        assert_eq!(g.next_node_id(), Some(nodes[1]));
        assert_eq!(g.next_node_id(), Some(nodes[1]));
        assert_eq!(g.previous_node_id(), Some(nodes[0]));
        assert_eq!(g.previous_node_id(), Some(nodes[0]));

        let arc = g.next_arc_id().unwrap();
        assert_eq!(g.next_arc_id(), Some(arc));
        assert_eq!(g.arc_down_node_id(arc), Some(nodes[0]));
        assert_eq!(g.arc_up_node_id(arc), Some(nodes[1]));
    }

    #[test]
    fn empty_graph_has_no_cursor() {
        let mut g = ReebGraph::new();
        assert_eq!(g.next_node_id(), None);
        assert_eq!(g.previous_arc_id(), None);
    }

    #[test]
    fn adjacency_lists_are_cleared_first() {
        let g = closed_triangle();
        let mut out = vec![ArcId::new(99).unwrap()];
        let bottom = g.nodes().next().unwrap();
        g.node_down_arc_ids(bottom, &mut out);
        assert!(out.is_empty());
        g.node_up_arc_ids(bottom, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn summary_lists_the_counts() {
        let g = closed_triangle();
        let text = g.to_string();
        assert!(text.contains("Number Of Node(s): 2"));
        assert!(text.contains("Number Of Arc(s): 1"));
        assert!(text.contains("Number Of Connected Component(s): 1"));
        assert!(text.contains("Number Of Loop(s): 0"));
    }

    #[test]
    fn deep_copy_is_independent() {
        let g = closed_triangle();
        let mut copy = ReebGraph::new();
        copy.deep_copy(&g);
        assert_eq!(copy.number_of_arcs(), 1);
        assert_eq!(copy.super_graph(), g.super_graph());
        copy.validate_invariants().unwrap();
    }

    #[test]
    fn long_stream_validates_once_at_close() {
        let n = 40u64;
        let mut g = ReebGraph::new();
        for y in 0..n - 1 {
            for x in 0..n - 1 {
                let v = |dx: u64, dy: u64| {
                    let id = (y + dy) * n + x + dx;
                    (id, ((x + dx) * (y + dy)) as f64 + id as f64 * 1e-3)
                };
                g.stream_triangle([v(0, 0), v(1, 0), v(1, 1)]).unwrap();
                g.stream_triangle([v(0, 0), v(1, 1), v(0, 1)]).unwrap();
            }
        }
        g.close_stream().unwrap();
        g.validate_invariants().unwrap();
        assert_eq!(g.number_of_connected_components(), 1);
        assert_eq!(g.number_of_loops(), 0);
        assert_eq!(g.super_graph().absorbed_len() + g.super_graph().num_vertices(), (n * n) as usize);
    }

    #[test]
    fn simplify_closes_an_open_stream() {
        let mut g = ReebGraph::new();
        g.stream_triangle([(0, 0.0), (1, 1.0), (2, 0.5)]).unwrap();
        assert_eq!(g.simplify(0.0, None).unwrap(), 0);
        assert!(g.is_closed());
        g.validate_invariants().unwrap();
    }
}
