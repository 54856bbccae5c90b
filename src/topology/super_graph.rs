//! The external graph handed to callers.
//!
//! Vertices are the mesh vertices that survived as nodes; each super-arc
//! runs from a lower to a higher vertex and carries, in ascending scalar
//! order, the mesh vertices it absorbed (regular vertices collapsed while
//! building, and critical vertices removed by simplification).

use serde::{Deserialize, Serialize};

use crate::topology::handle::VertexId;

/// Directed super-arc between two vertex slots of a [`SuperGraph`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperArc {
    /// Index of the lower endpoint in [`SuperGraph::vertices`].
    pub source: usize,
    /// Index of the upper endpoint in [`SuperGraph::vertices`].
    pub target: usize,
    /// Absorbed mesh vertices, sorted by (scalar, vertex id).
    pub interior: Vec<VertexId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperGraph {
    vertices: Vec<VertexId>,
    arcs: Vec<SuperArc>,
}

impl SuperGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.arcs.clear();
    }

    /// Add a vertex, returning its slot.
    pub fn add_vertex(&mut self, vertex: VertexId) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    pub fn add_arc(&mut self, source: usize, target: usize, interior: Vec<VertexId>) {
        self.arcs.push(SuperArc {
            source,
            target,
            interior,
        });
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn arcs(&self) -> &[SuperArc] {
        &self.arcs
    }

    /// Mesh vertex id stored in slot `slot`.
    pub fn vertex_id(&self, slot: usize) -> Option<VertexId> {
        self.vertices.get(slot).copied()
    }

    /// Endpoints of `arc` as mesh vertex ids, lower first.
    pub fn arc_endpoints(&self, arc: &SuperArc) -> Option<(VertexId, VertexId)> {
        Some((self.vertex_id(arc.source)?, self.vertex_id(arc.target)?))
    }

    /// First super-arc running from mesh vertex `down` to mesh vertex `up`.
    pub fn find_arc(&self, down: VertexId, up: VertexId) -> Option<&SuperArc> {
        self.arcs
            .iter()
            .find(|arc| self.arc_endpoints(arc) == Some((down, up)))
    }

    /// Total number of absorbed vertices over every super-arc.
    pub fn absorbed_len(&self) -> usize {
        self.arcs.iter().map(|a| a.interior.len()).sum()
    }
}
