//! Online ingestion of simplices.
//!
//! Each streamed triangle contributes its three edges as labelled paths and
//! then zips the two paths that leave its lowest and middle vertices
//! together with `collapse`. A tetrahedron does the same for three of its
//! faces (the fourth face is implied by the other three).
//!
//! Vertices are finalized when their remaining-incidence counter drops to
//! zero. Counters start at zero unless incidences were declared up front,
//! so by default every vertex is finalized when the stream closes.

use hashbrown::HashMap;

use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{NodeId, VertexId};
use crate::topology::records::{LabelTag, ReebNode};
use crate::topology::storage::ReebStorage;

/// A streamed vertex: its ingestion-order index and its node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Corner {
    pub index: u32,
    pub node: NodeId,
}

/// Bookkeeping of the simplex stream.
#[derive(Clone, Debug)]
pub struct StreamState {
    index_of: HashMap<VertexId, u32>,
    node_of: Vec<NodeId>,
    remaining: Vec<i64>,
    declared: HashMap<VertexId, i64>,
    closed: bool,
}

impl StreamState {
    pub fn with_capacity(capacity: usize) -> Self {
        StreamState {
            index_of: HashMap::with_capacity(capacity),
            node_of: Vec::with_capacity(capacity),
            remaining: Vec::with_capacity(capacity),
            declared: HashMap::new(),
            closed: false,
        }
    }

    /// Number of distinct vertices streamed so far.
    pub fn len(&self) -> usize {
        self.node_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_of.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Announce how many simplices will reference `vertex`, so it can be
    /// finalized as soon as its last simplex is streamed.
    pub fn declare_incidence(&mut self, vertex: VertexId, count: i64) {
        match self.index_of.get(&vertex) {
            Some(&i) => self.remaining[i as usize] = count,
            None => {
                self.declared.insert(vertex, count);
            }
        }
    }

    /// Corner of `vertex`, adding it to the graph on first sight. A vertex
    /// keeps the scalar it was first streamed with.
    pub fn corner(
        &mut self,
        storage: &mut ReebStorage,
        vertex: VertexId,
        scalar: f64,
    ) -> Result<Corner, ReebGraphError> {
        if let Some(&index) = self.index_of.get(&vertex) {
            return Ok(Corner {
                index,
                node: self.node_of[index as usize],
            });
        }
        let grow_failed = |requested| ReebGraphError::AllocationFailed {
            table: "vertex stream",
            requested,
        };
        let index = u32::try_from(self.node_of.len()).map_err(|_| grow_failed(self.node_of.len() + 1))?;
        self.node_of
            .try_reserve(1)
            .map_err(|_| grow_failed(self.node_of.len() + 1))?;
        self.remaining
            .try_reserve(1)
            .map_err(|_| grow_failed(self.remaining.len() + 1))?;
        self.index_of
            .try_reserve(1)
            .map_err(|_| grow_failed(self.index_of.len() + 1))?;

        let node = storage.add_mesh_vertex(vertex, scalar)?;
        self.index_of.insert(vertex, index);
        self.node_of.push(node);
        self.remaining
            .push(self.declared.remove(&vertex).unwrap_or(0));
        Ok(Corner { index, node })
    }

    /// Count one incidence of `corner` as consumed; true when it was the last.
    fn consume(&mut self, corner: Corner) -> bool {
        let left = &mut self.remaining[corner.index as usize];
        *left -= 1;
        *left == 0
    }
}

impl ReebStorage {
    /// Add a node for a mesh vertex and fold its scalar into the range.
    pub fn add_mesh_vertex(&mut self, vertex: VertexId, scalar: f64) -> Result<NodeId, ReebGraphError> {
        let n = self.nodes.allocate(ReebNode::new(vertex, scalar))?;
        self.scalars.insert(vertex, scalar);
        self.scalar_range = Some(match self.scalar_range {
            Some((lo, hi)) => (lo.min(scalar), hi.max(scalar)),
            None => (scalar, scalar),
        });
        Ok(n)
    }

    fn sort_corners(&self, corners: &mut [Corner]) {
        corners.sort_by(|a, b| self.nodes[a.node].key().cmp_key(&self.nodes[b.node].key()));
    }

    /// Trace the three edges of an ascending triangle and zip them.
    fn add_face(&mut self, c: [Corner; 3]) -> Result<(), ReebGraphError> {
        let l01 = LabelTag::edge(c[0].index, c[1].index);
        let l12 = LabelTag::edge(c[1].index, c[2].index);
        let l02 = LabelTag::edge(c[0].index, c[2].index);

        for (from, to, tag) in [(c[0], c[1], l01), (c[1], c[2], l12), (c[0], c[2], l02)] {
            if self.find_up_label(from.node, tag).is_none() {
                self.add_path(&[from.node, to.node], Some(tag))?;
            }
        }
        self.collapse(c[0].node, c[1].node, l01, l02)?;
        self.collapse(c[1].node, c[2].node, l12, l02)
    }

    pub fn add_mesh_triangle(
        &mut self,
        stream: &mut StreamState,
        mut corners: [Corner; 3],
    ) -> Result<(), ReebGraphError> {
        self.sort_corners(&mut corners);
        self.add_face(corners)?;
        for c in corners {
            if stream.consume(c) {
                self.end_vertex(c.node);
            }
        }
        Ok(())
    }

    pub fn add_mesh_tetrahedron(
        &mut self,
        stream: &mut StreamState,
        mut corners: [Corner; 4],
    ) -> Result<(), ReebGraphError> {
        self.sort_corners(&mut corners);
        let [c0, c1, c2, c3] = corners;
        for face in [[c0, c1, c2], [c0, c1, c3], [c0, c2, c3]] {
            self.add_face(face)?;
        }
        for c in corners {
            if stream.consume(c) {
                self.end_vertex(c.node);
            }
        }
        Ok(())
    }

    /// Mark `n` finalized, drop the label chains anchored at it, and
    /// collapse it if it turned out regular.
    pub fn end_vertex(&mut self, n: NodeId) {
        let Some(node) = self.nodes.get_mut(n) else {
            return;
        };
        node.is_finalized = true;
        self.simplify_labels(n, None, true, true);
        if self.nodes.is_live(n) && self.is_regular(n) {
            self.collapse_vertex(n);
        }
    }
}
