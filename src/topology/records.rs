//! Node, arc and label records.
//!
//! Arcs are threaded into two intrusive doubly-linked lists:
//!
//! * the *up list* of `node0` (every arc leaving a node upward), linked
//!   through `next_up`/`prev_up`;
//! * the *down list* of `node1` (every arc entering a node from below),
//!   linked through `next_down`/`prev_down`.
//!
//! Labels attached to one arc form its horizontal list
//! (`label_head`..`label_tail`, linked by `h_prev`/`h_next`). Labels of the
//! same tag on consecutive arcs form a vertical chain (`v_prev`/`v_next`)
//! that traces one mesh edge through the graph.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::topology::handle::{ArcId, LabelId, NodeId, VertexId};

/// One mesh vertex in the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ReebNode {
    pub vertex_id: VertexId,
    pub value: f64,
    /// Head of the list of arcs whose `node1` is this node.
    pub arc_down: Option<ArcId>,
    /// Head of the list of arcs whose `node0` is this node.
    pub arc_up: Option<ArcId>,
    pub is_finalized: bool,
    pub is_critical: bool,
}

impl ReebNode {
    pub fn new(vertex_id: VertexId, value: f64) -> Self {
        ReebNode {
            vertex_id,
            value,
            arc_down: None,
            arc_up: None,
            is_finalized: false,
            is_critical: false,
        }
    }

    #[inline]
    pub fn key(&self) -> OrderKey {
        OrderKey {
            value: self.value,
            vertex_id: self.vertex_id,
        }
    }
}

/// Directed arc from the lower `node0` to the higher `node1`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReebArc {
    pub node0: NodeId,
    pub node1: NodeId,
    /// Previous arc in `node0`'s up list.
    pub prev_up: Option<ArcId>,
    /// Next arc in `node0`'s up list.
    pub next_up: Option<ArcId>,
    /// Previous arc in `node1`'s down list.
    pub prev_down: Option<ArcId>,
    /// Next arc in `node1`'s down list.
    pub next_down: Option<ArcId>,
    pub label_head: Option<LabelId>,
    pub label_tail: Option<LabelId>,
    /// Mesh vertices collapsed into this arc while streaming, in no
    /// particular order. Emptied when the stream closes.
    pub absorbed: Vec<VertexId>,
}

impl ReebArc {
    /// Unlinked, unlabelled arc from `node0` to `node1`.
    pub fn between(node0: NodeId, node1: NodeId) -> Self {
        ReebArc {
            node0,
            node1,
            prev_up: None,
            next_up: None,
            prev_down: None,
            next_down: None,
            label_head: None,
            label_tail: None,
            absorbed: Vec::new(),
        }
    }
}

/// Path tag carried by a label.
///
/// Mesh edges are tagged by packing the stream indices of their two
/// endpoints, lower endpoint in the low 32 bits. Simplification uses two
/// reserved route tags; labels are flushed before simplification starts so
/// the two families never meet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelTag(pub u64);

impl LabelTag {
    /// Path that is being cancelled.
    pub const ROUTE_OLD: LabelTag = LabelTag(100);
    /// Path the cancelled branch is rerouted onto.
    pub const ROUTE_NEW: LabelTag = LabelTag(200);

    /// Tag of the mesh edge between two streamed vertices.
    #[inline]
    pub fn edge(low: u32, high: u32) -> Self {
        LabelTag(u64::from(low) | (u64::from(high) << 32))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReebLabel {
    pub arc: ArcId,
    pub tag: LabelTag,
    pub h_prev: Option<LabelId>,
    pub h_next: Option<LabelId>,
    pub v_prev: Option<LabelId>,
    pub v_next: Option<LabelId>,
}

/// One cancellation recorded while simplifying: the arcs (as vertex pairs)
/// that disappeared and the arcs that replaced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub removed: Vec<(VertexId, VertexId)>,
    pub inserted: Vec<(VertexId, VertexId)>,
}

// -----------------------------------------------------------------------------
// Total order on nodes
// -----------------------------------------------------------------------------

/// Sort key of a node: scalar value, ties broken by vertex id.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrderKey {
    pub value: f64,
    pub vertex_id: VertexId,
}

impl OrderKey {
    pub fn new(value: f64, vertex_id: VertexId) -> Self {
        OrderKey { value, vertex_id }
    }

    #[inline]
    pub fn cmp_key(&self, other: &OrderKey) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(self.vertex_id.cmp(&other.vertex_id))
    }

    #[inline]
    pub fn precedes(&self, other: &OrderKey) -> bool {
        self.cmp_key(other) == Ordering::Less
    }
}
