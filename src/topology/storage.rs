//! Record storage of a Reeb graph and its primitive operations.
//!
//! [`ReebStorage`] owns the three record tables together with the
//! bookkeeping every algorithm needs (scalar samples, scalar range,
//! cancellation history, loop table, the external super-graph). The
//! primitives here splice arcs in and out of the intrusive adjacency lists;
//! the algorithms in [`crate::algs`] add their own `impl ReebStorage` blocks.

use std::collections::BTreeMap;

use crate::debug_invariants::{DebugInvariants, violation};
use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, LabelId, NodeId, VertexId};
use crate::topology::records::{Cancellation, LabelTag, OrderKey, ReebArc, ReebLabel, ReebNode};
use crate::topology::super_graph::SuperGraph;
use crate::topology::table::RecordTable;

/// Every table and counter of one Reeb graph.
#[derive(Clone, Debug)]
pub struct ReebStorage {
    pub nodes: RecordTable<NodeId, ReebNode>,
    pub arcs: RecordTable<ArcId, ReebArc>,
    pub labels: RecordTable<LabelId, ReebLabel>,
    /// Scalar value of every vertex seen so far.
    pub scalars: BTreeMap<VertexId, f64>,
    /// Running `(min, max)` over every added vertex.
    pub scalar_range: Option<(f64, f64)>,
    pub history: Vec<Cancellation>,
    pub history_on: bool,
    /// One arc per independent cycle, refreshed by `find_loops`.
    pub loop_arcs: Vec<ArcId>,
    pub connected_components: usize,
    pub super_graph: SuperGraph,
}

impl Default for ReebStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ReebStorage {
    pub fn new() -> Self {
        ReebStorage {
            nodes: RecordTable::new("node"),
            arcs: RecordTable::new("arc"),
            labels: RecordTable::new("label"),
            scalars: BTreeMap::new(),
            scalar_range: None,
            history: Vec::new(),
            history_on: false,
            loop_arcs: Vec::new(),
            connected_components: 0,
            super_graph: SuperGraph::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Order and measures
    // -------------------------------------------------------------------------

    /// `a` strictly precedes `b` in (value, vertex id) order.
    #[inline]
    pub fn is_smaller(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[a].key().precedes(&self.nodes[b].key())
    }

    /// `a` strictly follows `b` in (value, vertex id) order.
    #[inline]
    pub fn is_higher_than(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[b].key().precedes(&self.nodes[a].key())
    }

    /// Sort key of a streamed mesh vertex; unknown vertices sort last.
    pub fn vertex_key(&self, v: VertexId) -> OrderKey {
        OrderKey::new(self.scalars.get(&v).copied().unwrap_or(f64::INFINITY), v)
    }

    #[inline]
    pub fn vertex(&self, n: NodeId) -> VertexId {
        self.nodes[n].vertex_id
    }

    /// Vertex ids of an arc's endpoints, lower first.
    #[inline]
    pub fn arc_vertices(&self, a: ArcId) -> (VertexId, VertexId) {
        let arc = &self.arcs[a];
        (self.vertex(arc.node0), self.vertex(arc.node1))
    }

    /// Scalar span of an arc normalized by the global scalar range.
    ///
    /// A field with zero range has no significant feature: every arc then
    /// has persistence 0.
    pub fn persistence(&self, a: ArcId) -> f64 {
        let arc = &self.arcs[a];
        let span = self.nodes[arc.node1].value - self.nodes[arc.node0].value;
        match self.scalar_range {
            Some((min, max)) if max > min => span / (max - min),
            _ => 0.0,
        }
    }

    /// Exactly one arc below, exactly one arc above, and not pinned critical.
    pub fn is_regular(&self, n: NodeId) -> bool {
        let node = &self.nodes[n];
        if node.is_critical {
            return false;
        }
        match (node.arc_down, node.arc_up) {
            (Some(d), Some(u)) => {
                self.arcs[d].next_down.is_none() && self.arcs[u].next_up.is_none()
            }
            _ => false,
        }
    }

    pub fn up_degree(&self, n: NodeId) -> usize {
        self.up_arcs(n).count()
    }

    pub fn down_degree(&self, n: NodeId) -> usize {
        self.down_arcs(n).count()
    }

    // -------------------------------------------------------------------------
    // List walks
    // -------------------------------------------------------------------------

    /// Arcs leaving `n` upward, most recently linked first.
    pub fn up_arcs(&self, n: NodeId) -> impl Iterator<Item = ArcId> + '_ {
        std::iter::successors(self.nodes[n].arc_up, move |&a| self.arcs[a].next_up)
    }

    /// Arcs entering `n` from below, most recently linked first.
    pub fn down_arcs(&self, n: NodeId) -> impl Iterator<Item = ArcId> + '_ {
        std::iter::successors(self.nodes[n].arc_down, move |&a| self.arcs[a].next_down)
    }

    /// Labels on arc `a`, head to tail.
    pub fn arc_labels(&self, a: ArcId) -> impl Iterator<Item = LabelId> + '_ {
        std::iter::successors(self.arcs[a].label_head, move |&l| self.labels[l].h_next)
    }

    // -------------------------------------------------------------------------
    // Adjacency splicing
    // -------------------------------------------------------------------------

    /// Push `a` at the head of `n`'s up list.
    pub fn add_up_arc(&mut self, n: NodeId, a: ArcId) {
        let head = self.nodes[n].arc_up;
        let arc = &mut self.arcs[a];
        arc.prev_up = None;
        arc.next_up = head;
        if let Some(h) = head {
            self.arcs[h].prev_up = Some(a);
        }
        self.nodes[n].arc_up = Some(a);
    }

    /// Push `a` at the head of `n`'s down list.
    pub fn add_down_arc(&mut self, n: NodeId, a: ArcId) {
        let head = self.nodes[n].arc_down;
        let arc = &mut self.arcs[a];
        arc.prev_down = None;
        arc.next_down = head;
        if let Some(h) = head {
            self.arcs[h].prev_down = Some(a);
        }
        self.nodes[n].arc_down = Some(a);
    }

    /// Unlink `a` from `n`'s up list.
    pub fn remove_up_arc(&mut self, n: NodeId, a: ArcId) {
        let (prev, next) = (self.arcs[a].prev_up, self.arcs[a].next_up);
        match prev {
            Some(p) => self.arcs[p].next_up = next,
            None => self.nodes[n].arc_up = next,
        }
        if let Some(x) = next {
            self.arcs[x].prev_up = prev;
        }
    }

    /// Unlink `a` from `n`'s down list.
    pub fn remove_down_arc(&mut self, n: NodeId, a: ArcId) {
        let (prev, next) = (self.arcs[a].prev_down, self.arcs[a].next_down);
        match prev {
            Some(p) => self.arcs[p].next_down = next,
            None => self.nodes[n].arc_down = next,
        }
        if let Some(x) = next {
            self.arcs[x].prev_down = prev;
        }
    }

    /// Create one arc per consecutive pair of `path` (which must ascend),
    /// each optionally tagged, the tags chained vertically along the path
    /// and onto any loose label of the same tag at either end.
    /// Returns the first arc.
    pub fn add_path(
        &mut self,
        path: &[NodeId],
        tag: Option<LabelTag>,
    ) -> Result<ArcId, ReebGraphError> {
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return Err(violation!("a path needs at least two nodes"));
        };
        if path.len() < 2 {
            return Err(violation!("a path needs at least two nodes"));
        }
        self.arcs.reserve(path.len() - 1)?;
        if tag.is_some() {
            self.labels.reserve(path.len() - 1)?;
        }

        let mut prev_label = tag
            .and_then(|t| self.find_dw_label(first, t))
            .filter(|&l| self.labels[l].v_next.is_none());
        let tail_label = tag
            .and_then(|t| self.find_up_label(last, t))
            .filter(|&l| self.labels[l].v_prev.is_none());

        let mut first_arc = None;
        for pair in path.windows(2) {
            let a = self.arcs.allocate(ReebArc::between(pair[0], pair[1]))?;
            if let Some(t) = tag {
                let l = self.labels.allocate(ReebLabel {
                    arc: a,
                    tag: t,
                    h_prev: None,
                    h_next: None,
                    v_prev: prev_label,
                    v_next: None,
                })?;
                if let Some(p) = prev_label {
                    self.labels[p].v_next = Some(l);
                }
                let arc = &mut self.arcs[a];
                arc.label_head = Some(l);
                arc.label_tail = Some(l);
                prev_label = Some(l);
            }
            self.add_up_arc(pair[0], a);
            self.add_down_arc(pair[1], a);
            first_arc.get_or_insert(a);
        }
        if let (Some(l), Some(t)) = (prev_label, tail_label) {
            self.labels[l].v_next = Some(t);
            self.labels[t].v_prev = Some(l);
        }
        first_arc.ok_or_else(|| violation!("empty path"))
    }

    /// Unlabelled arc between two nodes, oriented from the smaller one.
    pub fn add_arc(&mut self, a: NodeId, b: NodeId) -> Result<ArcId, ReebGraphError> {
        let (lo, hi) = if self.is_smaller(a, b) { (a, b) } else { (b, a) };
        self.add_path(&[lo, hi], None)
    }

    /// Merge the single down arc and single up arc of a regular node into
    /// one arc and free the node. The up arc's labels are dropped; their
    /// vertical neighbours are linked to each other.
    ///
    /// Outside simplification the node's vertex, and everything the up arc
    /// had absorbed, is absorbed into the merged arc.
    pub fn collapse_vertex(&mut self, n: NodeId) {
        let (Some(a0), Some(a1)) = (self.nodes[n].arc_down, self.nodes[n].arc_up) else {
            return;
        };
        let vertex = self.nodes[n].vertex_id;
        let upper = self.arcs[a1].clone();

        let track = !self.history_on;
        let lower = &mut self.arcs[a0];
        if track {
            lower.absorbed.push(vertex);
            lower.absorbed.extend_from_slice(&upper.absorbed);
        }
        lower.node1 = upper.node1;
        lower.prev_down = upper.prev_down;
        lower.next_down = upper.next_down;
        if let Some(p) = upper.prev_down {
            self.arcs[p].next_down = Some(a0);
        }
        if let Some(x) = upper.next_down {
            self.arcs[x].prev_down = Some(a0);
        }
        if self.nodes[upper.node1].arc_down == Some(a1) {
            self.nodes[upper.node1].arc_down = Some(a0);
        }

        self.drop_arc_labels(a1);
        self.arcs.free(a1);
        self.nodes.free(n);
    }

    /// Free every label on `a`, bridging the vertical chains they sat on.
    pub fn drop_arc_labels(&mut self, a: ArcId) {
        let mut cursor = self.arcs[a].label_head;
        while let Some(l) = cursor {
            let label = &self.labels[l];
            let (up, down, next) = (label.v_next, label.v_prev, label.h_next);
            if let Some(d) = down {
                self.labels[d].v_next = up;
            }
            if let Some(u) = up {
                self.labels[u].v_prev = down;
            }
            self.labels.free(l);
            cursor = next;
        }
        let arc = &mut self.arcs[a];
        arc.label_head = None;
        arc.label_tail = None;
    }

    /// Unlink `a` from both endpoint lists and free it with its labels.
    pub fn discard_arc(&mut self, a: ArcId) {
        let (n0, n1) = (self.arcs[a].node0, self.arcs[a].node1);
        self.remove_up_arc(n0, a);
        self.remove_down_arc(n1, a);
        self.drop_arc_labels(a);
        self.arcs.free(a);
    }

    /// Append a cancellation to the history while history is being kept.
    pub fn record_cancellation(
        &mut self,
        removed: Vec<(VertexId, VertexId)>,
        inserted: Vec<(VertexId, VertexId)>,
    ) {
        if self.history_on {
            log::trace!("cancellation: removed {removed:?}, inserted {inserted:?}");
            self.history.push(Cancellation { removed, inserted });
        }
    }
}

// -----------------------------------------------------------------------------
// Structural validation
// -----------------------------------------------------------------------------

impl DebugInvariants for ReebStorage {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "reeb storage");
    }

    fn validate_invariants(&self) -> Result<(), ReebGraphError> {
        self.nodes.validate_invariants()?;
        self.arcs.validate_invariants()?;
        self.labels.validate_invariants()?;

        let mut listed_up = 0usize;
        let mut listed_down = 0usize;
        for (n, node) in self.nodes.iter() {
            let mut prev = None;
            let mut cursor = node.arc_up;
            while let Some(a) = cursor {
                let arc = self
                    .arcs
                    .get(a)
                    .ok_or_else(|| violation!("node {n} lists freed up arc {a}"))?;
                if arc.node0 != n || arc.prev_up != prev {
                    return Err(violation!("up list of node {n} is broken at arc {a}"));
                }
                listed_up += 1;
                if listed_up > self.arcs.len() {
                    return Err(violation!("up list of node {n} is cyclic"));
                }
                prev = Some(a);
                cursor = arc.next_up;
            }
            let mut prev = None;
            let mut cursor = node.arc_down;
            while let Some(a) = cursor {
                let arc = self
                    .arcs
                    .get(a)
                    .ok_or_else(|| violation!("node {n} lists freed down arc {a}"))?;
                if arc.node1 != n || arc.prev_down != prev {
                    return Err(violation!("down list of node {n} is broken at arc {a}"));
                }
                listed_down += 1;
                if listed_down > self.arcs.len() {
                    return Err(violation!("down list of node {n} is cyclic"));
                }
                prev = Some(a);
                cursor = arc.next_down;
            }
        }
        if listed_up != self.arcs.len() || listed_down != self.arcs.len() {
            return Err(violation!(
                "{} live arcs but {} listed upward and {} downward",
                self.arcs.len(),
                listed_up,
                listed_down
            ));
        }

        let mut listed_labels = 0usize;
        for (a, arc) in self.arcs.iter() {
            if !self.nodes.is_live(arc.node0) || !self.nodes.is_live(arc.node1) {
                return Err(violation!("arc {a} has a freed endpoint"));
            }
            if !self.is_smaller(arc.node0, arc.node1) {
                return Err(violation!(
                    "arc {a} runs from vertex {} down to vertex {}",
                    self.vertex(arc.node0),
                    self.vertex(arc.node1)
                ));
            }
            let mut prev = None;
            let mut cursor = arc.label_head;
            while let Some(l) = cursor {
                let label = self
                    .labels
                    .get(l)
                    .ok_or_else(|| violation!("arc {a} lists freed label {l}"))?;
                if label.arc != a || label.h_prev != prev {
                    return Err(violation!("label list of arc {a} is broken at {l}"));
                }
                listed_labels += 1;
                if listed_labels > self.labels.len() {
                    return Err(violation!("label list of arc {a} is cyclic"));
                }
                prev = Some(l);
                cursor = label.h_next;
            }
            if arc.label_tail != prev {
                return Err(violation!("label tail of arc {a} is stale"));
            }
        }
        if listed_labels != self.labels.len() {
            return Err(violation!(
                "{} live labels but {} attached to arcs",
                self.labels.len(),
                listed_labels
            ));
        }
        for (l, label) in self.labels.iter() {
            if let Some(u) = label.v_next {
                if self.labels.get(u).and_then(|x| x.v_prev) != Some(l) {
                    return Err(violation!("vertical link {l} -> {u} is one-sided"));
                }
            }
            if let Some(d) = label.v_prev {
                if self.labels.get(d).and_then(|x| x.v_next) != Some(l) {
                    return Err(violation!("vertical link {d} -> {l} is one-sided"));
                }
            }
        }
        Ok(())
    }
}
