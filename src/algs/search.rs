//! Monotone path searches used by simplification.
//!
//! The four depth-first searches follow unlabelled arcs between finalized
//! nodes and, on success, tag every arc of the path they found while the
//! recursion unwinds. `find_path` is a best-first search for the cheapest
//! alternative route between the endpoints of a loop arc.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::algs::metric::SimplificationMetric;
use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, Handle, NodeId};
use crate::topology::records::LabelTag;
use crate::topology::storage::ReebStorage;

/// A route through the graph together with its accumulated cost.
#[derive(Clone, Debug, PartialEq)]
pub struct ReebPath {
    pub value: f64,
    pub nodes: Vec<NodeId>,
    pub arcs: Vec<ArcId>,
}

impl ReebPath {
    fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

impl Eq for ReebPath {}

// Cheapest first, then fewest arcs, then lowest last node.
impl Ord for ReebPath {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| other.arcs.len().cmp(&self.arcs.len()))
            .then_with(|| other.last_node().cmp(&self.last_node()))
    }
}

impl PartialOrd for ReebPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ReebStorage {
    /// Follow unlabelled up arcs from `n` to the first finalized node above
    /// `start`, tagging the route with `tag`.
    pub fn find_greater(
        &mut self,
        n: NodeId,
        start: NodeId,
        tag: Option<LabelTag>,
    ) -> Result<Option<NodeId>, ReebGraphError> {
        if !self.nodes[n].is_finalized {
            return Ok(None);
        }
        if self.is_higher_than(n, start) {
            return Ok(Some(n));
        }
        let ups: Vec<ArcId> = self.up_arcs(n).collect();
        for a in ups {
            let m = self.arcs[a].node1;
            if self.arcs[a].label_head.is_some() || !self.nodes[m].is_finalized {
                continue;
            }
            if let Some(found) = self.find_greater(m, start, tag)? {
                if let Some(t) = tag {
                    self.set_label(a, t)?;
                }
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Follow unlabelled down arcs from `n` to the first finalized node below
    /// `start`, tagging the route with `tag`.
    pub fn find_less(
        &mut self,
        n: NodeId,
        start: NodeId,
        tag: Option<LabelTag>,
    ) -> Result<Option<NodeId>, ReebGraphError> {
        if !self.nodes[n].is_finalized {
            return Ok(None);
        }
        if self.is_smaller(n, start) {
            return Ok(Some(n));
        }
        let downs: Vec<ArcId> = self.down_arcs(n).collect();
        for a in downs {
            let m = self.arcs[a].node0;
            if self.arcs[a].label_head.is_some() || !self.nodes[m].is_finalized {
                continue;
            }
            if let Some(found) = self.find_less(m, start, tag)? {
                if let Some(t) = tag {
                    self.set_label(a, t)?;
                }
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Climb from arc `a` to the first node where another arc joins in.
    ///
    /// With `one_path_only` the climb gives up as soon as an arc has a
    /// sibling at its lower end.
    pub fn find_join_node(
        &mut self,
        a: ArcId,
        tag: Option<LabelTag>,
        one_path_only: bool,
    ) -> Result<Option<NodeId>, ReebGraphError> {
        let arc = &self.arcs[a];
        let n = arc.node1;
        if arc.label_head.is_some() || !self.nodes[n].is_finalized {
            return Ok(None);
        }
        if one_path_only && (arc.next_up.is_some() || arc.prev_up.is_some()) {
            return Ok(None);
        }
        if arc.next_down.is_some() || arc.prev_down.is_some() {
            if let Some(t) = tag {
                self.set_label(a, t)?;
            }
            return Ok(Some(n));
        }
        let ups: Vec<ArcId> = self.up_arcs(n).collect();
        for c in ups {
            if let Some(found) = self.find_join_node(c, tag, one_path_only)? {
                if let Some(t) = tag {
                    self.set_label(a, t)?;
                }
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Descend from arc `a` to the first node where another arc splits off.
    pub fn find_split_node(
        &mut self,
        a: ArcId,
        tag: Option<LabelTag>,
        one_path_only: bool,
    ) -> Result<Option<NodeId>, ReebGraphError> {
        let arc = &self.arcs[a];
        let n = arc.node0;
        if arc.label_head.is_some() || !self.nodes[n].is_finalized {
            return Ok(None);
        }
        if one_path_only && (arc.next_down.is_some() || arc.prev_down.is_some()) {
            return Ok(None);
        }
        if arc.next_up.is_some() || arc.prev_up.is_some() {
            if let Some(t) = tag {
                self.set_label(a, t)?;
            }
            return Ok(Some(n));
        }
        let downs: Vec<ArcId> = self.down_arcs(n).collect();
        for c in downs {
            if let Some(found) = self.find_split_node(c, tag, one_path_only)? {
                if let Some(t) = tag {
                    self.set_label(a, t)?;
                }
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Cheapest route from `a`'s lower to its upper node that avoids `a`.
    ///
    /// A route's cost starts at `a`'s own cost and adds the cost of every
    /// arc it travels (in either direction). Routes reaching `threshold`
    /// are abandoned; a zero threshold disables pruning. `None` when `a`
    /// itself is too costly or no affordable route exists.
    pub fn find_path(
        &self,
        a: ArcId,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Option<ReebPath> {
        let (n0, n1) = (self.arcs[a].node0, self.arcs[a].node1);
        let pruned = |value: f64| threshold != 0.0 && value >= threshold;

        let base = self.arc_cost(a, metric);
        if pruned(base) {
            return None;
        }

        let mut node_seen = vec![false; self.nodes.capacity()];
        let mut arc_seen = vec![false; self.arcs.capacity()];
        node_seen[n0.index()] = true;
        arc_seen[a.index()] = true;

        let mut queue = BinaryHeap::new();
        queue.push(ReebPath {
            value: base,
            nodes: vec![n0],
            arcs: Vec::new(),
        });

        while let Some(entry) = queue.pop() {
            let n = entry.last_node()?;
            let neighbours = self
                .down_arcs(n)
                .map(|c| (c, self.arcs[c].node0))
                .chain(self.up_arcs(n).map(|c| (c, self.arcs[c].node1)));
            for (c, m) in neighbours {
                if arc_seen[c.index()] {
                    continue;
                }
                arc_seen[c.index()] = true;
                if node_seen[m.index()] {
                    continue;
                }
                node_seen[m.index()] = true;

                if m == n1 {
                    let mut found = entry.clone();
                    found.nodes.push(n1);
                    found.arcs.push(c);
                    return Some(found);
                }

                let value = entry.value + self.arc_cost(c, metric);
                if pruned(value) {
                    continue;
                }
                let mut longer = entry.clone();
                longer.value = value;
                longer.nodes.push(m);
                longer.arcs.push(c);
                queue.push(longer);
            }
        }
        None
    }
}
