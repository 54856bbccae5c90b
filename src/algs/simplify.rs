//! Branch cancellation and the simplification driver.
//!
//! A leaf arc (one ending at a maximum or starting at a minimum) whose cost
//! is below the threshold is cancelled by rerouting: the extremum is linked
//! to a node beyond the nearest saddle on another branch, and the two routes
//! are zipped with `collapse`, which folds the extremum and the saddle into
//! regular nodes that then disappear.

use crate::algs::metric::SimplificationMetric;
use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, NodeId, VertexId};
use crate::topology::records::LabelTag;
use crate::topology::storage::ReebStorage;

impl ReebStorage {
    /// Cancel every leaf branch cheaper than `threshold`, repeating until a
    /// whole sweep changes nothing. Returns the number of cancellations.
    pub fn simplify_branches(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Result<usize, ReebGraphError> {
        if threshold == 0.0 {
            return Ok(0);
        }
        let mut cancelled = 0usize;
        loop {
            let mut stack: Vec<ArcId> = Vec::new();
            for n in self.nodes.handles() {
                let node = &self.nodes[n];
                match (node.arc_down, node.arc_up) {
                    (None, None) => {
                        self.nodes.free(n);
                    }
                    (None, Some(_)) => self.push_cheap_up_arcs(n, threshold, metric, &mut stack),
                    (Some(_), None) => self.push_cheap_down_arcs(n, threshold, metric, &mut stack),
                    (Some(_), Some(_)) => {}
                }
            }

            let mut changed = false;
            while let Some(a) = stack.pop() {
                if self.cancel_branch(a, threshold, metric, &mut stack)? {
                    cancelled += 1;
                    changed = true;
                    self.commit_simplification();
                }
            }
            if !changed {
                return Ok(cancelled);
            }
        }
    }

    fn push_cheap_up_arcs(
        &self,
        n: NodeId,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
        stack: &mut Vec<ArcId>,
    ) {
        stack.extend(self.up_arcs(n).filter(|&a| self.arc_cost(a, metric) < threshold));
    }

    fn push_cheap_down_arcs(
        &self,
        n: NodeId,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
        stack: &mut Vec<ArcId>,
    ) {
        stack.extend(self.down_arcs(n).filter(|&a| self.arc_cost(a, metric) < threshold));
    }

    /// Try to cancel the branch ending in arc `a`. True when the graph
    /// changed.
    fn cancel_branch(
        &mut self,
        a: ArcId,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
        stack: &mut Vec<ArcId>,
    ) -> Result<bool, ReebGraphError> {
        let Some(arc) = self.arcs.get(a) else {
            return Ok(false);
        };
        let (n, m) = (arc.node0, arc.node1);
        if self.nodes[n].arc_down.is_some() && self.nodes[m].arc_up.is_some() {
            return Ok(false);
        }
        if self.arc_cost(a, metric) >= threshold {
            return Ok(false);
        }

        let m_down = self.down_degree(m);
        let n_up = self.up_degree(n);
        let n_down = self.down_degree(n);
        let m_up = self.up_degree(m);

        if n_down == 0 && n_up == 1 && m_down == 1 && m_up == 0 {
            log::trace!("dropping isolated arc {:?}", self.arc_vertices(a));
            self.discard_arc(a);
            for end in [n, m] {
                if self.nodes.is_live(end) && self.is_regular(end) {
                    self.end_vertex(end);
                }
            }
            return Ok(true);
        }

        let mut rerouted: Option<(NodeId, NodeId)> = None;

        if m_up == 0 {
            if let Some(down) = self.find_split_node(a, Some(LabelTag::ROUTE_OLD), false)? {
                match self.find_greater(down, m, Some(LabelTag::ROUTE_NEW))? {
                    Some(up) => {
                        let bridge = self.add_arc(m, up)?;
                        self.set_label(bridge, LabelTag::ROUTE_OLD)?;
                        self.collapse(down, up, LabelTag::ROUTE_OLD, LabelTag::ROUTE_NEW)?;
                        rerouted = Some((down, up));
                    }
                    None => self.simplify_labels(down, None, true, true),
                }
            }
        }

        if rerouted.is_none() && n_down == 0 {
            if let Some(up) = self.find_join_node(a, Some(LabelTag::ROUTE_OLD), false)? {
                match self.find_less(up, n, Some(LabelTag::ROUTE_NEW))? {
                    Some(down) => {
                        let bridge = self.add_arc(down, n)?;
                        self.set_label(bridge, LabelTag::ROUTE_OLD)?;
                        self.collapse(down, up, LabelTag::ROUTE_OLD, LabelTag::ROUTE_NEW)?;
                        rerouted = Some((down, up));
                    }
                    None => self.simplify_labels(up, None, true, true),
                }
            }
        }

        let Some((down, up)) = rerouted else {
            return Ok(false);
        };
        log::trace!(
            "cancelled branch {:?} through saddle span {}..{}",
            (self.vertex_or_none(n), self.vertex_or_none(m)),
            down,
            up
        );

        if self.nodes.is_live(down) {
            self.simplify_labels(down, None, true, true);
            if self.nodes[down].arc_down.is_none() {
                self.push_cheap_up_arcs(down, threshold, metric, stack);
            }
        }
        if self.nodes.is_live(up) {
            self.simplify_labels(up, None, true, true);
            if self.nodes[up].arc_up.is_none() {
                self.push_cheap_down_arcs(up, threshold, metric, stack);
            }
        }
        Ok(true)
    }

    fn vertex_or_none(&self, n: NodeId) -> Option<VertexId> {
        self.nodes.get(n).map(|node| node.vertex_id)
    }

    /// Branches, then loops, then branches again, with every cancellation
    /// folded into the external graph. Route labels left over from failed
    /// searches are dropped at the end. Returns the number of arcs removed.
    pub fn simplify(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Result<usize, ReebGraphError> {
        if let Some((min, max)) = self.scalar_range {
            if max <= min && metric.is_none() {
                log::warn!("simplifying a field with zero scalar range; every arc has persistence 0");
            }
        }
        self.history.clear();
        self.history_on = true;

        let outcome = self.run_passes(threshold, metric);

        self.commit_simplification();
        self.history_on = false;
        self.flush_labels();
        self.find_loops();
        outcome
    }

    fn run_passes(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Result<usize, ReebGraphError> {
        let mut removed = self.simplify_branches(threshold, metric)?;
        removed += self.simplify_loops(threshold, metric)?;
        removed += self.simplify_branches(threshold, metric)?;
        Ok(removed)
    }
}
