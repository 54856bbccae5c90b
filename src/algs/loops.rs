//! Cycle detection and loop cancellation.

use crate::algs::metric::SimplificationMetric;
use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, Handle, NodeId, VertexId};
use crate::topology::storage::ReebStorage;

impl ReebStorage {
    /// Refresh the loop table and the connected-component count.
    ///
    /// A depth-first sweep over every arc; an arc reaching an already
    /// visited node closes one independent cycle and is recorded.
    pub fn find_loops(&mut self) {
        self.loop_arcs.clear();
        self.connected_components = 0;

        let mut node_seen = vec![false; self.nodes.capacity()];
        let mut arc_seen = vec![false; self.arcs.capacity()];
        let mut stack: Vec<NodeId> = Vec::new();

        for root in self.nodes.handles() {
            if node_seen[root.index()] {
                continue;
            }
            self.connected_components += 1;
            node_seen[root.index()] = true;
            stack.push(root);

            while let Some(n) = stack.pop() {
                let neighbours: Vec<(ArcId, NodeId)> = self
                    .down_arcs(n)
                    .map(|a| (a, self.arcs[a].node0))
                    .chain(self.up_arcs(n).map(|a| (a, self.arcs[a].node1)))
                    .collect();
                for (a, m) in neighbours {
                    if arc_seen[a.index()] {
                        continue;
                    }
                    if node_seen[m.index()] {
                        self.loop_arcs.push(a);
                    } else {
                        stack.push(m);
                    }
                    arc_seen[a.index()] = true;
                    node_seen[m.index()] = true;
                }
            }
        }
    }

    /// Cut loop arc `a`, recording how its neighbours in both adjacency
    /// lists absorb it.
    pub fn fast_arc_simplify(&mut self, a: ArcId) {
        if self.history_on {
            let arc = &self.arcs[a];
            let v = |n: NodeId| self.vertex(n);
            let ends = |b: ArcId| (v(self.arcs[b].node0), v(self.arcs[b].node1));
            let (lo, hi) = (v(arc.node0), v(arc.node1));

            let mut moves: Vec<((VertexId, VertexId), (VertexId, VertexId))> = Vec::new();
            if let Some(b) = arc.next_up {
                let (b0, b1) = ends(b);
                moves.push(((lo, b1), (b0, b1)));
            }
            if let Some(b) = arc.next_down {
                let (b0, _) = ends(b);
                moves.push(((lo, hi), (b0, hi)));
            }
            if let Some(b) = arc.prev_up {
                let (_, b1) = ends(b);
                moves.push(((lo, hi), (lo, b1)));
            }
            if let Some(b) = arc.prev_down {
                let (b0, b1) = ends(b);
                moves.push(((b0, hi), (b0, b1)));
            }
            for (removed, inserted) in moves {
                self.record_cancellation(vec![removed], vec![inserted]);
            }
        }
        self.discard_arc(a);
    }

    /// Cut every loop whose arc and cheapest alternative route both cost
    /// less than `threshold`, then drop isolated nodes and collapse nodes
    /// left regular. Returns the number of loops cut.
    pub fn simplify_loops(
        &mut self,
        threshold: f64,
        metric: Option<&dyn SimplificationMetric>,
    ) -> Result<usize, ReebGraphError> {
        if threshold == 0.0 {
            return Ok(0);
        }
        self.find_loops();

        let mut removed = 0usize;
        for a in self.loop_arcs.clone() {
            if !self.arcs.is_live(a) {
                continue;
            }
            if self.arc_cost(a, metric) >= threshold {
                continue;
            }
            let Some(path) = self.find_path(a, threshold, metric) else {
                continue;
            };
            if path.value >= threshold {
                continue;
            }
            log::trace!(
                "cutting loop arc {:?} (alternative route of {} arcs, cost {:.4})",
                self.arc_vertices(a),
                path.arcs.len(),
                path.value
            );
            self.fast_arc_simplify(a);
            removed += 1;
            self.commit_simplification();
        }

        for n in self.nodes.handles() {
            if !self.nodes.is_live(n) {
                continue;
            }
            let node = &self.nodes[n];
            if node.arc_down.is_none() && node.arc_up.is_none() {
                self.nodes.free(n);
            } else if self.is_regular(n) {
                self.record_regular_collapse(n);
                self.end_vertex(n);
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_invariants::DebugInvariants;

    /// min -> split -> {left, right} -> merge -> max, all finalized.
    fn diamond() -> (ReebStorage, Vec<NodeId>) {
        let mut s = ReebStorage::new();
        let n: Vec<_> = [0.0, 1.0, 2.0, 3.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| s.add_mesh_vertex(i as VertexId, v).unwrap())
            .collect();
        s.add_arc(n[0], n[1]).unwrap();
        s.add_arc(n[1], n[2]).unwrap();
        s.add_arc(n[1], n[2]).unwrap();
        s.add_arc(n[2], n[3]).unwrap();
        for &id in &n {
            s.nodes[id].is_finalized = true;
        }
        (s, n)
    }

    #[test]
    fn one_loop_one_component() {
        let (mut s, _) = diamond();
        s.find_loops();
        assert_eq!(s.loop_arcs.len(), 1);
        assert_eq!(s.connected_components, 1);
    }

    #[test]
    fn components_are_counted_separately() {
        let (mut s, _) = diamond();
        let a = s.add_mesh_vertex(10, 0.5).unwrap();
        let b = s.add_mesh_vertex(11, 0.7).unwrap();
        s.add_arc(a, b).unwrap();
        s.find_loops();
        assert_eq!(s.connected_components, 2);
        assert_eq!(s.loop_arcs.len(), 1);
    }

    #[test]
    fn cheap_loop_is_cut_and_saddles_collapse() {
        let (mut s, n) = diamond();
        let cut = s.simplify_loops(0.5, None).unwrap();
        assert_eq!(cut, 1);
        assert_eq!(s.arcs.len(), 1);
        assert!(!s.nodes.is_live(n[1]));
        assert!(!s.nodes.is_live(n[2]));
        s.find_loops();
        assert!(s.loop_arcs.is_empty());
        s.validate_invariants().unwrap();
    }

    #[test]
    fn expensive_loop_survives() {
        let (mut s, _) = diamond();
        assert_eq!(s.simplify_loops(0.2, None).unwrap(), 0);
        assert_eq!(s.arcs.len(), 4);
    }

    #[test]
    fn zero_threshold_is_a_no_op() {
        let (mut s, _) = diamond();
        assert_eq!(s.simplify_loops(0.0, None).unwrap(), 0);
        assert_eq!(s.arcs.len(), 4);
    }
}
