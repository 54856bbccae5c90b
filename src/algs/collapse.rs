//! Zipping two monotone label paths into one.
//!
//! `collapse` walks the chains of two tags that leave the same node and end
//! at the same node, merging the arcs they travel on. At every step the two
//! current arcs either coincide, share their upper node (and are merged), or
//! diverge (the longer one is rerouted to start at the shorter one's top).

use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, LabelId, NodeId, VertexId};
use crate::topology::records::{LabelTag, ReebLabel};
use crate::topology::storage::ReebStorage;

impl ReebStorage {
    /// Merge the path tagged `tag_s` and the path tagged `tag_e`, both of
    /// which run from `start` to `end`.
    pub fn collapse(
        &mut self,
        start: NodeId,
        end: NodeId,
        tag_s: LabelTag,
        tag_e: LabelTag,
    ) -> Result<(), ReebGraphError> {
        if start == end {
            return Ok(());
        }
        let (start, end) = if self.is_smaller(start, end) {
            (start, end)
        } else {
            (end, start)
        };

        let mut l0 = self.find_up_label(start, tag_s);
        let mut l1 = self.find_up_label(start, tag_e);

        while let (Some(mut c0), Some(mut c1)) = (l0, l1) {
            let mut a0 = self.labels[c0].arc;
            let mut a1 = self.labels[c1].arc;

            let (next0, next1) = if a0 == a1 {
                (self.labels[c0].v_next, self.labels[c1].v_next)
            } else if self.arcs[a0].node1 == self.arcs[a1].node1 {
                self.merge_parallel_arcs(a0, a1);
                (self.labels[c0].v_next, self.labels[c1].v_next)
            } else {
                if self.history_on {
                    let (down0, up0) = self.arc_vertices(a0);
                    let up1 = self.vertex(self.arcs[a1].node1);
                    self.record_cancellation(vec![(down0, up1)], vec![(down0, up0), (up0, up1)]);
                }
                if !self.is_smaller(self.arcs[a0].node1, self.arcs[a1].node1) {
                    std::mem::swap(&mut a0, &mut a1);
                    std::mem::swap(&mut c0, &mut c1);
                }
                self.reroute_over(a0, a1)?;
                (self.labels[c0].v_next, Some(c1))
            };

            let bottom = self.arcs[a0].node0;
            let top = self.arcs[a0].node1;
            if self.nodes[bottom].is_finalized && self.is_regular(bottom) {
                self.collapse_regular(bottom);
            }
            if top == end {
                if self.nodes.is_live(end) && self.nodes[end].is_finalized && self.is_regular(end) {
                    self.collapse_regular(end);
                }
                return Ok(());
            }
            l0 = next0;
            l1 = next1;
        }
        Ok(())
    }

    /// `a0` and `a1` leave and enter the same nodes: fold `a1` into `a0`,
    /// moving its labels to the end of `a0`'s list.
    fn merge_parallel_arcs(&mut self, a0: ArcId, a1: ArcId) {
        let (n0, n1) = (self.arcs[a1].node0, self.arcs[a1].node1);
        self.remove_up_arc(n0, a1);
        self.remove_down_arc(n1, a1);

        let absorbed = std::mem::take(&mut self.arcs[a1].absorbed);
        self.arcs[a0].absorbed.extend(absorbed);

        let moved: Vec<LabelId> = self.arc_labels(a1).collect();
        for &l in &moved {
            self.labels[l].arc = a0;
        }
        if let (Some(&head), Some(&tail)) = (moved.first(), moved.last()) {
            let old_tail = self.arcs[a0].label_tail;
            self.labels[head].h_prev = old_tail;
            match old_tail {
                Some(t) => self.labels[t].h_next = Some(head),
                None => self.arcs[a0].label_head = Some(head),
            }
            self.arcs[a0].label_tail = Some(tail);
        }
        self.arcs.free(a1);
    }

    /// `a0` and `a1` leave the same node and `a0` ends lower: make `a1`
    /// start at the top of `a0`, and copy `a1`'s labels onto `a0` so the
    /// mesh edges they trace still pass through the shared stretch.
    /// Vertices `a1` absorbed below the top of `a0` move to `a0`.
    fn reroute_over(&mut self, a0: ArcId, a1: ArcId) -> Result<(), ReebGraphError> {
        let (bottom, mid) = (self.arcs[a0].node0, self.arcs[a0].node1);
        self.remove_up_arc(bottom, a1);
        self.arcs[a1].node0 = mid;
        self.add_up_arc(mid, a1);

        let split = self.nodes[mid].key();
        let (below, above): (Vec<VertexId>, Vec<VertexId>) = std::mem::take(&mut self.arcs[a1].absorbed)
            .into_iter()
            .partition(|&v| self.vertex_key(v).precedes(&split));
        self.arcs[a0].absorbed.extend(below);
        self.arcs[a1].absorbed = above;

        let originals: Vec<LabelId> = self.arc_labels(a1).collect();
        self.labels.reserve(originals.len())?;
        for cur in originals {
            let (tag, below) = (self.labels[cur].tag, self.labels[cur].v_prev);
            let tail = self.arcs[a0].label_tail;
            let copy = self.labels.allocate(ReebLabel {
                arc: a0,
                tag,
                h_prev: tail,
                h_next: None,
                v_prev: below,
                v_next: Some(cur),
            })?;
            self.labels[cur].v_prev = Some(copy);
            if let Some(b) = below {
                self.labels[b].v_next = Some(copy);
            }
            match tail {
                Some(t) => self.labels[t].h_next = Some(copy),
                None => self.arcs[a0].label_head = Some(copy),
            }
            self.arcs[a0].label_tail = Some(copy);
        }
        Ok(())
    }

    /// Collapse a regular node, logging the merge while history is kept.
    pub fn collapse_regular(&mut self, n: NodeId) {
        self.record_regular_collapse(n);
        self.collapse_vertex(n);
    }

    /// Log that regular node `n` is about to merge its two arcs.
    pub fn record_regular_collapse(&mut self, n: NodeId) {
        if !self.history_on {
            return;
        }
        if let (Some(d), Some(u)) = (self.nodes[n].arc_down, self.nodes[n].arc_up) {
            let (below, mid) = self.arc_vertices(d);
            let (_, above) = self.arc_vertices(u);
            self.record_cancellation(vec![(below, mid), (mid, above)], vec![(below, above)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::debug_invariants::DebugInvariants;
    use crate::topology::handle::{NodeId, VertexId};
    use crate::topology::records::LabelTag;
    use crate::topology::storage::ReebStorage;

    fn nodes(s: &mut ReebStorage, values: &[f64]) -> Vec<NodeId> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| s.add_mesh_vertex(i as VertexId, v).unwrap())
            .collect()
    }

    #[test]
    fn parallel_paths_merge_into_one_chain() {
        let mut s = ReebStorage::new();
        let n = nodes(&mut s, &[0.0, 1.0, 2.0, 3.0]);
        let ta = LabelTag::edge(0, 3);
        let tb = LabelTag::edge(1, 2);
        s.add_path(&[n[0], n[1], n[3]], Some(ta)).unwrap();
        s.add_path(&[n[0], n[2], n[3]], Some(tb)).unwrap();
        assert_eq!(s.arcs.len(), 4);

        s.collapse(n[0], n[3], ta, tb).unwrap();
        let mut pairs: Vec<_> = s.arcs.handles().into_iter().map(|a| s.arc_vertices(a)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3)]);
        s.validate_invariants().unwrap();
    }

    #[test]
    fn diverging_step_is_recorded_when_history_is_on() {
        let mut s = ReebStorage::new();
        let n = nodes(&mut s, &[0.0, 1.0, 2.0]);
        let ta = LabelTag::edge(0, 1);
        let tb = LabelTag::edge(0, 2);
        s.add_path(&[n[0], n[1]], Some(ta)).unwrap();
        s.add_path(&[n[0], n[2]], Some(tb)).unwrap();
        s.history_on = true;
        s.collapse(n[0], n[1], ta, tb).unwrap();
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.history[0].removed, vec![(0, 2)]);
        assert_eq!(s.history[0].inserted, vec![(0, 1), (1, 2)]);
        s.validate_invariants().unwrap();
    }

    #[test]
    fn finalized_regular_nodes_vanish_while_zipping() {
        let mut s = ReebStorage::new();
        let n = nodes(&mut s, &[0.0, 1.0, 2.0]);
        let ta = LabelTag::edge(0, 1);
        let tb = LabelTag::edge(0, 2);
        s.add_path(&[n[0], n[1], n[2]], Some(ta)).unwrap();
        s.add_path(&[n[0], n[2]], Some(tb)).unwrap();
        s.nodes[n[1]].is_finalized = true;
        s.collapse(n[0], n[2], ta, tb).unwrap();
        assert!(!s.nodes.is_live(n[1]));
        assert_eq!(s.arcs.len(), 1);
        s.validate_invariants().unwrap();
    }
}
