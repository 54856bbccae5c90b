//! Path labels.
//!
//! While the graph is being built, every mesh edge is traced through the
//! arcs it currently spans by a vertical chain of labels sharing one tag.
//! `Collapse` walks two such chains in lock-step. Simplification reuses the
//! same machinery with the two route tags to mark the path being cancelled
//! and the path it is rerouted onto.

use crate::reeb_error::ReebGraphError;
use crate::topology::handle::{ArcId, LabelId, NodeId};
use crate::topology::records::{LabelTag, ReebLabel};
use crate::topology::storage::ReebStorage;

impl ReebStorage {
    /// Label with `tag` on one of the arcs entering `n` from below.
    pub fn find_dw_label(&self, n: NodeId, tag: LabelTag) -> Option<LabelId> {
        self.down_arcs(n)
            .flat_map(|a| self.arc_labels(a))
            .find(|&l| self.labels[l].tag == tag)
    }

    /// Label with `tag` on one of the arcs leaving `n` upward.
    pub fn find_up_label(&self, n: NodeId, tag: LabelTag) -> Option<LabelId> {
        self.up_arcs(n)
            .flat_map(|a| self.arc_labels(a))
            .find(|&l| self.labels[l].tag == tag)
    }

    /// Tag an unlabelled arc, splicing the new label between the labels of
    /// the same tag found below `node0` and above `node1`.
    pub fn set_label(&mut self, a: ArcId, tag: LabelTag) -> Result<LabelId, ReebGraphError> {
        debug_assert!(self.arcs[a].label_head.is_none(), "arc {a} is already labelled");
        let (n0, n1) = (self.arcs[a].node0, self.arcs[a].node1);
        let v_prev = self.find_dw_label(n0, tag);
        let v_next = self.find_up_label(n1, tag);
        let l = self.labels.allocate(ReebLabel {
            arc: a,
            tag,
            h_prev: None,
            h_next: None,
            v_prev,
            v_next,
        })?;
        if let Some(p) = v_prev {
            self.labels[p].v_next = Some(l);
        }
        if let Some(n) = v_next {
            self.labels[n].v_prev = Some(l);
        }
        let arc = &mut self.arcs[a];
        arc.label_head = Some(l);
        arc.label_tail = Some(l);
        Ok(l)
    }

    /// Take label `l` out of its arc's horizontal list.
    pub fn unlink_label(&mut self, l: LabelId) {
        let label = &self.labels[l];
        let (arc, prev, next) = (label.arc, label.h_prev, label.h_next);
        match prev {
            Some(p) => self.labels[p].h_next = next,
            None => self.arcs[arc].label_head = next,
        }
        match next {
            Some(x) => self.labels[x].h_prev = prev,
            None => self.arcs[arc].label_tail = prev,
        }
    }

    /// Drop the label chains that end at `n` (coming from below) and the
    /// ones that start at `n` (going up), optionally only those with tag
    /// `only`.
    pub fn simplify_labels(
        &mut self,
        n: NodeId,
        only: Option<LabelTag>,
        go_down: bool,
        go_up: bool,
    ) {
        let wanted = |tag: LabelTag| only.is_none_or(|t| t == tag);

        if go_down && self.nodes.is_live(n) {
            let mut arc_cursor = self.nodes[n].arc_down;
            while let Some(a) = arc_cursor {
                let mut cursor = self.arcs[a].label_head;
                while let Some(l) = cursor {
                    let label = &self.labels[l];
                    cursor = label.h_next;
                    if label.v_next.is_none() && wanted(label.tag) {
                        let mut chain = Some(l);
                        while let Some(c) = chain {
                            chain = self.labels[c].v_prev;
                            self.unlink_label(c);
                            self.labels.free(c);
                        }
                    }
                }
                arc_cursor = self.arcs[a].next_down;
            }
        }

        if go_up && self.nodes.is_live(n) {
            let mut arc_cursor = self.nodes[n].arc_up;
            while let Some(a) = arc_cursor {
                let mut cursor = self.arcs[a].label_head;
                while let Some(l) = cursor {
                    let label = &self.labels[l];
                    cursor = label.h_next;
                    if label.v_prev.is_none() && wanted(label.tag) {
                        let mut chain = Some(l);
                        while let Some(c) = chain {
                            chain = self.labels[c].v_next;
                            self.unlink_label(c);
                            self.labels.free(c);
                        }
                    }
                }
                arc_cursor = self.arcs[a].next_up;
            }
        }
    }

    /// Detach every label from every arc and empty the label table.
    pub fn flush_labels(&mut self) {
        for a in self.arcs.handles() {
            let arc = &mut self.arcs[a];
            arc.label_head = None;
            arc.label_tail = None;
        }
        self.labels.reset();
    }
}
