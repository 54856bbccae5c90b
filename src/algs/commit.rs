//! Materializing the external super-graph.
//!
//! When the stream closes, the arcs of the graph are chained through their
//! degree-2 vertices into super-arcs, picking up the vertices each arc
//! absorbed while streaming. Afterwards every simplification step leaves a
//! cancellation record behind, and `commit_simplification` replays that
//! history to carry each old super-arc's absorbed vertices onto the arc it
//! was folded into.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use itertools::Itertools;

use crate::topology::handle::{ArcId, VertexId};
use crate::topology::storage::ReebStorage;

/// A super-arc before it is placed into a [`SuperGraph`](crate::topology::super_graph::SuperGraph).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArcSketch {
    pub down: VertexId,
    pub up: VertexId,
    pub interior: Vec<VertexId>,
}

impl ArcSketch {
    fn ends(&self) -> (VertexId, VertexId) {
        (self.down, self.up)
    }
}

#[derive(Default)]
struct Adjacency {
    below: Vec<ArcId>,
    above: Vec<ArcId>,
}

impl Adjacency {
    fn is_pass_through(&self) -> bool {
        self.below.len() == 1 && self.above.len() == 1
    }
}

impl ReebStorage {
    /// Chain the live arcs through vertices with exactly one arc below and
    /// one above. Every other vertex starts one super-arc per up arc, whose
    /// interior holds the chained vertices and everything the chained arcs
    /// absorbed, in ascending order.
    pub fn chain_super_arcs(&self) -> Vec<ArcSketch> {
        let mut adjacency: BTreeMap<VertexId, Adjacency> = BTreeMap::new();
        for a in self.arcs.handles() {
            let (down, up) = self.arc_vertices(a);
            adjacency.entry(down).or_default().above.push(a);
            adjacency.entry(up).or_default().below.push(a);
        }

        let mut sketches = Vec::new();
        for (&start, adj) in &adjacency {
            if adj.is_pass_through() {
                continue;
            }
            for &first in &adj.above {
                let mut interior = self.arcs[first].absorbed.clone();
                let mut cursor = self.arc_vertices(first).1;
                while let Some(next) = adjacency
                    .get(&cursor)
                    .filter(|c| c.is_pass_through())
                    .map(|c| c.above[0])
                {
                    interior.push(cursor);
                    interior.extend_from_slice(&self.arcs[next].absorbed);
                    cursor = self.arc_vertices(next).1;
                }
                sketches.push(ArcSketch {
                    down: start,
                    up: cursor,
                    interior: self.ascending(interior),
                });
            }
        }
        sketches
    }

    /// Empty every arc's absorbed list once it has been chained.
    pub fn forget_absorbed(&mut self) {
        for a in self.arcs.handles() {
            self.arcs[a].absorbed.clear();
        }
    }

    /// `vertices` sorted by (scalar, id).
    fn ascending(&self, vertices: Vec<VertexId>) -> Vec<VertexId> {
        vertices
            .into_iter()
            .sorted_by(|&a, &b| self.vertex_key(a).cmp_key(&self.vertex_key(b)))
            .collect()
    }

    /// Rebuild the super-graph: one vertex per live node in handle order,
    /// one super-arc per sketch whose endpoints both survived.
    pub fn install_super_graph(&mut self, sketches: Vec<ArcSketch>) {
        self.super_graph.clear();
        let mut slot_of: BTreeMap<VertexId, usize> = BTreeMap::new();
        for (_, node) in self.nodes.iter() {
            let slot = self.super_graph.add_vertex(node.vertex_id);
            slot_of.insert(node.vertex_id, slot);
        }
        for sketch in sketches {
            if let (Some(&source), Some(&target)) = (slot_of.get(&sketch.down), slot_of.get(&sketch.up)) {
                self.super_graph.add_arc(source, target, sketch.interior);
            }
        }
    }

    /// Fold the cancellation history into the super-graph and clear it.
    ///
    /// Each old super-arc follows the history to the arc that replaced it.
    /// An arc that survived untouched keeps its absorbed list; one that was
    /// cancelled hands its absorbed vertices, plus the critical vertices
    /// that the cancellation turned into pass-through ones, to its
    /// destination. A vertex is handed over at most once.
    pub fn commit_simplification(&mut self) {
        let before: Vec<ArcSketch> = self
            .super_graph
            .arcs()
            .iter()
            .filter_map(|arc| {
                let (down, up) = self.super_graph.arc_endpoints(arc)?;
                Some(ArcSketch {
                    down,
                    up,
                    interior: arc.interior.clone(),
                })
            })
            .collect();

        let mut after: Vec<ArcSketch> = self
            .arcs
            .handles()
            .into_iter()
            .map(|a| {
                let (down, up) = self.arc_vertices(a);
                ArcSketch {
                    down,
                    up,
                    interior: Vec::new(),
                }
            })
            .collect();

        let mut segmented: HashSet<VertexId> = HashSet::new();
        let mut untouched_taken: HashSet<usize> = HashSet::new();

        for old in before {
            let (destination, demoted) = self.replay_history(old.ends());

            let Some(j) = (0..after.len())
                .find(|&j| after[j].ends() == destination && !untouched_taken.contains(&j))
            else {
                continue;
            };
            let target = &mut after[j].interior;
            if old.ends() == destination {
                untouched_taken.insert(j);
                target.extend(old.interior);
            } else {
                target.extend(old.interior.into_iter().filter(|&v| segmented.insert(v)));
            }
            target.extend(demoted.into_iter().filter(|&v| segmented.insert(v)));
        }

        for sketch in &mut after {
            sketch.interior = self.ascending(std::mem::take(&mut sketch.interior));
        }

        log::debug!(
            "committing {} cancellation(s) onto {} super-arc(s)",
            self.history.len(),
            after.len()
        );
        self.install_super_graph(after);
        self.history.clear();
    }

    /// Follow arc `ends` through the history. Returns the arc it ends up
    /// in and the critical vertices that became pass-through on the way.
    fn replay_history(&self, ends: (VertexId, VertexId)) -> ((VertexId, VertexId), Vec<VertexId>) {
        let mut destination = ends;
        let mut demoted = Vec::new();
        for step in &self.history {
            for &removed in &step.removed {
                if removed != destination {
                    continue;
                }
                let Some(&inserted) = step.inserted.first() else {
                    continue;
                };
                destination = inserted;

                if let [r0, r1, ..] = &step.removed[..] {
                    let spans = (r0.0 == destination.0 && r1.1 == destination.1)
                        || (r1.0 == destination.0 && r0.1 == destination.1);
                    if spans {
                        for &(lo, hi) in &step.removed {
                            for v in [lo, hi] {
                                if v != destination.0 && v != destination.1 {
                                    demoted.push(v);
                                }
                            }
                        }
                    }
                }
            }
        }
        (destination, demoted)
    }
}
