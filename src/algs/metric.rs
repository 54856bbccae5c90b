//! Simplification metrics.
//!
//! An arc is cancelled when its cost falls below the simplification
//! threshold. By default the cost is its normalized persistence; callers can
//! plug in any [`SimplificationMetric`], which sees the arc's endpoints and
//! the mesh vertices absorbed into the matching super-arc.

use std::collections::BTreeMap;

use crate::topology::handle::{ArcId, VertexId};
use crate::topology::storage::ReebStorage;

/// Everything a metric may inspect about one arc.
#[derive(Clone, Copy, Debug)]
pub struct MetricInput<'a> {
    /// Lower endpoint.
    pub start: VertexId,
    /// Vertices absorbed into the arc, in ascending scalar order.
    pub interior: &'a [VertexId],
    /// Upper endpoint.
    pub end: VertexId,
    /// Global `(min, max)` of the scalar field.
    pub scalar_range: (f64, f64),
    scalars: &'a BTreeMap<VertexId, f64>,
}

impl<'a> MetricInput<'a> {
    /// Scalar value of a streamed vertex.
    pub fn scalar(&self, vertex: VertexId) -> Option<f64> {
        self.scalars.get(&vertex).copied()
    }

    /// Every vertex of the arc, bottom to top.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + 'a {
        std::iter::once(self.start)
            .chain(self.interior.iter().copied())
            .chain(std::iter::once(self.end))
    }
}

/// User-defined arc cost, expected in `[0, 1]` like persistence.
pub trait SimplificationMetric {
    fn compute_metric(&self, input: &MetricInput<'_>) -> f64;
}

impl<F> SimplificationMetric for F
where
    F: Fn(&MetricInput<'_>) -> f64,
{
    fn compute_metric(&self, input: &MetricInput<'_>) -> f64 {
        self(input)
    }
}

/// Normalized scalar span of the arc, the default cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct Persistence;

impl SimplificationMetric for Persistence {
    fn compute_metric(&self, input: &MetricInput<'_>) -> f64 {
        let (min, max) = input.scalar_range;
        match (input.scalar(input.start), input.scalar(input.end)) {
            (Some(lo), Some(hi)) if max > min => (hi - lo) / (max - min),
            _ => 0.0,
        }
    }
}

impl ReebStorage {
    /// Cost of arc `a` under `metric`, or its persistence without one.
    pub fn arc_cost(&self, a: ArcId, metric: Option<&dyn SimplificationMetric>) -> f64 {
        let Some(metric) = metric else {
            return self.persistence(a);
        };
        let (start, end) = self.arc_vertices(a);
        let interior = self
            .super_graph
            .find_arc(start, end)
            .map_or(&[][..], |arc| arc.interior.as_slice());
        metric.compute_metric(&MetricInput {
            start,
            interior,
            end,
            scalar_range: self.scalar_range.unwrap_or((0.0, 0.0)),
            scalars: &self.scalars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::super_graph::SuperGraph;

    #[test]
    fn persistence_metric_matches_builtin_cost() {
        let mut s = ReebStorage::new();
        let a = s.add_mesh_vertex(0, 1.0).unwrap();
        let b = s.add_mesh_vertex(1, 3.0).unwrap();
        s.add_mesh_vertex(2, 5.0).unwrap();
        let arc = s.add_arc(a, b).unwrap();
        let builtin = s.arc_cost(arc, None);
        let plugged = s.arc_cost(arc, Some(&Persistence));
        assert!((builtin - 0.5).abs() < 1e-12);
        assert!((plugged - builtin).abs() < 1e-12);
    }

    #[test]
    fn closures_see_the_absorbed_vertices() {
        let mut s = ReebStorage::new();
        let a = s.add_mesh_vertex(4, 0.0).unwrap();
        let b = s.add_mesh_vertex(9, 1.0).unwrap();
        let arc = s.add_arc(a, b).unwrap();
        let mut g = SuperGraph::new();
        let i = g.add_vertex(4);
        let j = g.add_vertex(9);
        g.add_arc(i, j, vec![5, 6, 7]);
        s.super_graph = g;

        let count = |m: &MetricInput<'_>| m.vertices().count() as f64;
        assert_eq!(s.arc_cost(arc, Some(&count)), 5.0);
    }
}
