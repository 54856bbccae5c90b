#![cfg_attr(docsrs, feature(doc_cfg))]
//! # reeb-graph
//!
//! reeb-graph computes the Reeb graph of a scalar field sampled on a
//! simplicial mesh (a triangulated surface or a tetrahedral volume) and
//! simplifies it by cancelling features whose persistence, or a custom
//! metric, falls below a threshold.
//!
//! ## Features
//! - Online construction: stream triangles or tetrahedra in any order, then
//!   close the stream
//! - Bulk construction from any [`SimplicialMesh`](data::mesh::SimplicialMesh)
//!   and a point field picked by name or index
//! - Branch and loop cancellation with cancellation history, folded into an
//!   external [`SuperGraph`](topology::super_graph::SuperGraph) whose arcs list
//!   the mesh vertices they absorbed
//! - Pluggable [`SimplificationMetric`](algs::metric::SimplificationMetric)
//! - Structural invariant checks behind the `check-invariants` and
//!   `strict-invariants` features
//!
//! ## Determinism
//!
//! Nodes are ordered by `(scalar, vertex id)`, so equal scalars never tie
//! and the result does not depend on the order simplices are streamed in.
//!
//! ## Usage
//!
//! ```
//! use reeb_graph::prelude::*;
//!
//! let mesh = SimplexMesh::surface([[0, 1, 2], [0, 2, 3]])
//!     .with_field(FieldArray::scalar("height", vec![0.0, 1.0, 3.0, 2.0]));
//! let mut g = ReebGraph::new();
//! g.build(&mesh, FieldSelector::Name("height".into()))?;
//! assert_eq!(g.number_of_connected_components(), 1);
//! assert_eq!(g.number_of_loops(), 0);
//! # Ok::<(), ReebGraphError>(())
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod reeb_error;
pub mod reeb_graph;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use reeb_error::ReebGraphError;
pub use reeb_graph::{ReebGraph, ReebGraphOpts};

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::metric::{MetricInput, Persistence, SimplificationMetric};
    pub use crate::data::mesh::{
        FieldArray, FieldSelector, MeshKind, PointData, SimplexMesh, SimplicialMesh,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::reeb_error::ReebGraphError;
    pub use crate::reeb_graph::{ReebGraph, ReebGraphOpts};
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::handle::{ArcId, NodeId, VertexId};
    pub use crate::topology::super_graph::{SuperArc, SuperGraph};
}
