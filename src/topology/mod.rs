//! Data model of the Reeb graph.
//!
//! This module provides the records the graph is made of and the primitive
//! operations on them:
//! - strong handles and the free-list tables that own the records
//! - node, arc and label records and the total order on nodes
//! - [`ReebStorage`](storage::ReebStorage), which splices arcs and labels
//! - the external [`SuperGraph`](super_graph::SuperGraph)
//!
//! Algorithms live in [`crate::algs`] as further `impl ReebStorage` blocks.

pub mod cell_type;
pub mod handle;
pub mod labels;
pub mod records;
pub mod storage;
pub mod super_graph;
pub mod table;

pub use handle::{ArcId, Handle, LabelId, NodeId, VertexId};
pub use storage::ReebStorage;
pub use super_graph::{SuperArc, SuperGraph};
