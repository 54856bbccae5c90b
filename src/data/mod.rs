//! Input meshes and point fields.

pub mod mesh;

pub use mesh::{FieldArray, FieldSelector, MeshKind, PointData, SimplexMesh, SimplicialMesh};
