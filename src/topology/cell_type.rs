//! Simplex types accepted as input cells.

use serde::{Deserialize, Serialize};

/// The simplex every cell of a mesh must be.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 2D simplex.
    Triangle,
    /// 3D simplex.
    Tetrahedron,
}

impl CellType {
    /// Number of corner points.
    pub fn point_count(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Tetrahedron => 4,
        }
    }

    /// Topological dimension.
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Triangle => 2,
            CellType::Tetrahedron => 3,
        }
    }
}
