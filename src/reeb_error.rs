//! ReebGraphError: Unified error type for reeb-graph public APIs
//!
//! Every fallible operation in the crate returns `Result<_, ReebGraphError>`.
//! [`ReebGraphError::code`] maps each variant to a stable negative integer;
//! the three input-validation codes are -1, -2 and -3.

use thiserror::Error;

use crate::topology::cell_type::CellType;
use crate::topology::handle::VertexId;

/// Unified error type for Reeb graph operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReebGraphError {
    /// A cell of the input mesh is not the simplex the mesh kind expects.
    #[error("cell {cell} has {points} points but a {expected:?} was expected")]
    NotASimplicialMesh {
        cell: usize,
        points: usize,
        expected: CellType,
    },
    /// The field selector names or indexes no point array of the mesh.
    #[error("no point field matches selector `{0}`")]
    NoSuchField(String),
    /// The scalar array cannot provide a value for a vertex of the mesh.
    #[error("field `{field}` has no scalar value for vertex {vertex}")]
    IncorrectField { field: String, vertex: VertexId },
    /// Growing one of the record tables failed.
    #[error("could not grow the {table} table to {requested} slots")]
    AllocationFailed {
        table: &'static str,
        requested: usize,
    },
    /// Attempted to construct a handle with a zero value (invalid).
    #[error("handle must be non-zero (0 is reserved as the null record)")]
    InvalidHandle,
    /// Simplices were streamed after the stream was closed.
    #[error("the simplex stream is already closed")]
    StreamClosed,
    /// A streamed simplex lists the same vertex twice.
    #[error("simplex repeats vertex {0}")]
    DegenerateSimplex(VertexId),
    /// A structural invariant does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ReebGraphError {
    /// Integer status code, negative for every error.
    ///
    /// `-1`, `-2` and `-3` match `ERR_INCORRECT_FIELD`, `ERR_NO_SUCH_FIELD`
    /// and `ERR_NOT_A_SIMPLICIAL_MESH`.
    pub fn code(&self) -> i32 {
        match self {
            ReebGraphError::IncorrectField { .. } => -1,
            ReebGraphError::NoSuchField(_) => -2,
            ReebGraphError::NotASimplicialMesh { .. } => -3,
            ReebGraphError::AllocationFailed { .. } => -4,
            ReebGraphError::InvalidHandle => -5,
            ReebGraphError::StreamClosed => -6,
            ReebGraphError::InvariantViolation(_) => -7,
            ReebGraphError::DegenerateSimplex(_) => -8,
        }
    }
}
