//! Strong, zero-cost handles for the records of a Reeb graph.
//!
//! Nodes, arcs and labels live in free-list tables whose slot 0 is reserved
//! as the null record. Each handle wraps a `NonZeroU32`, so "no record" is
//! spelled `Option<Handle>` and costs nothing: `Option<NodeId>` is still four
//! bytes.
//!
//! Mesh vertices are not records of the graph; they are identified by the
//! caller's raw [`VertexId`].

use std::{fmt, num::NonZeroU32};

use crate::reeb_error::ReebGraphError;

/// Identifier of a mesh vertex, as supplied by the caller.
pub type VertexId = u64;

/// Conversion between a handle and the table slot it names.
pub trait Handle: Copy + Eq + fmt::Debug {
    /// Handle naming `index`, or `None` for the reserved slot 0 and for
    /// indices that do not fit the handle width.
    fn from_index(index: usize) -> Option<Self>;
    /// Slot index named by this handle; never 0.
    fn index(self) -> usize;
}

macro_rules! record_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Creates a handle from its raw value.
            ///
            /// Returns [`ReebGraphError::InvalidHandle`] for `0`, which is
            /// reserved as the null record.
            #[inline]
            pub fn new(raw: u32) -> Result<Self, ReebGraphError> {
                NonZeroU32::new(raw).map($name).ok_or(ReebGraphError::InvalidHandle)
            }

            /// Raw value of this handle.
            #[inline]
            pub const fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl Handle for $name {
            #[inline]
            fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().and_then(NonZeroU32::new).map($name)
            }

            #[inline]
            fn index(self) -> usize {
                self.0.get() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.get()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }
    };
}

record_handle! {
    /// Handle of a node record: one mesh vertex in the graph.
    NodeId
}

record_handle! {
    /// Handle of an arc record: a directed edge from a lower to a higher node.
    ArcId
}

record_handle! {
    /// Handle of a label record tagging one arc with a mesh-edge path.
    LabelId
}

// -----------------------------------------------------------------------------
// Testing and assertions
// -----------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(NodeId::new(0), Err(ReebGraphError::InvalidHandle));
        assert!(ArcId::from_index(0).is_none());
    }

    #[test]
    fn index_round_trips() {
        let a = ArcId::from_index(17).unwrap();
        assert_eq!(a.index(), 17);
        assert_eq!(a.get(), 17);
    }

    #[test]
    fn oversized_index_is_rejected() {
        assert!(LabelId::from_index(u32::MAX as usize + 1).is_none());
    }

    #[test]
    fn debug_and_display() {
        let n = NodeId::new(7).unwrap();
        assert_eq!(format!("{n:?}"), "NodeId(7)");
        assert_eq!(format!("{n}"), "7");
    }

    #[test]
    fn json_roundtrip() {
        let n = NodeId::new(123).unwrap();
        let s = serde_json::to_string(&n).unwrap();
        let back: NodeId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, n);
    }
}
