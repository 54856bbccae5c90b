use crate::reeb_error::ReebGraphError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), ReebGraphError>;
}

/// Run a fallible invariant check and panic on error when invariant checking
/// is enabled. Compiles to nothing in release builds without the
/// `check-invariants` feature.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[reeb-graph invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

/// Build an `InvariantViolation` error from a format string.
macro_rules! violation {
    ($($arg:tt)*) => {
        $crate::reeb_error::ReebGraphError::InvariantViolation(format!($($arg)*))
    };
}
pub(crate) use violation;
