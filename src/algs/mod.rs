//! Construction and simplification algorithms.

pub mod collapse;
pub mod commit;
pub mod ingest;
pub mod loops;
pub mod metric;
pub mod search;
pub mod simplify;

pub use metric::{MetricInput, Persistence, SimplificationMetric};
pub use search::ReebPath;
