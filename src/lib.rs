pub mod batch;
pub mod eigen;
pub mod error;
pub mod features;
pub mod pca;
pub mod store;
mod utils;

/// Opaque key of a catalog item (e.g. a track id).
pub type ItemId = i64;

pub use error::{PcaError, Result};
pub use pca::{Analyzer, AnalyzerBuilder, Coordinate, DegeneratePolicy, ProjectionMode};
pub use utils::Axis2;
pub use utils::Normalize;
