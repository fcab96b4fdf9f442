//! Error types for the PCA engine.

use thiserror::Error;

use crate::ItemId;

/// Stage at which a division by zero would occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionStage {
    /// Scaling the summed outer products by `1 / (count - 1)` with a single sample.
    Covariance,
    /// Min-max scaling of an axis whose values are all equal.
    Normalization,
}

impl std::fmt::Display for DivisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DivisionStage::Covariance => write!(f, "covariance scaling"),
            DivisionStage::Normalization => write!(f, "axis normalization"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PcaError {
    /// Feature vector length differs from the first accepted vector
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The id has already been inserted in this run
    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    /// Entries cannot be added once the analysis has been computed
    #[error("Analysis already computed, construct a new analyzer for a new run")]
    AlreadyComputed,

    #[error("No features added")]
    InsufficientData,

    /// Fewer than two usable eigenpairs
    #[error("Degenerate spectrum: {0}")]
    DegenerateSpectrum(String),

    #[error("Division by zero during {0}")]
    DegenerateDivision(DivisionStage),

    /// The eigendecomposition backend failed
    #[error("Eigendecomposition failed: {0}")]
    Decomposition(String),
}

impl PcaError {
    /// Per-entry failures leave the run usable; the caller decides whether to skip or abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PcaError::DimensionMismatch { .. } | PcaError::DuplicateId(_) | PcaError::AlreadyComputed
        )
    }
}

pub type Result<T> = std::result::Result<T, PcaError>;
