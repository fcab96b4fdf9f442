//! # Eigendecomposition backends
//!
//! The PCA pipeline only consumes the output of a symmetric eigendecomposition.
//! Backends implement [`EigenDecomposition`] and are selected through
//! [`crate::pca::AnalyzerBuilder::backend`].
//!
//! - [`NalgebraEigen`]: pure Rust, always available
//! - `LapackEigen`: LAPACK `dsyev` through `nalgebra-lapack` (feature `lapack`)
//! - `FaerEigen`: faer's self-adjoint decomposition (feature `faer`)

use nalgebra::{Complex, DMatrix, SymmetricEigen};

use crate::error::{PcaError, Result};

#[cfg(feature = "faer")]
pub mod faer;
#[cfg(feature = "lapack")]
pub mod lapack;

#[cfg(feature = "faer")]
pub use self::faer::FaerEigen;
#[cfg(feature = "lapack")]
pub use self::lapack::LapackEigen;

/// Eigenvalues and eigenvectors of a square matrix.
///
/// `eigenvectors` holds one eigenvector per column; column `i` belongs to
/// `eigenvalues[i]`. No ordering is implied.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub eigenvalues: Vec<Complex<f64>>,
    pub eigenvectors: DMatrix<f64>,
}

impl Decomposition {
    /// Wraps the output of a symmetric solver, whose eigenvalues are real.
    pub fn from_real(eigenvalues: impl IntoIterator<Item = f64>, eigenvectors: DMatrix<f64>) -> Self {
        Decomposition {
            eigenvalues: eigenvalues.into_iter().map(|re| Complex::new(re, 0.0)).collect(),
            eigenvectors,
        }
    }

    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

// Trait for eigendecomposition implementations
pub trait EigenDecomposition: Send + Sync {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<Decomposition>;
}

/// Symmetric eigendecomposition with nalgebra's implicit QR iteration.
#[derive(Debug, Clone, Copy)]
pub struct NalgebraEigen {
    eps: f64,
    max_iterations: usize,
}

impl NalgebraEigen {
    pub fn new() -> Self {
        NalgebraEigen {
            eps: f64::EPSILON,
            max_iterations: 10_000,
        }
    }

    /// Upper bound on QR sweeps before the decomposition is reported as failed.
    /// `0` means no limit.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

impl Default for NalgebraEigen {
    fn default() -> Self {
        Self::new()
    }
}

impl EigenDecomposition for NalgebraEigen {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<Decomposition> {
        if !matrix.is_square() {
            return Err(PcaError::Decomposition(format!(
                "matrix is {}x{}, expected square",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.is_empty() {
            return Ok(Decomposition::from_real(std::iter::empty(), DMatrix::zeros(0, 0)));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(PcaError::Decomposition(
                "matrix contains non-finite values".to_string(),
            ));
        }

        let eigen = SymmetricEigen::try_new(matrix.clone(), self.eps, self.max_iterations)
            .ok_or_else(|| {
                PcaError::Decomposition(format!(
                    "no convergence after {} iterations",
                    self.max_iterations
                ))
            })?;

        Ok(Decomposition::from_real(
            eigen.eigenvalues.iter().copied(),
            eigen.eigenvectors,
        ))
    }
}
