use faer::{Mat, Side};
use nalgebra::DMatrix;

use crate::eigen::{Decomposition, EigenDecomposition};
use crate::error::{PcaError, Result};

/// Self-adjoint eigendecomposition through faer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerEigen;

impl EigenDecomposition for FaerEigen {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<Decomposition> {
        if !matrix.is_square() {
            return Err(PcaError::Decomposition(format!(
                "matrix is {}x{}, expected square",
                matrix.nrows(),
                matrix.ncols()
            )));
        }

        let n = matrix.nrows();
        let faer_mat = Mat::<f64>::from_fn(n, n, |i, j| matrix[(i, j)]);
        let evd = faer_mat.selfadjoint_eigendecomposition(Side::Lower);

        let s = evd.s().column_vector();
        let u = evd.u();
        let eigenvectors = DMatrix::from_fn(n, n, |i, j| u.read(i, j));

        Ok(Decomposition::from_real((0..n).map(|i| s.read(i)), eigenvectors))
    }
}
