use nalgebra::DMatrix;

use crate::eigen::{Decomposition, EigenDecomposition};
use crate::error::{PcaError, Result};

/// Symmetric eigendecomposition through LAPACK.
#[derive(Debug, Clone, Copy, Default)]
pub struct LapackEigen;

impl EigenDecomposition for LapackEigen {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<Decomposition> {
        if !matrix.is_square() {
            return Err(PcaError::Decomposition(format!(
                "matrix is {}x{}, expected square",
                matrix.nrows(),
                matrix.ncols()
            )));
        }

        let eigen = nalgebra_lapack::SymmetricEigen::try_new(matrix.clone())
            .ok_or_else(|| PcaError::Decomposition("LAPACK dsyev did not converge".to_string()))?;

        Ok(Decomposition::from_real(
            eigen.eigenvalues.iter().copied(),
            eigen.eigenvectors,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::dmatrix;

    #[test]
    fn test_lapack_eigen() {
        let m = dmatrix![2.0, 1.0;
                         1.0, 2.0];
        let decomposition = LapackEigen.decompose(&m).unwrap();
        let mut values: Vec<f64> = decomposition.eigenvalues.iter().map(|c| c.re).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(values[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-10);
    }
}
