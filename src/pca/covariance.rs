use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::{DivisionStage, PcaError, Result};
use crate::pca::DegeneratePolicy;

/// Builds the unbiased sample covariance matrix of a set of vectors.
///
/// `d_i = v_i - mean` for each vector, the outer products `d_i d_i^T` are
/// summed and the sum is scaled by `1 / (count - 1)`.
#[derive(Debug, Clone, Copy)]
pub struct CovarianceBuilder {
    policy: DegeneratePolicy,
}

impl CovarianceBuilder {
    pub fn new(policy: DegeneratePolicy) -> Self {
        CovarianceBuilder { policy }
    }

    /// Difference vectors `v_i - mean`, in the order of `vectors`.
    pub fn differences<'a, I>(vectors: I, mean: &DVector<f64>) -> Vec<DVector<f64>>
    where
        I: IntoIterator<Item = &'a DVector<f64>>,
    {
        vectors.into_iter().map(|v| v - mean).collect()
    }

    pub fn build<'a, I>(&self, vectors: I, mean: &DVector<f64>) -> Result<DMatrix<f64>>
    where
        I: IntoIterator<Item = &'a DVector<f64>>,
    {
        let differences = Self::differences(vectors, mean);
        let count = differences.len();
        if count == 0 {
            return Err(PcaError::InsufficientData);
        }

        let dim = mean.len();
        let mut cov = DMatrix::<f64>::zeros(dim, dim);
        for d in &differences {
            cov += d * d.transpose();
        }

        let scale = match (count, self.policy) {
            (1, DegeneratePolicy::Propagate) => {
                return Err(PcaError::DegenerateDivision(DivisionStage::Covariance));
            }
            (1, DegeneratePolicy::Guard) => {
                warn!("Covariance of a single sample is undefined, using a zero matrix");
                1.0
            }
            _ => 1.0 / (count - 1) as f64,
        };
        cov *= scale;

        debug!("Covariance matrix {}x{} from {} samples", dim, dim, count);
        Ok(cov)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::dvector;

    #[test]
    fn test_axis_aligned_samples() {
        let vectors = [dvector![1.0, 0.0], dvector![-1.0, 0.0], dvector![0.0, 0.0]];
        let mean = dvector![0.0, 0.0];
        let cov = CovarianceBuilder::new(DegeneratePolicy::Guard)
            .build(vectors.iter(), &mean)
            .unwrap();

        assert_abs_diff_eq!(cov[(0, 0)], 1.0);
        assert_abs_diff_eq!(cov[(0, 1)], 0.0);
        assert_abs_diff_eq!(cov[(1, 0)], 0.0);
        assert_abs_diff_eq!(cov[(1, 1)], 0.0);
    }

    #[test]
    fn test_matches_textbook_covariance() {
        let vectors = [
            dvector![2.0, 1.0, 0.0],
            dvector![4.0, 3.0, 1.0],
            dvector![6.0, 2.0, 5.0],
            dvector![8.0, 6.0, 2.0],
        ];
        let mean = vectors.iter().fold(DVector::<f64>::zeros(3), |acc, v| acc + v) / 4.0;
        let cov = CovarianceBuilder::new(DegeneratePolicy::Propagate)
            .build(vectors.iter(), &mean)
            .unwrap();

        for i in 0..3 {
            for j in 0..3 {
                let expected: f64 = vectors
                    .iter()
                    .map(|v| (v[i] - mean[i]) * (v[j] - mean[j]))
                    .sum::<f64>()
                    / 3.0;
                assert_abs_diff_eq!(cov[(i, j)], expected, epsilon = 1e-12);
                assert_abs_diff_eq!(cov[(i, j)], cov[(j, i)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_single_sample() {
        let vectors = [dvector![0.0, 0.0, 0.0]];
        let mean = dvector![0.0, 0.0, 0.0];

        let err = CovarianceBuilder::new(DegeneratePolicy::Propagate)
            .build(vectors.iter(), &mean)
            .unwrap_err();
        assert_eq!(err, PcaError::DegenerateDivision(DivisionStage::Covariance));

        let cov = CovarianceBuilder::new(DegeneratePolicy::Guard)
            .build(vectors.iter(), &mean)
            .unwrap();
        assert!(cov.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_no_samples() {
        let vectors: Vec<DVector<f64>> = Vec::new();
        let err = CovarianceBuilder::new(DegeneratePolicy::Guard)
            .build(vectors.iter(), &DVector::zeros(2))
            .unwrap_err();
        assert_eq!(err, PcaError::InsufficientData);
    }
}
