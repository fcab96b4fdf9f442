use log::{debug, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::eigen::Decomposition;
use crate::error::{PcaError, Result};

/// The two unit-length directions of greatest variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipalBasis {
    pub base1: DVector<f64>,
    pub base2: DVector<f64>,
    /// Real parts of the eigenvalues belonging to `base1` and `base2`.
    pub eigenvalues: [f64; 2],
    /// Sum of the real parts of all eigenvalues.
    pub total_variance: f64,
}

impl PrincipalBasis {
    /// Share of the total variance carried by each axis.
    ///
    /// Both entries are NaN when `total_variance` is zero, which only a
    /// selector that accepts zero spectra lets through.
    pub fn explained_variance_ratio(&self) -> [f64; 2] {
        [
            self.eigenvalues[0] / self.total_variance,
            self.eigenvalues[1] / self.total_variance,
        ]
    }

    pub fn dimensionality(&self) -> usize {
        self.base1.len()
    }
}

/// Picks the eigenvectors of the two largest real eigenvalues.
#[derive(Debug, Clone, Copy)]
pub struct ComponentSelector {
    imaginary_tolerance: f64,
    zero_variance_threshold: Option<f64>,
}

impl ComponentSelector {
    pub fn new(imaginary_tolerance: f64) -> Self {
        ComponentSelector {
            imaginary_tolerance,
            zero_variance_threshold: None,
        }
    }

    /// Fail when the data has no variance in any direction.
    ///
    /// The spread along the first axis, `sqrt(lambda1)`, is compared with
    /// `tolerance * magnitude`, where `magnitude` is the largest absolute
    /// input value. Rescaling the input therefore never changes the outcome.
    pub fn reject_zero_spectrum(mut self, magnitude: f64, tolerance: f64) -> Self {
        self.zero_variance_threshold = Some(tolerance * magnitude.abs());
        self
    }

    /// Indices of the largest and second largest real eigenvalue.
    ///
    /// Single pass in decomposition order with strict comparisons: on ties the
    /// earliest index ranks higher, and a value equal to the current second
    /// best does not replace it. NaN never compares greater and is skipped.
    pub fn top_two(&self, decomposition: &Decomposition) -> [Option<usize>; 2] {
        let mut max_vals = [f64::NEG_INFINITY; 2];
        let mut max_inds: [Option<usize>; 2] = [None, None];

        for (i, c) in decomposition.eigenvalues.iter().enumerate() {
            if c.im.abs() > self.imaginary_tolerance {
                warn!(
                    "Eigenvalue {} has imaginary part {:e}, using the real part {}",
                    i, c.im, c.re
                );
            }

            let tmp = c.re;
            if tmp > max_vals[0] {
                max_vals[1] = max_vals[0];
                max_inds[1] = max_inds[0];
                max_vals[0] = tmp;
                max_inds[0] = Some(i);
            } else if tmp > max_vals[1] {
                max_vals[1] = tmp;
                max_inds[1] = Some(i);
            }
        }

        max_inds
    }

    pub fn select(&self, decomposition: &Decomposition) -> Result<PrincipalBasis> {
        let (first, second) = match self.top_two(decomposition) {
            [Some(first), Some(second)] => (first, second),
            _ => {
                return Err(PcaError::DegenerateSpectrum(format!(
                    "need two eigenpairs, found {}",
                    decomposition.len()
                )))
            }
        };

        let lambda1 = decomposition.eigenvalues[first].re;
        let lambda2 = decomposition.eigenvalues[second].re;
        if let Some(threshold) = self.zero_variance_threshold {
            if lambda1.max(0.0).sqrt() <= threshold {
                return Err(PcaError::DegenerateSpectrum(
                    "no variance in any direction".to_string(),
                ));
            }
        }

        let base1 = self.unit_column(decomposition, first)?;
        let base2 = self.unit_column(decomposition, second)?;
        let total_variance = decomposition.eigenvalues.iter().map(|c| c.re).sum();

        debug!(
            "Selected eigenpairs {} ({}) and {} ({})",
            first, lambda1, second, lambda2
        );

        Ok(PrincipalBasis {
            base1,
            base2,
            eigenvalues: [lambda1, lambda2],
            total_variance,
        })
    }

    fn unit_column(&self, decomposition: &Decomposition, index: usize) -> Result<DVector<f64>> {
        if index >= decomposition.eigenvectors.ncols() {
            return Err(PcaError::DegenerateSpectrum(format!(
                "eigenvector {} missing from decomposition",
                index
            )));
        }
        let column: DVector<f64> = decomposition.eigenvectors.column(index).into_owned();
        column.try_normalize(f64::EPSILON).ok_or_else(|| {
            PcaError::DegenerateSpectrum(format!("eigenvector {} has zero length", index))
        })
    }
}

impl Default for ComponentSelector {
    fn default() -> Self {
        Self::new(1e-9)
    }
}
