//! # Catalog PCA
//!
//! Reduces one feature vector per catalog item to a normalized 2D coordinate.
//!
//! Feed vectors with [`Analyzer::add_entry`], run [`Analyzer::perform_pca`] once
//! and read [`Analyzer::coordinates`]. The run builds the sample covariance
//! matrix, decomposes it with the configured [`EigenDecomposition`] backend,
//! keeps the two directions of greatest variance, projects every vector onto
//! them and rescales each axis into `[0, 1]`.
//!
//! ```ignore
//! let mut analyzer = AnalyzerBuilder::new()
//!     .degenerate_policy(DegeneratePolicy::Guard)
//!     .build();
//! analyzer.add_entry(1, &[0.3, 1.2, -0.4])?;
//! analyzer.add_entry(2, &[0.1, 0.9, 0.2])?;
//! analyzer.add_entry(3, &[0.8, 1.0, 0.0])?;
//! analyzer.perform_pca()?;
//! for c in analyzer.coordinates().unwrap() {
//!     println!("{}", c);
//! }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use log::{debug, info, warn};
use nalgebra::DVector;
use ndarray::Array2;

use crate::eigen::{EigenDecomposition, NalgebraEigen};
use crate::error::{PcaError, Result};
use crate::utils::Normalize;
use crate::ItemId;

mod accumulator;
mod coordinate;
mod covariance;
mod normalize;
mod projection;
mod selection;

pub use accumulator::FeatureAccumulator;
pub use coordinate::Coordinate;
pub use covariance::CovarianceBuilder;
pub use normalize::DEGENERATE_AXIS_VALUE;
pub use projection::Projector;
pub use selection::{ComponentSelector, PrincipalBasis};

/// Whether vectors are centered on the mean before projection.
///
/// Both modes give identical coordinates after normalization, since centering
/// shifts each axis by a constant. They differ in [`Analyzer::project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// `M . v`
    #[default]
    Raw,
    /// `M . (v - mean)`
    Centered,
}

/// How divisions by zero are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Plain arithmetic: a zero-range axis turns into NaN for every entry.
    /// A single-sample covariance fails with [`PcaError::DegenerateDivision`]
    /// instead of handing a NaN matrix to the eigensolver.
    Propagate,
    /// A single-sample covariance is the zero matrix, a spectrum without any
    /// variance fails with [`PcaError::DegenerateSpectrum`], and a zero-range
    /// axis maps every entry to [`DEGENERATE_AXIS_VALUE`].
    #[default]
    Guard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerState {
    Empty,
    /// At least one entry accepted, ready for [`Analyzer::perform_pca`].
    Collecting,
    Computed,
}

pub struct AnalyzerBuilder<E: EigenDecomposition = NalgebraEigen> {
    projection: ProjectionMode,
    policy: DegeneratePolicy,
    truncate_underdetermined: bool,
    imaginary_tolerance: f64,
    zero_variance_tolerance: f64,
    backend: Arc<E>,
}

impl AnalyzerBuilder<NalgebraEigen> {
    /// Creates a builder with the nalgebra backend.
    ///
    /// Default values:
    /// - `projection`: Raw
    /// - `degenerate_policy`: Guard
    /// - `truncate_underdetermined`: false
    /// - `imaginary_tolerance`: 1e-9
    /// - `zero_variance_tolerance`: 1e-12
    pub fn new() -> Self {
        AnalyzerBuilder {
            projection: ProjectionMode::default(),
            policy: DegeneratePolicy::default(),
            truncate_underdetermined: false,
            imaginary_tolerance: 1e-9,
            zero_variance_tolerance: 1e-12,
            backend: Arc::new(NalgebraEigen::new()),
        }
    }
}

impl Default for AnalyzerBuilder<NalgebraEigen> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EigenDecomposition> AnalyzerBuilder<E> {
    pub fn backend<F: EigenDecomposition>(self, backend: F) -> AnalyzerBuilder<F> {
        self.shared_backend(Arc::new(backend))
    }

    /// Uses a backend shared with other analyzers.
    pub fn shared_backend<F: EigenDecomposition>(self, backend: Arc<F>) -> AnalyzerBuilder<F> {
        AnalyzerBuilder {
            projection: self.projection,
            policy: self.policy,
            truncate_underdetermined: self.truncate_underdetermined,
            imaginary_tolerance: self.imaginary_tolerance,
            zero_variance_tolerance: self.zero_variance_tolerance,
            backend,
        }
    }

    pub fn projection(mut self, projection: ProjectionMode) -> Self {
        self.projection = projection;
        self
    }

    pub fn degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// When there are more features than samples, only the first `count`
    /// features of every vector take part in the run.
    ///
    /// Off by default, so every feature is used and only a warning is logged.
    /// Earlier catalog tooling always truncated in this situation; enable
    /// this to reproduce its coordinates.
    pub fn truncate_underdetermined(mut self, truncate: bool) -> Self {
        self.truncate_underdetermined = truncate;
        self
    }

    /// Imaginary eigenvalue parts above this magnitude are reported.
    pub fn imaginary_tolerance(mut self, tolerance: f64) -> Self {
        self.imaginary_tolerance = tolerance;
        self
    }

    /// Relative spread below which [`DegeneratePolicy::Guard`] treats the
    /// data as constant: the run fails when the standard deviation along the
    /// first axis is at most `tolerance` times the largest absolute input
    /// value.
    pub fn zero_variance_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_variance_tolerance = tolerance;
        self
    }

    pub fn build(self) -> Analyzer<E> {
        Analyzer {
            accumulator: FeatureAccumulator::new(),
            projection: self.projection,
            policy: self.policy,
            truncate_underdetermined: self.truncate_underdetermined,
            imaginary_tolerance: self.imaginary_tolerance,
            zero_variance_tolerance: self.zero_variance_tolerance,
            backend: self.backend,
            result: None,
        }
    }
}

struct Computation {
    basis: PrincipalBasis,
    projector: Projector,
    mean: DVector<f64>,
    truncated_to: Option<usize>,
    coordinates: Vec<Coordinate>,
}

/// One PCA run over a set of catalog items.
pub struct Analyzer<E: EigenDecomposition = NalgebraEigen> {
    accumulator: FeatureAccumulator,
    projection: ProjectionMode,
    policy: DegeneratePolicy,
    truncate_underdetermined: bool,
    imaginary_tolerance: f64,
    zero_variance_tolerance: f64,
    backend: Arc<E>,
    result: Option<Computation>,
}

impl Analyzer<NalgebraEigen> {
    pub fn new() -> Self {
        AnalyzerBuilder::new().build()
    }
}

impl Default for Analyzer<NalgebraEigen> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EigenDecomposition> Analyzer<E> {
    /// Adds the feature vector of item `id`.
    ///
    /// The first accepted vector fixes the dimensionality. Rejected entries
    /// ([`PcaError::DimensionMismatch`], [`PcaError::DuplicateId`],
    /// [`PcaError::AlreadyComputed`]) leave the analyzer unchanged.
    pub fn add_entry(&mut self, id: ItemId, data: &[f64]) -> Result<()> {
        if self.result.is_some() {
            return Err(PcaError::AlreadyComputed);
        }
        self.accumulator.add(id, data).inspect_err(|e| {
            debug!("Rejected entry {}: {}", id, e);
        })
    }

    /// Adds `data` followed by `extra` as one feature vector.
    ///
    /// Lets independently computed feature groups (e.g. timbre and tempo) be
    /// combined without concatenating them first. `data` may be empty.
    pub fn add_entry_with_extras(&mut self, id: ItemId, data: &[f64], extra: &[f64]) -> Result<()> {
        if self.result.is_some() {
            return Err(PcaError::AlreadyComputed);
        }
        self.accumulator.add_with_extras(id, data, extra).inspect_err(|e| {
            debug!("Rejected entry {}: {}", id, e);
        })
    }

    /// Runs the full pipeline over every accumulated entry.
    ///
    /// # Returns
    /// - `Ok(())`: coordinates and basis are available
    /// - `Err(InsufficientData)`: nothing was added
    /// - `Err(DegenerateSpectrum)`: fewer than two usable eigenpairs, or
    ///   constant data under [`DegeneratePolicy::Guard`]
    /// - `Err(DegenerateDivision)`: single sample under [`DegeneratePolicy::Propagate`]
    /// - `Err(Decomposition)`: the backend failed
    ///
    /// On failure nothing is stored and the state does not change. Calling it
    /// again after success recomputes from the same data.
    pub fn perform_pca(&mut self) -> Result<()> {
        let count = self.accumulator.len();
        let full_mean = self.accumulator.mean().ok_or(PcaError::InsufficientData)?;
        let n_features = full_mean.len();

        if n_features > count {
            warn!(
                "Cannot solve equation if number of samples ({}) is smaller than number of features ({})",
                count, n_features
            );
        }
        let truncated_to = (self.truncate_underdetermined && n_features > count).then_some(count);

        info!("Performing PCA on {} entries with {} features", count, n_features);

        let mean = match truncated_to {
            Some(n) => full_mean.rows(0, n).into_owned(),
            None => full_mean,
        };
        let samples = self.working_set(truncated_to);

        let cov = CovarianceBuilder::new(self.policy)
            .build(samples.iter().map(|(_, v)| &**v), &mean)?;

        if cov.nrows() < 2 {
            return Err(PcaError::DegenerateSpectrum(format!(
                "dimensionality {} is below 2",
                cov.nrows()
            )));
        }

        let decomposition = self.backend.decompose(&cov)?;
        let mut selector = ComponentSelector::new(self.imaginary_tolerance);
        if self.policy == DegeneratePolicy::Guard {
            let magnitude = samples
                .iter()
                .map(|(_, v)| v.amax())
                .fold(0.0, f64::max);
            selector = selector.reject_zero_spectrum(magnitude, self.zero_variance_tolerance);
        }
        let basis = selector.select(&decomposition)?;
        debug!("PCA complete, computing coordinates");

        let projector = Projector::new(&basis, self.projection, &mean);
        let mut coordinates =
            projector.project_all(samples.iter().map(|(id, v)| (*id, &**v)));
        coordinates.normalize(self.policy);
        debug!("{} coordinates ready to use", coordinates.len());

        self.result = Some(Computation {
            basis,
            projector,
            mean,
            truncated_to,
            coordinates,
        });
        Ok(())
    }

    fn working_set(&self, truncated_to: Option<usize>) -> Vec<(ItemId, Cow<'_, DVector<f64>>)> {
        self.accumulator
            .iter()
            .map(|(id, v)| {
                let v = match truncated_to {
                    Some(n) => Cow::Owned(v.rows(0, n).into_owned()),
                    None => Cow::Borrowed(v),
                };
                (id, v)
            })
            .collect()
    }

    pub fn state(&self) -> AnalyzerState {
        if self.result.is_some() {
            AnalyzerState::Computed
        } else if self.accumulator.is_empty() {
            AnalyzerState::Empty
        } else {
            AnalyzerState::Collecting
        }
    }

    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    pub fn dimensionality(&self) -> Option<usize> {
        self.accumulator.dimensionality()
    }

    pub fn accumulator(&self) -> &FeatureAccumulator {
        &self.accumulator
    }

    /// Mean used by the last run, or the running mean before any run.
    pub fn mean(&self) -> Option<Cow<'_, DVector<f64>>> {
        match &self.result {
            Some(r) => Some(Cow::Borrowed(&r.mean)),
            None => self.accumulator.mean().map(Cow::Owned),
        }
    }

    /// Normalized coordinates in ascending id order, `None` before a successful run.
    pub fn coordinates(&self) -> Option<&[Coordinate]> {
        self.result.as_ref().map(|r| r.coordinates.as_slice())
    }

    pub fn into_coordinates(self) -> Option<Vec<Coordinate>> {
        self.result.map(|r| r.coordinates)
    }

    pub fn basis(&self) -> Option<&PrincipalBasis> {
        self.result.as_ref().map(|r| &r.basis)
    }

    /// See [`PrincipalBasis::explained_variance_ratio`]; NaN for constant
    /// data under [`DegeneratePolicy::Propagate`].
    pub fn explained_variance_ratio(&self) -> Option<[f64; 2]> {
        self.basis().map(PrincipalBasis::explained_variance_ratio)
    }

    /// Projection of item `id` onto the basis before normalization.
    pub fn project(&self, id: ItemId) -> Option<(f64, f64)> {
        let result = self.result.as_ref()?;
        let v = self.accumulator.get(id)?;
        Some(match result.truncated_to {
            Some(n) => result.projector.project(&v.rows(0, n).into_owned()),
            None => result.projector.project(v),
        })
    }

    /// One line per coordinate.
    pub fn coordinate_strings(&self) -> Option<String> {
        self.coordinates().map(|coords| {
            coords.iter().fold(String::new(), |mut out, c| {
                out.push_str(&c.to_string());
                out.push('\n');
                out
            })
        })
    }

    /// Coordinates as an `n x 2` array, rows in the order of [`Analyzer::coordinates`].
    pub fn coordinates_array(&self) -> Option<Array2<f64>> {
        self.coordinates().map(|coords| {
            Array2::from_shape_fn((coords.len(), 2), |(i, j)| {
                if j == 0 {
                    coords[i].x
                } else {
                    coords[i].y
                }
            })
        })
    }
}
