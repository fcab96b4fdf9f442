use nalgebra::{DMatrix, DVector};

use crate::pca::{Coordinate, PrincipalBasis, ProjectionMode};
use crate::ItemId;

/// Maps feature vectors onto a [`PrincipalBasis`].
///
/// Holds the `2 x d` matrix whose rows are `base1` and `base2`.
#[derive(Debug, Clone)]
pub struct Projector {
    matrix: DMatrix<f64>,
    offset: Option<DVector<f64>>,
}

impl Projector {
    pub fn new(basis: &PrincipalBasis, mode: ProjectionMode, mean: &DVector<f64>) -> Self {
        let matrix = DMatrix::from_rows(&[basis.base1.transpose(), basis.base2.transpose()]);
        let offset = match mode {
            ProjectionMode::Raw => None,
            ProjectionMode::Centered => Some(mean.clone()),
        };
        Projector { matrix, offset }
    }

    /// `M . v`, or `M . (v - mean)` when centering.
    pub fn project(&self, v: &DVector<f64>) -> (f64, f64) {
        let coord = match &self.offset {
            Some(mean) => &self.matrix * (v - mean),
            None => &self.matrix * v,
        };
        (coord[0], coord[1])
    }

    /// One coordinate per `(id, vector)` pair, in input order, without payload.
    pub fn project_all<'a, I>(&self, vectors: I) -> Vec<Coordinate>
    where
        I: IntoIterator<Item = (ItemId, &'a DVector<f64>)>,
    {
        vectors
            .into_iter()
            .map(|(id, v)| {
                let (x, y) = self.project(v);
                Coordinate::new(id, x, y)
            })
            .collect()
    }
}
