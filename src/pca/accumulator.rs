use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::trace;
use nalgebra::DVector;

use crate::error::{PcaError, Result};
use crate::ItemId;

/// Collects feature vectors keyed by item id.
///
/// The first accepted vector fixes the dimensionality for the run. A running
/// sum is kept alongside the vectors so the mean is available without another
/// pass. Vectors iterate in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct FeatureAccumulator {
    vectors: BTreeMap<ItemId, DVector<f64>>,
    sum: Option<DVector<f64>>,
    dimensionality: Option<usize>,
}

impl FeatureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature vector for `id`.
    ///
    /// Fails with [`PcaError::DimensionMismatch`] when the length differs from
    /// the first accepted vector and with [`PcaError::DuplicateId`] when `id`
    /// is already present. A failed call leaves the accumulator untouched.
    pub fn add(&mut self, id: ItemId, data: &[f64]) -> Result<()> {
        if let Some(expected) = self.dimensionality {
            if expected != data.len() {
                return Err(PcaError::DimensionMismatch {
                    expected,
                    got: data.len(),
                });
            }
        }

        let slot = match self.vectors.entry(id) {
            Entry::Occupied(_) => return Err(PcaError::DuplicateId(id)),
            Entry::Vacant(slot) => slot,
        };

        let v = DVector::from_column_slice(data);
        match self.sum.as_mut() {
            Some(sum) => *sum += &v,
            None => self.sum = Some(v.clone()),
        }
        slot.insert(v);
        self.dimensionality = Some(data.len());

        trace!("accumulated item {} ({} entries)", id, self.vectors.len());
        Ok(())
    }

    /// Concatenates `data` and `extra` into one vector before adding it.
    pub fn add_with_extras(&mut self, id: ItemId, data: &[f64], extra: &[f64]) -> Result<()> {
        let mut combined = Vec::with_capacity(data.len() + extra.len());
        combined.extend_from_slice(data);
        combined.extend_from_slice(extra);
        self.add(id, &combined)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Length fixed by the first accepted vector.
    pub fn dimensionality(&self) -> Option<usize> {
        self.dimensionality
    }

    pub fn get(&self, id: ItemId) -> Option<&DVector<f64>> {
        self.vectors.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.vectors.contains_key(&id)
    }

    /// `(id, vector)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &DVector<f64>)> {
        self.vectors.iter().map(|(&id, v)| (id, v))
    }

    /// Arithmetic mean of all accepted vectors, `None` while empty.
    pub fn mean(&self) -> Option<DVector<f64>> {
        let count = self.vectors.len();
        if count == 0 {
            return None;
        }
        self.sum.as_ref().map(|sum| sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dimension_enforcement() {
        let mut acc = FeatureAccumulator::new();
        acc.add(1, &[1.0, 2.0, 3.0]).unwrap();

        let err = acc.add(2, &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, PcaError::DimensionMismatch { expected: 3, got: 2 });
        let err = acc.add(3, &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(err, PcaError::DimensionMismatch { expected: 3, got: 4 });

        assert_eq!(acc.len(), 1);
        assert!(!acc.contains(2));
        assert!(!acc.contains(3));
        let mean = acc.mean().unwrap();
        assert_relative_eq!(mean[0], 1.0);
        assert_relative_eq!(mean[1], 2.0);
        assert_relative_eq!(mean[2], 3.0);
    }

    #[test]
    fn test_duplicate_keeps_first_vector() {
        let mut acc = FeatureAccumulator::new();
        acc.add(7, &[1.0, 1.0]).unwrap();
        assert_eq!(acc.add(7, &[5.0, 5.0]), Err(PcaError::DuplicateId(7)));

        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get(7).unwrap().as_slice(), &[1.0, 1.0]);
        assert_eq!(acc.mean().unwrap().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_running_mean() {
        let mut acc = FeatureAccumulator::new();
        assert!(acc.mean().is_none());
        acc.add(1, &[1.0, 0.0]).unwrap();
        acc.add(2, &[3.0, 4.0]).unwrap();
        acc.add(3, &[5.0, 2.0]).unwrap();

        let mean = acc.mean().unwrap();
        assert_relative_eq!(mean[0], 3.0);
        assert_relative_eq!(mean[1], 2.0);
    }

    #[test]
    fn test_extras_are_appended() {
        let mut acc = FeatureAccumulator::new();
        acc.add_with_extras(1, &[0.5, 0.25], &[120.0]).unwrap();
        acc.add_with_extras(2, &[], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(acc.get(1).unwrap().as_slice(), &[0.5, 0.25, 120.0]);
        assert_eq!(acc.dimensionality(), Some(3));

        assert!(acc.add_with_extras(3, &[1.0], &[2.0]).is_err());
    }

    #[test]
    fn test_iteration_order_is_by_id() {
        let mut acc = FeatureAccumulator::new();
        for id in [5, -2, 9, 0] {
            acc.add(id, &[id as f64]).unwrap();
        }
        let ids: Vec<ItemId> = acc.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![-2, 0, 5, 9]);
    }
}
