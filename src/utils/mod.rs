use num_traits::Float;

use crate::pca::DegeneratePolicy;

/// Axis of a 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis2 {
    X,
    Y,
}

pub trait Normalize {
    /// Rescales every value on `axis` into `[0, 1]`.
    fn normalize_axis(&mut self, axis: Axis2, policy: DegeneratePolicy);

    fn normalize(&mut self, policy: DegeneratePolicy) {
        self.normalize_axis(Axis2::X, policy);
        self.normalize_axis(Axis2::Y, policy);
    }
}

/// Running minimum and maximum over a stream of values.
///
/// Starts at `(+inf, -inf)` so that any finite value replaces both bounds.
/// NaN values never update a bound.
#[derive(Debug, Clone, Copy)]
pub struct MinMax<T: Float> {
    min: T,
    max: T,
}

impl<T: Float> Default for MinMax<T> {
    fn default() -> Self {
        Self {
            min: T::infinity(),
            max: T::neg_infinity(),
        }
    }
}

impl<T: Float> MinMax<T> {
    pub fn update(&mut self, value: T) {
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn range(&self) -> T {
        self.max - self.min
    }

    /// `true` until at least one comparable value has been seen.
    pub fn is_unset(&self) -> bool {
        self.min > self.max
    }

    /// Shift by the minimum and divide by the range, without guarding a zero range.
    pub fn scale(&self, value: T) -> T {
        (value - self.min) / self.range()
    }
}

impl<T: Float> FromIterator<T> for MinMax<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mm = MinMax::default();
        for v in iter {
            mm.update(v);
        }
        mm
    }
}

/// Median of a slice, sorting it in place. NaNs order last.
pub fn median_in_place<T: Float>(values: &mut [T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        let two = T::one() + T::one();
        Some((values[mid - 1] + values[mid]) / two)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_min_max() {
        let mm: MinMax<f64> = [3.0, -1.0, 2.0, f64::NAN].into_iter().collect();
        assert_relative_eq!(mm.min(), -1.0);
        assert_relative_eq!(mm.max(), 3.0);
        assert_relative_eq!(mm.scale(-1.0), 0.0);
        assert_relative_eq!(mm.scale(3.0), 1.0);
        assert_relative_eq!(mm.scale(1.0), 0.5);

        let empty: MinMax<f32> = std::iter::empty().collect();
        assert!(empty.is_unset());
    }

    #[test]
    fn test_median() {
        assert_eq!(median_in_place(&mut [5.0, 1.0, 3.0][..]), Some(3.0));
        assert_eq!(median_in_place(&mut [4.0, 1.0, 3.0, 2.0][..]), Some(2.5));
        assert_eq!(median_in_place::<f64>(&mut [][..]), None);
    }
}
