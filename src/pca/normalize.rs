use log::warn;

use crate::pca::{Coordinate, DegeneratePolicy};
use crate::utils::{Axis2, MinMax, Normalize};

/// Value every entry takes on a zero-range axis under [`DegeneratePolicy::Guard`].
pub const DEGENERATE_AXIS_VALUE: f64 = 0.5;

fn axis_value<P>(c: &Coordinate<P>, axis: Axis2) -> f64 {
    match axis {
        Axis2::X => c.x,
        Axis2::Y => c.y,
    }
}

fn axis_value_mut<P>(c: &mut Coordinate<P>, axis: Axis2) -> &mut f64 {
    match axis {
        Axis2::X => &mut c.x,
        Axis2::Y => &mut c.y,
    }
}

impl<P> Normalize for [Coordinate<P>] {
    fn normalize_axis(&mut self, axis: Axis2, policy: DegeneratePolicy) {
        let bounds: MinMax<f64> = self.iter().map(|c| axis_value(c, axis)).collect();
        if bounds.is_unset() {
            return;
        }

        let degenerate = bounds.range() == 0.0;
        if degenerate {
            warn!(
                "All {} coordinates share {:?} = {}, axis has zero range",
                self.len(),
                axis,
                bounds.min()
            );
        }

        for c in self.iter_mut() {
            let value = axis_value_mut(c, axis);
            *value = match (degenerate, policy) {
                (true, DegeneratePolicy::Guard) => DEGENERATE_AXIS_VALUE,
                _ => bounds.scale(*value),
            };
        }
    }
}
