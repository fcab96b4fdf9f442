use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ItemId;

/// Normalized 2D position of one catalog item.
///
/// `x` and `y` lie in `[0, 1]` after a successful run, except on an axis with
/// zero range under [`crate::pca::DegeneratePolicy::Propagate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate<P = ()> {
    pub id: ItemId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
}

impl<P> Coordinate<P> {
    pub fn new(id: ItemId, x: f64, y: f64) -> Self {
        Coordinate {
            id,
            x,
            y,
            payload: None,
        }
    }

    /// Replaces the payload, keeping id and position.
    pub fn with_payload<Q>(self, payload: Q) -> Coordinate<Q> {
        Coordinate {
            id: self.id,
            x: self.x,
            y: self.y,
            payload: Some(payload),
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl<P> fmt::Display for Coordinate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Coordinate: ID={}, X={}, Y={}]", self.id, self.x, self.y)
    }
}
