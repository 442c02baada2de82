//! Planar coordinate type.
//!
//! Node coordinates arrive from the ingestion side already projected to a
//! metric plane, so plain Euclidean geometry in `f64` is enough.  Edge lengths
//! are supplied separately and are not derived from these coordinates.

/// A 2-D point in projected metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at `fraction` of the way from `self` to `other`.
    ///
    /// `fraction` is clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: Point, fraction: f64) -> Point {
        let t = fraction.clamp(0.0, 1.0);
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// `true` if both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
