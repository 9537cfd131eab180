//! Regions: inclusive intervals between two points of the same degree.

use crate::compute::validation::validate_bounds;
use crate::error::Result;
use crate::point::{GridPoint, Point, Pointed};
use serde::{Deserialize, Serialize};

/// A region bounded by a lower and an upper point, both inclusive.
///
/// Containment follows the points' order, so for [`GridPoint`] a region is an
/// interval of the Z-order curve. Use [`Region::encloses`] for the exact
/// axis-aligned box test on grid coordinates.
///
/// # Examples
///
/// ```
/// use pointstore::{GridPoint, Region};
///
/// let region = Region::create(GridPoint::new([0, 0]), GridPoint::new([3, 3]))?;
/// assert!(region.contains_point(&GridPoint::new([1, 2])));
/// assert!(Region::create(GridPoint::new([3, 3]), GridPoint::new([0, 0])).is_err());
/// # Ok::<(), pointstore::PointStoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region<P> {
    lower: P,
    upper: P,
}

impl<P: Point> Region<P> {
    /// Creates a region, validating its bounds.
    ///
    /// # Errors
    ///
    /// [`crate::PointStoreError::DegreeMismatch`] if the bounds differ in degree,
    /// [`crate::PointStoreError::InvertedRegion`] if `lower > upper`.
    pub fn create(lower: P, upper: P) -> Result<Self> {
        validate_bounds(&lower, &upper)?;
        Ok(Self { lower, upper })
    }

    /// Creates a region without validating its bounds.
    ///
    /// For callers that already proved `lower <= upper` with equal degrees.
    /// Queries over an unvalidated inverted region are not guaranteed to fail.
    pub fn new_unchecked(lower: P, upper: P) -> Self {
        Self { lower, upper }
    }

    pub fn lower(&self) -> &P {
        &self.lower
    }

    pub fn upper(&self) -> &P {
        &self.upper
    }

    pub fn into_bounds(self) -> (P, P) {
        (self.lower, self.upper)
    }

    pub fn degree(&self) -> usize {
        self.lower.degree()
    }

    /// Whether `point` lies between the bounds, both ends closed.
    pub fn contains_point(&self, point: &P) -> bool {
        &self.lower <= point && point <= &self.upper
    }

    /// Whether `other` lies completely within this region.
    ///
    /// Regions that merely intersect are not contained.
    pub fn contains_region(&self, other: &Region<P>) -> bool {
        self.lower <= other.lower && self.upper >= other.upper
    }
}

impl<P: Point> Pointed for Region<P> {
    type Point = P;

    /// The lower bound represents the region.
    fn point(&self) -> &P {
        &self.lower
    }
}

impl Region<GridPoint> {
    /// Axis-aligned box test on grid coordinates, inclusive on every axis.
    ///
    /// A curve interval also covers points outside the box spanned by its
    /// bounds; range scans use this to filter those out.
    pub fn encloses(&self, point: &GridPoint) -> bool {
        if point.degree() != self.lower.degree() {
            return false;
        }
        self.lower
            .coordinates()
            .iter()
            .zip(self.upper.coordinates())
            .zip(point.coordinates())
            .all(|((low, high), c)| {
                let (low, high) = if low <= high { (low, high) } else { (high, low) };
                low <= c && c <= high
            })
    }
}
