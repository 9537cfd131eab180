//! Points, pointed values and the hashed grid point.
//!
//! A [`Point`] has a degree (its number of dimensions) and a total order along
//! some canonical traversal of space. Points that compare equal are co-located:
//! stores keep them in the same bucket even when they are not bit-identical.
//!
//! [`GridPoint`] is the concrete point shipped with this crate. It orders signed
//! 32-bit coordinates by their Z-order location hash, so a sorted map of grid
//! points is a Z-order traversal of the grid.

use crate::compute::hash::{
    COORDINATE_BITS, HASH_BITS, compare_interleaved, hash_unchecked, scale_unsigned,
};
use crate::compute::validation::{validate_degree, validate_resolution};
use crate::config::Config;
use crate::error::{PointStoreError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A point which can be ordered against other points of the same degree.
///
/// `Ord` must be consistent with spatial position along the implementation's
/// traversal. Comparing points of different degree through [`Point::try_compare`]
/// is an invalid-argument condition; the plain `Ord` impl still has to be total
/// so that points can key ordered maps.
pub trait Point: Ord + Clone + fmt::Debug {
    /// Number of dimensions this point acts in.
    fn degree(&self) -> usize;

    /// Fails unless `self` and `other` are measured in the same space.
    ///
    /// The default only requires equal degrees.
    fn check_comparable(&self, other: &Self) -> Result<()> {
        validate_degree(self.degree(), other.degree())
    }

    /// Compares two points, rejecting pairs that fail
    /// [`Point::check_comparable`].
    fn try_compare(&self, other: &Self) -> Result<Ordering> {
        self.check_comparable(other)?;
        Ok(self.cmp(other))
    }

    /// Equivalence used for grouping: same degree and ordinal position.
    ///
    /// Kept separate from ordering so that "same bucket" is never inferred from a
    /// comparison between points of different degree.
    fn colocated(&self, other: &Self) -> bool {
        self.degree() == other.degree() && self.cmp(other) == Ordering::Equal
    }
}

/// Something which has a point that can be used as its key.
pub trait Pointed {
    type Point: Point;

    fn point(&self) -> &Self::Point;
}

/// Bits of each scaled coordinate that tell grid points apart.
///
/// The lowest `shift` bits of every coordinate are discarded and the next
/// `precision` bits are interleaved. Coarser resolutions (larger shifts) make
/// every coordinate inside a `2^shift` cell co-located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub precision: u32,
    pub shift: u32,
}

impl Resolution {
    /// Every bit of every coordinate.
    pub const FULL: Resolution = Resolution::new(COORDINATE_BITS, 0);

    pub const fn new(precision: u32, shift: u32) -> Self {
        Self { precision, shift }
    }

    /// The finest resolution whose key holds every interleaved bit.
    ///
    /// Uses `min(32, 64 / degree)` bits per coordinate, taken from the top of
    /// each scaled coordinate. Degree 0 hashes nothing.
    pub fn for_degree(degree: usize) -> Self {
        if degree == 0 {
            return Self::new(0, 0);
        }
        Self::FULL.key_window(degree)
    }

    /// The leading part of this resolution that fits one key of `degree`
    /// coordinates.
    pub fn key_window(&self, degree: usize) -> Self {
        if degree == 0 {
            return *self;
        }
        let fits = (HASH_BITS as usize / degree).min(self.precision as usize) as u32;
        Self::new(fits, self.shift + (self.precision - fits))
    }

    /// Whether a key of `degree` coordinates holds every bit of this resolution.
    pub fn fits_key(&self, degree: usize) -> bool {
        self.key_window(degree) == *self
    }

    pub fn validate(&self) -> Result<()> {
        validate_resolution(self.precision, self.shift)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precision {} shift {}", self.precision, self.shift)
    }
}

/// A point on the signed 32-bit integer grid, in Z order.
///
/// Points are ordered by degree, then resolution, then their interleaved
/// code. The cached key is the leading 64 bits of that code. When more bits
/// are in play than a key holds (three or more coordinates at full
/// resolution), ties on the key are settled from the coordinates.
///
/// Serialized points carry coordinates and resolution only; the key is
/// rebuilt on deserialization.
///
/// # Examples
///
/// ```
/// use pointstore::{GridPoint, Point};
///
/// let a = GridPoint::new([1, 1, 1]);
/// let b = GridPoint::new([1, 1, 2]);
/// assert_eq!(a.degree(), 3);
/// assert!(a < b);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "GridPointRecord", into = "GridPointRecord")]
pub struct GridPoint {
    coordinates: SmallVec<[i32; 4]>,
    resolution: Resolution,
    key: u64,
}

/// On-disk shape of a [`GridPoint`].
#[derive(Serialize, Deserialize)]
struct GridPointRecord {
    coordinates: SmallVec<[i32; 4]>,
    resolution: Resolution,
}

impl TryFrom<GridPointRecord> for GridPoint {
    type Error = PointStoreError;

    fn try_from(record: GridPointRecord) -> Result<Self> {
        GridPoint::with_resolution(record.coordinates, record.resolution)
    }
}

impl From<GridPoint> for GridPointRecord {
    fn from(point: GridPoint) -> Self {
        Self {
            coordinates: point.coordinates,
            resolution: point.resolution,
        }
    }
}

impl GridPoint {
    /// Create a point that distinguishes every coordinate bit.
    pub fn new(coordinates: impl AsRef<[i32]>) -> Self {
        Self::from_parts(coordinates.as_ref(), Resolution::FULL)
    }

    /// Create a point at an explicit resolution.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PointStoreError::InvalidResolution`] if
    /// `precision + shift` exceeds the coordinate width.
    pub fn with_resolution(coordinates: impl AsRef<[i32]>, resolution: Resolution) -> Result<Self> {
        resolution.validate()?;
        Ok(Self::from_parts(coordinates.as_ref(), resolution))
    }

    /// Caller guarantees `resolution` is valid.
    fn from_parts(coordinates: &[i32], resolution: Resolution) -> Self {
        let scaled: SmallVec<[u64; 4]> = coordinates.iter().map(|&c| scale_unsigned(c)).collect();
        let window = resolution.key_window(coordinates.len());
        let key = hash_unchecked(window.shift, window.precision, &scaled);
        Self {
            coordinates: SmallVec::from_slice(coordinates),
            resolution,
            key,
        }
    }

    pub fn coordinates(&self) -> &[i32] {
        &self.coordinates
    }

    pub fn coordinate(&self, axis: usize) -> Option<i32> {
        self.coordinates.get(axis).copied()
    }

    /// Leading 64 bits of this point's Z-order code.
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn scaled(&self) -> SmallVec<[u64; 4]> {
        self.coordinates.iter().map(|&c| scale_unsigned(c)).collect()
    }

    /// Orders the bits of the code that did not fit the key.
    fn cmp_beyond_key(&self, other: &Self) -> Ordering {
        if self.resolution.fits_key(self.degree()) {
            return Ordering::Equal;
        }
        compare_interleaved(
            self.resolution.shift,
            self.resolution.precision,
            &self.scaled(),
            &other.scaled(),
        )
    }
}

impl Point for GridPoint {
    fn degree(&self) -> usize {
        self.coordinates.len()
    }

    /// Keys at different resolutions measure different cells, so both the
    /// degree and the resolution have to agree.
    fn check_comparable(&self, other: &Self) -> Result<()> {
        validate_degree(self.degree(), other.degree())?;
        if self.resolution != other.resolution {
            return Err(PointStoreError::ResolutionMismatch {
                expected: self.resolution,
                found: other.resolution,
            });
        }
        Ok(())
    }
}

impl PartialEq for GridPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GridPoint {}

impl PartialOrd for GridPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree()
            .cmp(&other.degree())
            .then(self.resolution.cmp(&other.resolution))
            .then(self.key.cmp(&other.key))
            .then_with(|| self.cmp_beyond_key(other))
    }
}

impl Hash for GridPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.degree().hash(state);
        self.resolution.hash(state);
        self.key.hash(state);
    }
}

impl fmt::Debug for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridPoint({:?} @ {:#x})", self.coordinates.as_slice(), self.key)
    }
}

/// Composes points from their factors and decomposes them back.
pub trait PointFactory {
    type Factor;
    type Point: Point;

    /// Build a point from its factors.
    fn create(&self, factors: &[Self::Factor]) -> Result<Self::Point>;

    /// Split a point into the factors it was built from.
    fn decompose(&self, point: &Self::Point) -> Vec<Self::Factor>;
}

/// Builds [`GridPoint`]s of a fixed degree at a fixed resolution.
///
/// All points from one factory share a resolution, so their keys are directly
/// comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPointFactory {
    degree: usize,
    resolution: Resolution,
}

impl GridPointFactory {
    /// Factory for points that distinguish every coordinate bit.
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            resolution: Resolution::FULL,
        }
    }

    pub fn with_resolution(degree: usize, resolution: Resolution) -> Result<Self> {
        resolution.validate()?;
        Ok(Self { degree, resolution })
    }

    /// Factory using the configured resolution, or full resolution.
    pub fn from_config(config: &Config, degree: usize) -> Result<Self> {
        match config.resolution {
            Some(resolution) => Self::with_resolution(degree, resolution),
            None => Ok(Self::new(degree)),
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

impl PointFactory for GridPointFactory {
    type Factor = i32;
    type Point = GridPoint;

    fn create(&self, factors: &[i32]) -> Result<GridPoint> {
        validate_degree(self.degree, factors.len())?;
        Ok(GridPoint::from_parts(factors, self.resolution))
    }

    fn decompose(&self, point: &GridPoint) -> Vec<i32> {
        point.coordinates().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolution_per_degree() {
        assert_eq!(Resolution::for_degree(0), Resolution::new(0, 0));
        assert_eq!(Resolution::for_degree(1), Resolution::new(32, 0));
        assert_eq!(Resolution::for_degree(2), Resolution::new(32, 0));
        assert_eq!(Resolution::for_degree(3), Resolution::new(21, 11));
        assert_eq!(Resolution::for_degree(4), Resolution::new(16, 16));
        assert_eq!(Resolution::for_degree(100), Resolution::new(0, 32));

        for degree in 0..80 {
            let resolution = Resolution::for_degree(degree);
            assert!(resolution.validate().is_ok());
            assert!(resolution.fits_key(degree));
        }
    }

    #[test]
    fn test_key_window() {
        assert_eq!(Resolution::FULL.key_window(2), Resolution::FULL);
        assert_eq!(Resolution::FULL.key_window(3), Resolution::new(21, 11));
        assert_eq!(Resolution::new(8, 24).key_window(4), Resolution::new(8, 24));
        assert_eq!(Resolution::new(20, 4).key_window(5), Resolution::new(12, 12));
        assert!(!Resolution::FULL.fits_key(3));
    }

    #[test]
    fn test_grid_point_ordering_follows_hash() {
        let origin = GridPoint::new([1, 1, 1]);
        assert!(origin < GridPoint::new([1, 1, 2]));
        assert!(origin < GridPoint::new([1, 2, 1]));
        assert!(origin < GridPoint::new([2, 1, 1]));
        assert!(GridPoint::new([1, 1, 2]) < GridPoint::new([1, 2, 1]));
        assert!(GridPoint::new([1, 2, 1]) < GridPoint::new([2, 1, 1]));
    }

    #[test]
    fn test_adjacent_points_stay_distinct() {
        for (a, b) in [
            (vec![1, 1, 1], vec![1, 1, 2]),
            (vec![-5, 0, 7], vec![-5, 1, 7]),
            (vec![1, 1, 1, 1], vec![1, 1, 1, 2]),
            (vec![0, 0, 0, 0, 0], vec![1, 0, 0, 0, 0]),
        ] {
            let a = GridPoint::new(a);
            let b = GridPoint::new(b);
            assert_eq!(a.key(), b.key(), "neighbours share the leading key bits");
            assert_ne!(a, b);
            assert!(!a.colocated(&b));
            assert!(a < b);
        }
    }

    #[test]
    fn test_mixed_resolutions_are_not_comparable() {
        let fine = GridPoint::new([1, 1]);
        let coarse = GridPoint::with_resolution([i32::MAX, i32::MAX], Resolution::new(8, 24)).unwrap();
        assert!(matches!(
            fine.try_compare(&coarse),
            Err(PointStoreError::ResolutionMismatch { .. })
        ));

        let same_spot = GridPoint::with_resolution([1, 1], Resolution::new(8, 24)).unwrap();
        assert_ne!(fine, same_spot);
        assert!(!fine.colocated(&same_spot));
        // The total order groups by resolution before comparing keys.
        assert!(fine.resolution() > coarse.resolution());
        assert!(fine > coarse);
    }

    #[test]
    fn test_deserialize_rebuilds_key() {
        let point = GridPoint::new([-7, 42]);
        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("key"));
        assert_eq!(serde_json::from_str::<GridPoint>(&json).unwrap().key(), point.key());

        let tampered = r#"{"coordinates":[-7,42],"resolution":{"precision":32,"shift":0},"key":12345}"#;
        let restored: GridPoint = serde_json::from_str(tampered).unwrap();
        assert_eq!(restored.key(), point.key());
        assert_eq!(restored, point);

        let invalid = r#"{"coordinates":[1],"resolution":{"precision":40,"shift":0}}"#;
        assert!(serde_json::from_str::<GridPoint>(invalid).is_err());
    }

    #[test]
    fn test_negative_coordinates_sort_first() {
        let mut points = vec![
            GridPoint::new([5]),
            GridPoint::new([-5]),
            GridPoint::new([0]),
            GridPoint::new([i32::MIN]),
            GridPoint::new([i32::MAX]),
        ];
        points.sort();
        let xs: Vec<i32> = points.iter().map(|p| p.coordinates()[0]).collect();
        assert_eq!(xs, vec![i32::MIN, -5, 0, 5, i32::MAX]);
    }

    #[test]
    fn test_coarse_resolution_colocates_cell() {
        let coarse = Resolution::new(28, 4);
        let a = GridPoint::with_resolution([16, 32], coarse).unwrap();
        let b = GridPoint::with_resolution([17, 47], coarse).unwrap();
        let c = GridPoint::with_resolution([48, 32], coarse).unwrap();

        assert!(a.colocated(&b));
        assert_eq!(a, b);
        assert_ne!(a.coordinates(), b.coordinates());
        assert!(!a.colocated(&c));
    }

    #[test]
    fn test_try_compare_rejects_degree_mismatch() {
        let flat = GridPoint::new([1, 2]);
        let deep = GridPoint::new([1, 2, 3]);
        assert!(matches!(
            flat.try_compare(&deep),
            Err(PointStoreError::DegreeMismatch {
                expected: 2,
                found: 3
            })
        ));
        assert!(!flat.colocated(&deep));
        assert_eq!(flat.try_compare(&flat.clone()).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_invalid_resolution_rejected() {
        assert!(GridPoint::with_resolution([1, 2, 3], Resolution::new(32, 1)).is_err());
        assert!(GridPoint::with_resolution([1], Resolution::new(30, 4)).is_err());
        assert!(GridPointFactory::with_resolution(2, Resolution::new(33, 0)).is_err());
    }

    #[test]
    fn test_factory_roundtrip_and_degree_check() {
        let factory = GridPointFactory::new(3);
        let point = factory.create(&[-7, 0, 12]).unwrap();
        assert_eq!(point.degree(), 3);
        assert_eq!(factory.decompose(&point), vec![-7, 0, 12]);

        assert!(matches!(
            factory.create(&[1, 2]),
            Err(PointStoreError::DegreeMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_factory_from_config() {
        let config = Config::default().with_resolution(Resolution::new(8, 24));
        let factory = GridPointFactory::from_config(&config, 2).unwrap();
        assert_eq!(factory.resolution(), Resolution::new(8, 24));

        let default = GridPointFactory::from_config(&Config::default(), 3).unwrap();
        assert_eq!(default.resolution(), Resolution::FULL);
    }

    #[test]
    fn test_zero_degree_point() {
        let empty = GridPoint::new(Vec::<i32>::new());
        assert_eq!(empty.degree(), 0);
        assert_eq!(empty.key(), 0);
        assert_eq!(empty.resolution(), Resolution::FULL);
        assert_eq!(empty, GridPoint::new(&[] as &[i32]));
    }
}
