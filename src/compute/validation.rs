//! Structural checks shared by regions, point sets and grid points.

use crate::compute::hash::COORDINATE_BITS;
use crate::error::{PointStoreError, Result};
use crate::point::Point;
use std::cmp::Ordering;

/// Fails with [`PointStoreError::DegreeMismatch`] unless both degrees agree.
///
/// # Examples
///
/// ```
/// use pointstore::compute::validation::validate_degree;
///
/// assert!(validate_degree(3, 3).is_ok());
/// assert!(validate_degree(3, 2).is_err());
/// ```
pub fn validate_degree(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(PointStoreError::DegreeMismatch { expected, found });
    }
    Ok(())
}

/// Checks that `candidate` may share a bucket with `anchor`.
///
/// Degree is checked first so the error names the invariant that failed.
pub fn validate_colocated<P: Point>(anchor: &P, candidate: &P) -> Result<()> {
    anchor.check_comparable(candidate)?;
    if anchor.cmp(candidate) != Ordering::Equal {
        return Err(PointStoreError::NotColocated);
    }
    Ok(())
}

/// Checks that `lower` and `upper` can bound a region.
pub fn validate_bounds<P: Point>(lower: &P, upper: &P) -> Result<()> {
    lower.check_comparable(upper)?;
    if lower.cmp(upper) == Ordering::Greater {
        return Err(PointStoreError::InvertedRegion);
    }
    Ok(())
}

/// Checks a grid resolution against the coordinate width.
///
/// `precision + shift` must fit in a scaled coordinate. The key width does not
/// limit the resolution: keys hold the leading bits of the interleaved code.
pub fn validate_resolution(precision: u32, shift: u32) -> Result<()> {
    if precision.saturating_add(shift) > COORDINATE_BITS {
        return Err(PointStoreError::InvalidResolution(format!(
            "precision {} + shift {} exceeds {} coordinate bits",
            precision, shift, COORDINATE_BITS
        )));
    }
    Ok(())
}
