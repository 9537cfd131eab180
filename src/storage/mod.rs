//! Point store abstraction.
//!
//! A point store maps points to multisets of values. It never deduplicates:
//! inserting a value twice at a point stores it twice, and the same value may
//! live at several points. Region queries yield every stored occurrence exactly
//! once.
//!
//! [`PointStore`] is the blocking contract, implemented in memory by
//! [`MemoryPointStore`]. With the `async` feature, [`AsyncPointStore`] exposes the
//! same operations as futures and streams, and [`BlockingStoreAdapter`] fronts any
//! blocking store on tokio's blocking pool.

use crate::error::Result;
use crate::point::{Point, Pointed};
use crate::point_set::PointSet;
use crate::region::Region;
use serde::{Deserialize, Serialize};

mod dual_iter;
mod memory;

#[cfg(feature = "async")]
pub mod async_store;
#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use dual_iter::DualIterator;
pub use memory::{MemoryPointStore, RegionCursor};

#[cfg(feature = "async")]
pub use async_store::{AsyncPointStore, BlockingStoreAdapter};
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotFile;

/// Trait for point store implementations.
///
/// Operations that take a [`Region`] trust it: build regions with
/// [`Region::create`] unless the bounds are already known to be valid.
pub trait PointStore<P: Point, V: Clone> {
    /// Stores `value` at `point`, next to any values already there.
    fn insert(&mut self, point: P, value: V) -> Result<()>;

    /// Stores every value at `point`, next to any values already there.
    fn insert_all(&mut self, point: P, values: Vec<V>) -> Result<()>;

    /// Values currently at `point` (empty if none).
    fn at(&self, point: &P) -> Result<Box<dyn Iterator<Item = V> + '_>>;

    /// Every `(point, value)` pair whose point lies in `region`, bounds
    /// inclusive, in point order.
    fn within(&mut self, region: &Region<P>) -> Result<Box<dyn DualIterator<P, V> + '_>>;

    /// Removes and returns every value at `point`; empty if there were none.
    fn remove_at(&mut self, point: &P) -> Result<Vec<V>>;

    /// Removes every entry whose point lies in `region`.
    fn remove_in(&mut self, region: &Region<P>) -> Result<()> {
        let mut cursor = self.within(region)?;
        while cursor.next_key().is_some() {
            cursor.remove_key()?;
        }
        Ok(())
    }

    /// The values at `point` grouped as a point set.
    fn collect_at(&self, point: &P) -> Result<PointSet<Located<P, V>>> {
        // One bucket, so membership is already proven.
        let items = self
            .at(point)?
            .map(|value| Located::new(point.clone(), value))
            .collect();
        Ok(PointSet::from_unchecked(items))
    }
}

/// A value together with the point it is stored at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Located<P, V> {
    pub point: P,
    pub value: V,
}

impl<P, V> Located<P, V> {
    pub fn new(point: P, value: V) -> Self {
        Self { point, value }
    }

    pub fn into_parts(self) -> (P, V) {
        (self.point, self.value)
    }
}

impl<P: Point, V> Pointed for Located<P, V> {
    type Point = P;

    fn point(&self) -> &P {
        &self.point
    }
}

impl<P, V> From<(P, V)> for Located<P, V> {
    fn from((point, value): (P, V)) -> Self {
        Self::new(point, value)
    }
}

/// Point store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of distinct points holding at least one value
    pub point_count: usize,
    /// Number of stored values across all points
    pub value_count: usize,
    /// Number of write operations performed
    pub operations_count: u64,
}
