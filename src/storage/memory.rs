//! In-memory point store backed by an ordered map.

use super::{DualIterator, PointStore, StoreStats};
use crate::error::{PointStoreError, Result};
use crate::point::Point;
use crate::region::Region;
use std::collections::BTreeMap;

/// In-memory point store using a `BTreeMap` from point to value bucket.
///
/// Points that compare equal share a bucket, keyed by the first of them that
/// was inserted. Buckets are never empty: a point with no values has no entry.
/// With [`crate::GridPoint`] keys the map is walked in Z order, so region
/// queries are single range scans.
pub struct MemoryPointStore<P, V> {
    data: BTreeMap<P, Vec<V>>,
    operations: u64,
}

impl<P: Point, V: Clone> MemoryPointStore<P, V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            operations: 0,
        }
    }

    /// Number of distinct points holding values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates all buckets in point order.
    pub fn buckets(&self) -> impl Iterator<Item = (&P, &[V])> {
        self.data.iter().map(|(point, values)| (point, values.as_slice()))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            point_count: self.data.len(),
            value_count: self.data.values().map(Vec::len).sum(),
            operations_count: self.operations,
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.operations += 1;
    }

    #[cfg(feature = "snapshot")]
    pub(crate) fn from_buckets(data: BTreeMap<P, Vec<V>>) -> Self {
        let mut data = data;
        data.retain(|_, values| !values.is_empty());
        Self {
            data,
            operations: 0,
        }
    }
}

impl<P: Point, V: Clone> Default for MemoryPointStore<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Point, V: Clone> PointStore<P, V> for MemoryPointStore<P, V> {
    fn insert(&mut self, point: P, value: V) -> Result<()> {
        self.data.entry(point).or_default().push(value);
        self.operations += 1;
        Ok(())
    }

    fn insert_all(&mut self, point: P, values: Vec<V>) -> Result<()> {
        if !values.is_empty() {
            self.data.entry(point).or_default().extend(values);
        }
        self.operations += 1;
        Ok(())
    }

    fn at(&self, point: &P) -> Result<Box<dyn Iterator<Item = V> + '_>> {
        Ok(Box::new(self.data.get(point).into_iter().flatten().cloned()))
    }

    fn within(&mut self, region: &Region<P>) -> Result<Box<dyn DualIterator<P, V> + '_>> {
        if region.lower() > region.upper() {
            // BTreeMap::range panics on inverted bounds.
            log::warn!("Rejecting region query with inverted bounds");
            return Err(PointStoreError::InvertedRegion);
        }

        let keys: Vec<P> = self
            .data
            .range(region.lower()..=region.upper())
            .map(|(point, _)| point.clone())
            .collect();

        Ok(Box::new(RegionCursor::new(
            &mut self.data,
            &mut self.operations,
            keys,
        )))
    }

    fn remove_at(&mut self, point: &P) -> Result<Vec<V>> {
        self.operations += 1;
        Ok(self.data.remove(point).unwrap_or_default())
    }

    fn remove_in(&mut self, region: &Region<P>) -> Result<()> {
        if region.lower() > region.upper() {
            log::warn!("Rejecting region removal with inverted bounds");
            return Err(PointStoreError::InvertedRegion);
        }

        let before = self.data.len();
        let upper = region.upper();
        // Split off everything from the lower bound, then put back what lies
        // beyond the upper bound.
        let mut tail = self.data.split_off(region.lower());
        let mut beyond: BTreeMap<P, Vec<V>> = BTreeMap::new();
        while let Some((point, values)) = tail.pop_last() {
            if &point <= upper {
                break;
            }
            beyond.insert(point, values);
        }
        self.data.append(&mut beyond);
        self.operations += 1;

        log::debug!(
            "Removed {} points in region",
            before.saturating_sub(self.data.len())
        );
        Ok(())
    }
}

/// Cursor over the buckets of a [`MemoryPointStore`] inside one region.
///
/// The keys are captured when the cursor is created; values are read from the
/// store as the cursor reaches them.
pub struct RegionCursor<'a, P, V> {
    data: &'a mut BTreeMap<P, Vec<V>>,
    operations: &'a mut u64,
    keys: Vec<P>,
    key_index: Option<usize>,
    value_index: usize,
    key_removed: bool,
}

impl<'a, P: Point, V: Clone> RegionCursor<'a, P, V> {
    fn new(data: &'a mut BTreeMap<P, Vec<V>>, operations: &'a mut u64, keys: Vec<P>) -> Self {
        Self {
            data,
            operations,
            keys,
            key_index: None,
            value_index: 0,
            key_removed: false,
        }
    }

    fn following_index(&self) -> usize {
        self.key_index.map_or(0, |index| index + 1)
    }

    fn current_values(&self) -> Option<&Vec<V>> {
        if self.key_removed {
            return None;
        }
        let key = self.keys.get(self.key_index?)?;
        self.data.get(key)
    }
}

impl<P: Point, V: Clone> Iterator for RegionCursor<'_, P, V> {
    type Item = (P, V);

    fn next(&mut self) -> Option<(P, V)> {
        if !self.has_next_value_in_key() {
            self.next_key()?;
        }
        let value = self.current_values()?.get(self.value_index)?.clone();
        self.value_index += 1;
        let key = self.current_key()?.clone();
        Some((key, value))
    }
}

impl<P: Point, V: Clone> DualIterator<P, V> for RegionCursor<'_, P, V> {
    fn has_next(&self) -> bool {
        // Buckets are never empty, so every remaining key has a value.
        self.has_next_value_in_key() || self.has_next_key()
    }

    fn has_next_key(&self) -> bool {
        self.following_index() < self.keys.len()
    }

    fn has_next_value_in_key(&self) -> bool {
        self.current_values()
            .is_some_and(|values| self.value_index < values.len())
    }

    fn next_key(&mut self) -> Option<P> {
        let index = self.following_index();
        let key = self.keys.get(index)?.clone();
        self.key_index = Some(index);
        self.value_index = 0;
        self.key_removed = false;
        Some(key)
    }

    fn current_key(&self) -> Option<&P> {
        self.keys.get(self.key_index?)
    }

    fn remove_key(&mut self) -> Result<()> {
        if self.key_removed {
            return Err(PointStoreError::NoCurrentKey);
        }
        let key = self
            .key_index
            .and_then(|index| self.keys.get(index))
            .ok_or(PointStoreError::NoCurrentKey)?;
        self.data.remove(key);
        *self.operations += 1;
        self.key_removed = true;
        Ok(())
    }
}
