//! Homogeneous groups of values that share one point.
//!
//! Every member of a [`PointSet`] has the same degree and compares equal to the
//! set's first member. Checked entry points enforce this; the `*_unchecked`
//! variants skip validation for bulk loads whose members are already known to
//! be co-located (for example values read from a single store bucket).

use crate::compute::validation::{validate_colocated, validate_degree};
use crate::error::Result;
use crate::point::{Point, Pointed};
use std::cmp::Ordering;
use std::fmt;

/// A collection of pointed values that all sit at the same point.
///
/// Members are kept in insertion order and duplicates are allowed.
///
/// A set is itself a [`Point`] located at its first member, so sets can be
/// grouped into further sets or bound a [`crate::Region`]. Sets compare by
/// that point alone; an empty set has degree 0 and sorts before any other.
///
/// # Examples
///
/// ```
/// use pointstore::{GridPoint, Located, PointSet};
///
/// let here = GridPoint::new([4, 2]);
/// let mut set = PointSet::create(vec![
///     Located::new(here.clone(), "a"),
///     Located::new(here.clone(), "b"),
/// ])?;
/// set.add(Located::new(here, "c"))?;
/// assert_eq!(set.len(), 3);
///
/// let elsewhere = GridPoint::new([9, 9]);
/// assert!(set.add(Located::new(elsewhere, "d")).is_err());
/// # Ok::<(), pointstore::PointStoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PointSet<T> {
    items: Vec<T>,
}

impl<T> PointSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Wraps `items` without validating them.
    pub fn from_unchecked(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Appends without validation.
    pub fn add_unchecked(&mut self, item: T) {
        self.items.push(item);
    }

    /// Appends every item without validation.
    pub fn add_all_unchecked<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.items.retain(keep);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: PartialEq> PointSet<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Removes one occurrence of `item`, returning whether one was present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|existing| existing == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<T: Pointed> PointSet<T> {
    /// Creates a set, validating every member against the first in one pass.
    ///
    /// # Errors
    ///
    /// Fails at the first member whose degree differs
    /// ([`crate::PointStoreError::DegreeMismatch`]) or whose point does not
    /// compare equal ([`crate::PointStoreError::NotColocated`]).
    pub fn create(items: Vec<T>) -> Result<Self> {
        if let Some((first, rest)) = items.split_first() {
            for item in rest {
                validate_colocated(first.point(), item.point())?;
            }
        }
        Ok(Self { items })
    }

    /// The point every member shares, taken from the first member.
    pub fn representative(&self) -> Option<&T::Point> {
        self.items.first().map(Pointed::point)
    }

    /// Degree of the members, 0 for an empty set.
    pub fn degree(&self) -> usize {
        self.representative().map_or(0, Point::degree)
    }

    /// Orders the set's point against `point`. An empty set compares equal to
    /// everything.
    pub fn compare_point(&self, point: &T::Point) -> Ordering {
        self.representative()
            .map_or(Ordering::Equal, |anchor| anchor.cmp(point))
    }

    /// Checks that `point` could join this set.
    pub fn check_point(&self, point: &T::Point) -> Result<()> {
        match self.representative() {
            Some(anchor) => validate_colocated(anchor, point),
            None => Ok(()),
        }
    }

    /// Appends `item` after checking it against the set.
    pub fn add(&mut self, item: T) -> Result<()> {
        self.check_point(item.point())?;
        self.items.push(item);
        Ok(())
    }

    /// Appends all items, or none if any of them fails validation.
    ///
    /// On an empty set the first incoming item becomes the anchor.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) -> Result<()> {
        let incoming: Vec<T> = items.into_iter().collect();
        let anchor = match self.representative() {
            Some(anchor) => anchor,
            None => match incoming.first() {
                Some(first) => first.point(),
                None => return Ok(()),
            },
        };
        for item in &incoming {
            validate_colocated(anchor, item.point())?;
        }
        self.items.extend(incoming);
        Ok(())
    }

    /// Moves every member of `other` into this set after checking its
    /// representative once.
    pub fn merge(&mut self, other: PointSet<T>) -> Result<()> {
        if let Some(point) = other.representative() {
            self.check_point(point)?;
        }
        self.items.extend(other.items);
        Ok(())
    }
}

impl<T: Pointed> PartialEq for PointSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Pointed> Eq for PointSet<T> {}

impl<T: Pointed> PartialOrd for PointSet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Pointed> Ord for PointSet<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.representative().cmp(&other.representative())
    }
}

impl<T: Pointed + Clone + fmt::Debug> Point for PointSet<T> {
    fn degree(&self) -> usize {
        self.representative().map_or(0, Point::degree)
    }

    fn check_comparable(&self, other: &Self) -> Result<()> {
        match (self.representative(), other.representative()) {
            (Some(a), Some(b)) => a.check_comparable(b),
            _ => validate_degree(Point::degree(self), Point::degree(other)),
        }
    }
}

impl<T: Pointed + Clone + fmt::Debug> Pointed for PointSet<T> {
    type Point = Self;

    fn point(&self) -> &Self {
        self
    }
}

impl<T> Default for PointSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for PointSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
