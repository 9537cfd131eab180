//! Two-level iteration over a key to multi-value structure.

use crate::error::Result;

/// An iterator over `(key, value)` pairs that can also move key by key.
///
/// The plain [`Iterator`] surface walks value by value: `next` yields the next
/// value under the current key, or the first value of the following key once
/// the current one is exhausted. The key-granular methods let range algorithms
/// skip or drop a whole key without tracking key boundaries themselves.
///
/// States:
/// - before the first key: `current_key` is `None`;
/// - within a key: positioned after the last value yielded under it;
/// - exhausted: `has_next` and `has_next_key` are both false.
///
/// ```text
/// key A: a1 a2      next() -> a1, next() -> a2, next() -> b1
/// key B: b1 b2      next_key() from within A -> B, then next() -> b1
/// ```
pub trait DualIterator<K, V>: Iterator<Item = (K, V)> {
    /// Whether `next` would yield another pair.
    fn has_next(&self) -> bool;

    /// Whether a key exists beyond the current one, regardless of how many
    /// values remain under the current key.
    fn has_next_key(&self) -> bool;

    /// Whether the current key has a value not yet yielded by `next`.
    fn has_next_value_in_key(&self) -> bool;

    /// Skips the rest of the current key and moves to the start of the next.
    ///
    /// The cursor is left before the new key's first value, so `next` yields
    /// that value. Returns `None` when no key is left.
    fn next_key(&mut self) -> Option<K>;

    /// The key the cursor is positioned in, if any.
    fn current_key(&self) -> Option<&K>;

    /// Removes the current key and all of its values from the backing store.
    ///
    /// Afterwards the current key has no values left, and subsequent
    /// `has_next_key`/`next_key` calls continue with the keys after it.
    ///
    /// # Errors
    ///
    /// [`crate::PointStoreError::NoCurrentKey`] if the cursor is not positioned
    /// in a key, or that key was already removed.
    fn remove_key(&mut self) -> Result<()>;
}
