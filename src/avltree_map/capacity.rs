use compare::{Natural, natural};

use super::AVLTreeMap;
use crate::raw::RawAVLTreeMap;

impl<K: Ord, V> AVLTreeMap<K, V, Natural<K>> {
    /// Creates an empty map with capacity for at least `capacity` elements.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let map: AVLTreeMap<i32, i32> = AVLTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AVLTreeMap::with_capacity_and_cmp(capacity, natural())
    }
}

impl<K, V, C> AVLTreeMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`, with capacity for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::comparator::{Compare, natural};
    ///
    /// let mut map = AVLTreeMap::with_capacity_and_cmp(8, natural().rev());
    /// map.extend([(1, ()), (2, ())]);
    /// assert!(map.capacity() >= 8);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, 1]);
    /// ```
    pub fn with_capacity_and_cmp(capacity: usize, cmp: C) -> Self {
        AVLTreeMap {
            raw: RawAVLTreeMap::with_capacity(capacity, cmp),
        }
    }

    /// Returns the number of elements the map can hold without reallocating.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let map: AVLTreeMap<i32, i32> = AVLTreeMap::with_capacity(32);
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
