use core::fmt;
use core::mem;

use super::Cursor;
use crate::raw::{AttachPoint, Handle, RawAVLTreeMap};

/// A view into a single entry in a map, which may either be vacant or occupied.
///
/// This `enum` is constructed from the [`entry`] method on [`crate::AVLTreeMap`].
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
/// use wabi_avl::avltree_map::Entry;
///
/// let mut map = AVLTreeMap::new();
///
/// match map.entry("oz") {
///     Entry::Vacant(v) => {
///         v.insert(1);
///     }
///     Entry::Occupied(mut o) => {
///         *o.get_mut() += 1;
///     }
/// }
/// assert_eq!(map[&"oz"], 1);
/// ```
///
/// [`entry`]: crate::AVLTreeMap::entry
pub enum Entry<'a, K: 'a, V: 'a, C: 'a> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, C>),

    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, C>),
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Entry<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(v) => f.debug_tuple("Entry").field(v).finish(),
            Entry::Occupied(o) => f.debug_tuple("Entry").field(o).finish(),
        }
    }
}

/// A view into a vacant entry in an `AVLTreeMap`.
/// It is part of the [`Entry`] enum.
///
/// The entry remembers where its key belongs, so [`insert`](VacantEntry::insert)
/// attaches the new node directly.
pub struct VacantEntry<'a, K, V, C> {
    pub(super) key: K,
    pub(super) at: AttachPoint,
    pub(super) tree: &'a mut RawAVLTreeMap<K, V, C>,
}

impl<K: fmt::Debug, V, C> fmt::Debug for VacantEntry<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VacantEntry").field("key", &self.key).finish()
    }
}

/// A view into an occupied entry in an `AVLTreeMap`.
/// It is part of the [`Entry`] enum.
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
/// use wabi_avl::avltree_map::Entry;
///
/// let mut map = AVLTreeMap::new();
/// map.insert("oz", 1);
///
/// if let Entry::Occupied(mut o) = map.entry("oz") {
///     *o.get_mut() += 1;
/// }
/// assert_eq!(map[&"oz"], 2);
/// ```
pub struct OccupiedEntry<'a, K, V, C> {
    pub(super) handle: Handle,
    pub(super) tree: &'a mut RawAVLTreeMap<K, V, C>,
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OccupiedEntry<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry").field("key", self.key()).field("value", self.get()).finish()
    }
}

impl<'a, K, V, C> Entry<'a, K, V, C> {
    /// Ensures a value is in the entry by inserting the default if empty, and returns
    /// a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// assert_eq!(map[&"poneyland"], 12);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) if vacant (rebalancing), O(1) if occupied.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default function if empty,
    /// and returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map: AVLTreeMap<&str, String> = AVLTreeMap::new();
    /// let s = "hoho".to_string();
    ///
    /// map.entry("poneyland").or_insert_with(|| s);
    ///
    /// assert_eq!(map[&"poneyland"], "hoho".to_string());
    /// ```
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(default()),
        }
    }

    /// Ensures a value is in the entry by inserting, if empty, the result of the default function.
    ///
    /// The default function receives a reference to the key that was moved into the
    /// `.entry(key)` call.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    ///
    /// map.entry("poneyland").or_insert_with_key(|key| key.chars().count());
    ///
    /// assert_eq!(map[&"poneyland"], 9);
    /// ```
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => {
                let value = default(&v.key);
                v.insert(value)
            }
        }
    }

    /// Returns a reference to this entry's key.
    ///
    /// For an occupied entry this is the key stored in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    /// assert_eq!(map.entry("poneyland").key(), &"poneyland");
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(o) => o.key(),
            Entry::Vacant(v) => v.key(),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    ///
    /// map.entry("poneyland")
    ///    .and_modify(|e| { *e += 1 })
    ///    .or_insert(42);
    /// assert_eq!(map[&"poneyland"], 42);
    ///
    /// map.entry("poneyland")
    ///    .and_modify(|e| { *e += 1 })
    ///    .or_insert(42);
    /// assert_eq!(map[&"poneyland"], 43);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[allow(clippy::return_self_not_must_use)]
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(ref mut o) = self {
            f(o.get_mut());
        }
        self
    }
}

impl<'a, K, V: Default, C> Entry<'a, K, V, C> {
    /// Ensures a value is in the entry by inserting the default value if empty,
    /// and returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map: AVLTreeMap<&str, Option<usize>> = AVLTreeMap::new();
    /// map.entry("poneyland").or_default();
    ///
    /// assert_eq!(map[&"poneyland"], None);
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn or_default(self) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(V::default()),
        }
    }
}

impl<'a, K, V, C> VacantEntry<'a, K, V, C> {
    /// Gets a reference to the key that would be used when inserting a value
    /// through the `VacantEntry`.
    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::avltree_map::Entry;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    ///
    /// if let Entry::Vacant(v) = map.entry("poneyland") {
    ///     assert_eq!(v.into_key(), "poneyland");
    /// }
    /// assert!(map.is_empty());
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn into_key(self) -> K {
        self.key
    }

    /// Sets the value of the entry with the `VacantEntry`'s key,
    /// and returns a mutable reference to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::avltree_map::Entry;
    ///
    /// let mut map: AVLTreeMap<&str, u32> = AVLTreeMap::new();
    ///
    /// if let Entry::Vacant(o) = map.entry("poneyland") {
    ///     o.insert(37);
    /// }
    /// assert_eq!(map[&"poneyland"], 37);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) for rebalancing; no search is repeated.
    pub fn insert(self, value: V) -> &'a mut V {
        let tree = self.tree;
        let handle = tree.attach(self.key, value, self.at);
        tree.entry_mut(handle).1
    }
}

impl<'a, K, V, C> OccupiedEntry<'a, K, V, C> {
    /// Gets a reference to the key in the entry.
    ///
    /// This is the key stored in the map, which may differ from the (equivalent)
    /// key used to look the entry up.
    #[must_use]
    pub fn key(&self) -> &K {
        self.tree.node(self.handle).key()
    }

    /// Returns a cursor to this entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::avltree_map::Entry;
    ///
    /// let mut map = AVLTreeMap::from([(1, 'a'), (2, 'b')]);
    /// let cursor = match map.entry(2) {
    ///     Entry::Occupied(o) => o.cursor(),
    ///     Entry::Vacant(_) => unreachable!(),
    /// };
    /// assert_eq!(map.get_at(cursor), Ok((&2, &'b')));
    /// ```
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::at_node(&*self.tree, self.handle)
    }

    /// Take ownership of the key and value from the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::avltree_map::Entry;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// if let Entry::Occupied(o) = map.entry("poneyland") {
    ///     assert_eq!(o.remove_entry(), ("poneyland", 12));
    /// }
    /// assert!(!map.contains_key(&"poneyland"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[allow(clippy::must_use_candidate)]
    pub fn remove_entry(self) -> (K, V) {
        self.tree.erase(self.handle)
    }

    /// Gets a reference to the value in the entry.
    #[must_use]
    pub fn get(&self) -> &V {
        self.tree.entry(self.handle).1
    }

    /// Gets a mutable reference to the value in the entry.
    ///
    /// If you need a reference to the `OccupiedEntry` that may outlive the
    /// destruction of the `Entry` value, see [`into_mut`].
    ///
    /// [`into_mut`]: OccupiedEntry::into_mut
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::avltree_map::Entry;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// if let Entry::Occupied(mut o) = map.entry("poneyland") {
    ///     *o.get_mut() += 10;
    ///     assert_eq!(*o.get(), 22);
    ///
    ///     // We can use the same Entry multiple times.
    ///     *o.get_mut() += 2;
    /// }
    /// assert_eq!(map[&"poneyland"], 24);
    /// ```
    pub fn get_mut(&mut self) -> &mut V {
        self.tree.entry_mut(self.handle).1
    }

    /// Converts the entry into a mutable reference to its value.
    ///
    /// If you need multiple references to the `OccupiedEntry`, see [`get_mut`].
    ///
    /// [`get_mut`]: OccupiedEntry::get_mut
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_mut(self) -> &'a mut V {
        self.tree.entry_mut(self.handle).1
    }

    /// Sets the value of the entry, and returns the entry's old value.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::avltree_map::Entry;
    ///
    /// let mut map: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// if let Entry::Occupied(mut o) = map.entry("poneyland") {
    ///     assert_eq!(o.insert(15), 12);
    /// }
    /// assert_eq!(map[&"poneyland"], 15);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Takes the value of the entry out of the map, and returns it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[allow(clippy::must_use_candidate)]
    pub fn remove(self) -> V {
        self.remove_entry().1
    }
}
