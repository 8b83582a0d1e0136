use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

use compare::{Compare, Natural, natural};

use crate::error::{Error, Result};
use crate::raw::{Arena, Handle, Node, RawAVLTreeMap, SearchResult, predecessor, successor};

mod capacity;
mod cursor;
mod entry;

pub use cursor::Cursor;
pub use entry::{Entry, OccupiedEntry, VacantEntry};

/// An ordered map based on an [AVL tree].
///
/// Entries are kept in the order defined by the map's comparator `C`, which
/// defaults to the keys' natural [`Ord`] order. Any [`Compare`] implementation can
/// be used instead (see [`with_cmp`](AVLTreeMap::with_cmp) and
/// [`comparator`](crate::comparator)). Keys are unique up to equivalence: two keys
/// are the same key when neither orders before the other.
///
/// Besides the familiar `BTreeMap`-style API the map hands out [`Cursor`]s. A cursor
/// names one entry (or the end position) without borrowing the map; each use is
/// checked, so a cursor to a removed entry or to another map is reported as
/// [`Error::InvalidCursor`] instead of reading the wrong entry.
///
/// Indexing with `map[&key]` panics when the key is absent, for reads and writes
/// alike. Use [`get_or_insert_default`](AVLTreeMap::get_or_insert_default) to insert
/// a default value on a miss.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key changes while it is in the map. The behavior resulting
/// from such a logic error is not specified, but will be encapsulated to the
/// `AVLTreeMap` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
///
/// // type inference lets us omit an explicit type signature (which
/// // would be `AVLTreeMap<&str, &str>` in this example).
/// let mut movie_reviews = AVLTreeMap::new();
///
/// // review some movies.
/// movie_reviews.insert("Office Space",       "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction",       "Masterpiece.");
/// movie_reviews.insert("The Godfather",      "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// // check for a specific one.
/// if !movie_reviews.contains_key(&"Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.",
///              movie_reviews.len());
/// }
///
/// // oops, this review has a lot of spelling mistakes, let's delete it.
/// movie_reviews.remove(&"The Blues Brothers");
///
/// // look up the values associated with some keys.
/// let to_find = ["Up!", "Office Space"];
/// for movie in &to_find {
///     match movie_reviews.get(movie) {
///        Some(review) => println!("{movie}: {review}"),
///        None => println!("{movie} is unreviewed.")
///     }
/// }
///
/// // Look up the value for a key (will panic if the key is not found).
/// println!("Movie review: {}", movie_reviews[&"Office Space"]);
///
/// // iterate over everything.
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// An `AVLTreeMap` with a known list of items can be initialized from an array:
///
/// ```
/// use wabi_avl::AVLTreeMap;
///
/// let solar_distance = AVLTreeMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// ```
///
/// Custom orderings are given at construction:
///
/// ```
/// use wabi_avl::AVLTreeMap;
/// use wabi_avl::comparator::{Compare, natural};
///
/// let mut map = AVLTreeMap::with_cmp(natural().rev());
/// map.extend([(1, "a"), (3, "c"), (2, "b")]);
/// assert_eq!(map.first_key_value(), Some((&3, &"c")));
/// ```
///
/// # Background
///
/// An AVL tree is a binary search tree in which the heights of the two subtrees of
/// every node differ by at most one. Insertions and removals restore that property
/// with at most a few rotations per ancestor, so the height stays below
/// 1.44 log<sub>2</sub>(n + 2) and lookups, insertions and removals are O(log n).
///
/// Nodes live in an index-addressed arena rather than in individual heap
/// allocations. Parent links are plain indices, which keeps in-order stepping
/// in both directions cheap and lets cursors name nodes without holding borrows.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AVLTreeMap<K, V, C = Natural<K>> {
    raw: RawAVLTreeMap<K, V, C>,
}

/// An iterator over the entries of an `AVLTreeMap`.
///
/// This `struct` is created by the [`iter`] method on [`AVLTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
///
/// let map = AVLTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: AVLTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K>>,
    values: &'a Arena<V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// A mutable iterator over the entries of an `AVLTreeMap`.
///
/// This `struct` is created by the [`iter_mut`] method on [`AVLTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
///
/// let mut map = AVLTreeMap::from([(1, 10), (2, 20)]);
/// for (_, value) in map.iter_mut() {
///     *value += 1;
/// }
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, [11, 21]);
/// ```
///
/// [`iter_mut`]: AVLTreeMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K: 'a, V: 'a> {
    nodes: &'a Arena<Node<K>>,
    values: *mut Arena<V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    _marker: PhantomData<&'a mut V>,
}

// SAFETY: IterMut hands out `&K` and `&mut V`, so it may move across threads when
// `&K` and `&mut V` may, and be shared when both are `Sync`.
unsafe impl<K: Sync, V: Send> Send for IterMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for IterMut<'_, K, V> {}

/// An owning iterator over the entries of an `AVLTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`AVLTreeMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `AVLTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`AVLTreeMap`]. See its
/// documentation for more.
///
/// [`keys`]: AVLTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `AVLTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`AVLTreeMap`]. See its
/// documentation for more.
///
/// [`values`]: AVLTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of an `AVLTreeMap`.
///
/// This `struct` is created by the [`values_mut`] method on [`AVLTreeMap`]. See its
/// documentation for more.
///
/// [`values_mut`]: AVLTreeMap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<K: Ord, V> AVLTreeMap<K, V> {
    /// Makes a new, empty `AVLTreeMap` ordered by the keys' [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        AVLTreeMap::with_cmp(natural())
    }
}

impl<K, V, C> AVLTreeMap<K, V, C> {
    /// Makes a new, empty `AVLTreeMap` ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// // Order by absolute value; 2 and -2 are equivalent keys.
    /// let mut map = AVLTreeMap::with_cmp(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
    /// map.insert(-3, "minus three");
    /// map.insert(2, "two");
    /// assert!(!map.insert(-2, "minus two").1);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, -3]);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        AVLTreeMap {
            raw: RawAVLTreeMap::new(cmp),
        }
    }

    /// Returns the comparator that orders this map.
    #[must_use]
    pub fn cmp(&self) -> &C {
        self.raw.cmp()
    }

    /// Clears the map, removing all elements.
    ///
    /// All cursors into the map except [`end`](Self::end) become invalid.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut a = AVLTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.entry(handle))
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.entry(handle))
    }

    /// Removes and returns the first element in the map.
    /// The key of this element is the minimum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.raw.first()?;
        Some(self.raw.erase(handle))
    }

    /// Removes and returns the last element in the map.
    /// The key of this element is the maximum key that was in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.raw.last()?;
        Some(self.raw.erase(handle))
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut a = AVLTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the underlying tree: 0 for an empty map, 1 for a single entry.
    ///
    /// The height never exceeds 1.44 log<sub>2</sub>(n + 2).
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let map: AVLTreeMap<_, _> = (1..=7).map(|k| (k, ())).collect();
    /// assert_eq!(map.height(), 3);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let (nodes, values) = self.raw.arenas();
        Iter {
            nodes,
            values,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::from([
    ///    ("a", 1),
    ///    ("b", 2),
    ///    ("c", 3),
    /// ]);
    ///
    /// // add 10 to the value if the key isn't "a"
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map[&"c"], 13);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let front = self.raw.first();
        let back = self.raw.last();
        let remaining = self.raw.len();
        let (nodes, values) = self.raw.arenas_mut();
        IterMut {
            nodes,
            values: &raw mut *values,
            front,
            back,
            remaining,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut a = AVLTreeMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut a = AVLTreeMap::new();
    /// a.insert(1, String::from("hello"));
    /// a.insert(2, String::from("goodbye"));
    ///
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    ///
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"),
    ///                     String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }
}

impl<K, V, C> AVLTreeMap<K, V, C> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The lookup key may be of any type `Q` the map's comparator can order against `K`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.entry(handle).1)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.entry_mut(handle).1)
    }

    /// Returns the stored key and its value for the supplied key.
    ///
    /// Useful when equivalent keys are not identical.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    /// use wabi_avl::comparator::less_by;
    ///
    /// let mut map = AVLTreeMap::with_cmp(less_by(|a: &(u8, char), b: &(u8, char)| a.0 < b.0));
    /// map.insert((1, 'x'), "one");
    /// assert_eq!(map.get_key_value(&(1, 'y')), Some((&(1, 'x'), &"one")));
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.entry(handle))
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no equivalent key is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::{AVLTreeMap, Error};
    ///
    /// let map = AVLTreeMap::from([(1, "a")]);
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&2), Err(Error::NotFound));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no equivalent key is present.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.get_mut(key).ok_or(Error::NotFound)
    }

    /// Returns a cursor to the entry for `key`, or [`end`](Self::end) if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let map = AVLTreeMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.get_at(map.find(&2)), Ok((&2, &"b")));
    /// assert_eq!(map.find(&3), map.end());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        Cursor::from_node(&self.raw, self.raw.find(key))
    }

    /// Returns the number of entries with a key equivalent to `key`: 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        usize::from(self.contains_key(key))
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.contains_key(&1), true);
    /// assert_eq!(map.contains_key(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.find(key).is_some()
    }

    /// Inserts a key-value pair unless an equivalent key is already present.
    ///
    /// Returns a cursor to the entry holding the key and whether the pair was inserted.
    /// When the key is already present the map is left untouched: the existing key and
    /// value are kept and the offered pair is dropped. Use [`entry`](Self::entry) or
    /// [`get_mut`](Self::get_mut) to replace a value.
    ///
    /// Existing cursors stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// let (cursor, inserted) = map.insert(37, "a");
    /// assert!(inserted);
    /// assert_eq!(map.get_at(cursor), Ok((&37, &"a")));
    ///
    /// let (again, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(again, cursor);
    /// assert_eq!(map[&37], "a");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool)
    where
        C: Compare<K>,
    {
        let (handle, inserted) = self.raw.insert(key, value);
        (Cursor::at_node(&self.raw, handle), inserted)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key
    /// was previously in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.erase(handle))
    }

    /// Gets the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut count: AVLTreeMap<&str, usize> = AVLTreeMap::new();
    ///
    /// // count the number of occurrences of letters in the vec
    /// for x in ["a", "b", "a", "c", "a", "b"] {
    ///     count.entry(x).and_modify(|curr| *curr += 1).or_insert(1);
    /// }
    ///
    /// assert_eq!(count[&"a"], 3);
    /// assert_eq!(count[&"b"], 2);
    /// assert_eq!(count[&"c"], 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n); inserting through the returned entry needs no second search.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, C>
    where
        C: Compare<K>,
    {
        match self.raw.search(&key) {
            SearchResult::Found(handle) => Entry::Occupied(OccupiedEntry {
                handle,
                tree: &mut self.raw,
            }),
            SearchResult::Vacant(at) => Entry::Vacant(VacantEntry {
                key,
                at,
                tree: &mut self.raw,
            }),
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting `V::default()` first
    /// if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut letters: AVLTreeMap<char, usize> = AVLTreeMap::new();
    /// for ch in "a short treatise on fungi".chars() {
    ///     *letters.get_or_insert_default(ch) += 1;
    /// }
    /// assert_eq!(letters[&'s'], 2);
    /// assert_eq!(letters[&'t'], 3);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        C: Compare<K>,
        V: Default,
    {
        self.entry(key).or_default()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for AVLTreeMap<K, V, C> {
    fn clone(&self) -> Self {
        AVLTreeMap { raw: self.raw.clone() }
    }

    fn clone_from(&mut self, source: &Self) {
        // The copy is complete before the old contents are released.
        let copy = source.clone();
        *self = copy;
    }
}

impl<K: Hash, V: Hash, C> Hash for AVLTreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AVLTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, C> Eq for AVLTreeMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for AVLTreeMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for AVLTreeMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AVLTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for AVLTreeMap<K, V, C> {
    fn default() -> Self {
        AVLTreeMap::with_cmp(C::default())
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for AVLTreeMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AVLTreeMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for AVLTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>> Extend<(&'a K, &'a V)> for AVLTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a AVLTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut AVLTreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for AVLTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let map = AVLTreeMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V, C> Index<&Q> for AVLTreeMap<K, V, C>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, Q, V, C> IndexMut<&Q> for AVLTreeMap<K, V, C>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    /// Returns a mutable reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map. Use
    /// [`get_or_insert_default`](AVLTreeMap::get_or_insert_default) to insert on a miss.
    fn index_mut(&mut self, key: &Q) -> &mut V {
        self.get_mut(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AVLTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let (nodes, values) = (self.nodes, self.values);
        let handle = self.front?;
        self.remaining -= 1;
        self.front = successor(nodes, handle);

        let node = nodes.get(handle);
        Some((node.key(), values.get(node.value())))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let (nodes, values) = (self.nodes, self.values);
        let handle = self.back?;
        self.remaining -= 1;
        self.back = predecessor(nodes, handle);

        let node = nodes.get(handle);
        Some((node.key(), values.get(node.value())))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            values: self.values,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let nodes = self.nodes;
        let handle = self.front?;
        self.remaining -= 1;
        self.front = successor(nodes, handle);

        let node = nodes.get(handle);
        // SAFETY: The iterator holds the map's exclusive borrow for 'a and `remaining`
        // keeps the front and back walks from meeting, so each value is lent out once.
        // Navigation only reads the node arena, never the value arena.
        let value = unsafe { Arena::get_mut_ptr(self.values, node.value()) };
        Some((node.key(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let nodes = self.nodes;
        let handle = self.back?;
        self.remaining -= 1;
        self.back = predecessor(nodes, handle);

        let node = nodes.get(handle);
        // SAFETY: Same as in next().
        let value = unsafe { Arena::get_mut_ptr(self.values, node.value()) };
        Some((node.key(), value))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V> fmt::Debug for ValuesMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.remaining).finish_non_exhaustive()
    }
}
