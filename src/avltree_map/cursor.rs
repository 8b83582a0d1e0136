use super::AVLTreeMap;
use crate::error::{Error, Result};
use crate::raw::{Generation, Handle, RawAVLTreeMap, TreeId};

/// A position in an [`AVLTreeMap`]: either an element or the end position.
///
/// A cursor does not borrow its map. It remembers which map produced it and which
/// entry it points at, and every map operation taking a cursor checks both before
/// using it. A cursor becomes invalid once its entry is removed (by [`erase`],
/// [`remove`], [`clear`], ...); operations given an invalid cursor return
/// [`Error::InvalidCursor`] and leave the map unchanged. End cursors stay valid for
/// the lifetime of their map.
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
///
/// let mut map = AVLTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
///
/// let two = map.find(&2);
/// assert_eq!(map.get_at(two), Ok((&2, &"b")));
///
/// let three = map.cursor_next(two).unwrap();
/// assert_eq!(map.get_at(three), Ok((&3, &"c")));
/// assert!(map.cursor_next(three).unwrap().is_end());
///
/// // Cursors survive unrelated mutations.
/// map.remove(&1);
/// assert_eq!(map.get_at(two), Ok((&2, &"b")));
///
/// // ...but not the removal of their own entry.
/// map.remove(&2);
/// assert!(map.get_at(two).is_err());
/// ```
///
/// [`erase`]: AVLTreeMap::erase
/// [`remove`]: AVLTreeMap::remove
/// [`clear`]: AVLTreeMap::clear
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    owner: TreeId,
    position: Option<(Handle, Generation)>,
}

impl Cursor {
    pub(super) fn end_of<K, V, C>(tree: &RawAVLTreeMap<K, V, C>) -> Self {
        Cursor {
            owner: tree.id(),
            position: None,
        }
    }

    /// Cursor to the live node at `handle`.
    pub(super) fn at_node<K, V, C>(tree: &RawAVLTreeMap<K, V, C>, handle: Handle) -> Self {
        let generation = tree.generation(handle).expect("cursor target must be a live node");
        Cursor {
            owner: tree.id(),
            position: Some((handle, generation)),
        }
    }

    /// Creates a cursor for `handle`, or the end cursor for `None`.
    pub(super) fn from_node<K, V, C>(tree: &RawAVLTreeMap<K, V, C>, handle: Option<Handle>) -> Self {
        handle.map_or_else(|| Cursor::end_of(tree), |handle| Cursor::at_node(tree, handle))
    }

    /// Returns `true` if this is the end cursor (one past the last element).
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let map = AVLTreeMap::from([(1, 'a')]);
    /// assert!(map.end().is_end());
    /// assert!(!map.begin().is_end());
    /// assert!(map.find(&7).is_end());
    /// ```
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }
}

impl<K, V, C> AVLTreeMap<K, V, C> {
    /// Returns a cursor to the first (minimum) element, or [`end`](Self::end) if the map is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::from_node(&self.raw, self.raw.first())
    }

    /// Returns the end cursor, the position one past the last element.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::end_of(&self.raw)
    }

    /// Returns the cursor following `cursor` in key order.
    ///
    /// Advancing from the last element yields the end cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] if `cursor` is the end cursor, belongs to another
    /// map, or refers to a removed entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::{AVLTreeMap, Error};
    ///
    /// let map = AVLTreeMap::from([(1, 'a'), (2, 'b')]);
    /// let second = map.cursor_next(map.begin()).unwrap();
    /// assert_eq!(map.get_at(second), Ok((&2, &'b')));
    /// assert_eq!(map.cursor_next(second), Ok(map.end()));
    /// assert_eq!(map.cursor_next(map.end()), Err(Error::InvalidCursor));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    pub fn cursor_next(&self, cursor: Cursor) -> Result<Cursor> {
        match self.resolve(cursor)? {
            Some(handle) => Ok(Cursor::from_node(&self.raw, self.raw.next(handle))),
            None => {
                tracing::debug!(?cursor, "cannot advance the end cursor");
                Err(Error::InvalidCursor)
            }
        }
    }

    /// Returns the cursor preceding `cursor` in key order.
    ///
    /// Stepping back from the end cursor yields the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] if `cursor` is the first element (or the end
    /// cursor of an empty map), belongs to another map, or refers to a removed entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::{AVLTreeMap, Error};
    ///
    /// let map = AVLTreeMap::from([(1, 'a'), (2, 'b')]);
    /// let last = map.cursor_prev(map.end()).unwrap();
    /// assert_eq!(map.get_at(last), Ok((&2, &'b')));
    /// assert_eq!(map.cursor_prev(map.begin()), Err(Error::InvalidCursor));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn cursor_prev(&self, cursor: Cursor) -> Result<Cursor> {
        let previous = match self.resolve(cursor)? {
            Some(handle) => self.raw.prev(handle),
            None => self.raw.last(),
        };

        previous.map(|handle| Cursor::at_node(&self.raw, handle)).ok_or_else(|| {
            tracing::debug!(?cursor, "no element before cursor");
            Error::InvalidCursor
        })
    }

    /// Returns the entry `cursor` points at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] for the end cursor, a cursor of another map, or a
    /// cursor whose entry has been removed.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn get_at(&self, cursor: Cursor) -> Result<(&K, &V)> {
        let handle = self.element(cursor)?;
        Ok(self.raw.entry(handle))
    }

    /// Returns the entry `cursor` points at, with a mutable value.
    ///
    /// # Errors
    ///
    /// Same as [`get_at`](Self::get_at).
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::AVLTreeMap;
    ///
    /// let mut map = AVLTreeMap::from([(1, 10)]);
    /// let cursor = map.begin();
    /// *map.get_at_mut(cursor).unwrap().1 += 5;
    /// assert_eq!(map[&1], 15);
    /// ```
    pub fn get_at_mut(&mut self, cursor: Cursor) -> Result<(&K, &mut V)> {
        let handle = self.element(cursor)?;
        Ok(self.raw.entry_mut(handle))
    }

    /// Removes the entry `cursor` points at and returns it.
    ///
    /// Only `cursor` (and copies of it) become invalid; cursors to other entries keep working.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] for the end cursor, a cursor of another map, or a
    /// cursor whose entry has already been removed. The map is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_avl::{AVLTreeMap, Error};
    ///
    /// let mut map = AVLTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let cursor = map.find(&2);
    /// assert_eq!(map.erase(cursor), Ok((2, 'b')));
    /// assert_eq!(map.erase(cursor), Err(Error::InvalidCursor));
    /// assert_eq!(map.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn erase(&mut self, cursor: Cursor) -> Result<(K, V)> {
        let handle = self.element(cursor)?;
        Ok(self.raw.erase(handle))
    }

    /// Checks `cursor` against this map; `Ok(None)` is the end position.
    fn resolve(&self, cursor: Cursor) -> Result<Option<Handle>> {
        if cursor.owner != self.raw.id() {
            tracing::debug!(?cursor, "rejected cursor from another map");
            return Err(Error::InvalidCursor);
        }

        match cursor.position {
            None => Ok(None),
            Some((handle, generation)) if self.raw.is_live(handle, generation) => Ok(Some(handle)),
            Some(_) => {
                tracing::debug!(?cursor, "rejected stale cursor");
                Err(Error::InvalidCursor)
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but the end position is an error too.
    fn element(&self, cursor: Cursor) -> Result<Handle> {
        self.resolve(cursor)?.ok_or_else(|| {
            tracing::debug!(?cursor, "end cursor has no element");
            Error::InvalidCursor
        })
    }
}
