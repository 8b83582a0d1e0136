use alloc::vec::Vec;
use core::cmp::Ordering;
use core::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use compare::Compare;
use smallvec::{SmallVec, smallvec};

use super::arena::Arena;
use super::handle::{Generation, Handle};
use super::navigate;
use super::node::{Node, Side};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of one tree instance. Cursors remember it so a tree can reject
/// cursors that were produced by another tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct TreeId(usize);

impl TreeId {
    fn fresh() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Where a missing key belongs: below `parent` on `side`, or `None` for the root of an empty tree.
pub(crate) type AttachPoint = Option<(Handle, Side)>;

/// Result of descending the tree for a key.
pub(crate) enum SearchResult {
    /// A node with an equivalent key exists.
    Found(Handle),
    /// No equivalent key; a new node would be attached here.
    Vacant(AttachPoint),
}

// AVL height is at most ~1.44 * log2(n), so walks of a few dozen frames stay inline.
type Stack<T> = SmallVec<[T; 64]>;

/// The core AVL tree implementation backing `AVLTreeMap`.
pub(crate) struct RawAVLTreeMap<K, V, C> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values (separate from nodes so iterators can walk links while lending `&mut V`).
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
    /// Ordering policy shared by every descent.
    cmp: C,
    /// Owner identity handed to cursors.
    id: TreeId,
}

impl<K, V, C> RawAVLTreeMap<K, V, C> {
    /// Creates a new, empty tree ordered by `cmp`.
    pub(crate) fn new(cmp: C) -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
            cmp,
            id: TreeId::fresh(),
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            len: 0,
            cmp,
            id: TreeId::fresh(),
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub(crate) fn cmp(&self) -> &C {
        &self.cmp
    }

    pub(crate) fn id(&self) -> TreeId {
        self.id
    }

    /// Returns the height of the whole tree (0 when empty).
    pub(crate) fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Returns the key and the value of the node at `handle`.
    pub(crate) fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    /// Returns the key and a mutable value of the node at `handle`.
    pub(crate) fn entry_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get_mut(node.value()))
    }

    /// Borrows both arenas for read-only traversal.
    pub(crate) fn arenas(&self) -> (&Arena<Node<K>>, &Arena<V>) {
        (&self.nodes, &self.values)
    }

    /// Borrows the node arena shared and the value arena exclusively.
    pub(crate) fn arenas_mut(&mut self) -> (&Arena<Node<K>>, &mut Arena<V>) {
        (&self.nodes, &mut self.values)
    }

    /// Returns the generation of the node at `handle`, if it is occupied.
    pub(crate) fn generation(&self, handle: Handle) -> Option<Generation> {
        self.nodes.generation(handle)
    }

    /// Returns true if `handle` still refers to the node stamped with `generation`.
    pub(crate) fn is_live(&self, handle: Handle, generation: Generation) -> bool {
        self.nodes.is_live(handle, generation)
    }

    /// Returns the minimum node, if any.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| navigate::min(&self.nodes, root))
    }

    /// Returns the maximum node, if any.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| navigate::max(&self.nodes, root))
    }

    /// Returns the in-order successor of `handle`.
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        navigate::successor(&self.nodes, handle)
    }

    /// Returns the in-order predecessor of `handle`.
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        navigate::predecessor(&self.nodes, handle)
    }

    /// Clears all elements from the tree.
    ///
    /// Every node is released through the arena, so cursors to them go stale.
    pub(crate) fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            self.destroy_subtree(root);
        }
        self.len = 0;
    }

    /// Releases every node of the subtree rooted at `root`, children before parents.
    ///
    /// The caller is responsible for unlinking `root` and fixing `len`.
    fn destroy_subtree(&mut self, root: Handle) {
        let mut stack: Stack<(Handle, bool)> = smallvec![(root, false)];

        while let Some((handle, expanded)) = stack.pop() {
            if expanded {
                drop(self.take_entry(handle));
                continue;
            }

            stack.push((handle, true));
            let node = self.nodes.get(handle);
            if let Some(right) = node.right() {
                stack.push((right, false));
            }
            if let Some(left) = node.left() {
                stack.push((left, false));
            }
        }
    }

    /// Drains all key-value pairs from the tree in key order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        // Successor walks climb through already visited ancestors, so record the
        // order before any node is taken out.
        let mut order = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            order.push(handle);
            current = self.next(handle);
        }

        let entries = order.into_iter().map(|handle| self.take_entry(handle)).collect();
        self.root = None;
        self.len = 0;
        entries
    }

    /// Allocates a new node for `key`/`value` at `at` and rebalances from its parent upward.
    pub(crate) fn attach(&mut self, key: K, value: V, at: AttachPoint) -> Handle {
        let value = self.values.alloc(value);
        let parent = at.map(|(parent, _)| parent);
        let handle = self.nodes.alloc(Node::new(key, value, parent));

        match at {
            None => self.root = Some(handle),
            Some((parent, side)) => self.nodes.get_mut(parent).set_child(side, Some(handle)),
        }
        self.len += 1;

        self.rebalance_up(parent);
        handle
    }

    /// Removes the node at `handle` and returns its entry.
    ///
    /// `handle` must refer to a live node of this tree.
    pub(crate) fn erase(&mut self, handle: Handle) -> (K, V) {
        let node = self.nodes.get(handle);
        let (left, right, parent) = (node.left(), node.right(), node.parent());

        let (first_start, second_start) = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = navigate::min(&self.nodes, right);

                let start = if successor == right {
                    Some(successor)
                } else {
                    // Lift the successor out of the right subtree first.
                    let successor_parent = self.nodes.get(successor).parent();
                    let successor_right = self.nodes.get(successor).right();
                    self.transplant(successor, successor_right);
                    self.nodes.get_mut(successor).set_child(Side::Right, Some(right));
                    self.nodes.get_mut(right).set_parent(Some(successor));
                    successor_parent
                };

                self.transplant(handle, Some(successor));
                self.nodes.get_mut(successor).set_child(Side::Left, Some(left));
                self.nodes.get_mut(left).set_parent(Some(successor));

                (start, parent)
            }
            (child, None) | (None, child) => {
                self.transplant(handle, child);
                (parent, None)
            }
        };

        let entry = self.take_entry(handle);
        self.len -= 1;
        debug_assert_eq!(self.nodes.len(), self.len);

        self.rebalance_up(first_start);
        if second_start != first_start {
            self.rebalance_up(second_start);
        }

        entry
    }

    fn take_entry(&mut self, handle: Handle) -> (K, V) {
        let (key, value) = self.nodes.take(handle).into_parts();
        (key, self.values.take(value))
    }

    /// Puts `replacement` where `target` hangs from its parent (or at the root).
    ///
    /// `target`'s own links are left untouched.
    fn transplant(&mut self, target: Handle, replacement: Option<Handle>) {
        let parent = self.nodes.get(target).parent();
        match parent {
            None => self.root = replacement,
            Some(parent) => {
                let side = self.nodes.get(parent).side_of(target).expect("parent link is not mirrored by a child link");
                self.nodes.get_mut(parent).set_child(side, replacement);
            }
        }
        if let Some(replacement) = replacement {
            self.nodes.get_mut(replacement).set_parent(parent);
        }
    }

    #[inline]
    fn height_of(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.nodes.get(h).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left()).max(self.height_of(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// Right subtree height minus left subtree height.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height_of(node.right())) - i16::from(self.height_of(node.left()))
    }

    /// Rotates the subtree rooted at `pivot` towards `side` and returns its new root.
    ///
    /// The child of `pivot` on the opposite side rises and inherits `pivot`'s parent link.
    fn rotate(&mut self, pivot: Handle, side: Side) -> Handle {
        tracing::trace!(?pivot, ?side, "rotate");

        let riser = self.nodes.get(pivot).child(side.opposite()).expect("rotation needs a child to lift");
        let inner = self.nodes.get(riser).child(side);

        self.transplant(pivot, Some(riser));

        self.nodes.get_mut(pivot).set_child(side.opposite(), inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(pivot));
        }

        self.nodes.get_mut(riser).set_child(side, Some(pivot));
        self.nodes.get_mut(pivot).set_parent(Some(riser));

        self.update_height(pivot);
        self.update_height(riser);
        riser
    }

    /// Restores height and balance at `handle`, returning the root of its (possibly rotated) subtree.
    fn rebalance_at(&mut self, handle: Handle) -> Handle {
        self.update_height(handle);
        let balance = self.balance_factor(handle);

        if balance > 1 {
            let right = self.nodes.get(handle).right().expect("right-heavy node has a right child");
            if self.balance_factor(right) < 0 {
                self.rotate(right, Side::Right);
            }
            self.rotate(handle, Side::Left)
        } else if balance < -1 {
            let left = self.nodes.get(handle).left().expect("left-heavy node has a left child");
            if self.balance_factor(left) > 0 {
                self.rotate(left, Side::Left);
            }
            self.rotate(handle, Side::Right)
        } else {
            handle
        }
    }

    /// Rebalances `start` and every ancestor up to the root.
    fn rebalance_up(&mut self, start: Option<Handle>) {
        tracing::trace!(?start, "rebalance pass");

        let mut current = start;
        while let Some(handle) = current {
            let top = self.rebalance_at(handle);
            current = self.nodes.get(top).parent();
        }
    }
}

impl<K, V, C> RawAVLTreeMap<K, V, C> {
    /// Descends from the root looking for `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let mut current = self.root;
        let mut at: AttachPoint = None;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match self.cmp.compare(key, node.key()) {
                Ordering::Equal => return SearchResult::Found(handle),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            at = Some((handle, side));
            current = node.child(side);
        }

        SearchResult::Vacant(at)
    }

    /// Returns the node holding a key equivalent to `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        match self.search(key) {
            SearchResult::Found(handle) => Some(handle),
            SearchResult::Vacant(_) => None,
        }
    }

    /// Inserts `key`/`value` unless an equivalent key is present.
    ///
    /// Returns the node holding the key and whether it was inserted. A rejected
    /// pair is dropped and the tree is left untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, bool)
    where
        C: Compare<K>,
    {
        match self.search(&key) {
            SearchResult::Found(handle) => (handle, false),
            SearchResult::Vacant(at) => (self.attach(key, value, at), true),
        }
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RawAVLTreeMap<K, V, C> {
    /// Deep-copies the tree shape, entries and cached heights into a fresh tree.
    ///
    /// The copy gets its own identity, so cursors into `self` are not valid for it.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len, self.cmp.clone());

        if let Some(root) = self.root {
            let copy_root = copy.clone_node(self, root, None);
            copy.root = Some(copy_root);

            let mut stack: Stack<(Handle, Handle)> = smallvec![(root, copy_root)];
            while let Some((source, target)) = stack.pop() {
                for side in [Side::Left, Side::Right] {
                    if let Some(child) = self.nodes.get(source).child(side) {
                        let copied = copy.clone_node(self, child, Some(target));
                        copy.nodes.get_mut(target).set_child(side, Some(copied));
                        stack.push((child, copied));
                    }
                }
            }
        }

        copy.len = self.len;
        copy
    }
}

impl<K: Clone, V: Clone, C> RawAVLTreeMap<K, V, C> {
    fn clone_node(&mut self, source: &Self, handle: Handle, parent: Option<Handle>) -> Handle {
        let node = source.nodes.get(handle);
        let value = self.values.alloc(source.values.get(node.value()).clone());
        let mut copied = Node::new(node.key().clone(), value, parent);
        copied.set_height(node.height());
        self.nodes.alloc(copied)
    }
}
