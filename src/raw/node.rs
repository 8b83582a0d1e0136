use super::handle::Handle;

/// Which child link of a node is meant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// AVL node: the key lives here, the value lives in the tree's value arena.
pub(crate) struct Node<K> {
    key: K,
    value: Handle,
    // Back-link only; a node never owns its parent.
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    // Height of the subtree rooted here; a leaf has height 1, an absent child 0.
    height: u8,
}

impl<K> Node<K> {
    /// Creates a new leaf node below `parent`.
    pub(crate) fn new(key: K, value: Handle, parent: Option<Handle>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    /// Returns the handle of this node's value in the value arena.
    #[inline]
    pub(crate) fn value(&self) -> Handle {
        self.value
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns which side `child` hangs from, or `None` if it is not a child of this node.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }

    /// Consumes the node, returning its key and value handle.
    pub(crate) fn into_parts(self) -> (K, Handle) {
        (self.key, self.value)
    }
}
