//! In-order navigation over parent links.
//!
//! These work on the node arena alone so iterators that hand out `&mut V` from the
//! value arena can keep walking the tree.

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};

/// Returns the outermost node on `side` of the subtree rooted at `handle`.
pub(crate) fn extreme<K>(nodes: &Arena<Node<K>>, mut handle: Handle, side: Side) -> Handle {
    while let Some(child) = nodes.get(handle).child(side) {
        handle = child;
    }
    handle
}

/// Returns the leftmost (minimum) node of the subtree rooted at `handle`.
#[inline]
pub(crate) fn min<K>(nodes: &Arena<Node<K>>, handle: Handle) -> Handle {
    extreme(nodes, handle, Side::Left)
}

/// Returns the rightmost (maximum) node of the subtree rooted at `handle`.
#[inline]
pub(crate) fn max<K>(nodes: &Arena<Node<K>>, handle: Handle) -> Handle {
    extreme(nodes, handle, Side::Right)
}

// Next node in direction `side`: descend once to `side`, then all the way to the
// opposite side; otherwise climb until we arrive from the opposite side.
fn step<K>(nodes: &Arena<Node<K>>, mut handle: Handle, side: Side) -> Option<Handle> {
    if let Some(child) = nodes.get(handle).child(side) {
        return Some(extreme(nodes, child, side.opposite()));
    }

    let mut parent = nodes.get(handle).parent();
    while let Some(p) = parent {
        if nodes.get(p).child(side) != Some(handle) {
            return Some(p);
        }
        handle = p;
        parent = nodes.get(p).parent();
    }
    None
}

/// Returns the in-order successor of `handle`, or `None` if it is the maximum.
#[inline]
pub(crate) fn successor<K>(nodes: &Arena<Node<K>>, handle: Handle) -> Option<Handle> {
    step(nodes, handle, Side::Right)
}

/// Returns the in-order predecessor of `handle`, or `None` if it is the minimum.
#[inline]
pub(crate) fn predecessor<K>(nodes: &Arena<Node<K>>, handle: Handle) -> Option<Handle> {
    step(nodes, handle, Side::Left)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    //        4
    //      /   \
    //     2     6
    //    / \     \
    //   1   3     7
    fn sample() -> (Arena<Node<u32>>, Handle) {
        let mut nodes = Arena::new();
        let unused = Handle::from_index(0);
        let root = nodes.alloc(Node::new(4, unused, None));
        let two = nodes.alloc(Node::new(2, unused, Some(root)));
        let six = nodes.alloc(Node::new(6, unused, Some(root)));
        let one = nodes.alloc(Node::new(1, unused, Some(two)));
        let three = nodes.alloc(Node::new(3, unused, Some(two)));
        let seven = nodes.alloc(Node::new(7, unused, Some(six)));
        nodes.get_mut(root).set_child(Side::Left, Some(two));
        nodes.get_mut(root).set_child(Side::Right, Some(six));
        nodes.get_mut(two).set_child(Side::Left, Some(one));
        nodes.get_mut(two).set_child(Side::Right, Some(three));
        nodes.get_mut(six).set_child(Side::Right, Some(seven));
        (nodes, root)
    }

    #[test]
    fn forward_walk_is_sorted() {
        let (nodes, root) = sample();
        let mut keys = Vec::new();
        let mut current = Some(min(&nodes, root));
        while let Some(h) = current {
            keys.push(*nodes.get(h).key());
            current = successor(&nodes, h);
        }
        assert_eq!(keys, [1, 2, 3, 4, 6, 7]);
    }

    #[test]
    fn backward_walk_is_reverse_sorted() {
        let (nodes, root) = sample();
        let mut keys = Vec::new();
        let mut current = Some(max(&nodes, root));
        while let Some(h) = current {
            keys.push(*nodes.get(h).key());
            current = predecessor(&nodes, h);
        }
        assert_eq!(keys, [7, 6, 4, 3, 2, 1]);
    }

    #[test]
    fn extremes_have_no_neighbour_beyond() {
        let (nodes, root) = sample();
        assert_eq!(predecessor(&nodes, min(&nodes, root)), None);
        assert_eq!(successor(&nodes, max(&nodes, root)), None);
    }
}
