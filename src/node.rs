//! The tree node: a key/value cell with owned children and a non-owning
//! parent back-reference.
//!
//! Children are exclusively owned through the create/destroy discipline
//! below; the parent pointer is used for navigation only and never for
//! destruction. Every node caches the height of its subtree so balance
//! checks never re-scan.

use std::cmp;
use std::ptr::NonNull;

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;
pub(crate) type LinkPtr<K, V> = NonNull<Link<K, V>>;

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
    /// Cached subtree height. Zero for a leaf; a parent sees an absent
    /// child as height 0 and a present child as `child.height + 1`.
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }

    /// Frees the node and moves its key/value pair out.
    pub(crate) unsafe fn into_entry(node_ptr: NodePtr<K, V>) -> (K, V) {
        let boxed = Box::from_raw(node_ptr.as_ptr());
        (boxed.key, boxed.value)
    }
}

/// Height of the left subtree as seen from `node_ptr`: 0 when absent.
pub(crate) fn left_height<K, V>(node_ptr: NodePtr<K, V>) -> usize {
    unsafe {
        match node_ptr.as_ref().left {
            None => 0,
            Some(left_ptr) => left_ptr.as_ref().height + 1,
        }
    }
}

/// Height of the right subtree as seen from `node_ptr`: 0 when absent.
pub(crate) fn right_height<K, V>(node_ptr: NodePtr<K, V>) -> usize {
    unsafe {
        match node_ptr.as_ref().right {
            None => 0,
            Some(right_ptr) => right_ptr.as_ref().height + 1,
        }
    }
}

/// Recomputes the cached height from the immediate children only.
/// Callers must adjust bottom-up along any path they mutated.
pub(crate) fn adjust_height<K, V>(mut node_ptr: NodePtr<K, V>) {
    unsafe {
        node_ptr.as_mut().height = cmp::max(left_height(node_ptr), right_height(node_ptr));
    }
}

/// First node of the subtree in key order.
pub(crate) fn leftmost<K, V>(node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
    let mut current = node_ptr;
    unsafe {
        while let Some(left_ptr) = current.as_ref().left {
            current = left_ptr;
        }
    }
    current
}

/// Last node of the subtree in key order.
pub(crate) fn rightmost<K, V>(node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
    let mut current = node_ptr;
    unsafe {
        while let Some(right_ptr) = current.as_ref().right {
            current = right_ptr;
        }
    }
    current
}

/// Next node in key order: the leftmost descendant of the right subtree,
/// or else the first ancestor of which this node is in the left subtree.
/// None past the last node.
pub(crate) fn successor<K, V>(node_ptr: NodePtr<K, V>) -> Link<K, V> {
    unsafe {
        if let Some(right_ptr) = node_ptr.as_ref().right {
            return Some(leftmost(right_ptr));
        }
        let mut current = node_ptr;
        while let Some(parent_ptr) = current.as_ref().parent {
            if parent_ptr.as_ref().left == Some(current) {
                return Some(parent_ptr);
            }
            current = parent_ptr;
        }
        None
    }
}

/// Previous node in key order. None before the first node.
pub(crate) fn predecessor<K, V>(node_ptr: NodePtr<K, V>) -> Link<K, V> {
    unsafe {
        if let Some(left_ptr) = node_ptr.as_ref().left {
            return Some(rightmost(left_ptr));
        }
        let mut current = node_ptr;
        while let Some(parent_ptr) = current.as_ref().parent {
            if parent_ptr.as_ref().right == Some(current) {
                return Some(parent_ptr);
            }
            current = parent_ptr;
        }
        None
    }
}

/// Deep copy of a subtree. Parent links in the copy are derived from the
/// new ownership structure, never taken from the source.
pub(crate) fn clone_subtree<K: Clone, V: Clone>(
    src_ptr: NodePtr<K, V>,
    parent: Link<K, V>,
) -> NodePtr<K, V> {
    unsafe {
        let src = src_ptr.as_ref();
        let mut cloned = Node::create(parent, src.key.clone(), src.value.clone());
        cloned.as_mut().height = src.height;
        cloned.as_mut().left = src.left.map(|left_ptr| clone_subtree(left_ptr, Some(cloned)));
        cloned.as_mut().right = src
            .right
            .map(|right_ptr| clone_subtree(right_ptr, Some(cloned)));
        cloned
    }
}
