//! Search, insertion, deletion and rebalancing over node graphs.
//!
//! The tree owns the root and the comparator but no element count; the
//! count is the wrapping container's business. All algorithms keep the
//! AVL condition: after every completed insert or unlink the height
//! difference between any node's subtrees is at most one.

use std::cmp;
use std::cmp::Ordering;

use crate::compare::Compare;
use crate::node::{
    adjust_height, left_height, leftmost, right_height, rightmost, Link, LinkPtr, Node, NodePtr,
};

pub(crate) struct Tree<K, V, C> {
    pub(crate) root: Link<K, V>,
    pub(crate) compare: C,
}

/// Outcome of descending for an insertion: either the key is already
/// present, or the empty link slot to attach a new leaf to plus the node
/// that owns the slot.
pub(crate) enum InsertPos<K, V> {
    Occupied(NodePtr<K, V>),
    Vacant(Link<K, V>, LinkPtr<K, V>),
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K, V, C: Compare<K>> Tree<K, V, C> {
    pub(crate) fn find(&self, key: &K) -> Link<K, V> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match self.compare.compare(key, &node_ptr.as_ref().key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    /// Leftmost node with key greater than (or, if `inclusive`, equal to)
    /// the given key. Descends while tracking the best candidate seen.
    pub(crate) fn bound_front(&self, key: &K, inclusive: bool) -> Link<K, V> {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            unsafe {
                match self.compare.compare(&node_ptr.as_ref().key, key) {
                    Ordering::Greater => {
                        candidate = Some(node_ptr);
                        current = node_ptr.as_ref().left;
                    }
                    Ordering::Equal if inclusive => return Some(node_ptr),
                    _ => current = node_ptr.as_ref().right,
                }
            }
        }
        candidate
    }

    /// Rightmost node with key less than (or, if `inclusive`, equal to)
    /// the given key.
    pub(crate) fn bound_back(&self, key: &K, inclusive: bool) -> Link<K, V> {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            unsafe {
                match self.compare.compare(&node_ptr.as_ref().key, key) {
                    Ordering::Less => {
                        candidate = Some(node_ptr);
                        current = node_ptr.as_ref().right;
                    }
                    Ordering::Equal if inclusive => return Some(node_ptr),
                    _ => current = node_ptr.as_ref().left,
                }
            }
        }
        candidate
    }

    pub(crate) fn find_insert_pos(&mut self, key: &K) -> InsertPos<K, V> {
        let mut parent: Link<K, V> = None;
        let mut link_ptr: LinkPtr<K, V> = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                match self.compare.compare(key, &node_ptr.as_ref().key) {
                    Ordering::Equal => return InsertPos::Occupied(node_ptr),
                    Ordering::Less => {
                        parent = Some(node_ptr);
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().left);
                    }
                    Ordering::Greater => {
                        parent = Some(node_ptr);
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                    }
                }
            }
        }
        InsertPos::Vacant(parent, link_ptr)
    }

    /// Asserts that the tree structure is consistent and returns the
    /// number of nodes. Checks parent back-links, cached heights, the
    /// AVL condition at every node and that an in-order walk is strictly
    /// increasing under the comparator.
    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self) -> usize {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            let mut num_nodes = 0;
            let mut previous: Link<K, V> = None;
            self.traverse(
                |node_ptr| {
                    let mut height = 0;
                    let mut left_height = 0;
                    let mut right_height = 0;

                    // Check link for left child node
                    if let Some(left_ptr) = node_ptr.as_ref().left {
                        assert!(left_ptr.as_ref().parent == Some(node_ptr));
                        left_height = left_ptr.as_ref().height + 1;
                        height = cmp::max(height, left_height);
                    }

                    // Check link for right child node
                    if let Some(right_ptr) = node_ptr.as_ref().right {
                        assert!(right_ptr.as_ref().parent == Some(node_ptr));
                        right_height = right_ptr.as_ref().height + 1;
                        height = cmp::max(height, right_height);
                    }

                    // Check height
                    assert_eq!(node_ptr.as_ref().height, height);

                    // Check AVL condition (near balance)
                    assert!(left_height <= right_height + 1);
                    assert!(right_height <= left_height + 1);

                    num_nodes += 1;
                },
                |node_ptr| {
                    // Check strict in-order key ordering
                    if let Some(previous_ptr) = previous {
                        assert!(
                            self.compare
                                .compare(&previous_ptr.as_ref().key, &node_ptr.as_ref().key)
                                == Ordering::Less
                        );
                    }
                    previous = Some(node_ptr);
                },
                |_| {},
            );
            num_nodes
        }
    }
}

impl<K, V, C> Tree<K, V, C> {
    pub(crate) fn new(compare: C) -> Self {
        Self {
            root: None,
            compare,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.postorder(|node_ptr| unsafe { Node::destroy(node_ptr) });
        self.root = None;
    }

    /// Attaches a new leaf at the vacant slot found by `find_insert_pos`
    /// and restores balance on the way back to the root. A single
    /// insertion disturbs at most one ancestor, so the unwind stops after
    /// the first rotation.
    pub(crate) fn insert_leaf(
        &mut self,
        parent: Link<K, V>,
        mut link_ptr: LinkPtr<K, V>,
        key: K,
        value: V,
    ) -> NodePtr<K, V> {
        let node_ptr = Node::create(parent, key, value);
        unsafe {
            *link_ptr.as_mut() = Some(node_ptr);
        }
        self.rebalance_once(parent);
        node_ptr
    }

    /// Unlinks a node from the tree without freeing it.
    ///
    /// A node with a right subtree is replaced by its in-order successor,
    /// the leftmost node of that subtree (always the successor: the
    /// replacement policy is fixed and deterministic). The successor has
    /// no left child, so taking it out of its own position is a simple
    /// splice. Nodes without a right subtree are spliced out directly.
    /// Rebalancing after removal walks all the way up to the root: unlike
    /// insertion, a removal can leave every ancestor out of balance.
    pub(crate) fn unlink_node(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(mut succ_ptr) = node_ptr.as_ref().right {
                // Find the in-order successor in the right subtree
                let mut succ_parent_ptr = node_ptr;
                while let Some(left_ptr) = succ_ptr.as_ref().left {
                    succ_parent_ptr = succ_ptr;
                    succ_ptr = left_ptr;
                }

                // Successor is stem or leaf, unlink it from the tree
                debug_assert!(succ_ptr.as_ref().left.is_none());
                if succ_parent_ptr.as_ref().left == Some(succ_ptr) {
                    succ_parent_ptr.as_mut().left = succ_ptr.as_ref().right;
                } else {
                    succ_parent_ptr.as_mut().right = succ_ptr.as_ref().right;
                }
                if let Some(mut right_ptr) = succ_ptr.as_ref().right {
                    right_ptr.as_mut().parent = succ_ptr.as_ref().parent;
                }

                // Replace the node to unlink by its successor (up to 6 links)
                succ_ptr.as_mut().left = node_ptr.as_ref().left;
                if let Some(mut left_ptr) = node_ptr.as_ref().left {
                    left_ptr.as_mut().parent = Some(succ_ptr);
                }

                succ_ptr.as_mut().right = node_ptr.as_ref().right;
                if let Some(mut right_ptr) = node_ptr.as_ref().right {
                    right_ptr.as_mut().parent = Some(succ_ptr);
                }

                succ_ptr.as_mut().parent = node_ptr.as_ref().parent;
                match node_ptr.as_ref().parent {
                    None => self.root = Some(succ_ptr),
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = Some(succ_ptr);
                        } else {
                            parent_ptr.as_mut().right = Some(succ_ptr);
                        }
                    }
                }

                // The successor's old parent may be out of balance now
                let mut rebalance_from = succ_parent_ptr;
                if rebalance_from == node_ptr {
                    // Old parent is the unlinked node itself, which has
                    // just been replaced by the successor
                    rebalance_from = succ_ptr;
                }
                self.rebalance(Some(rebalance_from));
            } else {
                // No right subtree: splice the left child (if any) into
                // the unlinked node's slot
                debug_assert!(node_ptr.as_ref().right.is_none());
                if let Some(mut left_ptr) = node_ptr.as_ref().left {
                    left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                }
                match node_ptr.as_ref().parent {
                    None => self.root = node_ptr.as_ref().left,
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = node_ptr.as_ref().left;
                        } else {
                            parent_ptr.as_mut().right = node_ptr.as_ref().left;
                        }
                        // Parent node may be out of balance now
                        self.rebalance(Some(parent_ptr));
                    }
                }
            }
        }
    }

    /// Detaches the minimum node without rebalancing and moves its entry
    /// out. Heights go stale; only for consuming the whole tree.
    pub(crate) fn pop_leftmost(&mut self) -> Option<(K, V)> {
        let node_ptr = self.root.map(leftmost)?;
        unsafe {
            debug_assert!(node_ptr.as_ref().left.is_none());
            if let Some(mut right_ptr) = node_ptr.as_ref().right {
                right_ptr.as_mut().parent = node_ptr.as_ref().parent;
            }
            match node_ptr.as_ref().parent {
                None => self.root = node_ptr.as_ref().right,
                Some(mut parent_ptr) => parent_ptr.as_mut().left = node_ptr.as_ref().right,
            }
            Some(Node::into_entry(node_ptr))
        }
    }

    /// Detaches the maximum node without rebalancing and moves its entry
    /// out. Heights go stale; only for consuming the whole tree.
    pub(crate) fn pop_rightmost(&mut self) -> Option<(K, V)> {
        let node_ptr = self.root.map(rightmost)?;
        unsafe {
            debug_assert!(node_ptr.as_ref().right.is_none());
            if let Some(mut left_ptr) = node_ptr.as_ref().left {
                left_ptr.as_mut().parent = node_ptr.as_ref().parent;
            }
            match node_ptr.as_ref().parent {
                None => self.root = node_ptr.as_ref().left,
                Some(mut parent_ptr) => parent_ptr.as_mut().right = node_ptr.as_ref().left,
            }
            Some(Node::into_entry(node_ptr))
        }
    }

    /// Single rotation: promotes the right child into this node's
    /// position, moves the promoted node's vacated left subtree into the
    /// demoted node's right slot and fixes every affected parent link.
    /// Touches nothing above the rotated subtree except the one child
    /// link pointing at it.
    fn rotate_left(&mut self, mut node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(mut right_ptr) = node_ptr.as_ref().right {
                node_ptr.as_mut().right = right_ptr.as_ref().left;
                if let Some(mut right_left_ptr) = right_ptr.as_mut().left {
                    right_left_ptr.as_mut().parent = Some(node_ptr);
                }

                right_ptr.as_mut().parent = node_ptr.as_ref().parent;
                match node_ptr.as_ref().parent {
                    None => self.root = Some(right_ptr),
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = Some(right_ptr);
                        } else {
                            parent_ptr.as_mut().right = Some(right_ptr);
                        }
                    }
                }

                right_ptr.as_mut().left = Some(node_ptr);
                node_ptr.as_mut().parent = Some(right_ptr);

                adjust_height(node_ptr);
                adjust_height(right_ptr);
            }
        }
    }

    fn rotate_right(&mut self, mut node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(mut left_ptr) = node_ptr.as_ref().left {
                node_ptr.as_mut().left = left_ptr.as_ref().right;
                if let Some(mut left_right_ptr) = left_ptr.as_ref().right {
                    left_right_ptr.as_mut().parent = Some(node_ptr);
                }

                left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                match node_ptr.as_ref().parent {
                    None => self.root = Some(left_ptr),
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = Some(left_ptr);
                        } else {
                            parent_ptr.as_mut().right = Some(left_ptr);
                        }
                    }
                }

                left_ptr.as_mut().right = Some(node_ptr);
                node_ptr.as_mut().parent = Some(left_ptr);

                adjust_height(node_ptr);
                adjust_height(left_ptr);
            }
        }
    }

    /// Rebalances nodes starting from the given position up to the root.
    fn rebalance(&mut self, start_from: Link<K, V>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
    }

    /// Rebalances nodes starting from the given position up to the root,
    /// stopping after the first rebalance operation.
    fn rebalance_once(&mut self, start_from: Link<K, V>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            let did_rebalance = self.rebalance_node(node_ptr);
            if did_rebalance {
                break;
            }
            current = parent;
        }
    }

    /// Restores the AVL condition at the given node if necessary and
    /// adjusts its height. The imbalance must not exceed two, which
    /// always holds after a single structural update. A left-heavy node
    /// whose left child leans right takes a double rotation (rotate the
    /// child left, then the node right); otherwise a single right
    /// rotation suffices. Right-heavy is symmetric. Returns whether a
    /// rotation happened.
    fn rebalance_node(&mut self, node_ptr: NodePtr<K, V>) -> bool {
        unsafe {
            let node_left_height = left_height(node_ptr);
            let node_right_height = right_height(node_ptr);
            debug_assert!(node_left_height <= node_right_height + 2);
            debug_assert!(node_right_height <= node_left_height + 2);
            if node_left_height > node_right_height + 1 {
                // Rebalance right
                let left_ptr = node_ptr.as_ref().left.unwrap();
                if right_height(left_ptr) > left_height(left_ptr) {
                    self.rotate_left(left_ptr);
                }
                self.rotate_right(node_ptr);
                true
            } else if node_right_height > node_left_height + 1 {
                // Rebalance left
                let right_ptr = node_ptr.as_ref().right.unwrap();
                if left_height(right_ptr) > right_height(right_ptr) {
                    self.rotate_right(right_ptr);
                }
                self.rotate_left(node_ptr);
                true
            } else {
                adjust_height(node_ptr);
                false
            }
        }
    }

    fn postorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    /// Iterative traversal by link chasing; no recursion, no auxiliary
    /// storage. Calls each visitor at the matching visit of a node.
    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<K, V>),
        In: FnMut(NodePtr<K, V>),
        Post: FnMut(NodePtr<K, V>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_ptr);
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so the node pointer must not be touched after
                        // the postorder call.
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl<K, V, C> Drop for Tree<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for Tree<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            root: self
                .root
                .map(|root_ptr| crate::node::clone_subtree(root_ptr, None)),
            compare: self.compare.clone(),
        }
    }
}
