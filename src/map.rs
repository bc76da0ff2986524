//! An ordered map implemented with an AVL tree.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Bound, Index, RangeBounds};

use crate::compare::{Compare, NaturalOrder};
use crate::cursor::{Cursor, CursorMut};
use crate::iter::{IntoIter, Iter, IterMut, Range};
use crate::node::{leftmost, rightmost, Node};
use crate::tree::{InsertPos, Tree};

/// An ordered map implemented with an AVL tree.
///
/// Entries are kept sorted by key under a pluggable comparator, the
/// natural [`Ord`] order by default. Lookups, insertions and removals
/// take O(log n); iteration and cursor stepping walk the tree's own
/// child and parent links.
///
/// Unlike the maps in `std::collections`, inserting an already present
/// key does not replace the stored entry (see [`OrderedMap::insert`]).
///
/// ```
/// use ordmap::OrderedMap;
/// let mut map = OrderedMap::new();
/// map.insert(1, "one");
/// map.insert(2, "two");
/// map.insert(3, "three");
/// assert_eq!(map.get(&2), Some(&"two"));
/// map.remove(&2);
/// assert!(map.get(&2).is_none());
/// ```
pub struct OrderedMap<K, V, C = NaturalOrder> {
    pub(crate) tree: Tree<K, V, C>,
    pub(crate) len: usize,
}

unsafe impl<K: Send, V: Send, C: Send> Send for OrderedMap<K, V, C> {}
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for OrderedMap<K, V, C> {}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map ordered by the keys' natural order.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Creates an empty map ordered by the given comparator.
    /// No memory is allocated until the first entry is inserted.
    pub fn with_comparator(compare: C) -> Self {
        Self {
            tree: Tree::new(compare),
            len: 0,
        }
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.root.is_none()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns a reference to the map's comparator.
    pub fn comparator(&self) -> &C {
        &self.tree.compare
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
    }

    /// Exchanges the contents of two maps in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns references to the first entry in key order, or `None` if
    /// the map is empty.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.root.map(|root_ptr| unsafe {
            let node = &*leftmost(root_ptr).as_ptr();
            (&node.key, &node.value)
        })
    }

    /// Returns references to the last entry in key order, or `None` if
    /// the map is empty.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.root.map(|root_ptr| unsafe {
            let node = &*rightmost(root_ptr).as_ptr();
            (&node.key, &node.value)
        })
    }

    /// Gets an iterator over the entries of the map in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            front: self.tree.root.map(leftmost),
            back: self.tree.root.map(rightmost),
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the entries of the map in key order, with
    /// mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            front: self.tree.root.map(leftmost),
            back: self.tree.root.map(rightmost),
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// Returns a cursor at the first entry in key order, or at the end
    /// of the map if it is empty.
    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor {
            map: self,
            pos: self.tree.root.map(leftmost),
        }
    }

    /// Returns a cursor at the last entry in key order, or at the end of
    /// the map if it is empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V, C> {
        Cursor {
            map: self,
            pos: self.tree.root.map(rightmost),
        }
    }

    /// Returns a cursor at the end of the map, one past the last entry.
    pub fn cursor_end(&self) -> Cursor<'_, K, V, C> {
        Cursor {
            map: self,
            pos: None,
        }
    }

    /// Returns a mutable cursor at the first entry in key order, or at
    /// the end of the map if it is empty.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, C> {
        let pos = self.tree.root.map(leftmost);
        CursorMut { map: self, pos }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self)
    where
        C: Compare<K>,
    {
        let num_nodes = self.tree.check_consistency();
        assert_eq!(num_nodes, self.len);
    }

    #[cfg(test)]
    pub(crate) fn height(&self) -> usize {
        match self.tree.root {
            None => 0,
            Some(root_ptr) => unsafe { root_ptr.as_ref().height },
        }
    }
}

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree
            .find(key)
            .map(|node_ptr| &unsafe { &*node_ptr.as_ptr() }.value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree
            .find(key)
            .map(|node_ptr| unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree.find(key).map(|node_ptr| unsafe {
            let node = &*node_ptr.as_ptr();
            (&node.key, &node.value)
        })
    }

    /// Returns true if the map contains an entry for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.find(key).is_some()
    }

    /// Returns the number of entries for the key, which is either 0 or 1.
    pub fn count(&self, key: &K) -> usize {
        match self.tree.find(key) {
            None => 0,
            Some(_) => 1,
        }
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns a cursor at the entry for the key together with whether an
    /// insertion happened. If the key was already present the stored
    /// entry is left untouched, the given value is dropped and the flag
    /// is false.
    ///
    /// ```
    /// use ordmap::OrderedMap;
    /// let mut map = OrderedMap::new();
    /// assert!(map.insert(1, "one").1);
    /// assert!(!map.insert(1, "uno").1);
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V, C>, bool) {
        match self.tree.find_insert_pos(&key) {
            InsertPos::Occupied(node_ptr) => (
                Cursor {
                    map: &*self,
                    pos: Some(node_ptr),
                },
                false,
            ),
            InsertPos::Vacant(parent, link_ptr) => {
                let node_ptr = self.tree.insert_leaf(parent, link_ptr, key, value);
                self.len += 1;
                (
                    Cursor {
                        map: &*self,
                        pos: Some(node_ptr),
                    },
                    true,
                )
            }
        }
    }

    /// Returns a mutable reference to the value for the key, inserting an
    /// entry with the default value first if the key is not present.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let node_ptr = match self.tree.find_insert_pos(&key) {
            InsertPos::Occupied(node_ptr) => node_ptr,
            InsertPos::Vacant(parent, link_ptr) => {
                let node_ptr = self.tree.insert_leaf(parent, link_ptr, key, V::default());
                self.len += 1;
                node_ptr
            }
        };
        unsafe { &mut (*node_ptr.as_ptr()).value }
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map.
    /// Returns the stored entry if the key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let node_ptr = self.tree.find(key)?;
        debug_assert!(self.len >= 1);
        self.tree.unlink_node(node_ptr);
        self.len -= 1;
        let entry = unsafe { Node::into_entry(node_ptr) };
        debug_assert!(self.get(key).is_none());
        Some(entry)
    }

    /// Removes every entry whose key lies in the range and returns how
    /// many were removed.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    pub fn remove_range<R: RangeBounds<K>>(&mut self, range: R) -> usize {
        self.assert_valid_range(&range);
        let mut removed = 0;
        loop {
            // Re-find the front of the range each round: rebalancing
            // after an unlink may reshape the tree arbitrarily.
            let front = match range.start_bound() {
                Bound::Unbounded => self.tree.root.map(leftmost),
                Bound::Included(key) => self.tree.bound_front(key, true),
                Bound::Excluded(key) => self.tree.bound_front(key, false),
            };
            let node_ptr = match front {
                None => break,
                Some(node_ptr) => node_ptr,
            };
            let in_range = match range.end_bound() {
                Bound::Unbounded => true,
                Bound::Included(key) => unsafe {
                    self.tree.compare.compare(&node_ptr.as_ref().key, key) != Ordering::Greater
                },
                Bound::Excluded(key) => unsafe {
                    self.tree.compare.compare(&node_ptr.as_ref().key, key) == Ordering::Less
                },
            };
            if !in_range {
                break;
            }
            self.tree.unlink_node(node_ptr);
            self.len -= 1;
            unsafe { Node::destroy(node_ptr) };
            removed += 1;
        }
        removed
    }

    /// Returns a cursor at the entry for the key, or at the end of the
    /// map if the key is not present.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V, C> {
        Cursor {
            map: self,
            pos: self.tree.find(key),
        }
    }

    /// Returns a mutable cursor at the entry for the key, or at the end
    /// of the map if the key is not present.
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C> {
        let pos = self.tree.find(key);
        CursorMut { map: self, pos }
    }

    /// Returns a cursor at the first entry with key greater than or equal
    /// to the given key, or at the end of the map if there is none.
    /// Descends the tree in O(log n).
    pub fn lower_bound(&self, key: &K) -> Cursor<'_, K, V, C> {
        Cursor {
            map: self,
            pos: self.tree.bound_front(key, true),
        }
    }

    /// Returns a mutable cursor at the first entry with key greater than
    /// or equal to the given key, or at the end of the map if there is
    /// none.
    pub fn lower_bound_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C> {
        let pos = self.tree.bound_front(key, true);
        CursorMut { map: self, pos }
    }

    /// Returns a cursor at the first entry with key strictly greater than
    /// the given key, or at the end of the map if there is none.
    /// Descends the tree in O(log n).
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, K, V, C> {
        Cursor {
            map: self,
            pos: self.tree.bound_front(key, false),
        }
    }

    /// Returns the pair `(lower_bound(key), upper_bound(key))`. For a
    /// key that is present the two cursors delimit exactly that entry;
    /// otherwise they are equal.
    pub fn equal_range(&self, key: &K) -> (Cursor<'_, K, V, C>, Cursor<'_, K, V, C>) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Gets an iterator over a sub-range of entries in the map in key
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V> {
        self.assert_valid_range(&range);
        let front = match range.start_bound() {
            Bound::Unbounded => self.tree.root.map(leftmost),
            Bound::Included(key) => self.tree.bound_front(key, true),
            Bound::Excluded(key) => self.tree.bound_front(key, false),
        };
        let back = match range.end_bound() {
            Bound::Unbounded => self.tree.root.map(rightmost),
            Bound::Included(key) => self.tree.bound_back(key, true),
            Bound::Excluded(key) => self.tree.bound_back(key, false),
        };
        if let (Some(front_ptr), Some(back_ptr)) = (front, back) {
            let ordering = unsafe {
                self.tree
                    .compare
                    .compare(&front_ptr.as_ref().key, &back_ptr.as_ref().key)
            };
            if ordering != Ordering::Greater {
                return Range {
                    front,
                    back,
                    _marker: PhantomData,
                };
            }
        }
        Range {
            front: None,
            back: None,
            _marker: PhantomData,
        }
    }

    fn assert_valid_range<R: RangeBounds<K>>(&self, range: &R) {
        if let (
            Bound::Included(start) | Bound::Excluded(start),
            Bound::Included(end) | Bound::Excluded(end),
        ) = (range.start_bound(), range.end_bound())
        {
            match self.tree.compare.compare(start, end) {
                Ordering::Greater => {
                    panic!("range start is greater than range end in OrderedMap")
                }
                Ordering::Equal => {
                    if matches!(range.start_bound(), Bound::Excluded(_))
                        && matches!(range.end_bound(), Bound::Excluded(_))
                    {
                        panic!("range start and end are equal and excluded in OrderedMap")
                    }
                }
                Ordering::Less => {}
            }
        }
    }
}

impl<K, V, C: Default> Default for OrderedMap<K, V, C> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMap<K, V, C> {
    /// Deep copy: every node is cloned recursively; parent links in the
    /// copy are derived from the new structure.
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            len: self.len,
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OrderedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for OrderedMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for OrderedMap<K, V, C> {
    /// Lexicographic order over the entries in key order.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for OrderedMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K, V, C: Compare<K>> Index<&K> for OrderedMap<K, V, C> {
    type Output = V;

    /// Returns a reference to the value for the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for OrderedMap<K, V, C> {
    /// Builds a map from key-value pairs. If a key occurs more than once
    /// the first occurrence is kept.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |(key, value)| {
            self.insert(key, value);
        });
    }
}

impl<'a, K, V, C> Extend<(&'a K, &'a V)> for OrderedMap<K, V, C>
where
    K: Copy + 'a,
    V: Copy + 'a,
    C: Compare<K>,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut OrderedMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for OrderedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.len;
        IntoIter {
            tree: self.tree,
            len,
        }
    }
}
