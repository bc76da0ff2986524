//! Cursors: bidirectional positions over the entries of a map.
//!
//! A cursor points either at an entry or at the end position, the
//! canonical one-past-the-last-entry sentinel. Stepping forward follows
//! the in-order successor, stepping backward the predecessor; both are
//! pure walks over child and parent links.

use std::ptr;

use crate::compare::NaturalOrder;
use crate::map::OrderedMap;
use crate::node::{predecessor, rightmost, successor, Link, Node};

/// A cursor over the entries of an [`OrderedMap`].
///
/// Cursors point either at an entry or at the end of the map. This type
/// is returned by [`OrderedMap::cursor`], [`OrderedMap::find`],
/// [`OrderedMap::lower_bound`] and friends.
pub struct Cursor<'a, K, V, C = NaturalOrder> {
    pub(crate) map: &'a OrderedMap<K, V, C>,
    pub(crate) pos: Link<K, V>,
}

/// A cursor over the entries of an [`OrderedMap`] which allows removing
/// the pointed-at entry and mutating its value.
///
/// This type is returned by [`OrderedMap::cursor_mut`],
/// [`OrderedMap::find_mut`] and [`OrderedMap::lower_bound_mut`].
pub struct CursorMut<'a, K, V, C = NaturalOrder> {
    pub(crate) map: &'a mut OrderedMap<K, V, C>,
    pub(crate) pos: Link<K, V>,
}

impl<'a, K, V, C> Cursor<'a, K, V, C> {
    /// Returns true if the cursor points to the end of the map.
    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    /// Returns a reference to the key of the pointed-at entry, or `None`
    /// at the end of the map.
    pub fn key(&self) -> Option<&'a K> {
        self.pos.map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).key })
    }

    /// Returns a reference to the value of the pointed-at entry, or
    /// `None` at the end of the map.
    pub fn value(&self) -> Option<&'a V> {
        self.pos
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Returns references to the key and value of the pointed-at entry,
    /// or `None` at the end of the map.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.pos.map(|node_ptr| unsafe {
            let node = &*node_ptr.as_ptr();
            (&node.key, &node.value)
        })
    }

    /// Advances the cursor to the next entry in key order. Past the last
    /// entry the cursor comes to rest at the end of the map.
    ///
    /// # Panics
    ///
    /// Panics if the cursor already points to the end of the map.
    pub fn next(&mut self) {
        let node_ptr = self.pos.expect("cursor is at the end of the map");
        self.pos = successor(node_ptr);
    }

    /// Moves the cursor back to the previous entry in key order. At the
    /// end of the map this yields the last entry.
    ///
    /// If the cursor already points to the first entry (or the map is
    /// empty), returns `false` and does not move.
    pub fn prev(&mut self) -> bool {
        let previous = match self.pos {
            None => self.map.tree.root.map(rightmost),
            Some(node_ptr) => predecessor(node_ptr),
        };
        match previous {
            None => false,
            Some(_) => {
                self.pos = previous;
                true
            }
        }
    }
}

// Auto derived clone would have an invalid type bound of K: Clone, V: Clone
impl<K, V, C> Clone for Cursor<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            pos: self.pos,
        }
    }
}

/// Cursors are equal when they point at the same position of the same
/// map.
impl<K, V, C> PartialEq for Cursor<'_, K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.map, other.map) && self.pos == other.pos
    }
}

impl<K, V, C> Eq for Cursor<'_, K, V, C> {}

impl<'a, K, V, C> CursorMut<'a, K, V, C> {
    /// Returns true if the cursor points to the end of the map.
    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    /// Returns a reference to the key of the pointed-at entry, or `None`
    /// at the end of the map.
    pub fn key(&self) -> Option<&K> {
        self.pos.map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).key })
    }

    /// Returns a reference to the value of the pointed-at entry, or
    /// `None` at the end of the map.
    pub fn value(&self) -> Option<&V> {
        self.pos
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Returns a mutable reference to the value of the pointed-at entry,
    /// or `None` at the end of the map.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.pos
            .map(|node_ptr| unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Returns references to the key and value of the pointed-at entry,
    /// or `None` at the end of the map.
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.pos.map(|node_ptr| unsafe {
            let node = &*node_ptr.as_ptr();
            (&node.key, &node.value)
        })
    }

    /// Returns the key and a mutable reference to the value of the
    /// pointed-at entry, or `None` at the end of the map.
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.pos.map(|node_ptr| unsafe {
            let node = &mut *node_ptr.as_ptr();
            (&node.key, &mut node.value)
        })
    }

    /// Advances the cursor to the next entry in key order. Past the last
    /// entry the cursor comes to rest at the end of the map.
    ///
    /// # Panics
    ///
    /// Panics if the cursor already points to the end of the map.
    pub fn next(&mut self) {
        let node_ptr = self.pos.expect("cursor is at the end of the map");
        self.pos = successor(node_ptr);
    }

    /// Moves the cursor back to the previous entry in key order. At the
    /// end of the map this yields the last entry.
    ///
    /// If the cursor already points to the first entry (or the map is
    /// empty), returns `false` and does not move.
    pub fn prev(&mut self) -> bool {
        let previous = match self.pos {
            None => self.map.tree.root.map(rightmost),
            Some(node_ptr) => predecessor(node_ptr),
        };
        match previous {
            None => false,
            Some(_) => {
                self.pos = previous;
                true
            }
        }
    }

    /// Removes the pointed-at entry from the map and returns it. After
    /// removal the cursor points at the entry that followed the removed
    /// one, or at the end of the map.
    ///
    /// # Panics
    ///
    /// Panics if the cursor points to the end of the map.
    pub fn remove(&mut self) -> (K, V) {
        let node_ptr = self.pos.expect("cursor is at the end of the map");
        // The successor survives removal: either it is untouched, or it
        // is spliced into the removed node's position.
        self.pos = successor(node_ptr);
        self.map.tree.unlink_node(node_ptr);
        self.map.len -= 1;
        unsafe { Node::into_entry(node_ptr) }
    }
}
