//! An ordered map implemented with an AVL tree.
//!
//! The tree keeps itself height-balanced across insertions and removals,
//! so lookups, mutations and bound queries all run in O(log n). Every
//! node carries a parent back-reference, which gives iterators and
//! cursors stable forward and backward stepping without auxiliary
//! storage.
//!
//! The key order is pluggable: by default keys are sorted by [`Ord`], or
//! a [`Compare`] implementation (any ordering closure works) can be
//! supplied at construction.
//!
//! ```
//! use ordmap::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.insert(1, "one");
//! map.insert(2, "two");
//! map.insert(3, "three");
//! assert_eq!(map.get(&2), Some(&"two"));
//!
//! for (key, value) in &map {
//!     println!("{key} => {value}");
//! }
//!
//! let (cursor, inserted) = map.insert(2, "deux");
//! assert!(!inserted);
//! assert_eq!(cursor.value(), Some(&"two"));
//! ```
//!
//! Two maps exchange their contents in constant time with
//! [`OrderedMap::swap`] (or plain [`std::mem::swap`]).

mod compare;
mod cursor;
mod iter;
mod map;
mod node;
mod tree;

pub use compare::{Compare, NaturalOrder};
pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut, Range};
pub use map::OrderedMap;


#[cfg(test)]
mod proptests;
