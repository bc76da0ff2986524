//! The pluggable key order.

use std::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// A map carries one comparator, supplied at construction, and every
/// search, insertion and removal consults it. Implementations must be a
/// strict total order: irreflexive, antisymmetric and transitive, and they
/// must not change their answer for as long as a key is stored in a map.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator:
///
/// ```
/// use ordmap::OrderedMap;
///
/// let mut map = OrderedMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// map.insert(1, "one");
/// map.insert(2, "two");
/// map.insert(3, "three");
/// let keys: Vec<i32> = map.iter().map(|(&k, _)| k).collect();
/// assert_eq!(keys, [3, 2, 1]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Compares two keys, returning their relative order.
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// The order given by [`Ord`]. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Compare<K> for NaturalOrder {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}
