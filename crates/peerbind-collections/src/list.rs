//! Dense 1-based ordered sequence
//!
//! Positions run from `1` to [`List::count`] with no gaps. Every mutator
//! keeps the relative order of the elements it does not touch. Accessing a
//! position outside the live range is an explicit
//! [`CollectionError::IndexOutOfRange`], never a sentinel.

use crate::error::{CollectionError, CollectionResult};
use std::cmp::Ordering;
use std::fmt;
use std::iter::{Enumerate, FusedIterator, Rev};

/// Ordered sequence addressed by 1-based positions
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct List<T> {
    items: Vec<T>,
}

impl<T> List<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty list with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of live elements
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Check if the list holds no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Translate a 1-based position into a `Vec` offset
    fn offset(&self, index: usize) -> CollectionResult<usize> {
        if index == 0 || index > self.items.len() {
            return Err(CollectionError::IndexOutOfRange {
                index,
                count: self.items.len(),
            });
        }
        Ok(index - 1)
    }

    /// Get the element at `index`
    pub fn at(&self, index: usize) -> CollectionResult<&T> {
        let offset = self.offset(index)?;
        Ok(&self.items[offset])
    }

    /// Get a mutable reference to the element at `index`
    pub fn at_mut(&mut self, index: usize) -> CollectionResult<&mut T> {
        let offset = self.offset(index)?;
        Ok(&mut self.items[offset])
    }

    /// Get the element at position 1
    pub fn first(&self) -> CollectionResult<&T> {
        self.items
            .first()
            .ok_or(CollectionError::Empty { operation: "first" })
    }

    /// Get the element at position `count()`
    pub fn last(&self) -> CollectionResult<&T> {
        self.items
            .last()
            .ok_or(CollectionError::Empty { operation: "last" })
    }

    /// Add an element after the current last position
    pub fn append(&mut self, element: T) {
        self.items.push(element);
    }

    /// Add an element before the current first position
    pub fn prepend(&mut self, element: T) {
        self.items.insert(0, element);
    }

    /// Insert an element so that it ends up at `index`
    ///
    /// Valid positions are `1..=count() + 1`; inserting at `count() + 1`
    /// is the same as [`append`](Self::append).
    pub fn insert_at(&mut self, index: usize, element: T) -> CollectionResult<()> {
        if index == 0 || index > self.items.len() + 1 {
            return Err(CollectionError::IndexOutOfRange {
                index,
                count: self.items.len(),
            });
        }
        self.items.insert(index - 1, element);
        Ok(())
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&mut self, index: usize) -> CollectionResult<T> {
        if self.items.is_empty() {
            return Err(CollectionError::Empty {
                operation: "remove_at",
            });
        }
        let offset = self.offset(index)?;
        Ok(self.items.remove(offset))
    }

    /// Remove and return the first element
    pub fn remove_first(&mut self) -> CollectionResult<T> {
        if self.items.is_empty() {
            return Err(CollectionError::Empty {
                operation: "remove_first",
            });
        }
        Ok(self.items.remove(0))
    }

    /// Remove and return the last element
    pub fn remove_last(&mut self) -> CollectionResult<T> {
        self.items.pop().ok_or(CollectionError::Empty {
            operation: "remove_last",
        })
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&mut self, index: usize, element: T) -> CollectionResult<T> {
        let offset = self.offset(index)?;
        Ok(std::mem::replace(&mut self.items[offset], element))
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sort in place with a less-than comparator
    ///
    /// The sort is stable: elements the comparator considers equal keep
    /// their relative order.
    pub fn sort_by<F>(&mut self, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.items.sort_by(|a, b| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
    }

    /// Replace every element with the value returned by `transform`
    ///
    /// The new elements are stored only once every call has returned, so a
    /// panicking transform leaves the list unchanged.
    pub fn apply_to_all<F>(&mut self, transform: F)
    where
        F: FnMut(&T) -> T,
    {
        let items: Vec<T> = self.items.iter().map(transform).collect();
        self.items = items;
    }

    /// Iterate `(position, element)` pairs from first to last
    ///
    /// The iterator is lazy and cloneable; calling `iter()` again (or
    /// cloning an unstarted iterator) restarts from position 1.
    pub fn iter(&self) -> ListIter<'_, T> {
        ListIter {
            inner: self.items.iter().enumerate(),
        }
    }

    /// Iterate `(position, element)` pairs from last to first
    pub fn iter_rev(&self) -> Rev<ListIter<'_, T>> {
        self.iter().rev()
    }

    /// View the elements as a slice (position `i` is slice index `i - 1`)
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume the list, returning its elements in order
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: PartialEq> List<T> {
    /// Position of the first element equal to `element`, or `0` when absent
    pub fn find(&self, element: &T) -> usize {
        self.items
            .iter()
            .position(|item| item == element)
            .map_or(0, |offset| offset + 1)
    }

    /// Check if any element equals `element`
    pub fn contains(&self, element: &T) -> bool {
        self.find(element) != 0
    }
}

impl<T: Clone> List<T> {
    /// New list holding the elements for which `predicate` holds, in order
    pub fn filter<F>(&self, mut predicate: F) -> List<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items
            .iter()
            .filter(|item| predicate(*item))
            .cloned()
            .collect()
    }
}

impl<T: Ord> List<T> {
    /// Sort in place by the natural order (stable)
    pub fn sort(&mut self) {
        self.items.sort();
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = (usize, &'a T);
    type IntoIter = ListIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(position, element)` pairs of a [`List`]
#[derive(Debug)]
pub struct ListIter<'a, T> {
    inner: Enumerate<std::slice::Iter<'a, T>>,
}

impl<T> Clone for ListIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for ListIter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(offset, item)| (offset + 1, item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for ListIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(offset, item)| (offset + 1, item))
    }
}

impl<T> ExactSizeIterator for ListIter<'_, T> {}

impl<T> FusedIterator for ListIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[i32]) -> List<i32> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_list_creation() {
        let list: List<i32> = List::new();
        assert_eq!(list.count(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_list_positions_are_one_based() {
        let list = list_of(&[10, 20, 30]);
        assert_eq!(list.at(1), Ok(&10));
        assert_eq!(list.at(3), Ok(&30));
        assert_eq!(list.first(), Ok(&10));
        assert_eq!(list.last(), Ok(&30));
    }

    #[test]
    fn test_list_out_of_range() {
        let list = list_of(&[1, 2]);
        assert_eq!(
            list.at(0),
            Err(CollectionError::IndexOutOfRange { index: 0, count: 2 })
        );
        assert_eq!(
            list.at(3),
            Err(CollectionError::IndexOutOfRange { index: 3, count: 2 })
        );
    }

    #[test]
    fn test_list_empty_accessors() {
        let mut list: List<i32> = List::new();
        assert_eq!(list.first(), Err(CollectionError::Empty { operation: "first" }));
        assert_eq!(list.last(), Err(CollectionError::Empty { operation: "last" }));
        assert!(list.remove_first().is_err());
        assert!(list.remove_last().is_err());
        assert_eq!(
            list.remove_at(1),
            Err(CollectionError::Empty {
                operation: "remove_at"
            })
        );
    }

    #[test]
    fn test_list_find_sentinel() {
        let list = list_of(&[5, 6, 5]);
        assert_eq!(list.find(&5), 1);
        assert_eq!(list.find(&6), 2);
        assert_eq!(list.find(&7), 0);
        assert!(!list.contains(&7));
    }

    #[test]
    fn test_list_insert_and_remove_preserve_order() {
        let mut list = list_of(&[1, 3]);
        list.insert_at(2, 2).unwrap();
        list.insert_at(4, 4).unwrap();
        list.prepend(0);
        assert_eq!(list.as_slice(), &[0, 1, 2, 3, 4]);

        assert_eq!(list.remove_at(3), Ok(2));
        assert_eq!(list.remove_first(), Ok(0));
        assert_eq!(list.remove_last(), Ok(4));
        assert_eq!(list.as_slice(), &[1, 3]);
    }

    #[test]
    fn test_list_insert_bounds() {
        let mut list = list_of(&[1]);
        assert!(list.insert_at(0, 9).is_err());
        assert!(list.insert_at(3, 9).is_err());
        assert_eq!(list.count(), 1);
    }

    #[test]
    fn test_list_set_returns_previous() {
        let mut list = list_of(&[1, 2]);
        assert_eq!(list.set(2, 20), Ok(2));
        assert_eq!(list.as_slice(), &[1, 20]);
        assert!(list.set(3, 30).is_err());
    }

    #[test]
    fn test_list_clear() {
        let mut list = list_of(&[1, 2, 3]);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_list_filter_returns_new_list() {
        let list = list_of(&[1, 2, 3, 4, 5, 6]);
        let even = list.filter(|v| v % 2 == 0);
        assert_eq!(even.as_slice(), &[2, 4, 6]);
        assert_eq!(list.count(), 6);
    }

    #[test]
    fn test_list_sort_is_stable() {
        let mut list: List<(i32, char)> =
            vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')].into();
        list.sort_by(|a, b| a.0 < b.0);
        assert_eq!(list.as_slice(), &[(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_list_apply_to_all() {
        let mut list = list_of(&[1, 2, 3]);
        list.apply_to_all(|v| v * 10);
        assert_eq!(list.as_slice(), &[10, 20, 30]);
    }

    #[test]
    fn test_list_apply_to_all_panic_leaves_list_intact() {
        let mut list = list_of(&[1, 2, 3]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            list.apply_to_all(|&v| if v == 2 { panic!("transform failed") } else { v * 10 });
        }));

        assert!(result.is_err());
        assert_eq!(list.count(), 3);
        assert_eq!(list.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_list_iterators() {
        let list = list_of(&[7, 8, 9]);
        let forward: Vec<_> = list.iter().collect();
        assert_eq!(forward, vec![(1, &7), (2, &8), (3, &9)]);

        let backward: Vec<_> = list.iter_rev().collect();
        assert_eq!(backward, vec![(3, &9), (2, &8), (1, &7)]);
    }

    #[test]
    fn test_list_iterator_restarts() {
        let list = list_of(&[1, 2]);
        let iter = list.iter();
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.clone().count(), 2);
        assert_eq!(iter.clone().next(), Some((1, &1)));
    }
}
