//! Growable array with explicit, geometric capacity management.
//!
//! `DynamicArray` tracks its own declared capacity instead of deferring to the
//! allocator policy of `Vec`: capacity starts at zero, doubles (0 -> 1 -> 2 -> 4)
//! whenever a push or insert would exceed it, and only ever shrinks through
//! [`DynamicArray::shrink_to_fit`]. The backing `Vec` is reserved to at least
//! the declared capacity so growth stays amortized O(1).

use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice;

use crate::domain::error::{DomainError, DomainResult};

pub struct DynamicArray<T> {
    /// Live elements, `items.len() <= capacity`
    items: Vec<T>,
    /// Declared capacity
    capacity: usize,
}

impl<T> DynamicArray<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn grow(&mut self) {
        let new_capacity = if self.capacity == 0 {
            1
        } else {
            self.capacity * 2
        };
        self.items.reserve_exact(new_capacity - self.items.len());
        self.capacity = new_capacity;
    }

    /// Appends `value`, doubling the capacity when full.
    pub fn push(&mut self, value: T) {
        if self.items.len() >= self.capacity {
            self.grow();
        }
        self.items.push(value);
    }

    /// Inserts `value` at `index`, shifting later elements right.
    ///
    /// Only positions of existing elements are valid (`index < len`);
    /// appending goes through [`push`](Self::push).
    pub fn insert(&mut self, index: usize, value: T) -> DomainResult<()> {
        self.check_index(index)?;
        if self.items.len() >= self.capacity {
            self.grow();
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting later elements left.
    /// Capacity is left unchanged.
    pub fn remove(&mut self, index: usize) -> DomainResult<T> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> DomainResult<&T> {
        let len = self.items.len();
        self.items
            .get(index)
            .ok_or(DomainError::OutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> DomainResult<&mut T> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(DomainError::OutOfRange { index, len })
    }

    pub fn first(&self) -> DomainResult<&T> {
        self.items.first().ok_or(DomainError::EmptyContainer)
    }

    pub fn last(&self) -> DomainResult<&T> {
        self.items.last().ok_or(DomainError::EmptyContainer)
    }

    /// Trims the capacity down to exactly `len`.
    pub fn shrink_to_fit(&mut self) {
        if self.items.len() < self.capacity {
            self.items.shrink_to(self.items.len());
            self.capacity = self.items.len();
        }
    }

    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().position(predicate)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn check_index(&self, index: usize) -> DomainResult<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(DomainError::OutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl<T: PartialEq> DynamicArray<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies exactly the live elements into a store sized to them.
impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        let mut items = Vec::with_capacity(self.items.len());
        items.extend(self.items.iter().cloned());
        Self {
            capacity: items.len(),
            items,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

/// Unchecked fast path.
///
/// # Panics
/// The caller guarantees `index < len`; an out-of-bounds index panics.
impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
