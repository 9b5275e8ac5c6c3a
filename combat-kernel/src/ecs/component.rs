// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Enum-indexed column storage
//!
//! Per-entity data is kept in a Structure-of-Arrays layout: one contiguous
//! column per enum value, each column indexed by dense entity slot.
//!
//! # Memory Layout
//!
//! For a key with three values (A, B, C) and capacity N:
//! ```text
//! data: [A0, A1, .. A(N-1), B0, B1, .. B(N-1), C0, C1, .. C(N-1)]
//! ```
//!
//! A column view is a plain slice, so per-entity loops over one key are
//! sequential and cache friendly.

use std::marker::PhantomData;

/// A closed enumeration whose values select a column
///
/// `ALL` must list every value in index order.
pub trait ColumnKey: Copy + Eq + Send + Sync + 'static {
    /// Every value of the enumeration in index order
    const ALL: &'static [Self];

    /// Number of values (columns)
    const COUNT: usize = Self::ALL.len();

    /// Column number of this value
    fn index(self) -> usize;
}

/// Fixed-capacity store of one column per key value
///
/// Every column spans the full slot capacity; which slots are live is
/// tracked by the owner.
#[derive(Debug, Clone)]
pub struct EnumIndexedArray<K: ColumnKey, T: Copy + Default> {
    capacity: usize,
    data: Vec<T>,
    _key: PhantomData<K>,
}

impl<K: ColumnKey, T: Copy + Default> EnumIndexedArray<K, T> {
    /// Allocate `K::COUNT` columns of `capacity` default cells
    ///
    /// # Panics
    ///
    /// Panics if the key's value list does not match its declared width.
    pub fn new(capacity: usize) -> Self {
        assert_eq!(
            K::ALL.len(),
            K::COUNT,
            "Column key cardinality does not match column width"
        );
        assert!(
            K::ALL.iter().enumerate().all(|(i, k)| k.index() == i),
            "Column key values must be listed in index order"
        );

        EnumIndexedArray {
            capacity,
            data: vec![T::default(); K::COUNT * capacity],
            _key: PhantomData,
        }
    }

    /// Slots per column
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        K::COUNT
    }

    #[inline]
    fn offset(&self, key: K) -> usize {
        key.index() * self.capacity
    }

    /// Full column view for one key
    pub fn column(&self, key: K) -> &[T] {
        let start = self.offset(key);
        &self.data[start..start + self.capacity]
    }

    /// Mutable column view for one key
    pub fn column_mut(&mut self, key: K) -> &mut [T] {
        let start = self.offset(key);
        let capacity = self.capacity;
        &mut self.data[start..start + capacity]
    }

    /// Read a single cell
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the capacity.
    #[inline]
    pub fn get(&self, key: K, slot: usize) -> &T {
        &self.column(key)[slot]
    }

    /// Mutable reference to a single cell
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the capacity.
    #[inline]
    pub fn get_mut(&mut self, key: K, slot: usize) -> &mut T {
        &mut self.column_mut(key)[slot]
    }

    /// Copy the cell at `moved_from` into `removed` for every column
    pub fn swap_back(&mut self, removed: usize, moved_from: usize) {
        debug_assert!(removed < self.capacity && moved_from < self.capacity);
        for &key in K::ALL {
            let column = self.column_mut(key);
            column[removed] = column[moved_from];
        }
    }

    /// Reset a slot to default values in every column
    pub fn clear_slot(&mut self, slot: usize) {
        if slot >= self.capacity {
            return;
        }
        for &key in K::ALL {
            self.column_mut(key)[slot] = T::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Axis {
        X,
        Y,
    }

    impl ColumnKey for Axis {
        const ALL: &'static [Self] = &[Axis::X, Axis::Y];

        fn index(self) -> usize {
            self as usize
        }
    }

    #[test]
    fn test_columns_are_independent() {
        let mut store = EnumIndexedArray::<Axis, f32>::new(4);
        assert_eq!(store.width(), 2);
        assert_eq!(store.column(Axis::X).len(), 4);

        *store.get_mut(Axis::X, 1) = 3.0;
        *store.get_mut(Axis::Y, 1) = 7.0;

        assert_eq!(store.column(Axis::X), &[0.0, 3.0, 0.0, 0.0]);
        assert_eq!(store.column(Axis::Y), &[0.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_swap_back_copies_every_column() {
        let mut store = EnumIndexedArray::<Axis, f32>::new(5);
        for slot in 0..5 {
            *store.get_mut(Axis::X, slot) = slot as f32;
            *store.get_mut(Axis::Y, slot) = slot as f32 * 10.0;
        }

        store.swap_back(3, 4);
        assert_eq!(*store.get(Axis::X, 3), 4.0);
        assert_eq!(*store.get(Axis::Y, 3), 40.0);
        assert_eq!(*store.get(Axis::X, 2), 2.0);
    }

    #[test]
    fn test_clear_slot() {
        let mut store = EnumIndexedArray::<Axis, f32>::new(2);
        *store.get_mut(Axis::X, 0) = 1.0;
        *store.get_mut(Axis::Y, 0) = 2.0;
        store.clear_slot(0);
        store.clear_slot(99);
        assert_eq!(*store.get(Axis::X, 0), 0.0);
        assert_eq!(*store.get(Axis::Y, 0), 0.0);
    }

    #[test]
    fn test_column_mut_vectorized_update() {
        let mut store = EnumIndexedArray::<Axis, f32>::new(3);
        for cell in store.column_mut(Axis::Y) {
            *cell += 2.0;
        }
        assert!(store.column(Axis::Y).iter().all(|&v| v == 2.0));
        assert!(store.column(Axis::X).iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_slot_panics() {
        let store = EnumIndexedArray::<Axis, f32>::new(2);
        let _ = store.get(Axis::X, 2);
    }
}
