// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Iteration over a [`TupleVec`](crate::TupleVec).
//!
//! A tuple vector cannot hand out `&(A, B, C)` because no such struct
//! exists in memory; each iterator here is instead a pointer bundle — one
//! base pointer per column, captured when the iterator is created — plus
//! an index. Dereferencing synthesizes a fresh tuple of references by
//! pairing every base pointer with the index, so nothing is ever cached
//! and writing through a yielded reference hits the storage directly.
//!
//! The captured pointers are a snapshot: any operation that reallocates
//! or shifts rows invalidates outstanding iterators, exactly as with
//! `Vec`. The borrow checker rules that out for the borrowing iterators;
//! [`TupleVec::validate_iterator`](crate::TupleVec::validate_iterator)
//! exists for debugging the same condition across unsafe code.

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use bitflags::bitflags;

use crate::alloc::RawAllocator;
use crate::columns::{ColumnTuple, Columns, drop_rows};
use crate::raw_vec::RawTupleVec;

bitflags! {
    /// Result of [`TupleVec::validate_iterator`](crate::TupleVec::validate_iterator).
    ///
    /// The flags are cumulative rather than mutually exclusive: an
    /// iterator at `end` is valid and current but not dereferenceable,
    /// while one taken before a reallocation is none of the three.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IteratorStatus: u8 {
        /// The position lies within `[0, len]` of the vector's storage.
        const VALID = 0b001;
        /// The captured column pointers match the vector's current
        /// buffer, i.e. no reallocation happened since capture.
        const CURRENT = 0b010;
        /// The position lies within `[0, len)` and may be dereferenced.
        const DEREFERENCEABLE = 0b100;
    }
}

/// Shared iterator over the rows of a [`TupleVec`](crate::TupleVec),
/// yielding one [`Columns::Ref`] per row.
///
/// Beyond `Iterator`, this type carries the random-access algebra of a
/// contiguous-container iterator: `+`/`-` with a row count, iterator
/// difference, and ordering. Arithmetic acts on the index alone and the
/// laws hold: `(it + a) + b == it + (a + b)` and `it2 - it1 == n` exactly
/// when `it1 + n == it2`. Two iterators compare equal when their index
/// and their column-0 pointer agree; ordering across different buffers is
/// `None`.
pub struct Iter<'a, T: Columns> {
    pub(crate) ptrs: <T::ColumnRepr as ColumnTuple>::Pointers,
    pub(crate) index: u32,
    pub(crate) end: u32,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Columns> Iter<'a, T> {
    pub(crate) fn new(ptrs: <T::ColumnRepr as ColumnTuple>::Pointers, index: u32, end: u32) -> Self {
        Iter {
            ptrs,
            index,
            end,
            _marker: PhantomData,
        }
    }

    /// Current row position within the vector.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Row `n` positions ahead of the current one, without advancing.
    #[inline]
    pub fn get(&self, n: u32) -> Option<T::Ref<'a>> {
        let index = self.index.checked_add(n)?;
        if index >= self.end {
            return None;
        }
        // SAFETY: index < end, so the row is initialized.
        let ptrs = unsafe { T::ColumnRepr::add(self.ptrs, index) };
        Some(T::as_ref(PhantomData, ptrs))
    }
}

impl<T: Columns> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Columns> Copy for Iter<'_, T> {}

impl<'a, T: Columns> Iterator for Iter<'a, T> {
    type Item = T::Ref<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        // SAFETY: index < end <= the vector's length; the row is
        // initialized and borrowed for 'a.
        let ptrs = unsafe { T::ColumnRepr::add(self.ptrs, self.index) };
        self.index += 1;
        Some(T::as_ref(PhantomData, ptrs))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.index = self
            .index
            .saturating_add(u32::try_from(n).unwrap_or(u32::MAX));
        self.next()
    }
}

impl<T: Columns> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: end < the vector's length; the row is initialized.
        let ptrs = unsafe { T::ColumnRepr::add(self.ptrs, self.end) };
        Some(T::as_ref(PhantomData, ptrs))
    }
}

impl<T: Columns> ExactSizeIterator for Iter<'_, T> {}
impl<T: Columns> core::iter::FusedIterator for Iter<'_, T> {}

impl<T: Columns> PartialEq for Iter<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        // Column 0 stands in for the whole snapshot: all columns of one
        // vector live and die with one allocation.
        self.index == other.index
            && T::ColumnRepr::first_pointer(self.ptrs) == T::ColumnRepr::first_pointer(other.ptrs)
    }
}

impl<T: Columns> PartialOrd for Iter<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        if T::ColumnRepr::first_pointer(self.ptrs) != T::ColumnRepr::first_pointer(other.ptrs) {
            return None;
        }
        self.index.partial_cmp(&other.index)
    }
}

impl<'a, T: Columns> Add<u32> for Iter<'a, T> {
    type Output = Iter<'a, T>;

    fn add(mut self, n: u32) -> Self::Output {
        self.index += n;
        self
    }
}

impl<'a, T: Columns> Add<Iter<'a, T>> for u32 {
    type Output = Iter<'a, T>;

    fn add(self, it: Iter<'a, T>) -> Self::Output {
        it + self
    }
}

impl<'a, T: Columns> Sub<u32> for Iter<'a, T> {
    type Output = Iter<'a, T>;

    fn sub(mut self, n: u32) -> Self::Output {
        self.index -= n;
        self
    }
}

impl<'a, T: Columns> Sub<Iter<'a, T>> for Iter<'a, T> {
    type Output = i64;

    fn sub(self, other: Iter<'a, T>) -> i64 {
        debug_assert!(
            T::ColumnRepr::first_pointer(self.ptrs) == T::ColumnRepr::first_pointer(other.ptrs)
        );
        i64::from(self.index) - i64::from(other.index)
    }
}

impl<T: Columns> AddAssign<u32> for Iter<'_, T> {
    fn add_assign(&mut self, n: u32) {
        self.index += n;
    }
}

impl<T: Columns> SubAssign<u32> for Iter<'_, T> {
    fn sub_assign(&mut self, n: u32) {
        self.index -= n;
    }
}

impl<T: Columns> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("index", &self.index)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

/// Exclusive iterator over the rows of a [`TupleVec`](crate::TupleVec),
/// yielding one [`Columns::Mut`] per row.
///
/// Converts into [`Iter`] via `From`; the opposite conversion does not
/// exist, so a shared iterator can never be laundered into an exclusive
/// one.
pub struct IterMut<'a, T: Columns> {
    pub(crate) ptrs: <T::ColumnRepr as ColumnTuple>::Pointers,
    pub(crate) index: u32,
    pub(crate) end: u32,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T: Columns> IterMut<'a, T> {
    pub(crate) fn new(ptrs: <T::ColumnRepr as ColumnTuple>::Pointers, index: u32, end: u32) -> Self {
        IterMut {
            ptrs,
            index,
            end,
            _marker: PhantomData,
        }
    }

    /// Current row position within the vector.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<'a, T: Columns> From<IterMut<'a, T>> for Iter<'a, T> {
    fn from(it: IterMut<'a, T>) -> Self {
        Iter::new(it.ptrs, it.index, it.end)
    }
}

impl<'a, T: Columns> Iterator for IterMut<'a, T> {
    type Item = T::Mut<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        // SAFETY: index < end; each row is yielded at most once, so the
        // exclusive borrows never alias.
        let ptrs = unsafe { T::ColumnRepr::add(self.ptrs, self.index) };
        self.index += 1;
        Some(T::as_mut(PhantomData, ptrs))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl<T: Columns> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: as in next.
        let ptrs = unsafe { T::ColumnRepr::add(self.ptrs, self.end) };
        Some(T::as_mut(PhantomData, ptrs))
    }
}

impl<T: Columns> ExactSizeIterator for IterMut<'_, T> {}
impl<T: Columns> core::iter::FusedIterator for IterMut<'_, T> {}

impl<T: Columns> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("index", &self.index)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

/// Consuming iterator: moves each row out of the vector by value.
///
/// This is the move-extraction view: the rows are read out of the columns
/// and reassembled with [`Columns::from_columns`], so non-`Copy` columns
/// transfer ownership. Rows not consumed by the time the iterator drops
/// are dropped in place; the buffer is freed afterwards.
pub struct IntoIter<T: Columns, A: RawAllocator> {
    pub(crate) buf: RawTupleVec<T, A>,
    pub(crate) index: u32,
}

impl<T: Columns, A: RawAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.index == self.buf.len() {
            return None;
        }
        // SAFETY: index < len, the row is initialized; it is never read
        // again because index advances past it.
        let repr = unsafe {
            T::ColumnRepr::read(self.buf.as_ptr(), self.index, self.buf.capacity())
        };
        self.index += 1;
        Some(T::from_columns(repr))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.buf.len() - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl<T: Columns, A: RawAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        let len = self.buf.len();
        if self.index == len {
            return None;
        }
        // SAFETY: the last row is initialized; shortening the length
        // first means it is never dropped again.
        unsafe {
            self.buf.set_len(len - 1);
            Some(T::from_columns(T::ColumnRepr::read(
                self.buf.as_ptr(),
                len - 1,
                self.buf.capacity(),
            )))
        }
    }
}

impl<T: Columns, A: RawAllocator> ExactSizeIterator for IntoIter<T, A> {}
impl<T: Columns, A: RawAllocator> core::iter::FusedIterator for IntoIter<T, A> {}

impl<T: Columns, A: RawAllocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // SAFETY: rows [index, len) were never yielded and are still
        // initialized; the buffer itself is freed by RawTupleVec's Drop.
        unsafe {
            drop_rows::<T>(
                self.buf.as_ptr(),
                self.buf.capacity(),
                self.index,
                self.buf.len(),
            );
        }
    }
}
