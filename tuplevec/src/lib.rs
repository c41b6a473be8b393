// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A vector of tuples stored column-wise: a growable Struct-of-Arrays
//! container with the interface of a single sequence.
//!
//! [`TupleVec<T>`] stores rows of type `T` — a tuple, or any type
//! implementing [`Columns`] — but lays the data out as one array per
//! column inside a single allocation. Iterating or scanning one column
//! touches only that column's bytes, which is what makes the layout
//! worthwhile: cache lines carry no dead weight and the element stride is
//! the field size, so bulk passes vectorize well. At the same time the
//! container still behaves like a sequence of rows: `push`, `insert`,
//! `remove`, random access, and row-wise iteration all work on whole
//! rows, and accessing a row yields a tuple of references into the
//! columns.
//!
//! # Basic usage
//!
//! Tuples of up to six elements are rows out of the box:
//!
//! ```
//! use tuplevec::TupleVec;
//!
//! let mut vec = TupleVec::new();
//! vec.push((1u32, 1.5f32)).unwrap();
//! vec.push((2, 2.5)).unwrap();
//!
//! assert_eq!(vec.len(), 2);
//! assert_eq!(vec.get(0), Some((&1, &1.5)));
//!
//! // One contiguous slice per column.
//! let (ints, floats) = vec.as_slice();
//! assert_eq!(ints, &[1, 2]);
//! assert_eq!(floats, &[1.5, 2.5]);
//! ```
//!
//! The [`Columns`] trait can be derived on structs to name the columns
//! after the struct's fields. The derive also generates wrapper types for
//! the [`as_ref`], [`as_mut`], [`as_slice`], and [`as_mut_slice`]
//! methods' return values, so columns are addressed by field name with no
//! runtime cost:
//!
//! ```
//! use tuplevec::TupleVec;
//! use tuplevec_derive::Columns;
//!
//! #[derive(Clone, Columns)]
//! struct Particle {
//!     position: f64,
//!     velocity: f64,
//!     alive: bool,
//! }
//!
//! let mut vec = TupleVec::new();
//! vec.push(Particle { position: 0.0, velocity: 1.0, alive: true }).unwrap();
//! let ParticleSlice { position, velocity, alive } = vec.as_slice();
//! assert_eq!(position, &[0.0]);
//! assert_eq!(velocity, &[1.0]);
//! assert_eq!(alive, &[true]);
//! ```
//!
//! [`as_ref`]: Columns::as_ref
//! [`as_mut`]: Columns::as_mut
//! [`as_slice`]: TupleVec::as_slice
//! [`as_mut_slice`]: TupleVec::as_mut_slice

mod alloc;
mod columns;
mod iter;
mod macros;
mod raw_vec;

use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ops::Range;

use raw_vec::RawTupleVec;

pub use alloc::{AllocError, Global, RawAllocator};
pub use columns::{
    Col0, Col1, Col2, Col3, Col4, Col5, ColumnAt, ColumnSelect, ColumnTuple, ColumnTupleClone,
    ColumnTupleDefault, Columns,
};
pub use iter::{IntoIter, Iter, IterMut, IteratorStatus};

#[cfg(feature = "derive")]
pub use tuplevec_derive::*;

/// A contiguous growable Struct-of-Arrays container, written as
/// `TupleVec<T>`, short for 'tuple vector'.
///
/// The API deliberately shadows `Vec`, with two systematic differences:
/// lengths, capacities and indices are `u32`, and every operation that
/// may allocate returns a `Result` instead of aborting on exhaustion.
///
/// # Layout
///
/// One allocation holds every column. A vector of rows `'a'` and `'b'`
/// with columns `x` and `y` and capacity 4 looks like this:
///
/// ```text
///             ptr      len  capacity
///        +--------+--------+--------+
///        | 0x0123 |      2 |      4 |
///        +--------+--------+--------+
///             |
///             v
/// Heap   +--------+--------+--------+--------+~~+--------+--------+--------+--------+
///        |  'a.x' |  'b.x' | uninit | uninit |  |  'a.y' |  'b.y' | uninit | uninit |
///        +--------+--------+--------+--------+~~+--------+--------+--------+--------+
/// ```
///
/// where `~~` is padding inserted only when column `y`'s alignment
/// requires it. Column 0 always starts at offset 0; each further column
/// starts at the previous column's end rounded up to its own alignment,
/// and the allocation's alignment is the maximum column alignment. All
/// columns share one length and one capacity: rows below the length are
/// initialized in every column, rows between length and capacity are
/// uninitialized in every column.
///
/// # Capacity and reallocation
///
/// Growth reallocates: a fresh buffer is laid out for the new capacity,
/// every column's live range is moved across, and only then is the old
/// buffer freed. This makes reallocation strictly all-or-nothing — if
/// allocating the new buffer fails, the vector is untouched and the
/// error is returned — and it is also why reallocation is more expensive
/// than for a plain `Vec`: every column but the first lands at a
/// different relative offset, so there is no realloc-in-place fast path.
/// Use [`with_capacity`](TupleVec::with_capacity) or
/// [`reserve`](TupleVec::reserve) when the final size is known.
///
/// When a full vector grows it doubles: the new capacity is
/// `max(2 × old, required)`, growing from zero to one. Appending after a
/// sufficient `reserve` never reallocates and never invalidates column
/// addresses; any reallocating or shifting operation invalidates all
/// outstanding iterators and column slices (the borrow checker enforces
/// this for safe code).
///
/// `TupleVec` never shrinks on its own, requests exactly the asked-for
/// capacity in [`with_capacity`](TupleVec::with_capacity) and the
/// [`tuplevec!`] macro, and allocates if and only if the row has a
/// nonzero size and the capacity is nonzero. A vector whose columns are
/// all zero-sized never allocates and reports a capacity of `u32::MAX`.
///
/// # Indexing and iteration
///
/// Rows are accessed with [`get`]/[`get_mut`], which return a tuple of
/// per-column references (or the derive's named wrapper). Whole columns
/// are accessed with [`as_slice`], [`column`], or, for rows whose column
/// types are distinct, [`column_of`]. Row-wise iteration yields the same
/// reference tuples; the iterators are pointer bundles that synthesize
/// the tuple on each access, never storing references, and carry the
/// full random-access algebra (see [`Iter`]).
///
/// [`get`]: TupleVec::get
/// [`get_mut`]: TupleVec::get_mut
/// [`as_slice`]: TupleVec::as_slice
/// [`column`]: TupleVec::column
/// [`column_of`]: TupleVec::column_of
#[repr(C)]
pub struct TupleVec<T: Columns, A: RawAllocator = Global> {
    buf: RawTupleVec<T, A>,
}

impl<T: Columns> TupleVec<T, Global> {
    /// Constructs a new, empty `TupleVec<T>`. Does not allocate.
    pub fn new() -> Self {
        TupleVec {
            buf: RawTupleVec::new_in(Global),
        }
    }

    /// Constructs a new, empty `TupleVec<T>` with room for exactly
    /// `capacity` rows in every column.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::TupleVec;
    ///
    /// let mut vec = TupleVec::<(u32, u32)>::with_capacity(10).unwrap();
    ///
    /// assert_eq!(vec.len(), 0);
    /// assert!(vec.capacity() >= 10);
    ///
    /// // These are all done without reallocating...
    /// for i in 0..10 {
    ///     vec.push((i, i)).unwrap();
    /// }
    /// assert_eq!(vec.len(), 10);
    ///
    /// // ...but this may make the vector reallocate.
    /// vec.push((11, 11)).unwrap();
    /// assert!(vec.capacity() >= 11);
    /// ```
    pub fn with_capacity(capacity: u32) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, Global)
    }

    /// Constructs a `TupleVec<T>` holding `count` clones of `row`.
    /// Allocates exactly once, for exactly `count` rows.
    pub fn from_elem(row: T, count: u32) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut vec = Self::with_capacity(count)?;
        vec.resize_fill(count, row)?;
        Ok(vec)
    }

    /// Constructs a `TupleVec<T>` from an iterator of rows, reserving the
    /// iterator's lower size hint up front.
    pub fn try_from_iter<I>(rows: I) -> Result<Self, AllocError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut vec = Self::new();
        vec.try_extend(rows)?;
        Ok(vec)
    }
}

impl<T: Columns, A: RawAllocator> TupleVec<T, A> {
    /// Constructs a new, empty `TupleVec<T, A>` with the given allocation
    /// strategy. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        TupleVec {
            buf: RawTupleVec::new_in(alloc),
        }
    }

    /// Constructs a new, empty `TupleVec<T, A>` with room for exactly
    /// `capacity` rows, allocated through `alloc`.
    pub fn with_capacity_in(capacity: u32, alloc: A) -> Result<Self, AllocError> {
        Ok(TupleVec {
            buf: RawTupleVec::with_capacity_in(capacity, alloc)?,
        })
    }

    /// Returns the number of rows in the vector.
    #[inline]
    pub fn len(&self) -> u32 {
        self.buf.len()
    }

    /// Returns `true` if the vector contains no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the number of rows the vector can hold without
    /// reallocating.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.buf.capacity()
    }

    /// Returns a reference to the underlying allocation strategy.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Reserves capacity for at least `additional` more rows. The vector
    /// may reserve more to amortize repeated growth. Does nothing if the
    /// capacity is already sufficient.
    pub fn reserve(&mut self, additional: u32) -> Result<(), AllocError> {
        self.buf.reserve(additional)
    }

    /// Shrinks the capacity to the current length, releasing the excess.
    ///
    /// When capacity already equals length this is a no-op: no allocator
    /// traffic occurs and the column addresses are unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<(), AllocError> {
        self.buf.shrink_to_fit()
    }

    /// Appends a row to the back of the vector.
    ///
    /// # Time complexity
    ///
    /// Amortized *O*(1); growth relocates every column into a larger
    /// allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let mut vec = tuplevec![(1u32, 1u32), (2, 2)].unwrap();
    /// vec.push((3, 3)).unwrap();
    /// assert_eq!(vec.get(2), Some((&3, &3)));
    /// ```
    pub fn push(&mut self, row: T) -> Result<(), AllocError> {
        let len = self.len();
        if len == self.capacity() {
            self.buf.reserve(1)?;
        }
        // SAFETY: a free slot past the last row exists in every column.
        unsafe {
            T::ColumnRepr::write(
                self.buf.as_ptr(),
                T::into_columns(row),
                len,
                self.capacity(),
            );
            // SAFETY: length cannot overflow, reserve succeeded.
            self.buf.set_len(len.unchecked_add(1));
        }
        Ok(())
    }

    /// Appends a row and returns the mutable references to it, for
    /// patterns that construct a row and immediately adjust it in place.
    pub fn push_mut(&mut self, row: T) -> Result<T::Mut<'_>, AllocError> {
        self.push(row)?;
        let index = self.len() - 1;
        // SAFETY: the row at index was written by push above.
        let ptrs =
            unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), index, self.capacity()) };
        Ok(T::as_mut(PhantomData, ptrs))
    }

    /// Appends a default-constructed row.
    pub fn push_default(&mut self) -> Result<(), AllocError>
    where
        T::ColumnRepr: ColumnTupleDefault,
    {
        let len = self.len();
        if len == self.capacity() {
            self.buf.reserve(1)?;
        }
        // SAFETY: a free slot past the last row exists in every column.
        unsafe {
            let ptrs = T::ColumnRepr::pointers(self.buf.as_ptr(), len, self.capacity());
            T::ColumnRepr::write_default(ptrs, 1);
            self.buf.set_len(len.unchecked_add(1));
        }
        Ok(())
    }

    /// Appends a slot without constructing anything in it: the escape
    /// hatch for bulk-fill patterns that write whole columns afterwards
    /// through [`column_ptr_mut`](TupleVec::column_ptr_mut).
    ///
    /// # Safety
    ///
    /// The caller must initialize the new row in every column before it
    /// is read, and before any operation that can read or drop it runs —
    /// including `drop`, `clear`, the safe row accessors, and the safe
    /// column slices, all of which assume every row below `len` is
    /// initialized.
    pub unsafe fn push_uninit(&mut self) -> Result<(), AllocError> {
        let len = self.len();
        if len == self.capacity() {
            self.buf.reserve(1)?;
        }
        // SAFETY: the slot exists; initialization is the caller's debt.
        unsafe { self.buf.set_len(len.unchecked_add(1)) };
        Ok(())
    }

    /// Removes the last row and returns it, or [`None`] if the vector is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let mut vec = tuplevec![(1, 1), (2, 2), (3, 3)].unwrap();
    /// assert_eq!(vec.pop(), Some((3, 3)));
    /// assert_eq!(vec.len(), 2);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            None
        } else {
            // SAFETY: the last row is initialized; shortening the length
            // first keeps it from ever being dropped in place.
            unsafe {
                self.buf.set_len(len - 1);
                core::hint::assert_unchecked(self.len() < self.capacity());
                Some(T::from_columns(T::ColumnRepr::read(
                    self.buf.as_ptr(),
                    self.len(),
                    self.capacity(),
                )))
            }
        }
    }

    /// Inserts a row at position `index`, shifting all rows after it to
    /// the right in every column.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: u32, row: T) -> Result<(), AllocError> {
        let _ = self.insert_mut(index, row)?;
        Ok(())
    }

    /// Inserts a row at position `index` and returns the mutable
    /// references to it.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let mut vec = tuplevec![(1, 1), (3, 3)].unwrap();
    /// let (a, b) = vec.insert_mut(1, (2, 0)).unwrap();
    /// *b = *a * 10;
    /// assert_eq!(vec.get(1), Some((&2, &20)));
    /// ```
    pub fn insert_mut(&mut self, index: u32, row: T) -> Result<T::Mut<'_>, AllocError> {
        let len = self.len();
        if index > len {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }
        if len == self.capacity() {
            self.buf.reserve(1)?;
        }
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: capacity holds len + 1 rows; the shift stays within
        // each column's array and the gap is written before the length
        // grows.
        unsafe {
            if index < len {
                let src = T::ColumnRepr::pointers(base, index, cap);
                let dst = T::ColumnRepr::pointers(base, index + 1, cap);
                T::ColumnRepr::copy(src, dst, len - index);
            }
            T::ColumnRepr::write(base, T::into_columns(row), index, cap);
            self.buf.set_len(len.unchecked_add(1));
            let ptrs = T::ColumnRepr::pointers(base, index, cap);
            Ok(T::as_mut(PhantomData, ptrs))
        }
    }

    /// Inserts `count` clones of `row` at position `index`, shifting all
    /// rows after it to the right in every column.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_fill(&mut self, index: u32, count: u32, row: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let len = self.len();
        if index > len {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }
        if count == 0 {
            return Ok(());
        }
        self.buf.reserve(count)?;
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: capacity holds len + count rows. The length is zeroed
        // while the gap is open: rows past the gap exist twice bitwise,
        // and a panicking clone must not let Drop see either copy.
        unsafe {
            self.buf.set_len(0);
            if index < len {
                let src = T::ColumnRepr::pointers(base, index, cap);
                let dst = T::ColumnRepr::pointers(base, index + count, cap);
                T::ColumnRepr::copy(src, dst, len - index);
            }
            for offset in 0..count - 1 {
                T::ColumnRepr::write(base, T::into_columns(row.clone()), index + offset, cap);
            }
            T::ColumnRepr::write(base, T::into_columns(row), index + count - 1, cap);
            self.buf.set_len(len + count);
        }
        Ok(())
    }

    /// Inserts clones of the given rows at position `index`, preserving
    /// their order, shifting all rows after it to the right in every
    /// column.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_slice(&mut self, index: u32, rows: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let len = self.len();
        if index > len {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }
        let count = u32::try_from(rows.len()).map_err(|_| AllocError)?;
        if count == 0 {
            return Ok(());
        }
        self.buf.reserve(count)?;
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: as in insert_fill.
        unsafe {
            self.buf.set_len(0);
            if index < len {
                let src = T::ColumnRepr::pointers(base, index, cap);
                let dst = T::ColumnRepr::pointers(base, index + count, cap);
                T::ColumnRepr::copy(src, dst, len - index);
            }
            for (offset, row) in rows.iter().enumerate() {
                T::ColumnRepr::write(
                    base,
                    T::into_columns(row.clone()),
                    index + offset as u32,
                    cap,
                );
            }
            self.buf.set_len(len + count);
        }
        Ok(())
    }

    /// Removes and returns the row at position `index`, shifting all rows
    /// after it to the left in every column.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let mut vec = tuplevec![('a', 0), ('b', 1), ('c', 2)].unwrap();
    /// assert_eq!(vec.remove(1), ('b', 1));
    /// assert_eq!(vec.len(), 2);
    /// ```
    pub fn remove(&mut self, index: u32) -> T {
        let len = self.len();
        if index >= len {
            panic!("removal index (is {index}) should be < len (is {len})");
        }
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: the row is initialized; it is read out before the shift
        // overwrites its slots, and the length excludes the vacated tail
        // slot afterwards.
        unsafe {
            let row = T::ColumnRepr::read(base, index, cap);
            if index < len - 1 {
                let src = T::ColumnRepr::pointers(base, index + 1, cap);
                let dst = T::ColumnRepr::pointers(base, index, cap);
                T::ColumnRepr::copy(src, dst, len - index - 1);
            }
            self.buf.set_len(len - 1);
            T::from_columns(row)
        }
    }

    /// Removes and returns the row at position `index` in *O*(1) by
    /// moving the last row into its place.
    ///
    /// This does not preserve row ordering — the trade-off for not
    /// shifting the tail. Use [`remove`](TupleVec::remove) when order
    /// matters.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn swap_remove(&mut self, index: u32) -> T {
        let len = self.len();
        if index >= len {
            panic!("swap_remove index (is {index}) should be < len (is {len})");
        }
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: the row is read out before the last row's bits are
        // moved over it; the length then excludes the vacated last slot.
        unsafe {
            let row = T::ColumnRepr::read(base, index, cap);
            if index < len - 1 {
                let src = T::ColumnRepr::pointers(base, len - 1, cap);
                let dst = T::ColumnRepr::pointers(base, index, cap);
                T::ColumnRepr::copy(src, dst, 1);
            }
            self.buf.set_len(len - 1);
            T::from_columns(row)
        }
    }

    /// Removes the rows in `range`, shifting all rows after it to the
    /// left in every column. Relative order is preserved.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or its end exceeds the length.
    pub fn erase_range(&mut self, range: Range<u32>) {
        let len = self.len();
        if range.start > range.end || range.end > len {
            panic!(
                "erase range ({}..{}) invalid for len (is {len})",
                range.start, range.end
            );
        }
        if range.start == range.end {
            return;
        }
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: the erased rows are dropped exactly once, then the tail
        // shift leaves rows [0, len - count) initialized. The length is
        // zeroed across the gap so a panicking Drop cannot re-drop.
        unsafe {
            self.buf.set_len(0);
            columns::drop_rows::<T>(base, cap, range.start, range.end);
            if range.end < len {
                let src = T::ColumnRepr::pointers(base, range.end, cap);
                let dst = T::ColumnRepr::pointers(base, range.start, cap);
                T::ColumnRepr::copy(src, dst, len - range.end);
            }
            self.buf.set_len(len - (range.end - range.start));
        }
    }

    /// Shortens the vector to `len` rows, dropping the excess. Has no
    /// effect when `len` is not smaller than the current length, and no
    /// effect on capacity ever.
    pub fn truncate(&mut self, len: u32) {
        let old_len = self.len();
        if len >= old_len {
            return;
        }
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: the dropped tail is excluded from the length first.
        unsafe {
            self.buf.set_len(len);
            columns::drop_rows::<T>(base, cap, len, old_len);
        }
    }

    /// Resizes the vector to `new_len` rows, default-constructing every
    /// column of the appended rows, or dropping the excess when
    /// shrinking.
    pub fn resize(&mut self, new_len: u32) -> Result<(), AllocError>
    where
        T::ColumnRepr: ColumnTupleDefault,
    {
        let len = self.len();
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }
        self.buf.reserve(new_len - len)?;
        // SAFETY: capacity holds new_len rows; the appended slots are
        // uninitialized until written here.
        unsafe {
            let ptrs = T::ColumnRepr::pointers(self.buf.as_ptr(), len, self.capacity());
            T::ColumnRepr::write_default(ptrs, new_len - len);
            self.buf.set_len(new_len);
        }
        Ok(())
    }

    /// Resizes the vector to `new_len` rows, filling appended rows with
    /// clones of `row`, or dropping the excess when shrinking.
    pub fn resize_fill(&mut self, new_len: u32, row: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let len = self.len();
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }
        self.buf.reserve(new_len - len)?;
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: capacity holds new_len rows; the length only grows once
        // every appended row is written, so a panicking clone at worst
        // leaks the rows written so far.
        unsafe {
            for index in len..new_len - 1 {
                T::ColumnRepr::write(base, T::into_columns(row.clone()), index, cap);
            }
            T::ColumnRepr::write(base, T::into_columns(row), new_len - 1, cap);
            self.buf.set_len(new_len);
        }
        Ok(())
    }

    /// Replaces the contents with `count` clones of `row`, reusing the
    /// existing buffer when its capacity suffices.
    pub fn assign_fill(&mut self, count: u32, row: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.clear();
        self.resize_fill(count, row)
    }

    /// Replaces the contents with clones of the given rows, reusing the
    /// existing buffer when its capacity suffices.
    pub fn assign_slice(&mut self, rows: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.clear();
        self.insert_slice(0, rows)
    }

    /// Replaces the contents with the rows of an iterator, reusing the
    /// existing buffer when its capacity suffices.
    pub fn assign_with<I>(&mut self, rows: I) -> Result<(), AllocError>
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.try_extend(rows)
    }

    /// Appends every row of an iterator, reserving its lower size hint up
    /// front.
    pub fn try_extend<I>(&mut self, rows: I) -> Result<(), AllocError>
    where
        I: IntoIterator<Item = T>,
    {
        let rows = rows.into_iter();
        let (lower, _) = rows.size_hint();
        self.buf
            .reserve(u32::try_from(lower).map_err(|_| AllocError)?)?;
        for row in rows {
            self.push(row)?;
        }
        Ok(())
    }

    /// Clears the vector, dropping all rows. Capacity is unaffected.
    pub fn clear(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let base = self.buf.as_ptr();
        let cap = self.capacity();
        // SAFETY: the length is zeroed first so the rows drop exactly
        // once even if one of their destructors panics.
        unsafe {
            self.buf.set_len(0);
            columns::drop_rows::<T>(base, cap, 0, len);
        }
    }

    /// Returns a reference to each column's value at `index`, or `None`
    /// if out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let vec = tuplevec![(10, 'x'), (40, 'y')].unwrap();
    /// assert_eq!(vec.get(1), Some((&40, &'y')));
    /// assert_eq!(vec.get(2), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, index: u32) -> Option<T::Ref<'_>> {
        if self.len() <= index {
            return None;
        }
        // SAFETY: index < len.
        let ptrs =
            unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), index, self.capacity()) };
        Some(T::as_ref(PhantomData, ptrs))
    }

    /// Returns a mutable reference to each column's value at `index`, or
    /// `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self, index: u32) -> Option<T::Mut<'_>> {
        if self.len() <= index {
            return None;
        }
        // SAFETY: index < len; the borrow is exclusive.
        let ptrs =
            unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), index, self.capacity()) };
        Some(T::as_mut(PhantomData, ptrs))
    }

    /// Unchecked variant of [`get`](TupleVec::get): no bounds check in
    /// release builds, an assertion in debug builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](TupleVec::len).
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: u32) -> T::Ref<'_> {
        debug_assert!(index < self.len());
        // SAFETY: caller guarantees index < len.
        let ptrs =
            unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), index, self.capacity()) };
        T::as_ref(PhantomData, ptrs)
    }

    /// Unchecked variant of [`get_mut`](TupleVec::get_mut).
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](TupleVec::len).
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, index: u32) -> T::Mut<'_> {
        debug_assert!(index < self.len());
        // SAFETY: caller guarantees index < len; the borrow is exclusive.
        let ptrs =
            unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), index, self.capacity()) };
        T::as_mut(PhantomData, ptrs)
    }

    /// References to the first row, or `None` if the vector is empty.
    #[inline]
    pub fn first(&self) -> Option<T::Ref<'_>> {
        self.get(0)
    }

    /// References to the last row, or `None` if the vector is empty.
    #[inline]
    pub fn last(&self) -> Option<T::Ref<'_>> {
        self.get(self.len().checked_sub(1)?)
    }

    /// Extracts one shared slice per column covering the whole vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let vec = tuplevec![(1u8, 1u16), (2, 2), (3, 3)].unwrap();
    /// let (bytes, shorts) = vec.as_slice();
    /// assert_eq!(bytes, &[1, 2, 3]);
    /// assert_eq!(shorts, &[1, 2, 3]);
    /// ```
    pub fn as_slice(&self) -> T::Slice<'_> {
        // SAFETY: base pointers are valid for the current capacity and
        // paired with the current length.
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        T::as_slice(PhantomData, ptrs, self.len())
    }

    /// Extracts one mutable slice per column covering the whole vector.
    pub fn as_mut_slice(&mut self) -> T::SliceMut<'_> {
        // SAFETY: as in as_slice, with exclusive access.
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        T::as_mut_slice(PhantomData, ptrs, self.len())
    }

    /// The initialized contents of column `I` as a slice.
    ///
    /// An `I` that is not a valid column position fails to compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let vec = tuplevec![(1u32, 'a'), (2, 'b')].unwrap();
    /// assert_eq!(vec.column::<0>(), &[1, 2]);
    /// assert_eq!(vec.column::<1>(), &['a', 'b']);
    /// ```
    pub fn column<const I: usize>(&self) -> &[<T::ColumnRepr as ColumnAt<I>>::Column]
    where
        T::ColumnRepr: ColumnAt<I>,
    {
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        let col = <T::ColumnRepr as ColumnAt<I>>::column(ptrs);
        // SAFETY: rows [0, len) are initialized in every column.
        unsafe { core::slice::from_raw_parts(col.as_ptr(), self.len() as usize) }
    }

    /// The initialized contents of column `I` as a mutable slice.
    pub fn column_mut<const I: usize>(&mut self) -> &mut [<T::ColumnRepr as ColumnAt<I>>::Column]
    where
        T::ColumnRepr: ColumnAt<I>,
    {
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        let col = <T::ColumnRepr as ColumnAt<I>>::column(ptrs);
        // SAFETY: as in column, with exclusive access.
        unsafe { core::slice::from_raw_parts_mut(col.as_ptr(), self.len() as usize) }
    }

    /// The raw base pointer of column `I`: the escape hatch for bulk
    /// reads that bypass the row interface, including reads of capacity
    /// slots populated after [`push_uninit`](TupleVec::push_uninit).
    ///
    /// The pointer is valid for `capacity()` elements until the next
    /// reallocating operation; only the first `len()` are initialized
    /// unless the caller has initialized more.
    pub fn column_ptr<const I: usize>(&self) -> *const <T::ColumnRepr as ColumnAt<I>>::Column
    where
        T::ColumnRepr: ColumnAt<I>,
    {
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        <T::ColumnRepr as ColumnAt<I>>::column(ptrs).as_ptr()
    }

    /// The raw mutable base pointer of column `I`.
    pub fn column_ptr_mut<const I: usize>(&mut self) -> *mut <T::ColumnRepr as ColumnAt<I>>::Column
    where
        T::ColumnRepr: ColumnAt<I>,
    {
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        <T::ColumnRepr as ColumnAt<I>>::column(ptrs).as_ptr()
    }

    /// The initialized contents of the column holding element type `C`.
    ///
    /// Available only when `C` is the type of exactly one column: a type
    /// used by two columns makes the lookup ambiguous and the call fails
    /// to compile. The position marker `M` is inferred.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let vec = tuplevec![(1u32, 1.5f32), (2, 2.5)].unwrap();
    /// let floats: &[f32] = vec.column_of::<f32, _>();
    /// assert_eq!(floats, &[1.5, 2.5]);
    /// ```
    pub fn column_of<C, M>(&self) -> &[C]
    where
        T::ColumnRepr: ColumnSelect<C, M>,
    {
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        let col = <T::ColumnRepr as ColumnSelect<C, M>>::select(ptrs);
        // SAFETY: rows [0, len) are initialized in every column.
        unsafe { core::slice::from_raw_parts(col.as_ptr(), self.len() as usize) }
    }

    /// The initialized contents of the column holding element type `C`,
    /// mutably.
    pub fn column_of_mut<C, M>(&mut self) -> &mut [C]
    where
        T::ColumnRepr: ColumnSelect<C, M>,
    {
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        let col = <T::ColumnRepr as ColumnSelect<C, M>>::select(ptrs);
        // SAFETY: as in column_of, with exclusive access.
        unsafe { core::slice::from_raw_parts_mut(col.as_ptr(), self.len() as usize) }
    }

    /// Returns a row-wise iterator of shared reference tuples.
    pub fn iter(&self) -> Iter<'_, T> {
        // SAFETY: index 0 pointers are in bounds for any capacity.
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        Iter::new(ptrs, 0, self.len())
    }

    /// Returns a row-wise iterator of mutable reference tuples.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        // SAFETY: as in iter, with exclusive access.
        let ptrs = unsafe { T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity()) };
        IterMut::new(ptrs, 0, self.len())
    }

    /// Retains only the rows for which the predicate returns `true`,
    /// passing mutable references. Visits each row exactly once in order
    /// and preserves the order of retained rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use tuplevec::tuplevec;
    ///
    /// let mut vec = tuplevec![(1, 1), (2, 2), (3, 3), (4, 4)].unwrap();
    /// vec.retain_mut(|(a, b)| if *a <= 3 {
    ///     *b += 1;
    ///     true
    /// } else {
    ///     false
    /// });
    /// assert_eq!(vec.len(), 3);
    /// assert_eq!(vec.get(2), Some((&3, &4)));
    /// ```
    pub fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(T::Mut<'_>) -> bool,
    {
        let original_len = self.len();

        if original_len == 0 {
            return;
        }

        // Avoid double drop if the drop guard is not executed, since the
        // process below makes holes in the live range.
        unsafe { self.buf.set_len(0) };

        // Vec: [Kept, Kept, Hole, Hole, Hole, Hole, Unchecked, Unchecked]
        //      |<-              processed len   ->| ^- next to check
        //                  |<-  deleted cnt     ->|
        //      |<-              original_len                          ->|
        // Kept: rows the predicate approved.
        // Hole: moved or dropped row slot.
        // Unchecked: valid rows not yet visited.
        //
        // This drop guard runs when the predicate or a row's Drop
        // panics: it shifts the unchecked rows over the holes and
        // restores a consistent length. In the non-panicking case it is
        // optimized out.
        struct BackshiftOnDrop<'a, T: Columns, A: RawAllocator> {
            v: &'a mut TupleVec<T, A>,
            processed_len: u32,
            deleted_cnt: u32,
            original_len: u32,
        }

        impl<T: Columns, A: RawAllocator> Drop for BackshiftOnDrop<'_, T, A> {
            fn drop(&mut self) {
                if self.deleted_cnt > 0 {
                    let cap = self.v.buf.capacity();
                    // SAFETY: trailing unchecked rows are still valid
                    // since they were never touched.
                    unsafe {
                        T::ColumnRepr::copy(
                            T::ColumnRepr::pointers(
                                self.v.buf.as_ptr(),
                                self.processed_len,
                                cap,
                            ),
                            T::ColumnRepr::pointers(
                                self.v.buf.as_ptr(),
                                self.processed_len - self.deleted_cnt,
                                cap,
                            ),
                            self.original_len - self.processed_len,
                        );
                    }
                }
                // SAFETY: after filling the holes, all kept rows are
                // contiguous again.
                unsafe {
                    self.v.buf.set_len(self.original_len - self.deleted_cnt);
                }
            }
        }

        let mut g = BackshiftOnDrop {
            v: self,
            processed_len: 0,
            deleted_cnt: 0,
            original_len,
        };

        fn process_loop<F, T: Columns, A: RawAllocator, const DELETED: bool>(
            original_len: u32,
            f: &mut F,
            g: &mut BackshiftOnDrop<'_, T, A>,
        ) where
            F: FnMut(T::Mut<'_>) -> bool,
        {
            while g.processed_len != original_len {
                let cap = g.v.buf.capacity();
                // SAFETY: the unchecked row is still valid.
                let cur_ptrs = unsafe {
                    T::ColumnRepr::pointers(g.v.buf.as_ptr(), g.processed_len, cap)
                };
                let cur = T::as_mut(PhantomData, cur_ptrs);
                if !f(cur) {
                    let cur_len = g.processed_len;
                    // Advance early so a panicking drop cannot re-drop.
                    g.processed_len += 1;
                    g.deleted_cnt += 1;
                    if T::MUST_DROP_AS_SELF {
                        // SAFETY: the row's backing memory is never
                        // accessed again.
                        let _ = T::from_columns(unsafe {
                            T::ColumnRepr::read(g.v.buf.as_ptr(), cur_len, cap)
                        });
                    } else if const { core::mem::needs_drop::<T::ColumnRepr>() } {
                        // SAFETY: the row's backing memory is never
                        // accessed again.
                        unsafe { T::ColumnRepr::drop_in_place(cur_ptrs, 1) };
                    }
                    // The counter was already advanced.
                    if DELETED {
                        continue;
                    } else {
                        break;
                    }
                }
                if DELETED {
                    // SAFETY: deleted_cnt > 0, so the hole slot does not
                    // overlap the current row; this is a move and the
                    // source is never touched again.
                    unsafe {
                        let hole_slot = T::ColumnRepr::pointers(
                            g.v.buf.as_ptr(),
                            g.processed_len - g.deleted_cnt,
                            cap,
                        );
                        T::ColumnRepr::copy(cur_ptrs, hole_slot, 1);
                    }
                }
                g.processed_len += 1;
            }
        }

        // Stage 1: nothing was deleted yet.
        process_loop::<F, T, A, false>(original_len, &mut f, &mut g);

        // Stage 2: at least one row was deleted.
        process_loop::<F, T, A, true>(original_len, &mut f, &mut g);

        drop(g);
    }

    /// Deep-copies the vector: fresh allocation, every row cloned column
    /// by column. Requires the allocation strategy to be cloneable too.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T::ColumnRepr: ColumnTupleClone,
        A: Clone,
    {
        let len = self.len();
        let mut out = Self::with_capacity_in(len, self.buf.allocator().clone())?;
        if len > 0 {
            // SAFETY: the source holds len initialized rows, the fresh
            // buffer has room for them, and the two cannot overlap.
            unsafe {
                let src = T::ColumnRepr::pointers(self.buf.as_ptr(), 0, self.capacity());
                let dst = T::ColumnRepr::pointers(out.buf.as_ptr(), 0, out.capacity());
                T::ColumnRepr::clone_to(src, dst, len);
                out.buf.set_len(len);
            }
        }
        Ok(out)
    }

    /// Checks the container's own invariants: length within capacity and
    /// a self-consistent column layout. Intended for debug assertions
    /// around unsafe bulk manipulation.
    pub fn validate(&self) -> bool {
        if self.len() > self.capacity() {
            return false;
        }
        if T::ColumnRepr::IS_DATALESS || self.capacity() == 0 {
            return true;
        }
        T::ColumnRepr::layout_is_consistent(self.capacity())
    }

    /// Classifies an iterator against the vector's current storage. An
    /// iterator whose captured column pointers no longer match the
    /// current buffer — because a reallocation happened after it was
    /// taken — reports no flags at all.
    pub fn validate_iterator(&self, it: &Iter<'_, T>) -> IteratorStatus {
        if T::ColumnRepr::first_pointer(it.ptrs) != self.buf.as_ptr() {
            return IteratorStatus::empty();
        }
        if it.index < self.len() {
            IteratorStatus::VALID | IteratorStatus::CURRENT | IteratorStatus::DEREFERENCEABLE
        } else if it.index <= self.len() {
            IteratorStatus::VALID | IteratorStatus::CURRENT
        } else {
            IteratorStatus::empty()
        }
    }
}

impl<T: Columns, A: RawAllocator> Drop for TupleVec<T, A> {
    fn drop(&mut self) {
        let len = self.len();
        let cap = self.capacity();
        let base = self.buf.as_ptr();
        // SAFETY: all rows are initialized and dropped exactly once;
        // RawTupleVec's Drop frees the buffer afterwards.
        unsafe { columns::drop_rows::<T>(base, cap, 0, len) };
    }
}

impl<T: Columns> Default for TupleVec<T, Global> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Columns, A: RawAllocator> core::fmt::Debug for TupleVec<T, A>
where
    for<'a> T::Slice<'a>: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.as_slice(), f)
    }
}

impl<T: Columns, A: RawAllocator + Clone> Clone for TupleVec<T, A>
where
    T::ColumnRepr: ColumnTupleClone,
{
    fn clone(&self) -> Self {
        self.try_clone()
            .expect("allocation failed while cloning TupleVec")
    }
}

impl<T: Columns, A1: RawAllocator, A2: RawAllocator> PartialEq<TupleVec<T, A2>>
    for TupleVec<T, A1>
where
    for<'a> T::Ref<'a>: PartialEq,
{
    fn eq(&self, other: &TupleVec<T, A2>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Columns, A: RawAllocator> AsRef<TupleVec<T, A>> for TupleVec<T, A> {
    #[inline(always)]
    fn as_ref(&self) -> &TupleVec<T, A> {
        self
    }
}

impl<T: Columns, A: RawAllocator> AsMut<TupleVec<T, A>> for TupleVec<T, A> {
    #[inline(always)]
    fn as_mut(&mut self) -> &mut TupleVec<T, A> {
        self
    }
}

impl<T: Columns, A: RawAllocator> IntoIterator for TupleVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// Consumes the vector into an iterator that moves each row out by
    /// value.
    fn into_iter(self) -> IntoIter<T, A> {
        let me = ManuallyDrop::new(self);
        // SAFETY: ownership of the buffer moves into the iterator and
        // the vector's own Drop is suppressed.
        let buf = unsafe { core::ptr::read(&me.buf) };
        IntoIter { buf, index: 0 }
    }
}

impl<'a, T: Columns, A: RawAllocator> IntoIterator for &'a TupleVec<T, A> {
    type Item = T::Ref<'a>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T: Columns, A: RawAllocator> IntoIterator for &'a mut TupleVec<T, A> {
    type Item = T::Mut<'a>;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::marker::PhantomData;
    use std::rc::Rc;

    use crate as tuplevec;
    use crate::{
        AllocError, ColumnTuple, Columns, Global, IteratorStatus, RawAllocator, TupleVec,
    };

    #[test]
    fn basic_usage() {
        let mut vec = TupleVec::<(u64, u32)>::with_capacity(16).unwrap();
        vec.push((0, 2)).unwrap();
        assert_eq!(vec.get(0), Some((&0, &2)));

        let first = vec.get_mut(0).unwrap();
        *first.0 = 52;
        *first.1 = 66;
        assert_eq!(vec.get(0), Some((&52, &66)));

        vec.reserve(32).unwrap();
        assert_eq!(vec.get(0), Some((&52, &66)));

        vec.push((4, 8)).unwrap();
        let (a_slice, b_slice) = vec.as_slice();
        assert_eq!(a_slice, &[52, 4]);
        assert_eq!(b_slice, &[66, 8]);
        assert_eq!(vec.pop(), Some((4, 8)));
        assert_eq!(vec.len(), 1);
    }

    #[test]
    fn derive_generates_named_views() {
        use tuplevec_derive::Columns;

        #[derive(Debug, Clone, Copy, Columns)]
        struct Body {
            mass: f64,
            charge: f32,
            id: u32,
        }

        let mut vec = TupleVec::<Body>::new();
        vec.push(Body {
            mass: 1.0,
            charge: -1.0,
            id: 7,
        })
        .unwrap();
        vec.push(Body {
            mass: 2.0,
            charge: 0.5,
            id: 9,
        })
        .unwrap();

        let first = vec.get(0).unwrap();
        assert_eq!(first.mass, &1.0);
        assert_eq!(first.charge, &-1.0);
        assert_eq!(first.id, &7);

        let second = vec.get_mut(1).unwrap();
        *second.id = 10;

        let BodySlice { mass, charge, id } = vec.as_slice();
        assert_eq!(mass, &[1.0, 2.0]);
        assert_eq!(charge, &[-1.0, 0.5]);
        assert_eq!(id, &[7, 10]);
    }

    #[test]
    fn uninitialized_push_then_value_push() {
        let mut vec = TupleVec::<(i32,)>::new();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);

        // SAFETY: row 0 is written below before any safe view reads it.
        unsafe { vec.push_uninit().unwrap() };
        vec.push((5,)).unwrap();

        assert_eq!(vec.len(), 2);
        assert!(vec.capacity() >= 2);
        // Row 1 is readable through the raw column pointer even though
        // row 0 is not yet initialized.
        unsafe {
            assert_eq!(*vec.column_ptr::<0>().add(1), 5);
            *vec.column_ptr_mut::<0>() = 1;
        }
        assert_eq!(vec.column::<0>(), &[1, 5]);
    }

    #[test]
    fn ranged_traversal_column_sums() {
        let mut vec = TupleVec::<(i32, f32, i32)>::new();
        for row in [
            (1, 2.0, 6),
            (2, 3.0, 7),
            (3, 4.0, 8),
            (4, 5.0, 9),
            (5, 6.0, 10),
        ] {
            vec.push(row).unwrap();
        }

        let mut middle = 0.0f32;
        for (_, b, _) in vec.iter() {
            middle += *b;
        }
        assert_eq!(middle, 20.0);

        let last: i32 = vec.column::<2>().iter().sum();
        assert_eq!(last, 40);

        // The iterator's references and the column slices are views of
        // the same storage.
        let (first, ..) = vec.iter().next().unwrap();
        assert!(core::ptr::eq(first, &vec.column::<0>()[0]));
    }

    #[test]
    fn growth_doubles_from_one() {
        let mut vec = TupleVec::<(u32, u8)>::new();
        for i in 0..9u32 {
            vec.push((i, i as u8)).unwrap();
            assert_eq!(vec.capacity(), (i + 1).next_power_of_two());
        }
        assert_eq!(vec.len(), 9);
        assert_eq!(vec.capacity(), 16);
    }

    #[test]
    fn insert_then_erase_restores_sequence() {
        let original = crate::tuplevec![(1, 'a'), (2, 'b'), (3, 'c')].unwrap();
        let mut vec = original.clone();

        vec.insert_fill(1, 2, (9, 'z')).unwrap();
        assert_eq!(vec.len(), 5);
        assert_eq!(vec.column::<0>(), &[1, 9, 9, 2, 3]);

        vec.erase_range(1..3);
        assert_eq!(vec, original);
    }

    #[test]
    fn swap_remove_keeps_membership() {
        let mut vec = crate::tuplevec![(10,), (20,), (30,)].unwrap();
        assert_eq!(vec.swap_remove(0), (10,));
        assert_eq!(vec.len(), 2);

        let mut remaining = vec.column::<0>().to_vec();
        remaining.sort_unstable();
        assert_eq!(remaining, [20, 30]);
    }

    #[test]
    fn shrink_to_fit_is_idempotent() {
        let mut vec = TupleVec::<(u64, u8)>::with_capacity(8).unwrap();
        for i in 0..3u64 {
            vec.push((i, i as u8)).unwrap();
        }
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 3);

        let ptr = vec.column_ptr::<0>();
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 3);
        assert_eq!(vec.column_ptr::<0>(), ptr);
        assert_eq!(vec.column::<0>(), &[0, 1, 2]);
    }

    #[test]
    fn shrink_to_fit_of_empty_releases_buffer() {
        let mut vec = TupleVec::<(u32, u32)>::with_capacity(8).unwrap();
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 0);
        vec.push((1, 2)).unwrap();
        assert_eq!(vec.get(0), Some((&1, &2)));
    }

    #[test]
    fn clone_round_trips_all_columns() {
        let vec = crate::tuplevec![
            (1u32, String::from("ten"), 1.5f64),
            (2, String::from("twenty"), 2.5),
            (3, String::from("thirty"), 3.5),
        ]
        .unwrap();

        let copy = vec.clone();
        assert_eq!(copy.len(), vec.len());
        for index in 0..vec.len() {
            assert_eq!(copy.get(index), vec.get(index));
        }
        assert_eq!(copy, vec);
    }

    #[test]
    fn iterator_algebra_laws() {
        let vec = crate::tuplevec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)].unwrap();
        let a = vec.iter();

        assert_eq!((a + 3) - a, 3);
        assert_eq!((a + 2) + 1, a + 3);
        assert_eq!(2 + a, a + 2);
        assert_eq!((a + 3) - 2, a + 1);

        let mut b = a;
        b += 4;
        assert_eq!(b - a, 4);
        b -= 4;
        assert_eq!(b, a);

        assert!(a < a + 1);
        assert!(a + 5 >= a + 4);
        assert_eq!(a.get(4), Some((&4, &4)));
        assert_eq!(a.get(5), None);
    }

    #[test]
    fn iterators_from_different_buffers_do_not_compare() {
        let vec = crate::tuplevec![(1, 1), (2, 2)].unwrap();
        let other = crate::tuplevec![(1, 1), (2, 2)].unwrap();

        let a = vec.iter();
        let b = other.iter();
        assert_ne!(a, b);
        // Same index, different storage generation: unordered.
        assert_eq!(PartialOrd::partial_cmp(&a, &b), None);
        assert_eq!(vec.iter(), vec.iter());
    }

    #[test]
    fn mutable_iterator_converts_to_shared() {
        let mut vec = crate::tuplevec![(1, 1), (2, 2)].unwrap();
        for (a, b) in vec.iter_mut() {
            *a *= 10;
            *b *= 100;
        }
        let it_mut = vec.iter_mut();
        let it: crate::Iter<'_, (i32, i32)> = it_mut.into();
        assert_eq!(it.get(1), Some((&20, &200)));
    }

    #[derive(Clone)]
    struct QuotaAlloc {
        remaining: Rc<Cell<u32>>,
    }

    impl QuotaAlloc {
        fn new(allocations: u32) -> Self {
            QuotaAlloc {
                remaining: Rc::new(Cell::new(allocations)),
            }
        }
    }

    // SAFETY: defers to Global for all actual memory management.
    unsafe impl RawAllocator for QuotaAlloc {
        fn allocate(&self, layout: core::alloc::Layout) -> Result<core::ptr::NonNull<u8>, AllocError> {
            if self.remaining.get() == 0 {
                return Err(AllocError);
            }
            self.remaining.set(self.remaining.get() - 1);
            Global.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: core::ptr::NonNull<u8>, layout: core::alloc::Layout) {
            // SAFETY: ptr came from Global via allocate above.
            unsafe { Global.deallocate(ptr, layout) };
        }
    }

    #[test]
    fn failed_growth_leaves_vector_intact() {
        let mut vec =
            TupleVec::<(u32, u64), _>::with_capacity_in(2, QuotaAlloc::new(1)).unwrap();
        vec.push((1, 10)).unwrap();
        vec.push((2, 20)).unwrap();

        let ptr = vec.column_ptr::<0>();
        assert_eq!(vec.push((3, 30)), Err(AllocError));

        assert_eq!(vec.len(), 2);
        assert_eq!(vec.capacity(), 2);
        assert_eq!(vec.column_ptr::<0>(), ptr);
        assert_eq!(vec.as_slice(), (&[1u32, 2][..], &[10u64, 20][..]));
        assert!(vec.validate());

        assert_eq!(vec.reserve(10), Err(AllocError));
        assert_eq!(vec.capacity(), 2);
    }

    #[test]
    fn clear_resets_len_but_not_capacity() {
        let mut vec = TupleVec::<(u32, u64)>::with_capacity(5).unwrap();
        let cap = vec.capacity();
        vec.push((2, 0)).unwrap();
        assert_eq!(vec.len(), 1);

        vec.clear();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), cap);

        vec.push((3, 0)).unwrap();
        assert_eq!(vec.len(), 1);
        assert_eq!(vec.capacity(), cap);
    }

    #[test]
    fn clear_drops_all_rows() {
        let rc = Rc::new(2u32);

        let mut vec = TupleVec::<(Rc<u32>, u64)>::with_capacity(5).unwrap();
        vec.push((rc.clone(), 0)).unwrap();

        // Referenced once here and once inside the vector.
        assert_eq!(Rc::strong_count(&rc), 2);

        vec.clear();
        assert_eq!(vec.len(), 0);
        assert_eq!(Rc::strong_count(&rc), 1);
    }

    #[test]
    fn drop_reads_rows_out_when_required() {
        #[repr(C)]
        struct LoudDrop {
            a: (),
            b: (),
        }

        thread_local! {
            static DROP_COUNT: Cell<usize> = const { Cell::new(0) };
        }

        impl Drop for LoudDrop {
            fn drop(&mut self) {
                DROP_COUNT.with(|count| count.set(count.get() + 1));
            }
        }

        // SAFETY: no internal invariants on the fields; the type requires
        // drop as Self, which is declared.
        unsafe impl Columns for LoudDrop {
            type ColumnRepr = ((), ());

            const MUST_DROP_AS_SELF: bool = true;

            type Ref<'a>
                = (&'a (), &'a ())
            where
                Self: 'a;

            type Mut<'a>
                = (&'a mut (), &'a mut ())
            where
                Self: 'a;

            type Slice<'a>
                = (&'a [()], &'a [()])
            where
                Self: 'a;

            type SliceMut<'a>
                = (&'a mut [()], &'a mut [()])
            where
                Self: 'a;

            fn into_columns(value: Self) -> Self::ColumnRepr {
                core::mem::forget(value);
                ((), ())
            }

            fn from_columns(_value: Self::ColumnRepr) -> Self {
                Self { a: (), b: () }
            }

            fn as_ref<'a>(
                _: PhantomData<&'a Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
            ) -> Self::Ref<'a> {
                // SAFETY: the vector hands out pointers to live rows.
                unsafe { (value.0.as_ref(), value.1.as_ref()) }
            }

            fn as_mut<'a>(
                _: PhantomData<&'a mut Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
            ) -> Self::Mut<'a> {
                let (mut a, mut b) = value;
                // SAFETY: as above, exclusively.
                unsafe { (a.as_mut(), b.as_mut()) }
            }

            fn as_slice<'a>(
                _: PhantomData<&'a Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
                len: u32,
            ) -> Self::Slice<'a> {
                // SAFETY: as above, for len rows.
                unsafe {
                    (
                        core::slice::from_raw_parts(value.0.as_ptr(), len as usize),
                        core::slice::from_raw_parts(value.1.as_ptr(), len as usize),
                    )
                }
            }

            fn as_mut_slice<'a>(
                _: PhantomData<&'a mut Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
                len: u32,
            ) -> Self::SliceMut<'a> {
                // SAFETY: as above, exclusively.
                unsafe {
                    (
                        core::slice::from_raw_parts_mut(value.0.as_ptr(), len as usize),
                        core::slice::from_raw_parts_mut(value.1.as_ptr(), len as usize),
                    )
                }
            }
        }

        let mut vec = TupleVec::<LoudDrop>::with_capacity(16).unwrap();
        vec.push(LoudDrop { a: (), b: () }).unwrap();
        vec.push(LoudDrop { a: (), b: () }).unwrap();
        assert_eq!(vec.len(), 2);
        // Dataless rows: no allocation, unbounded capacity.
        assert_eq!(vec.capacity(), u32::MAX);

        vec.clear();
        assert_eq!(DROP_COUNT.with(Cell::get), 2);

        vec.push(LoudDrop { a: (), b: () }).unwrap();
        drop(vec);
        assert_eq!(DROP_COUNT.with(Cell::get), 3);
    }

    #[test]
    fn insert_and_insert_mut() {
        let mut vec = TupleVec::<(u32, u32)>::new();
        vec.push((1, 10)).unwrap();
        vec.push((3, 30)).unwrap();

        let (first, second) = vec.insert_mut(1, (2, 20)).unwrap();
        *first += 10;
        *second += 5;

        vec.insert(0, (0, 0)).unwrap();

        let slice = vec.as_slice();
        assert_eq!(slice.0, &[0, 1, 12, 3]);
        assert_eq!(slice.1, &[0, 10, 25, 30]);
    }

    #[test]
    fn insert_grows_capacity() {
        let mut vec = TupleVec::<(u32, u32)>::with_capacity(2).unwrap();
        assert_eq!(vec.capacity(), 2);

        vec.push((1, 10)).unwrap();
        vec.push((2, 20)).unwrap();
        assert_eq!(vec.capacity(), 2);

        vec.insert(1, (3, 30)).unwrap();
        assert!(vec.capacity() >= 3);

        let slice = vec.as_slice();
        assert_eq!(slice.0, &[1, 3, 2]);
        assert_eq!(slice.1, &[10, 30, 20]);
    }

    #[test]
    fn insert_slice_preserves_order() {
        let mut vec = crate::tuplevec![(1, 'a'), (5, 'e')].unwrap();
        vec.insert_slice(1, &[(2, 'b'), (3, 'c'), (4, 'd')]).unwrap();
        assert_eq!(vec.column::<0>(), &[1, 2, 3, 4, 5]);
        assert_eq!(vec.column::<1>(), &['a', 'b', 'c', 'd', 'e']);

        // Appending at the end needs no shift but the same interface.
        vec.insert_slice(5, &[(6, 'f')]).unwrap();
        assert_eq!(vec.column::<0>(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn remove_shifts_tail_left() {
        let mut vec = TupleVec::<(u64, u32)>::with_capacity(16).unwrap();
        for i in 0..10u64 {
            vec.push((i, i as u32)).unwrap();
        }

        assert_eq!(vec.remove(4), (4, 4));
        assert_eq!(vec.len(), 9);
        assert_eq!(vec.column::<0>(), &[0, 1, 2, 3, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn erase_range_middle() {
        let mut vec = crate::tuplevec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (5, 5)].unwrap();
        vec.erase_range(2..4);
        assert_eq!(vec.len(), 4);
        assert_eq!(vec.column::<0>(), &[0, 1, 4, 5]);

        vec.erase_range(0..0);
        assert_eq!(vec.len(), 4);

        vec.erase_range(2..4);
        assert_eq!(vec.column::<0>(), &[0, 1]);
    }

    #[test]
    fn erase_range_drops_rows() {
        let rc = Rc::new(0u32);
        let mut vec = TupleVec::<(Rc<u32>, u8)>::new();
        for i in 0..4u8 {
            vec.push((rc.clone(), i)).unwrap();
        }
        assert_eq!(Rc::strong_count(&rc), 5);

        vec.erase_range(1..3);
        assert_eq!(Rc::strong_count(&rc), 3);
        assert_eq!(vec.column::<1>(), &[0, 3]);
    }

    #[test]
    fn resize_and_truncate() {
        let mut vec = TupleVec::<(u32, bool)>::new();
        vec.resize(3).unwrap();
        assert_eq!(vec.len(), 3);
        assert_eq!(vec.as_slice(), (&[0u32, 0, 0][..], &[false, false, false][..]));

        vec.resize_fill(5, (7, true)).unwrap();
        assert_eq!(vec.column::<0>(), &[0, 0, 0, 7, 7]);

        vec.truncate(1);
        assert_eq!(vec.len(), 1);
        vec.truncate(10);
        assert_eq!(vec.len(), 1);

        vec.resize(0).unwrap();
        assert!(vec.is_empty());
    }

    #[test]
    fn assign_reuses_buffer_when_capacity_suffices() {
        let mut vec = crate::tuplevec![(1u32, 1u32), (2, 2), (3, 3), (4, 4)].unwrap();
        let ptr = vec.column_ptr::<0>();

        vec.assign_fill(2, (9, 9)).unwrap();
        assert_eq!(vec.capacity(), 4);
        assert_eq!(vec.column_ptr::<0>(), ptr);
        assert_eq!(vec.as_slice(), (&[9u32, 9][..], &[9u32, 9][..]));

        vec.assign_slice(&[(5, 50), (6, 60), (7, 70)]).unwrap();
        assert_eq!(vec.column_ptr::<0>(), ptr);
        assert_eq!(vec.column::<1>(), &[50, 60, 70]);

        vec.assign_with((0..6).map(|i| (i, i * 10))).unwrap();
        assert_eq!(vec.len(), 6);
        assert_eq!(vec.column::<0>(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn retain_mut_filters_in_place() {
        let mut vec = crate::tuplevec![(1, 1), (2, 2), (3, 3), (4, 4)].unwrap();
        vec.retain_mut(|(a, b)| {
            if *a <= 3 {
                *b += 1;
                true
            } else {
                false
            }
        });
        assert_eq!(vec.len(), 3);
        assert_eq!(vec.get(0), Some((&1, &2)));
        assert_eq!(vec.get(1), Some((&2, &3)));
        assert_eq!(vec.get(2), Some((&3, &4)));
    }

    #[test]
    fn column_lookup_by_type() {
        let vec = crate::tuplevec![(1u32, 1.5f32, true), (2, 2.5, false)].unwrap();
        let floats: &[f32] = vec.column_of::<f32, _>();
        assert_eq!(floats, &[1.5, 2.5]);
        let flags: &[bool] = vec.column_of::<bool, _>();
        assert_eq!(flags, &[true, false]);

        let mut vec = vec.clone();
        vec.column_of_mut::<u32, _>()[0] = 100;
        assert_eq!(vec.get(0), Some((&100, &1.5, &true)));
    }

    #[test]
    fn zero_sized_columns_never_allocate() {
        let mut vec = TupleVec::<((), ())>::new();
        assert_eq!(vec.capacity(), u32::MAX);
        vec.push(((), ())).unwrap();
        vec.push(((), ())).unwrap();
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.get(1), Some((&(), &())));
        assert_eq!(vec.pop(), Some(((), ())));
        assert!(vec.validate());
    }

    #[test]
    fn validate_and_validate_iterator() {
        let vec = crate::tuplevec![(1, 1), (2, 2)].unwrap();
        assert!(vec.validate());

        let begin = vec.iter();
        assert_eq!(
            vec.validate_iterator(&begin),
            IteratorStatus::VALID | IteratorStatus::CURRENT | IteratorStatus::DEREFERENCEABLE
        );

        let end = begin + vec.len();
        assert_eq!(
            vec.validate_iterator(&end),
            IteratorStatus::VALID | IteratorStatus::CURRENT
        );

        let past = begin + 3;
        assert_eq!(vec.validate_iterator(&past), IteratorStatus::empty());

        // An iterator over some other buffer carries stale pointers.
        let other = crate::tuplevec![(1, 1), (2, 2)].unwrap();
        assert_eq!(vec.validate_iterator(&other.iter()), IteratorStatus::empty());
    }

    #[test]
    fn into_iter_moves_rows_out() {
        let vec = crate::tuplevec![
            (1u8, String::from("one")),
            (2, String::from("two")),
            (3, String::from("three")),
        ]
        .unwrap();

        let rows: Vec<(u8, String)> = vec.into_iter().collect();
        assert_eq!(
            rows,
            [
                (1, String::from("one")),
                (2, String::from("two")),
                (3, String::from("three")),
            ]
        );
    }

    #[test]
    fn partially_consumed_into_iter_drops_the_rest() {
        let rc = Rc::new(0u32);
        let vec = crate::tuplevec![(rc.clone(), 1), (rc.clone(), 2), (rc.clone(), 3)].unwrap();
        assert_eq!(Rc::strong_count(&rc), 4);

        let mut rows = vec.into_iter();
        let first = rows.next().unwrap();
        assert_eq!(first.1, 1);
        drop(rows);
        drop(first);
        assert_eq!(Rc::strong_count(&rc), 1);
    }

    #[test]
    fn into_iter_from_both_ends() {
        let vec = crate::tuplevec![(1, 'a'), (2, 'b'), (3, 'c')].unwrap();
        let mut rows = vec.into_iter();
        assert_eq!(rows.next_back(), Some((3, 'c')));
        assert_eq!(rows.next(), Some((1, 'a')));
        assert_eq!(rows.next(), Some((2, 'b')));
        assert_eq!(rows.next(), None);
    }

    #[test]
    fn push_mut_and_push_default() {
        let mut vec = TupleVec::<(u32, u32)>::new();
        let (a, b) = vec.push_mut((1, 2)).unwrap();
        *a += 10;
        *b += 20;
        vec.push_default().unwrap();
        assert_eq!(vec.as_slice(), (&[11u32, 0][..], &[22u32, 0][..]));
    }

    #[test]
    fn first_and_last() {
        let mut vec = TupleVec::<(u32, char)>::new();
        assert_eq!(vec.first(), None);
        assert_eq!(vec.last(), None);
        vec.push((1, 'a')).unwrap();
        vec.push((2, 'b')).unwrap();
        assert_eq!(vec.first(), Some((&1, &'a')));
        assert_eq!(vec.last(), Some((&2, &'b')));
    }

    #[test]
    fn macro_forms() {
        let empty: TupleVec<(u32, u32)> = crate::tuplevec![];
        assert!(empty.is_empty());

        let filled = crate::tuplevec![(7u8, 7u64); 4].unwrap();
        assert_eq!(filled.len(), 4);
        assert_eq!(filled.capacity(), 4);
        assert_eq!(filled.column::<0>(), &[7, 7, 7, 7]);

        let listed = crate::tuplevec![(1, 'x'), (2, 'y'), (3, 'z')].unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed.capacity(), 3);
    }

    #[test]
    fn six_column_rows() {
        let mut vec = TupleVec::<(u8, u16, u32, u64, i8, i16)>::new();
        vec.push((1, 2, 3, 4, -5, -6)).unwrap();
        vec.push((7, 8, 9, 10, -11, -12)).unwrap();
        assert_eq!(vec.get(1), Some((&7, &8, &9, &10, &-11, &-12)));
        assert_eq!(vec.column::<3>(), &[4, 10]);
        assert_eq!(vec.remove(0), (1, 2, 3, 4, -5, -6));
        assert!(vec.validate());
    }

    #[test]
    fn mixed_alignment_columns_stay_aligned() {
        let mut vec = TupleVec::<(u8, u64, u16)>::new();
        for i in 0..33u8 {
            vec.push((i, u64::from(i) << 32, u16::from(i) << 8)).unwrap();
        }
        assert_eq!(vec.column::<1>()[32], 32u64 << 32);
        assert_eq!(vec.column_ptr::<1>() as usize % align_of::<u64>(), 0);
        assert_eq!(vec.column_ptr::<2>() as usize % align_of::<u16>(), 0);
        assert!(vec.validate());
    }

    #[test]
    fn droppable_column_types() {
        let mut vec = TupleVec::<(Vec<u64>, Box<u32>)>::with_capacity(16).unwrap();
        vec.push((vec![0], Box::new(2))).unwrap();

        let first = vec.get_mut(0).unwrap();
        first.0.push(52);
        *first.1 = Box::new(66);

        vec.reserve(32).unwrap();
        let first = vec.get(0).unwrap();
        assert_eq!(first.0, &[0, 52]);
        assert_eq!(**first.1, 66);

        vec.push((vec![4], Box::new(8))).unwrap();
        let (a_slice, b_slice) = vec.as_slice();
        assert_eq!(a_slice, &[vec![0, 52], vec![4]]);
        assert_eq!(b_slice, &[Box::new(66), Box::new(8)]);
    }
}
