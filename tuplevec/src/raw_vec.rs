// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The buffer behind a [`TupleVec`](crate::TupleVec): one allocation, a
//! length, and a capacity shared by every column.
//!
//! `RawTupleVec` owns the bytes but never the rows; dropping it frees the
//! buffer without running any element destructor. The container above is
//! responsible for dropping rows first, which keeps the division of labor
//! identical on every path (drop, clear, truncate, consuming iteration).

use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::alloc::{AllocError, RawAllocator};
use crate::columns::{ColumnTuple, Columns};

pub(crate) struct RawTupleVec<T: Columns, A: RawAllocator> {
    ptr: NonNull<u8>,
    cap: u32,
    len: u32,
    alloc: A,
    _marker: PhantomData<T::ColumnRepr>,
}

impl<T: Columns, A: RawAllocator> RawTupleVec<T, A> {
    /// A well-aligned pointer for the unallocated state. Aligned to the
    /// row's maximal column alignment so even the empty container's
    /// column pointers satisfy the per-column alignment checks.
    fn dangling() -> NonNull<u8> {
        // SAFETY: a zero-capacity layout cannot fail to compute.
        let layout = unsafe { T::ColumnRepr::layout(0).unwrap_unchecked() };
        // SAFETY: alignments are nonzero.
        unsafe { NonNull::new_unchecked(core::ptr::without_provenance_mut(layout.align())) }
    }

    pub(crate) fn new_in(alloc: A) -> Self {
        RawTupleVec {
            ptr: Self::dangling(),
            // Dataless rows never allocate, so every capacity is free.
            cap: if T::ColumnRepr::IS_DATALESS { u32::MAX } else { 0 },
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    pub(crate) fn with_capacity_in(capacity: u32, alloc: A) -> Result<Self, AllocError> {
        let mut buf = Self::new_in(alloc);
        if capacity > 0 && !T::ColumnRepr::IS_DATALESS {
            // Requests exactly the asked-for capacity, not a rounded one.
            buf.reallocate(capacity)?;
        }
        Ok(buf)
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets the number of initialized rows.
    ///
    /// # Safety
    ///
    /// `len` must not exceed the capacity, and rows `[0, len)` must be
    /// initialized in every column before they are next read or dropped.
    #[inline]
    pub(crate) unsafe fn set_len(&mut self, len: u32) {
        debug_assert!(len <= self.cap);
        self.len = len;
    }

    #[inline]
    pub(crate) fn capacity(&self) -> u32 {
        self.cap
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Ensures room for `additional` more rows beyond the current length,
    /// growing to `max(2 * capacity, len + additional)` when the current
    /// buffer is too small. An empty buffer grows to at least one row.
    pub(crate) fn reserve(&mut self, additional: u32) -> Result<(), AllocError> {
        let required = self.len.checked_add(additional).ok_or(AllocError)?;
        if required <= self.cap {
            return Ok(());
        }
        let new_cap = required.max(self.cap.saturating_mul(2)).max(1);
        self.reallocate(new_cap)
    }

    /// Reallocates down to exactly `len` rows. Does nothing when the
    /// capacity already matches, so no allocator traffic occurs and the
    /// column pointers stay put.
    pub(crate) fn shrink_to_fit(&mut self) -> Result<(), AllocError> {
        if T::ColumnRepr::IS_DATALESS || self.cap == self.len {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Moves the buffer to a new allocation of `new_cap` rows.
    ///
    /// The protocol is strictly two-phase: the new buffer is allocated
    /// first, then every column's live range is relocated, and only then
    /// is the old buffer released. A failed allocation returns before
    /// anything — pointer, length, capacity, or element — has changed.
    fn reallocate(&mut self, new_cap: u32) -> Result<(), AllocError> {
        debug_assert!(!T::ColumnRepr::IS_DATALESS);
        debug_assert!(new_cap >= self.len);
        let new_ptr = if new_cap == 0 {
            Self::dangling()
        } else {
            let layout = T::ColumnRepr::layout(new_cap).map_err(|_| AllocError)?;
            self.alloc.allocate(layout)?
        };
        if self.len > 0 {
            // SAFETY: the old buffer holds len initialized rows laid out
            // for cap; the new buffer has room for them under new_cap and
            // the two do not overlap.
            unsafe {
                let src = T::ColumnRepr::pointers(self.ptr, 0, self.cap);
                let dst = T::ColumnRepr::pointers(new_ptr, 0, new_cap);
                T::ColumnRepr::relocate(src, dst, self.len);
            }
        }
        // SAFETY: ptr/cap still describe the old allocation.
        unsafe { self.release() };
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Frees the current allocation, if there is one.
    ///
    /// # Safety
    ///
    /// All rows must already have been dropped or relocated; `ptr`/`cap`
    /// must not be used again before being overwritten.
    unsafe fn release(&mut self) {
        if self.cap > 0 && !T::ColumnRepr::IS_DATALESS {
            // SAFETY: the layout was validated when this buffer was
            // allocated.
            let layout = unsafe { T::ColumnRepr::layout(self.cap).unwrap_unchecked() };
            // SAFETY: ptr was returned by this allocator for this layout.
            unsafe { self.alloc.deallocate(self.ptr, layout) };
        }
    }
}

impl<T: Columns, A: RawAllocator> Drop for RawTupleVec<T, A> {
    fn drop(&mut self) {
        // Rows were dropped by the owner; only the bytes remain.
        // SAFETY: the buffer is not used after this.
        unsafe { self.release() };
    }
}
