// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Allocation strategy for [`TupleVec`](crate::TupleVec).
//!
//! A `TupleVec` makes exactly one allocation for all of its columns. The
//! [`RawAllocator`] trait is the seam through which that allocation is
//! requested, so callers can route the buffer into an arena, a counting
//! test allocator, or anything else that can hand out aligned byte blocks.

use core::alloc::Layout;
use core::ptr::NonNull;

/// Error returned when the underlying allocator cannot satisfy a request,
/// or when the requested capacity does not fit in an allocation at all.
///
/// A failed operation leaves the vector exactly as it was: the old buffer
/// is still owned, no element has been moved or dropped, and the length
/// and capacity are unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("tuple vector allocation failed")
    }
}

impl std::error::Error for AllocError {}

/// A source of raw byte allocations.
///
/// This is deliberately narrower than `std`'s unstable `Allocator` trait:
/// a `TupleVec` only ever asks for one block per buffer and never asks an
/// allocator to grow in place, because growing a Struct-of-Arrays buffer
/// in place would still require shuffling every column but the first.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stay live
/// until passed to [`deallocate`](RawAllocator::deallocate) with the same
/// layout. `allocate` is never called with a zero-size layout.
pub unsafe trait RawAllocator {
    /// Allocates a block of memory described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Deallocates a block previously returned by
    /// [`allocate`](RawAllocator::allocate) on this same allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with this exact
    /// `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The default allocation strategy: the process-global Rust allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

// SAFETY: forwards directly to the global allocator's contract.
unsafe impl RawAllocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0);
        // SAFETY: the layout is non-zero-sized per this trait's contract.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr came from `allocate` with `layout`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
    }
}
