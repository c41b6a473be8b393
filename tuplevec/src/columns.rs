// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::{
    alloc::{Layout, LayoutError},
    marker::PhantomData,
    ptr::{NonNull, drop_in_place},
};

/// Describes a row type that a [`TupleVec`](crate::TupleVec) can store in
/// Struct-of-Arrays form.
///
/// The trait maps the row to a [`ColumnRepr`](Columns::ColumnRepr) — a
/// plain tuple whose fields become the columns of the vector — and names
/// the borrowed view types handed out when the row is accessed inside the
/// vector. Tuples of one through six elements implement `Columns` out of
/// the box; structs can derive it with `#[derive(Columns)]` from the
/// `tuplevec_derive` crate, which also generates named `Ref`/`Mut`/
/// `Slice`/`SliceMut` wrapper structs so columns can be addressed by field
/// name with zero runtime cost.
///
/// # Safety
///
/// 1. The row must be safely droppable column-wise, **or**
///    [`MUST_DROP_AS_SELF`](Columns::MUST_DROP_AS_SELF) must be set. When
///    it is set, the vector reads each dropped row back onto the stack and
///    drops it as `Self`.
/// 2. The row's internal invariants must be upheld by the `Ref`, `Mut`,
///    `Slice`, and `SliceMut` types. If mutating one column in isolation
///    could break an invariant, that column's mutable reference must not
///    be exposed by the view types.
/// 3. Cloning the `ColumnRepr` column-wise (when its fields are `Clone`)
///    must be equivalent to cloning `Self`; rows for which this does not
///    hold must use column types that are not `Clone`, which keeps the
///    vector's `Clone`/`try_clone` unavailable for them.
///
/// # When to implement manually
///
/// Enums, unions, and structs with cross-field invariants need a manual
/// implementation so that the view types cannot be used to break them.
/// A row with a custom `Drop` must also be implemented manually: move the
/// value into `ManuallyDrop` inside
/// [`into_columns`](Columns::into_columns), read the fields out, and set
/// `MUST_DROP_AS_SELF` so the vector reconstitutes the row before
/// dropping it.
pub unsafe trait Columns: Sized {
    /// The row split into its columns, as a tuple recognised by
    /// [`ColumnTuple`].
    ///
    /// The tuple does not have to mirror the declaration order of the
    /// original type, but larger-alignment columns should come first so
    /// the shared allocation needs no padding between column arrays.
    type ColumnRepr: ColumnTuple;

    /// Set to true if the row must be read out of the vector and dropped
    /// as `Self` rather than column by column.
    const MUST_DROP_AS_SELF: bool = false;

    /// Borrowed view of one row: one shared reference per column.
    type Ref<'a>: Copy
    where
        Self: 'a;

    /// Exclusive borrowed view of one row: one mutable reference per
    /// column.
    type Mut<'a>
    where
        Self: 'a;

    /// Borrowed view of the whole vector: one shared slice per column.
    type Slice<'a>: Copy
    where
        Self: 'a;

    /// Exclusive borrowed view of the whole vector: one mutable slice per
    /// column.
    type SliceMut<'a>
    where
        Self: 'a;

    /// Take ownership of the row and split it into its columns. The result
    /// is written straight into the vector, which has already been checked
    /// to have room for it.
    fn into_columns(value: Self) -> Self::ColumnRepr;

    /// Reassemble a row from its columns. The result is immediately handed
    /// to the caller or dropped.
    fn from_columns(value: Self::ColumnRepr) -> Self;

    /// Convert a tuple of column pointers into [`Ref`](Columns::Ref).
    ///
    /// This must only perform the conversion; the generated code should be
    /// a no-op.
    fn as_ref<'a>(
        _: PhantomData<&'a Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
    ) -> Self::Ref<'a>;

    /// Convert a tuple of column pointers into [`Mut`](Columns::Mut).
    fn as_mut<'a>(
        _: PhantomData<&'a mut Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
    ) -> Self::Mut<'a>;

    /// Convert a tuple of column base pointers plus a length into
    /// [`Slice`](Columns::Slice).
    fn as_slice<'a>(
        _: PhantomData<&'a Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
        len: u32,
    ) -> Self::Slice<'a>;

    /// Convert a tuple of column base pointers plus a length into
    /// [`SliceMut`](Columns::SliceMut).
    fn as_mut_slice<'a>(
        _: PhantomData<&'a mut Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
        len: u32,
    ) -> Self::SliceMut<'a>;
}

/// Low-level operations on a Struct-of-Arrays allocation of a column
/// tuple.
///
/// Implementations exist for tuples of one through six elements; they are
/// generated by a local macro so every arity behaves identically. All
/// methods treat the allocation as `N` independent column arrays laid out
/// back to back in one buffer: column 0 starts at offset 0 and every
/// later column starts at the previous column's end rounded up to its own
/// alignment. One `capacity` value governs all columns.
pub trait ColumnTuple: Sized {
    /// Byte offset of each column's array within the shared allocation.
    /// Entry 0 belongs to column 0 and is always zero.
    type Offsets: Copy;
    /// One typed pointer per column, all referring to the same row index.
    type Pointers: Copy;

    /// True when every column is zero-sized. Such tuples never allocate
    /// and the vector reports an unbounded capacity for them.
    const IS_DATALESS: bool;

    /// Compute the layout of a Struct-of-Arrays allocation holding
    /// `capacity` rows. The resulting alignment is the maximum column
    /// alignment; a zero capacity yields a zero-size layout.
    fn layout(capacity: u32) -> Result<Layout, LayoutError>;

    /// Compute the per-column byte offsets for an allocation of
    /// `capacity` rows. Callers must only pass capacities for which
    /// [`layout`](ColumnTuple::layout) succeeded.
    fn offsets(capacity: u32) -> Self::Offsets;

    /// Check that the offsets computed for `capacity` respect each
    /// column's alignment and that every column array fits inside the
    /// computed layout. Used by debug-mode container validation only.
    fn layout_is_consistent(capacity: u32) -> bool;

    /// Resolve the column pointers for row `index` within the allocation
    /// at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to an allocation laid out for `capacity` rows
    /// (or be the aligned dangling pointer of an unallocated vector, in
    /// which case the result must not be read through), and `index` must
    /// be within that capacity.
    unsafe fn pointers(base: NonNull<u8>, index: u32, capacity: u32) -> Self::Pointers;

    /// The column-0 pointer, type-erased. Two pointer bundles over the
    /// same allocation agree on this value, which makes it usable as a
    /// storage-generation witness for iterator comparison and validation.
    fn first_pointer(ptrs: Self::Pointers) -> NonNull<u8>;

    /// Advance every column pointer by `offset` rows.
    ///
    /// # Safety
    ///
    /// The adjusted pointers must stay within (or one past) each column's
    /// array.
    unsafe fn add(ptrs: Self::Pointers, offset: u32) -> Self::Pointers;

    /// Read the row at `index` as a by-value tuple, leaving the memory
    /// unchanged.
    ///
    /// # Safety
    ///
    /// `base`/`capacity` as for [`pointers`](ColumnTuple::pointers), and
    /// the row at `index` must be initialized in every column. The result
    /// is a bitwise copy: using both it and the slot afterwards violates
    /// memory safety for non-`Copy` columns.
    #[must_use]
    unsafe fn read(base: NonNull<u8>, index: u32, capacity: u32) -> Self;

    /// Move `src` into the row at `index` without reading or dropping the
    /// previous contents of the slot.
    ///
    /// # Safety
    ///
    /// `base`/`capacity` as for [`pointers`](ColumnTuple::pointers);
    /// `index` must be within capacity. Overwriting an initialized row
    /// leaks it.
    unsafe fn write(base: NonNull<u8>, src: Self, index: u32, capacity: u32);

    /// Copy `count` rows from `src` to `dst` column by column. The ranges
    /// may overlap within a column; this is the shift primitive behind
    /// insert and erase.
    ///
    /// # Safety
    ///
    /// Both pointer bundles must be valid for `count` rows, `src`
    /// readable and `dst` writable.
    unsafe fn copy(src: Self::Pointers, dst: Self::Pointers, count: u32);

    /// Move `count` rows from `src` into the uninitialized range at
    /// `dst`, column by column. The source slots are left logically
    /// uninitialized: they must never be read or dropped again. This is
    /// the relocation primitive used when the vector moves its contents
    /// into a new allocation.
    ///
    /// # Safety
    ///
    /// The ranges must not overlap; `src` must hold `count` initialized
    /// rows and `dst` must have room for them.
    unsafe fn relocate(src: Self::Pointers, dst: Self::Pointers, count: u32);

    /// Drop `len` rows in place, column by column.
    ///
    /// # Safety
    ///
    /// The pointed-to ranges must hold `len` initialized rows and must
    /// not be used afterwards.
    unsafe fn drop_in_place(ptrs: Self::Pointers, len: u32);
}

/// Column tuples whose every column can be default-constructed. Backs
/// default-filling `push_default` and the growing half of `resize`.
pub trait ColumnTupleDefault: ColumnTuple {
    /// Write `count` default-constructed rows into the uninitialized
    /// slots at `ptrs`.
    ///
    /// # Safety
    ///
    /// Every column must have `count` writable, uninitialized slots at
    /// the pointed-to positions.
    unsafe fn write_default(ptrs: Self::Pointers, count: u32);
}

/// Column tuples whose every column can be cloned. Backs `try_clone` and
/// the buffer-duplicating assign paths.
///
/// Per the [`Columns`] safety contract, a column-wise clone of the tuple
/// must be equivalent to cloning the original row.
pub trait ColumnTupleClone: ColumnTuple {
    /// Clone `count` rows from `src` into the uninitialized range at
    /// `dst`.
    ///
    /// # Safety
    ///
    /// The ranges must not overlap; `src` must hold `count` initialized
    /// rows and every `dst` column must have `count` writable slots.
    unsafe fn clone_to(src: Self::Pointers, dst: Self::Pointers, count: u32);
}

/// Positional column lookup: resolves column `I` of a tuple to its
/// element type at compile time. An out-of-range `I` has no
/// implementation and is rejected by the compiler.
pub trait ColumnAt<const I: usize>: ColumnTuple {
    /// The element type stored in column `I`.
    type Column;

    /// The typed pointer for column `I` out of a pointer bundle.
    fn column(ptrs: Self::Pointers) -> NonNull<Self::Column>;
}

/// Type-based column lookup: resolves the single column holding element
/// type `C`.
///
/// The `M` parameter is a position marker ([`Col0`]..[`Col5`]) that the
/// compiler infers. When `C` appears in exactly one column the marker is
/// unambiguous and lookup succeeds; when two columns share the type the
/// inference is ambiguous and the call is rejected at compile time, so a
/// duplicated column type can still be used positionally but never by
/// type.
pub trait ColumnSelect<C, M>: ColumnTuple {
    /// The typed pointer for the column holding `C`.
    fn select(ptrs: Self::Pointers) -> NonNull<C>;
}

/// Position marker for [`ColumnSelect`].
pub struct Col0;
/// Position marker for [`ColumnSelect`].
pub struct Col1;
/// Position marker for [`ColumnSelect`].
pub struct Col2;
/// Position marker for [`ColumnSelect`].
pub struct Col3;
/// Position marker for [`ColumnSelect`].
pub struct Col4;
/// Position marker for [`ColumnSelect`].
pub struct Col5;

/// Drops rows `[from, to)` of the allocation at `base`, honouring
/// [`Columns::MUST_DROP_AS_SELF`].
///
/// # Safety
///
/// `base` must point to an allocation laid out for `capacity` rows whose
/// `[from, to)` range is initialized in every column; the range must not
/// be used afterwards.
pub(crate) unsafe fn drop_rows<T: Columns>(base: NonNull<u8>, capacity: u32, from: u32, to: u32) {
    if from == to {
        return;
    }
    if T::MUST_DROP_AS_SELF {
        for index in from..to {
            // SAFETY: reads each row out without altering the backing
            // memory; the range is never touched again per the caller
            // guarantee.
            let _ = T::from_columns(unsafe { T::ColumnRepr::read(base, index, capacity) });
        }
    } else if const { core::mem::needs_drop::<T::ColumnRepr>() } {
        // SAFETY: caller guarantee.
        unsafe {
            let ptrs = T::ColumnRepr::pointers(base, from, capacity);
            T::ColumnRepr::drop_in_place(ptrs, to - from);
        }
    }
}

#[inline]
fn extend_array<T>(layout: Layout, cap: u32) -> Result<(Layout, usize), LayoutError> {
    layout.extend(array_layout::<T>(cap)?)
}

#[inline]
fn array_layout<T>(cap: u32) -> Result<Layout, LayoutError> {
    let elem_layout = Layout::new::<T>();
    Layout::from_size_align(elem_layout.size() * cap as usize, elem_layout.align())
}

/// Generates the [`ColumnTuple`] family for one tuple arity. The first
/// field is listed separately because its offset is always zero; every
/// other field carries its tuple index.
macro_rules! impl_column_tuple {
    ($n:literal; ($T0:ident $s0:ident $d0:ident) $(, ($T:ident $s:ident $d:ident $idx:tt))* $(,)?) => {
        impl<$T0, $($T),*> ColumnTuple for ($T0, $($T,)*) {
            type Offsets = [usize; $n];
            type Pointers = (NonNull<$T0>, $(NonNull<$T>,)*);

            const IS_DATALESS: bool = size_of::<$T0>() == 0 $(&& size_of::<$T>() == 0)*;

            fn layout(capacity: u32) -> Result<Layout, LayoutError> {
                let layout = array_layout::<$T0>(capacity)?;
                $(let (layout, _) = extend_array::<$T>(layout, capacity)?;)*
                Ok(layout.pad_to_align())
            }

            fn offsets(capacity: u32) -> Self::Offsets {
                #[allow(unused_mut)]
                let mut offsets = [0usize; $n];
                // SAFETY: callers only pass capacities that already
                // produced a valid layout.
                let layout = unsafe { array_layout::<$T0>(capacity).unwrap_unchecked() };
                $(
                    // SAFETY: as above.
                    let (layout, offset) =
                        unsafe { extend_array::<$T>(layout, capacity).unwrap_unchecked() };
                    offsets[$idx] = offset;
                )*
                let _ = layout;
                offsets
            }

            fn layout_is_consistent(capacity: u32) -> bool {
                let Ok(layout) = Self::layout(capacity) else {
                    return false;
                };
                let offsets = Self::offsets(capacity);
                let mut ok = true;
                ok &= offsets[0] == 0 && size_of::<$T0>() * capacity as usize <= layout.size();
                $(
                    ok &= offsets[$idx] % align_of::<$T>() == 0
                        && offsets[$idx] + size_of::<$T>() * capacity as usize <= layout.size();
                )*
                ok
            }

            unsafe fn pointers(base: NonNull<u8>, index: u32, capacity: u32) -> Self::Pointers {
                let _offsets = Self::offsets(capacity);
                // SAFETY: caller guarantees base is laid out for capacity
                // and index lies within it.
                unsafe {
                    let $s0 = base.cast::<$T0>().add(index as usize);
                    debug_assert!($s0.is_aligned());
                    $(
                        let $s = base
                            .byte_add(_offsets[$idx])
                            .cast::<$T>()
                            .add(index as usize);
                        debug_assert!($s.is_aligned());
                    )*
                    ($s0, $($s,)*)
                }
            }

            fn first_pointer(ptrs: Self::Pointers) -> NonNull<u8> {
                ptrs.0.cast()
            }

            unsafe fn add(ptrs: Self::Pointers, offset: u32) -> Self::Pointers {
                let ($s0, $($s,)*) = ptrs;
                // SAFETY: caller guarantees the adjusted pointers stay in
                // bounds of each column array.
                unsafe { ($s0.add(offset as usize), $($s.add(offset as usize),)*) }
            }

            unsafe fn read(base: NonNull<u8>, index: u32, capacity: u32) -> Self {
                // SAFETY: caller guarantee.
                unsafe {
                    let ($s0, $($s,)*) = Self::pointers(base, index, capacity);
                    ($s0.read(), $($s.read(),)*)
                }
            }

            unsafe fn write(base: NonNull<u8>, src: Self, index: u32, capacity: u32) {
                let ($d0, $($d,)*) = src;
                // SAFETY: caller guarantee.
                unsafe {
                    let ($s0, $($s,)*) = Self::pointers(base, index, capacity);
                    $s0.write($d0);
                    $($s.write($d);)*
                }
            }

            unsafe fn copy(src: Self::Pointers, dst: Self::Pointers, count: u32) {
                if size_of::<Self>() == 0 || count == 0 {
                    return;
                }
                let ($s0, $($s,)*) = src;
                let ($d0, $($d,)*) = dst;
                // SAFETY: caller guarantees count rows readable at src and
                // writable at dst; ptr::copy tolerates overlap.
                unsafe {
                    core::ptr::copy($s0.as_ptr(), $d0.as_ptr(), count as usize);
                    $(core::ptr::copy($s.as_ptr(), $d.as_ptr(), count as usize);)*
                }
            }

            unsafe fn relocate(src: Self::Pointers, dst: Self::Pointers, count: u32) {
                if size_of::<Self>() == 0 || count == 0 {
                    return;
                }
                let ($s0, $($s,)*) = src;
                let ($d0, $($d,)*) = dst;
                // SAFETY: caller guarantees disjoint ranges with count
                // initialized rows at src and room at dst; the source is
                // treated as uninitialized afterwards, so this is a move.
                unsafe {
                    core::ptr::copy_nonoverlapping($s0.as_ptr(), $d0.as_ptr(), count as usize);
                    $(core::ptr::copy_nonoverlapping($s.as_ptr(), $d.as_ptr(), count as usize);)*
                }
            }

            unsafe fn drop_in_place(ptrs: Self::Pointers, len: u32) {
                assert!(core::mem::needs_drop::<Self>());
                let ($s0, $($s,)*) = ptrs;
                if core::mem::needs_drop::<$T0>() {
                    // SAFETY: caller guarantee.
                    unsafe {
                        drop_in_place(core::ptr::slice_from_raw_parts_mut(
                            $s0.as_ptr(),
                            len as usize,
                        ));
                    }
                }
                $(
                    if core::mem::needs_drop::<$T>() {
                        // SAFETY: caller guarantee.
                        unsafe {
                            drop_in_place(core::ptr::slice_from_raw_parts_mut(
                                $s.as_ptr(),
                                len as usize,
                            ));
                        }
                    }
                )*
            }
        }

        impl<$T0: Default, $($T: Default),*> ColumnTupleDefault for ($T0, $($T,)*) {
            unsafe fn write_default(ptrs: Self::Pointers, count: u32) {
                let ($s0, $($s,)*) = ptrs;
                for offset in 0..count as usize {
                    // SAFETY: caller guarantees count writable slots per
                    // column.
                    unsafe {
                        $s0.add(offset).write($T0::default());
                        $($s.add(offset).write($T::default());)*
                    }
                }
            }
        }

        impl<$T0: Clone, $($T: Clone),*> ColumnTupleClone for ($T0, $($T,)*) {
            unsafe fn clone_to(src: Self::Pointers, dst: Self::Pointers, count: u32) {
                let ($s0, $($s,)*) = src;
                let ($d0, $($d,)*) = dst;
                for offset in 0..count as usize {
                    // SAFETY: caller guarantees count initialized rows at
                    // src and count writable slots at dst, disjoint.
                    unsafe {
                        $d0.add(offset).write($s0.add(offset).as_ref().clone());
                        $($d.add(offset).write($s.add(offset).as_ref().clone());)*
                    }
                }
            }
        }

        // SAFETY: a bare tuple has no cross-field invariants and its
        // fields drop independently.
        unsafe impl<$T0, $($T),*> Columns for ($T0, $($T,)*) {
            type ColumnRepr = Self;

            type Ref<'a>
                = (&'a $T0, $(&'a $T,)*)
            where
                Self: 'a;

            type Mut<'a>
                = (&'a mut $T0, $(&'a mut $T,)*)
            where
                Self: 'a;

            type Slice<'a>
                = (&'a [$T0], $(&'a [$T],)*)
            where
                Self: 'a;

            type SliceMut<'a>
                = (&'a mut [$T0], $(&'a mut [$T],)*)
            where
                Self: 'a;

            fn into_columns(value: Self) -> Self::ColumnRepr {
                value
            }

            fn from_columns(value: Self::ColumnRepr) -> Self {
                value
            }

            fn as_ref<'a>(
                _: PhantomData<&'a Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
            ) -> Self::Ref<'a> {
                let ($s0, $($s,)*) = value;
                // SAFETY: the vector hands out pointers to initialized
                // rows it borrows for 'a.
                unsafe { ($s0.as_ref(), $($s.as_ref(),)*) }
            }

            fn as_mut<'a>(
                _: PhantomData<&'a mut Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
            ) -> Self::Mut<'a> {
                #[allow(unused_mut)]
                let (mut $s0, $(mut $s,)*) = value;
                // SAFETY: as in as_ref, with exclusive access for 'a.
                unsafe { ($s0.as_mut(), $($s.as_mut(),)*) }
            }

            fn as_slice<'a>(
                _: PhantomData<&'a Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
                len: u32,
            ) -> Self::Slice<'a> {
                let len = len as usize;
                let ($s0, $($s,)*) = value;
                // SAFETY: the vector hands out base pointers paired with
                // its own length; all len rows are initialized.
                unsafe {
                    (
                        core::slice::from_raw_parts($s0.as_ptr(), len),
                        $(core::slice::from_raw_parts($s.as_ptr(), len),)*
                    )
                }
            }

            fn as_mut_slice<'a>(
                _: PhantomData<&'a mut Self>,
                value: <Self::ColumnRepr as ColumnTuple>::Pointers,
                len: u32,
            ) -> Self::SliceMut<'a> {
                let len = len as usize;
                let ($s0, $($s,)*) = value;
                // SAFETY: as in as_slice, with exclusive access for 'a.
                unsafe {
                    (
                        core::slice::from_raw_parts_mut($s0.as_ptr(), len),
                        $(core::slice::from_raw_parts_mut($s.as_ptr(), len),)*
                    )
                }
            }
        }
    };
}

/// Generates the positional ([`ColumnAt`]) and type-based
/// ([`ColumnSelect`]) lookup impls for one column of one tuple arity.
macro_rules! impl_column_lookup {
    ([$($All:ident),+] $idx:tt $M:ident $T:ident) => {
        impl<$($All),+> ColumnAt<$idx> for ($($All,)+) {
            type Column = $T;

            fn column(ptrs: Self::Pointers) -> NonNull<$T> {
                ptrs.$idx
            }
        }

        impl<$($All),+> ColumnSelect<$T, $M> for ($($All,)+) {
            fn select(ptrs: Self::Pointers) -> NonNull<$T> {
                ptrs.$idx
            }
        }
    };
}

impl_column_tuple!(1; (A sa da));
impl_column_tuple!(2; (A sa da), (B sb db 1));
impl_column_tuple!(3; (A sa da), (B sb db 1), (C sc dc 2));
impl_column_tuple!(4; (A sa da), (B sb db 1), (C sc dc 2), (D sd dd 3));
impl_column_tuple!(5; (A sa da), (B sb db 1), (C sc dc 2), (D sd dd 3), (E se de 4));
impl_column_tuple!(6; (A sa da), (B sb db 1), (C sc dc 2), (D sd dd 3), (E se de 4), (F sf df 5));

impl_column_lookup!([A] 0 Col0 A);

impl_column_lookup!([A, B] 0 Col0 A);
impl_column_lookup!([A, B] 1 Col1 B);

impl_column_lookup!([A, B, C] 0 Col0 A);
impl_column_lookup!([A, B, C] 1 Col1 B);
impl_column_lookup!([A, B, C] 2 Col2 C);

impl_column_lookup!([A, B, C, D] 0 Col0 A);
impl_column_lookup!([A, B, C, D] 1 Col1 B);
impl_column_lookup!([A, B, C, D] 2 Col2 C);
impl_column_lookup!([A, B, C, D] 3 Col3 D);

impl_column_lookup!([A, B, C, D, E] 0 Col0 A);
impl_column_lookup!([A, B, C, D, E] 1 Col1 B);
impl_column_lookup!([A, B, C, D, E] 2 Col2 C);
impl_column_lookup!([A, B, C, D, E] 3 Col3 D);
impl_column_lookup!([A, B, C, D, E] 4 Col4 E);

impl_column_lookup!([A, B, C, D, E, F] 0 Col0 A);
impl_column_lookup!([A, B, C, D, E, F] 1 Col1 B);
impl_column_lookup!([A, B, C, D, E, F] 2 Col2 C);
impl_column_lookup!([A, B, C, D, E, F] 3 Col3 D);
impl_column_lookup!([A, B, C, D, E, F] 4 Col4 E);
impl_column_lookup!([A, B, C, D, E, F] 5 Col5 F);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_respect_alignment() {
        type Repr = (u8, u64, u16);
        for capacity in [1u32, 2, 3, 7, 64] {
            assert!(Repr::layout_is_consistent(capacity));
            let offsets = Repr::offsets(capacity);
            assert_eq!(offsets[0], 0);
            assert_eq!(offsets[1] % align_of::<u64>(), 0);
            assert_eq!(offsets[2] % align_of::<u16>(), 0);
            assert!(offsets[1] >= capacity as usize);
            assert!(offsets[2] >= offsets[1] + 8 * capacity as usize);
        }
    }

    #[test]
    fn zero_capacity_layout_is_empty() {
        type Repr = (u32, u64);
        let layout = Repr::layout(0).unwrap();
        assert_eq!(layout.size(), 0);
        assert_eq!(layout.align(), align_of::<u64>());
        assert_eq!(Repr::offsets(0), [0, 0]);
    }

    #[test]
    fn overall_alignment_is_max_column_alignment() {
        let layout = <(u8, u16, u64)>::layout(5).unwrap();
        assert_eq!(layout.align(), align_of::<u64>());
        let layout = <(u8,)>::layout(5).unwrap();
        assert_eq!(layout.align(), 1);
    }

    #[test]
    fn dataless_detection() {
        assert!(<((), ())>::IS_DATALESS);
        assert!(!<((), u8)>::IS_DATALESS);
        assert!(!<(u32, u64, u16)>::IS_DATALESS);
    }
}
