#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::hint::black_box;
use std::marker::PhantomData;
use tuplevec::{ColumnTuple, Columns, TupleVec};
use tuplevec_derive::Columns as ColumnsDerive;

#[derive(ColumnsDerive, Debug, Clone, PartialEq, Arbitrary)]
struct PlainStruct {
    x: i32,
    y: u64,
    z: i16,
}

#[derive(ColumnsDerive, Debug, Clone, PartialEq, Arbitrary)]
struct MixedStruct {
    id: u32,
    name: String,
    values: Vec<i32>,
    count: u16,
}

#[derive(ColumnsDerive, Debug, Clone, PartialEq, Arbitrary)]
struct HeapOnlyStruct {
    text: String,
    data: Vec<u8>,
    more_data: Vec<String>,
}

// A Vec shattered into raw parts: its columns cannot be dropped
// individually, so it exercises the MUST_DROP_AS_SELF path.
struct VecParts {
    ptr: *mut u32,
    length: usize,
    capacity: usize,
}

impl From<Vec<u32>> for VecParts {
    fn from(mut value: Vec<u32>) -> Self {
        let ptr = value.as_mut_ptr();
        let length = value.len();
        let capacity = value.capacity();

        core::mem::forget(value);

        VecParts {
            ptr,
            length,
            capacity,
        }
    }
}

impl From<VecParts> for Vec<u32> {
    fn from(value: VecParts) -> Self {
        let ptr = value.ptr;
        let length = value.length;
        let capacity = value.capacity;

        core::mem::forget(value);

        unsafe { Vec::from_raw_parts(ptr, length, capacity) }
    }
}

impl Drop for VecParts {
    fn drop(&mut self) {
        let _ = unsafe { Vec::from_raw_parts(self.ptr, self.length, self.capacity) };
    }
}

#[allow(dead_code)]
struct VecPartsRef<'soa> {
    pub ptr: &'soa *mut u32,
    pub length: &'soa usize,
    pub capacity: &'soa usize,
}
impl<'soa> Copy for VecPartsRef<'soa> {}

impl<'soa> Clone for VecPartsRef<'soa> {
    fn clone(&self) -> Self {
        *self
    }
}

#[allow(dead_code)]
struct VecPartsMut<'soa> {
    pub ptr: &'soa mut *mut u32,
    pub length: &'soa mut usize,
    pub capacity: &'soa mut usize,
}

#[allow(dead_code)]
struct VecPartsSlice<'soa> {
    pub ptr: &'soa [*mut u32],
    pub length: &'soa [usize],
    pub capacity: &'soa [usize],
}
impl<'soa> Copy for VecPartsSlice<'soa> {}

impl<'soa> Clone for VecPartsSlice<'soa> {
    fn clone(&self) -> Self {
        *self
    }
}

#[allow(dead_code)]
struct VecPartsSliceMut<'soa> {
    pub ptr: &'soa mut [*mut u32],
    pub length: &'soa mut [usize],
    pub capacity: &'soa mut [usize],
}

unsafe impl Columns for VecParts {
    const MUST_DROP_AS_SELF: bool = true;
    type ColumnRepr = (*mut u32, usize, usize);
    type Ref<'soa>
        = VecPartsRef<'soa>
    where
        Self: 'soa;
    type Mut<'soa>
        = VecPartsMut<'soa>
    where
        Self: 'soa;
    type Slice<'soa>
        = VecPartsSlice<'soa>
    where
        Self: 'soa;
    type SliceMut<'soa>
        = VecPartsSliceMut<'soa>
    where
        Self: 'soa;

    fn into_columns(value: Self) -> Self::ColumnRepr {
        let ptr = value.ptr;
        let length = value.length;
        let capacity = value.capacity;
        core::mem::forget(value);
        (ptr, length, capacity)
    }

    fn from_columns(value: Self::ColumnRepr) -> Self {
        let (ptr, length, capacity) = value;
        Self {
            ptr,
            length,
            capacity,
        }
    }

    fn as_ref<'soa>(
        _: PhantomData<&'soa Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
    ) -> Self::Ref<'soa> {
        let (ptr, length, capacity) = value;
        unsafe {
            VecPartsRef {
                ptr: ptr.as_ref(),
                length: length.as_ref(),
                capacity: capacity.as_ref(),
            }
        }
    }

    fn as_mut<'soa>(
        _: PhantomData<&'soa mut Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
    ) -> Self::Mut<'soa> {
        let (mut ptr, mut length, mut capacity) = value;
        unsafe {
            VecPartsMut {
                ptr: ptr.as_mut(),
                length: length.as_mut(),
                capacity: capacity.as_mut(),
            }
        }
    }

    fn as_slice<'soa>(
        _: PhantomData<&'soa Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
        len: u32,
    ) -> Self::Slice<'soa> {
        let len = len as usize;
        let (ptr, length, capacity) = value;
        unsafe {
            VecPartsSlice {
                ptr: core::slice::from_raw_parts(ptr.as_ptr(), len),
                length: core::slice::from_raw_parts(length.as_ptr(), len),
                capacity: core::slice::from_raw_parts(capacity.as_ptr(), len),
            }
        }
    }

    fn as_mut_slice<'soa>(
        _: PhantomData<&'soa mut Self>,
        value: <Self::ColumnRepr as ColumnTuple>::Pointers,
        len: u32,
    ) -> Self::SliceMut<'soa> {
        let len = len as usize;
        let (ptr, length, capacity) = value;
        unsafe {
            VecPartsSliceMut {
                ptr: core::slice::from_raw_parts_mut(ptr.as_ptr(), len),
                length: core::slice::from_raw_parts_mut(length.as_ptr(), len),
                capacity: core::slice::from_raw_parts_mut(capacity.as_ptr(), len),
            }
        }
    }
}

#[derive(Arbitrary, Debug)]
enum VecOp<T> {
    Push(T),
    Pop,
    Insert { index: u32, value: T },
    Remove { index: u32 },
    SwapRemove { index: u32 },
    EraseRange { start: u32, count: u32 },
    Truncate { len: u32 },
    Reserve { additional: u32 },
    ShrinkToFit,
    Clear,
    Get { index: u32 },
    GetMut { index: u32 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    plain_ops: Vec<VecOp<PlainStruct>>,
    mixed_ops: Vec<VecOp<MixedStruct>>,
    heap_only_ops: Vec<VecOp<HeapOnlyStruct>>,
    raw_vec_ops: Vec<VecOp<Vec<u32>>>,
}

fn execute_ops<T: Columns, U: Into<T> + Clone>(vec: &mut TupleVec<T>, ops: &[VecOp<U>]) {
    for op in ops {
        match op {
            VecOp::Push(item) => {
                let _ = vec.push(item.clone().into());
            }
            VecOp::Pop => {
                let _ = vec.pop();
            }
            VecOp::Insert { index, value } => {
                // Keep the index in bounds; out-of-bounds inserts panic
                // by contract and are tested elsewhere.
                let index = index % (vec.len() + 1);
                let _ = vec.insert(index, value.clone().into());
            }
            VecOp::Remove { index } => {
                if !vec.is_empty() {
                    let _ = vec.remove(index % vec.len());
                }
            }
            VecOp::SwapRemove { index } => {
                if !vec.is_empty() {
                    let _ = vec.swap_remove(index % vec.len());
                }
            }
            VecOp::EraseRange { start, count } => {
                let start = start % (vec.len() + 1);
                let end = (start.saturating_add(*count)).min(vec.len());
                vec.erase_range(start..end);
            }
            VecOp::Truncate { len } => {
                vec.truncate(*len);
            }
            VecOp::Reserve { additional } => {
                let safe_additional = (*additional).min(1_000_000);
                let _ = vec.reserve(safe_additional);
            }
            VecOp::ShrinkToFit => {
                let _ = vec.shrink_to_fit();
            }
            VecOp::Clear => {
                vec.clear();
            }
            VecOp::Get { index } => {
                black_box(vec.get(*index));
            }
            VecOp::GetMut { index } => {
                if let Some(mut item_ref) = vec.get_mut(*index) {
                    black_box(&item_ref);
                    black_box(&mut item_ref);
                }
            }
        }

        assert!(
            vec.len() <= vec.capacity(),
            "Length should not exceed capacity"
        );
        assert!(vec.validate(), "Container invariants should hold");
    }
}

fuzz_target!(|input: FuzzInput| {
    let mut plain_vec: TupleVec<PlainStruct> = TupleVec::new();
    execute_ops(&mut plain_vec, &input.plain_ops);

    let mut mixed_vec: TupleVec<MixedStruct> = TupleVec::new();
    execute_ops(&mut mixed_vec, &input.mixed_ops);

    let mut heap_only_vec: TupleVec<HeapOnlyStruct> = TupleVec::new();
    execute_ops(&mut heap_only_vec, &input.heap_only_ops);

    let mut raw_vec: TupleVec<VecParts> = TupleVec::new();
    execute_ops(&mut raw_vec, &input.raw_vec_ops);
});
