// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Creates a [`TupleVec`](crate::TupleVec) containing the given rows.
///
/// `tuplevec!` allows `TupleVec`s to be defined with the same syntax as
/// array expressions. The non-empty forms return a `Result` because the
/// initial allocation can fail; both request exactly the capacity needed
/// for the listed rows.
///
/// - Create a `TupleVec` from a list of rows:
///
/// ```
/// use tuplevec::tuplevec;
///
/// let vec = tuplevec![(1u32, 'a'), (2, 'b'), (3, 'c')].unwrap();
/// assert_eq!(vec.get(1), Some((&2, &'b')));
/// ```
///
/// - Create a `TupleVec` from a row and a count:
///
/// ```
/// use tuplevec::tuplevec;
///
/// let vec = tuplevec![(0u8, 0u64); 5].unwrap();
/// assert_eq!(vec.len(), 5);
/// ```
#[macro_export]
macro_rules! tuplevec {
    () => {
        $crate::TupleVec::new()
    };
    ($row:expr; $n:expr) => {
        $crate::TupleVec::from_elem($row, $n)
    };
    ($($row:expr),+ $(,)?) => {
        $crate::TupleVec::try_from_iter([$($row),+])
    };
}
