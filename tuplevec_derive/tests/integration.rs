// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]
use tuplevec_derive::Columns;

#[derive(Columns)]
struct TestStruct {
    a: u32,
    b: u64,
}

#[derive(Columns)]
struct TestStructThreeFields {
    x: i32,
    y: f64,
    z: bool,
}

#[derive(Columns)]
struct GenericStruct<T, U> {
    first: T,
    second: U,
}

#[derive(Columns)]
struct TupleStruct(u32, f64, String);

#[derive(Columns)]
struct StructWithLen {
    a: usize,
    // `len` must not collide with anything in the macro expansion
    len: usize,
}

#[derive(Columns)]
struct WithLifetime<'a> {
    data: &'a str,
    count: u32,
}

#[derive(Columns)]
pub(crate) struct CrateVisible {
    pub(crate) left: i32,
    pub(crate) right: i32,
}

#[test]
fn derive_compiles() {
    // If this compiles, the derive macro worked.
    let _s = TestStruct { a: 1, b: 2 };
    let _s3 = TestStructThreeFields {
        x: 1,
        y: 2.0,
        z: true,
    };
}

#[test]
fn columns_trait_implemented() {
    use tuplevec::Columns;

    let test_struct = TestStruct { a: 42, b: 100 };
    let columns = Columns::into_columns(test_struct);
    assert_eq!(columns, (42, 100));

    let back = TestStruct::from_columns((99, 200));
    assert_eq!(back.a, 99);
    assert_eq!(back.b, 200);
}

#[test]
fn generic_struct_round_trip() {
    use tuplevec::Columns;

    let generic = GenericStruct {
        first: "hello",
        second: 3.21,
    };
    let columns = Columns::into_columns(generic);
    assert_eq!(columns, ("hello", 3.21));

    let back = GenericStruct::from_columns(("world", 2.71));
    assert_eq!(back.first, "world");
    assert_eq!(back.second, 2.71);
}

#[test]
fn tuple_struct_round_trip() {
    use tuplevec::Columns;

    let tuple_struct = TupleStruct(7, 3.41, "test".to_string());
    let columns = Columns::into_columns(tuple_struct);
    assert_eq!(columns, (7, 3.41, "test".to_string()));

    let back = TupleStruct::from_columns((42, 2.71, "hello".to_string()));
    assert_eq!(back.0, 42);
    assert_eq!(back.1, 2.71);
    assert_eq!(back.2, "hello".to_string());
}

#[test]
fn len_field_does_not_collide() {
    use tuplevec::Columns;

    let value = StructWithLen { a: 5, len: 8 };
    let columns = Columns::into_columns(value);
    assert_eq!(columns, (5, 8));

    let back = StructWithLen::from_columns((9, 12));
    assert_eq!(back.a, 9);
    assert_eq!(back.len, 12);
}

#[test]
fn named_views_in_a_vector() {
    let mut vec = tuplevec::TupleVec::<TestStruct>::new();
    vec.push(TestStruct { a: 1, b: 10 }).unwrap();
    vec.push(TestStruct { a: 2, b: 20 }).unwrap();

    let first = vec.get(0).unwrap();
    assert_eq!(first.a, &1);
    assert_eq!(first.b, &10);

    let second = vec.get_mut(1).unwrap();
    *second.b += 2;

    let TestStructSlice { a, b } = vec.as_slice();
    assert_eq!(a, &[1, 2]);
    assert_eq!(b, &[10, 22]);

    let TestStructSliceMut { a, .. } = vec.as_mut_slice();
    a[0] = 7;
    assert_eq!(vec.get(0).unwrap().a, &7);
}

#[test]
fn lifetime_struct_in_a_vector() {
    let hello = String::from("hello");
    let world = String::from("world");

    let mut vec = tuplevec::TupleVec::<WithLifetime<'_>>::new();
    vec.push(WithLifetime {
        data: &hello,
        count: 1,
    })
    .unwrap();
    vec.push(WithLifetime {
        data: &world,
        count: 2,
    })
    .unwrap();

    let WithLifetimeSlice { data, count } = vec.as_slice();
    assert_eq!(data, &["hello", "world"]);
    assert_eq!(count, &[1, 2]);
}
