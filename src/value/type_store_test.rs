// SPDX-License-Identifier: GPL-3.0-or-later

use super::{TypeError, TypeName, TypeStore};

#[test]
fn fundamental_sizes() {
    let store = TypeStore::new();
    assert_eq!(store.size_of(&TypeName::i32()).unwrap(), 4);
    assert_eq!(store.size_of(&TypeName::i64()).unwrap(), 8);
    assert_eq!(store.size_of(&TypeName::u64()).unwrap(), 8);
    assert_eq!(store.size_of(&TypeName::f64()).unwrap(), 8);
    assert_eq!(store.size_of(&TypeName::char()).unwrap(), 1);
    assert_eq!(store.size_of(&TypeName::bool()).unwrap(), 1);
    assert_eq!(store.size_of(&TypeName::null()).unwrap(), 1);
}

#[test]
fn pointer_is_always_eight_bytes() {
    let store = TypeStore::new();
    let ty = TypeName::pointer(TypeName::i32());
    assert_eq!(store.size_of(&ty).unwrap(), 8);
}

#[test]
fn list_size_is_count_times_element_size() {
    let store = TypeStore::new();
    let ty = TypeName::list(TypeName::i64(), 5);
    assert_eq!(store.size_of(&ty).unwrap(), 40);
}

#[test]
fn record_fields_laid_out_with_no_padding() {
    let mut store = TypeStore::new();
    store
        .add(
            "Point",
            vec![
                ("x".to_string(), TypeName::i32()),
                ("y".to_string(), TypeName::i32()),
                ("flag".to_string(), TypeName::bool()),
            ],
        )
        .unwrap();

    let ty = TypeName::simple("Point");
    assert_eq!(store.size_of(&ty).unwrap(), 9);

    let fields = store.fields_of(&ty);
    assert_eq!(fields[0].offset, 0);
    assert_eq!(fields[1].offset, 4);
    assert_eq!(fields[2].offset, 8);
}

#[test]
fn duplicate_record_name_is_rejected() {
    let mut store = TypeStore::new();
    store.add("Point", vec![]).unwrap();
    let err = store.add("Point", vec![]).unwrap_err();
    assert_eq!(err, TypeError::DuplicateType("Point".to_string()));
}

#[test]
fn record_name_colliding_with_fundamental_is_rejected() {
    let mut store = TypeStore::new();
    let err = store.add("bool", vec![]).unwrap_err();
    assert_eq!(err, TypeError::DuplicateType("bool".to_string()));
}

#[test]
fn unknown_field_is_an_error() {
    let mut store = TypeStore::new();
    store.add("Point", vec![("x".to_string(), TypeName::i32())]).unwrap();
    let err = store.field(&TypeName::simple("Point"), "z").unwrap_err();
    assert!(matches!(err, TypeError::UnknownField { .. }));
}

#[test]
fn unregistered_record_type_has_no_size() {
    let store = TypeStore::new();
    let err = store.size_of(&TypeName::simple("Point")).unwrap_err();
    assert_eq!(err, TypeError::UnknownType(TypeName::simple("Point")));
}

#[test]
fn record_of_records_sums_nested_sizes() {
    let mut store = TypeStore::new();
    store
        .add("Point", vec![("x".to_string(), TypeName::i32()), ("y".to_string(), TypeName::i32())])
        .unwrap();
    store
        .add(
            "Line",
            vec![
                ("a".to_string(), TypeName::simple("Point")),
                ("b".to_string(), TypeName::simple("Point")),
            ],
        )
        .unwrap();

    assert_eq!(store.size_of(&TypeName::simple("Line")).unwrap(), 16);
    assert_eq!(store.field(&TypeName::simple("Line"), "b").unwrap().offset, 8);
}
