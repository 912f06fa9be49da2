use bson::{
    Array, Binary, DateTime, Document, Mapper, Object, SequenceKind, UnmarshalError, Value,
};
use proptest::prelude::*;

fn leaf(keep_kinds: bool) -> BoxedStrategy<Value> {
    let binary = prop::collection::vec(any::<u8>(), 0..16).prop_flat_map(move |bytes| {
        if keep_kinds {
            prop_oneof![
                Just(Value::Binary(Binary::new(bytes.clone()))),
                Just(Value::Binary(Binary::bytearray(bytes))),
            ]
            .boxed()
        } else {
            Just(Value::Binary(Binary::new(bytes))).boxed()
        }
    });
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<f64>()
            .prop_filter("NaN never compares equal", |d| !d.is_nan())
            .prop_map(Value::Double),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        ".*".prop_map(Value::String),
        binary,
        any::<i64>().prop_map(|ms| Value::DateTime(DateTime::from_millis(ms))),
    ]
    .boxed()
}

fn value(keep_kinds: bool) -> BoxedStrategy<Value> {
    leaf(keep_kinds)
        .prop_recursive(4, 48, 4, move |inner| {
            let sequence = prop::collection::vec(inner.clone(), 0..4);
            prop_oneof![
                sequence.prop_flat_map(move |items| {
                    if keep_kinds {
                        prop_oneof![
                            Just(Value::Array(Array::list(items.clone()))),
                            Just(Value::Array(Array::tuple(items))),
                        ]
                        .boxed()
                    } else {
                        Just(Value::Array(Array::list(items))).boxed()
                    }
                }),
                prop::collection::hash_map("[a-z0-9]{0,3}", inner, 0..4)
                    .prop_map(|entries| Value::Document(entries.into_iter().collect())),
            ]
        })
        .boxed()
}

fn document(keep_kinds: bool) -> impl Strategy<Value = Document> {
    prop::collection::hash_map("[a-z0-9]{0,3}", value(keep_kinds), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn is_index_like(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// What a value looks like after a round trip.
fn canonical(value: Value, keep_kinds: bool) -> Value {
    match value {
        Value::Int64(v) => i32::try_from(v).map_or(Value::Int64(v), Value::Int32),
        Value::Binary(binary) if !keep_kinds => Value::Binary(Binary::new(binary.into_bytes())),
        Value::Array(array) => {
            let tuple = keep_kinds && array.kind() == SequenceKind::Tuple;
            let items = array
                .into_items()
                .into_iter()
                .map(|item| canonical(item, keep_kinds))
                .collect();
            Value::Array(if tuple {
                Array::tuple(items)
            } else {
                Array::list(items)
            })
        }
        Value::Document(document) => Value::Document(canonical_document(document, keep_kinds)),
        other => other,
    }
}

fn canonical_document(document: Document, keep_kinds: bool) -> Document {
    let mut entries: Vec<(String, Value)> = document
        .into_iter()
        .map(|(key, value)| (key, canonical(value, keep_kinds)))
        .collect();
    if !entries.iter().all(|(key, _)| is_index_like(key)) {
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    }
    entries.into_iter().collect()
}

fn element(key: &str, value: i32) -> Vec<u8> {
    let mut bytes = vec![0x10];
    bytes.extend(key.as_bytes());
    bytes.push(0x00);
    bytes.extend(value.to_le_bytes());
    bytes
}

fn wrap(body: &[u8]) -> Vec<u8> {
    let mut bytes = ((body.len() + 5) as i32).to_le_bytes().to_vec();
    bytes.extend(body);
    bytes.push(0x00);
    bytes
}

proptest! {
    #[test]
    fn round_trip(document in document(false)) {
        let bytes = bson::marshal(&Object::from(document.clone())).unwrap();
        prop_assert_eq!(canonical_document(document, false), bson::unmarshal(&bytes).unwrap());
    }

    #[test]
    fn round_trip_keeping_types(document in document(true)) {
        let mapper = Mapper::builder().keep_types(true).build();
        let bytes = mapper.marshal(&Object::from(document.clone())).unwrap();
        prop_assert_eq!(canonical_document(document.clone(), true), mapper.unmarshal(&bytes).unwrap());
        // without keep_types the sidecar is dropped and the kinds with it
        prop_assert_eq!(canonical_document(document, false), bson::unmarshal(&bytes).unwrap());
    }

    #[test]
    fn key_order_does_not_change_bytes(document in document(false)) {
        prop_assume!(!document.keys().all(is_index_like));
        let reversed: Document = document.clone().into_iter().rev().collect();
        prop_assert_eq!(
            bson::marshal(&Object::from(document)).unwrap(),
            bson::marshal(&Object::from(reversed)).unwrap()
        );
    }

    #[test]
    fn truncated_input_is_rejected(document in document(true)) {
        let mapper = Mapper::builder().keep_types(true).python_only(true).build();
        let bytes = mapper.marshal(&Object::from(document)).unwrap();
        for len in 0..bytes.len() {
            let err = mapper.unmarshal(&bytes[..len]).unwrap_err();
            prop_assert!(
                matches!(err, UnmarshalError::BrokenData(_) | UnmarshalError::NotEnoughData { .. }),
                "prefix of {} bytes gave {:?}",
                len,
                err
            );
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = bson::unmarshal(&bytes);
        let _ = Mapper::builder().keep_types(true).python_only(true).build().unmarshal(&bytes);
    }

    #[test]
    fn repeated_key_is_rejected(
        keys in prop::collection::btree_set("[a-z]{1,3}", 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let repeated = pick.get(&keys).clone();
        let mut body: Vec<u8> = keys.iter().flat_map(|key| element(key, 1)).collect();
        body.extend(element(&repeated, 2));
        prop_assert_eq!(Err(UnmarshalError::RepeatedKey(repeated)), bson::unmarshal(&wrap(&body)));
    }

    #[test]
    fn repeated_array_index_is_rejected(len in 1usize..6, pick in any::<prop::sample::Index>()) {
        let index = pick.index(len).to_string();
        let mut body: Vec<u8> = (0..len).flat_map(|i| element(&i.to_string(), 1)).collect();
        body.extend(element(&index, 2));
        let mut outer = vec![0x04, b'a', 0x00];
        outer.extend(wrap(&body));
        prop_assert_eq!(Err(UnmarshalError::RepeatedKey(index)), bson::unmarshal(&wrap(&outer)));
    }
}
