
use protoarr_core::{
    CodecError, FieldDecl, FieldKind, ScalarKind, SchemaSource, SchemaView, StaticSchemas, Value,
    decode, encode, restore_defaults,
};
use test_helpers::*;

fn nulls(n: usize) -> Vec<Value> {
    vec![Value::Null; n]
}

fn round_trip(schemas: &StaticSchemas, msg: &TestMessage) -> Vec<Value> {
    let schema = schemas.schema(&msg.type_name).unwrap();
    let array = encode(msg, &schema, schemas).unwrap();
    let mut decoded = TestMessage::new(&msg.type_name);
    decode(&array, &schema, schemas, &mut decoded).unwrap();
    assert_eq!(&decoded, msg);
    array
}

fn filled_item() -> TestMessage {
    TestMessage::new("test.Queue.Item")
        .with(1, 45i64)
        .with(2, 23.67)
        .with(3, "Hello Inner World")
        .with(4, true)
        .with(5, Value::bytes(b"bytes inner"))
        .with(6, 2i64)
}

#[test]
fn basic_default_empty() {
    let schemas = basic_schemas();
    let array = round_trip(&schemas, &TestMessage::new("test.Queue"));

    let mut expected = nulls(6);
    expected.push(Value::Array(vec![]));
    assert_eq!(array, expected);
}

#[test]
fn basic_default_empty_subitem_is_null() {
    let schemas = basic_schemas();
    let queue = TestMessage::new("test.Queue")
        .with_messages(7, vec![TestMessage::new("test.Queue.Item")]);
    let array = round_trip(&schemas, &queue);

    let mut expected = nulls(6);
    expected.push(Value::Array(vec![Value::Null]));
    assert_eq!(array, expected);
}

#[test]
fn basic_explicit_zero_values_are_suppressed() {
    let schemas = basic_schemas();
    let schema = schemas.schema("test.Queue").unwrap();
    let queue = TestMessage::new("test.Queue")
        .with(1, 0i64)
        .with(2, 0.0)
        .with(3, "")
        .with(4, false)
        .with(5, Value::bytes(b""))
        .with(6, 0i64);

    let array = encode(&queue, &schema, &schemas).unwrap();
    let mut expected = nulls(6);
    expected.push(Value::Array(vec![]));
    assert_eq!(array, expected);

    let mut decoded = TestMessage::new("test.Queue");
    decode(&array, &schema, &schemas, &mut decoded).unwrap();
    assert!(decoded.slots.is_empty());
}

#[test]
fn basic_with_subitems() {
    let schemas = basic_schemas();
    let queue = TestMessage::new("test.Queue")
        .with(1, 100i64)
        .with(2, 77.89)
        .with(3, "Hello World")
        .with(4, true)
        .with(5, Value::bytes(b"bytes"))
        .with(6, 1i64)
        .with_messages(7, vec![filled_item()]);

    let array = round_trip(&schemas, &queue);
    assert_eq!(
        array,
        vec![
            Value::I64(100),
            Value::F64(77.89),
            Value::string("Hello World"),
            Value::Bool(true),
            Value::bytes(b"bytes"),
            Value::I64(1),
            Value::Array(vec![Value::Array(vec![
                Value::I64(45),
                Value::F64(23.67),
                Value::string("Hello Inner World"),
                Value::Bool(true),
                Value::bytes(b"bytes inner"),
                Value::I64(2),
            ])]),
        ]
    );
}

#[test]
fn alternate_zero_values_are_not_suppressed() {
    let schemas = alternate_schemas();
    let queue = TestMessage::new("test.Queue")
        .with_messages(7, vec![TestMessage::new("test.Queue.Item")]);
    let array = round_trip(&schemas, &queue);

    let zeros = vec![
        Value::I64(0),
        Value::F64(0.0),
        Value::string(""),
        Value::Bool(false),
        Value::bytes(b""),
        Value::I64(0),
    ];
    let mut expected = zeros.clone();
    expected.push(Value::Array(vec![Value::Array(zeros)]));
    assert_eq!(array, expected);
}

#[test]
fn alternate_defaults_restore_on_decode() {
    let schemas = alternate_schemas();
    let queue = TestMessage::new("test.Queue")
        .with(1, 1i64)
        .with(2, 1.0)
        .with(3, "null")
        .with(4, true)
        .with(5, Value::bytes(b"1"))
        .with(6, 1i64);

    let array = round_trip(&schemas, &queue);
    let mut expected = nulls(6);
    expected.push(Value::Array(vec![]));
    assert_eq!(array, expected);
}

#[test]
fn null_and_empty_elements_decode_to_default_sub_messages() {
    let schemas = alternate_schemas();
    let schema = schemas.schema("test.Queue").unwrap();
    let mut array = vec![
        Value::I64(0),
        Value::F64(0.0),
        Value::string(""),
        Value::Bool(false),
        Value::bytes(b""),
        Value::I64(0),
    ];
    array.push(Value::Array(vec![Value::Null, Value::Array(vec![])]));

    let mut decoded = TestMessage::new("test.Queue");
    decode(&array, &schema, &schemas, &mut decoded).unwrap();

    let Some(protoarr_core::FieldValue::Messages(items)) = decoded.slots.get(&7) else {
        panic!("expected items, got {:?}", decoded.slots.get(&7));
    };
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(item.value(3), Some(&Value::string("null")));
        assert_eq!(item.value(1), Some(&Value::I64(1)));
    }
}

#[test]
fn position_follows_field_numbers() {
    let schemas: StaticSchemas = [SchemaView::new(
        "test.Sparse",
        vec![
            FieldDecl::scalar("a", 1, ScalarKind::Int64),
            FieldDecl::scalar("b", 2, ScalarKind::String),
            FieldDecl::scalar("e", 5, ScalarKind::Int64),
        ],
    )
    .unwrap()]
    .into_iter()
    .collect();
    let schema = schemas.schema("test.Sparse").unwrap();

    let msg = TestMessage::new("test.Sparse").with(5, 9i64);
    let array = encode(&msg, &schema, &schemas).unwrap();
    assert_eq!(
        array,
        vec![
            Value::I64(0),
            Value::string(""),
            Value::Null,
            Value::Null,
            Value::I64(9)
        ]
    );

    let mut decoded = TestMessage::new("test.Sparse");
    decode(&array, &schema, &schemas, &mut decoded).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn null_in_undeclared_position_is_skipped() {
    let schemas = basic_schemas();
    let schema = schemas.schema("test.Queue.Item").unwrap();
    let mut decoded = TestMessage::new("test.Queue.Item");
    decode(&nulls(9), &schema, &schemas, &mut decoded).unwrap();
    assert!(decoded.slots.is_empty());
}

#[test]
fn unknown_field_number_fails_decode() {
    let schemas = basic_schemas();
    let schema = schemas.schema("test.Queue.Item").unwrap();
    let mut array = nulls(6);
    array.push(Value::I64(1));

    let mut decoded = TestMessage::new("test.Queue.Item");
    let err = decode(&array, &schema, &schemas, &mut decoded).unwrap_err();
    assert!(
        matches!(err, CodecError::UnknownFieldNumber { number: 7, ref schema_name } if schema_name == "test.Queue.Item"),
        "{err}"
    );
}

#[test]
fn repeated_scalars_are_copied_without_suppression() {
    let schemas: StaticSchemas = [SchemaView::new(
        "test.List",
        vec![
            FieldDecl::scalar("values", 1, ScalarKind::Int32)
                .repeated()
                .with_nullable_default("[0]"),
        ],
    )
    .unwrap()]
    .into_iter()
    .collect();

    let msg = TestMessage::new("test.List").with(1, vec![Value::I64(0)]);
    let array = round_trip(&schemas, &msg);
    assert_eq!(array, vec![Value::Array(vec![Value::I64(0)])]);

    // A null restores the repeated default from its array literal.
    let schema = schemas.schema("test.List").unwrap();
    let mut decoded = TestMessage::new("test.List");
    decode(&[Value::Null], &schema, &schemas, &mut decoded).unwrap();
    assert_eq!(decoded.value(1), Some(&Value::Array(vec![Value::I64(0)])));
}

#[test]
fn malformed_repeated_default_leaves_field_unset() {
    let schemas: StaticSchemas = [SchemaView::new(
        "test.List",
        vec![
            FieldDecl::scalar("values", 1, ScalarKind::Int32)
                .repeated()
                .with_nullable_default("not an array"),
            FieldDecl::scalar("n", 2, ScalarKind::Int32).with_nullable_default("3"),
        ],
    )
    .unwrap()]
    .into_iter()
    .collect();
    let schema = schemas.schema("test.List").unwrap();

    let mut decoded = TestMessage::new("test.List");
    decode(&nulls(2), &schema, &schemas, &mut decoded).unwrap();
    assert_eq!(decoded.value(1), None);
    assert_eq!(decoded.value(2), Some(&Value::I64(3)));
}

fn nested_schemas() -> StaticSchemas {
    [
        SchemaView::new(
            "test.Outer",
            vec![
                FieldDecl::new("inner", 1, FieldKind::Message("test.Inner".into())),
                FieldDecl::scalar("tag", 2, ScalarKind::String),
            ],
        )
        .unwrap(),
        SchemaView::new(
            "test.Inner",
            vec![FieldDecl::scalar("x", 1, ScalarKind::Int32).with_nullable_default("-1")],
        )
        .unwrap(),
    ]
    .into_iter()
    .collect()
}

#[test]
fn singular_message_is_encoded_recursively() {
    let schemas = nested_schemas();
    let msg = TestMessage::new("test.Outer")
        .with_message(1, TestMessage::new("test.Inner").with(1, 5i64))
        .with(2, "t");
    let array = round_trip(&schemas, &msg);
    assert_eq!(
        array,
        vec![Value::Array(vec![Value::I64(5)]), Value::string("t")]
    );
}

#[test]
fn null_singular_message_restores_nested_defaults() {
    let schemas = nested_schemas();
    let schema = schemas.schema("test.Outer").unwrap();

    let mut decoded = TestMessage::new("test.Outer");
    decode(&[Value::Null], &schema, &schemas, &mut decoded).unwrap();

    let Some(protoarr_core::FieldValue::Message(inner)) = decoded.slots.get(&1) else {
        panic!("expected inner message");
    };
    assert_eq!(inner.value(1), Some(&Value::I64(-1)));
}

#[test]
fn restore_defaults_fills_every_annotated_field() {
    let schemas = alternate_schemas();
    let schema = schemas.schema("test.Queue").unwrap();
    let mut msg = TestMessage::new("test.Queue");
    restore_defaults(&schema, &schemas, &mut msg).unwrap();
    assert_eq!(msg.value(3), Some(&Value::string("null")));
    assert_eq!(msg.value(4), Some(&Value::Bool(true)));
    assert_eq!(msg.value(5), Some(&Value::bytes(b"1")));
}

#[test]
fn bytes_field_accepts_text() {
    let schemas = basic_schemas();
    let schema = schemas.schema("test.Queue.Item").unwrap();
    let array = vec![
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        Value::string("bytes"),
    ];
    let mut decoded = TestMessage::new("test.Queue.Item");
    decode(&array, &schema, &schemas, &mut decoded).unwrap();
    assert_eq!(decoded.value(5), Some(&Value::bytes(b"bytes")));
}

#[test]
fn recursive_type_encodes_unset_child_as_null() {
    let schemas: StaticSchemas = [SchemaView::new(
        "test.Node",
        vec![
            FieldDecl::scalar("value", 1, ScalarKind::Int32),
            FieldDecl::new("child", 2, FieldKind::Message("test.Node".into())),
        ],
    )
    .unwrap()]
    .into_iter()
    .collect();

    let leaf = TestMessage::new("test.Node").with(1, 2i64);
    let root = TestMessage::new("test.Node")
        .with(1, 1i64)
        .with_message(2, leaf);
    let array = round_trip(&schemas, &root);
    assert_eq!(
        array,
        vec![
            Value::I64(1),
            Value::Array(vec![Value::I64(2), Value::Null]),
        ]
    );
}

#[test]
fn scalar_for_message_field_is_a_type_mismatch() {
    let schemas = nested_schemas();
    let schema = schemas.schema("test.Outer").unwrap();
    let mut decoded = TestMessage::new("test.Outer");
    let err = decode(&[Value::I64(1)], &schema, &schemas, &mut decoded).unwrap_err();
    assert!(matches!(err, CodecError::TypeMismatch { ref field, .. } if field == "inner"));
}

fn choice_schemas() -> StaticSchemas {
    [SchemaView::new(
        "test.Choice",
        vec![
            FieldDecl::scalar("a", 1, ScalarKind::Int32)
                .in_oneof("choice")
                .with_nullable_default("1"),
            FieldDecl::scalar("b", 2, ScalarKind::String)
                .in_oneof("choice")
                .with_nullable_default("x"),
            FieldDecl::scalar("c", 3, ScalarKind::Int32).with_nullable_default("9"),
        ],
    )
    .unwrap()]
    .into_iter()
    .collect()
}

#[test]
fn null_oneof_member_keeps_sibling_value() {
    let schemas = choice_schemas();
    let schema = schemas.schema("test.Choice").unwrap();

    let mut decoded = TestMessage::new("test.Choice");
    decode(
        &[Value::Null, Value::string("set"), Value::Null],
        &schema,
        &schemas,
        &mut decoded,
    )
    .unwrap();
    assert_eq!(decoded.value(1), None);
    assert_eq!(decoded.value(2), Some(&Value::string("set")));
    assert_eq!(decoded.value(3), Some(&Value::I64(9)));
}

#[test]
fn oneof_group_restores_only_first_default() {
    let schemas = choice_schemas();
    let schema = schemas.schema("test.Choice").unwrap();

    let mut decoded = TestMessage::new("test.Choice");
    decode(&nulls(3), &schema, &schemas, &mut decoded).unwrap();
    assert_eq!(decoded.value(1), Some(&Value::I64(1)));
    assert_eq!(decoded.value(2), None);

    let mut restored = TestMessage::new("test.Choice");
    restore_defaults(&schema, &schemas, &mut restored).unwrap();
    assert_eq!(restored, decoded);
}
