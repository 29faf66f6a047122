//! Positional array to message.

use std::collections::HashSet;

use tracing::trace;

use crate::{
    coerce::coerce_default,
    encode::nested_schema,
    error::CodecError,
    message::{FieldValue, MessageAccess},
    schema::{FieldDecl, SchemaView},
    source::SchemaSource,
    value::Value,
};

/// Populate `message` from its positional array form.
///
/// Index `i` is assigned to field number `i + 1`; a non-null value at an
/// index without a field declaration is an error. A `null` restores the
/// field's nullable default when it has one and leaves the field untouched
/// otherwise. A oneof member is only restored when no other member of its
/// group carries a value. Repeated message elements are appended to
/// whatever the field already holds.
pub fn decode<M, S>(
    array: &[Value],
    schema: &SchemaView,
    source: &S,
    message: &mut M,
) -> Result<(), CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    decode_message(array, schema, source, message, &mut Vec::new())
}

/// Apply every nullable default of `schema` to `message`, as if decoding an
/// array holding only `null`s.
pub fn restore_defaults<M, S>(
    schema: &SchemaView,
    source: &S,
    message: &mut M,
) -> Result<(), CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    restore_message(schema, source, message, &mut Vec::new())
}

fn decode_message<M, S>(
    array: &[Value],
    schema: &SchemaView,
    source: &S,
    message: &mut M,
    active: &mut Vec<String>,
) -> Result<(), CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    active.push(schema.name().to_string());

    let mut claimed: HashSet<&str> = schema
        .fields()
        .iter()
        .filter(|f| array.get(f.index()).is_some_and(|v| !v.is_null()))
        .filter_map(|f| f.oneof.as_deref())
        .collect();

    for (idx, item) in array.iter().enumerate() {
        let number = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        let Some(field) = schema.field_by_number(number) else {
            // Gaps between non-contiguous field numbers are padded with nulls.
            if item.is_null() {
                continue;
            }
            return Err(CodecError::UnknownFieldNumber {
                schema_name: schema.name().to_string(),
                number,
            });
        };
        if item.is_null() {
            restore_member(field, source, message, active, &mut claimed)?;
        } else {
            decode_field(field, item, source, message, active)?;
        }
    }

    active.pop();
    trace!(schema = schema.name(), len = array.len(), "decoded message");
    Ok(())
}

fn decode_field<M, S>(
    field: &FieldDecl,
    item: &Value,
    source: &S,
    message: &mut M,
    active: &mut Vec<String>,
) -> Result<(), CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    if field.is_message() {
        let nested = nested_schema(field, source)?;
        let array = item
            .try_array()
            .map_err(|e| CodecError::type_mismatch(&field.name, e))?
            .unwrap_or_default();

        if field.is_repeated() {
            let mut items = match message.get_field(field)? {
                FieldValue::Messages(items) => items,
                _ => Vec::new(),
            };
            items.reserve(array.len());
            for element in array {
                let mut sub = message.new_nested(field)?;
                if element.is_empty_slot() {
                    restore_message(&nested, source, &mut sub, active)?;
                } else {
                    let element = element
                        .try_array()
                        .map_err(|e| CodecError::type_mismatch(&field.name, e))?
                        .unwrap_or_default();
                    decode_message(element, &nested, source, &mut sub, active)?;
                }
                items.push(sub);
            }
            return message.set_field(field, FieldValue::Messages(items));
        }

        let mut sub = current_nested(field, message)?;
        decode_message(array, &nested, source, &mut sub, active)?;
        return attach_nested(field, message, sub).map(|_| ());
    }

    let value = if field.is_bytes() {
        text_to_bytes(field, item)?
    } else {
        item.clone()
    };
    message.set_field(field, FieldValue::Value(value))
}

fn restore_message<M, S>(
    schema: &SchemaView,
    source: &S,
    message: &mut M,
    active: &mut Vec<String>,
) -> Result<(), CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    active.push(schema.name().to_string());
    let mut claimed = HashSet::new();
    for field in schema.fields() {
        restore_member(field, source, message, active, &mut claimed)?;
    }
    active.pop();
    Ok(())
}

// Handling of a `null` slot. Setting one member of a oneof clears the
// others, so a group is restored at most once and never over a member that
// holds a value.
fn restore_member<'s, M, S>(
    field: &'s FieldDecl,
    source: &S,
    message: &mut M,
    active: &mut Vec<String>,
    claimed: &mut HashSet<&'s str>,
) -> Result<(), CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    let group = field.oneof.as_deref();
    if group.is_some_and(|g| claimed.contains(g)) {
        return Ok(());
    }
    if restore_field(field, source, message, active)? {
        claimed.extend(group);
    }
    Ok(())
}

// Returns whether a value was assigned.
fn restore_field<M, S>(
    field: &FieldDecl,
    source: &S,
    message: &mut M,
    active: &mut Vec<String>,
) -> Result<bool, CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    if field.is_message() {
        if field.is_repeated() {
            return Ok(false);
        }
        let nested = nested_schema(field, source)?;
        if active.iter().any(|name| name == nested.name()) {
            return Ok(false);
        }
        let mut sub = current_nested(field, message)?;
        restore_message(&nested, source, &mut sub, active)?;
        return attach_nested(field, message, sub);
    }

    let Some(default) = field.nullable_default.as_deref() else {
        return Ok(false);
    };
    match coerce_default(field, default) {
        Some(value) => message.set_field(field, FieldValue::Value(value)).map(|()| true),
        None => Ok(false),
    }
}

fn current_nested<M: MessageAccess>(field: &FieldDecl, message: &M) -> Result<M, CodecError> {
    match message.get_field(field)? {
        FieldValue::Message(sub) => Ok(sub),
        _ => message.new_nested(field),
    }
}

// A sub-message is only attached when it carries content or the slot was
// already populated, so decoding never invents presence for empty messages.
fn attach_nested<M: MessageAccess>(
    field: &FieldDecl,
    message: &mut M,
    sub: M,
) -> Result<bool, CodecError> {
    if sub.is_empty() && !message.has_field(field) {
        return Ok(false);
    }
    message.set_field(field, FieldValue::Message(sub))?;
    Ok(true)
}

// The text form cannot carry raw binary, so byte fields arrive as strings.
fn text_to_bytes(field: &FieldDecl, item: &Value) -> Result<Value, CodecError> {
    match item {
        Value::String(s) => Ok(Value::bytes(s.as_bytes())),
        Value::Array(items) if field.is_repeated() => items
            .iter()
            .map(|v| text_to_bytes(field, v))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}
