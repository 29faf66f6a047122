//! Message to positional array.

use tracing::trace;

use crate::{
    coerce::coerce_scalar,
    error::CodecError,
    message::{FieldValue, MessageAccess},
    schema::{FieldDecl, SchemaView},
    source::SchemaSource,
    value::Value,
};

/// Encode `message` into its positional array form.
///
/// Field `n` lands at index `n - 1`; positions without a declared field are
/// `null`. Values equal to a field's nullable default are written as `null`.
pub fn encode<M, S>(message: &M, schema: &SchemaView, source: &S) -> Result<Vec<Value>, CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    encode_message(message, schema, source, &mut Vec::new())
}

// `active` holds the message types currently being encoded. An unset
// singular field whose type is already active is written as `null`, which
// keeps recursive message types finite.
fn encode_message<M, S>(
    message: &M,
    schema: &SchemaView,
    source: &S,
    active: &mut Vec<String>,
) -> Result<Vec<Value>, CodecError>
where
    M: MessageAccess,
    S: SchemaSource + ?Sized,
{
    active.push(schema.name().to_string());
    let mut result = Vec::with_capacity(schema.max_number() as usize);

    for field in schema.fields() {
        let pos = field.index();
        if result.len() < pos {
            result.resize(pos, Value::Null);
        }

        let value = match message.get_field(field)? {
            FieldValue::Messages(items) => {
                let nested = nested_schema(field, source)?;
                let mut encoded = Vec::with_capacity(items.len());
                for item in &items {
                    if matches_message_default(field, item) {
                        encoded.push(Value::Null);
                    } else {
                        encoded.push(Value::Array(encode_message(item, &nested, source, active)?));
                    }
                }
                Value::Array(encoded)
            }
            FieldValue::Message(item) => {
                let nested = nested_schema(field, source)?;
                if !message.has_field(field) && active.iter().any(|n| n == nested.name()) {
                    Value::Null
                } else {
                    Value::Array(encode_message(&item, &nested, source, active)?)
                }
            }
            FieldValue::Value(value) if !field.is_repeated() && matches_default(field, &value) => {
                Value::Null
            }
            FieldValue::Value(value) => value,
        };

        result.push(value);
    }

    active.pop();
    trace!(schema = schema.name(), len = result.len(), "encoded message");
    Ok(result)
}

pub(crate) fn nested_schema<S>(
    field: &FieldDecl,
    source: &S,
) -> Result<std::sync::Arc<SchemaView>, CodecError>
where
    S: SchemaSource + ?Sized,
{
    let type_name = field
        .message_type()
        .ok_or_else(|| CodecError::FieldAccess {
            field: field.name.clone(),
            detail: "field is not message-typed".to_string(),
        })?;
    source.schema(type_name)
}

/// Whether a scalar value should be suppressed to `null`.
///
/// The value matches when its text form equals the annotation, or when it
/// equals the annotation coerced to the field's type. The second arm lets
/// `"0.0"`, `"False"` and `"0"` match the same zero value, and keeps the
/// decoder's restored value identical to what was suppressed.
pub fn matches_default(field: &FieldDecl, value: &Value) -> bool {
    let Some(default) = field.nullable_default.as_deref() else {
        return false;
    };
    if value.is_null() {
        return false;
    }
    if value.to_string() == default {
        return true;
    }
    coerce_scalar(&field.kind, default).is_some_and(|typed| same_value(value, &typed))
}

// Best-effort: compares the provider's text rendering of the sub-message.
fn matches_message_default<M: MessageAccess>(field: &FieldDecl, item: &M) -> bool {
    field
        .nullable_default
        .as_deref()
        .is_some_and(|default| item.text_form() == default)
}

fn same_value(value: &Value, typed: &Value) -> bool {
    match typed {
        Value::F64(b) => matches!(value.try_f64(), Ok(Some(a)) if a == *b),
        Value::I64(b) => matches!(value.try_i64(), Ok(Some(a)) if a == *b),
        Value::U64(b) => matches!(value.try_u64(), Ok(Some(a)) if a == *b),
        _ => value == typed,
    }
}
