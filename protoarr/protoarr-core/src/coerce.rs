//! Conversion of nullable-default annotations into typed values.

use tracing::warn;

use crate::{
    schema::{FieldDecl, FieldKind, ScalarKind},
    value::Value,
};

const TRUE_WORDS: [&str; 3] = ["true", "1", "yes"];

/// Convert the annotation text of `field` into the value a `null` stands for.
///
/// Returns `None` when the field kind has no scalar form (message fields) or
/// the text cannot be read as that kind; the field is then left unset.
/// Repeated fields expect a JSON array literal such as `[1, 2]`.
pub fn coerce_default(field: &FieldDecl, text: &str) -> Option<Value> {
    if field.is_repeated() {
        return coerce_list(field, text);
    }
    let value = coerce_scalar(&field.kind, text);
    if value.is_none() && !field.is_message() {
        warn!(
            field = %field.name,
            default = text,
            kind = field.kind.type_name(),
            "nullable default is not valid for the field type, leaving field unset"
        );
    }
    value
}

/// Per-kind conversion of a single default text.
pub fn coerce_scalar(kind: &FieldKind, text: &str) -> Option<Value> {
    match kind {
        FieldKind::Scalar(ScalarKind::String) => Some(Value::string(text)),
        FieldKind::Scalar(ScalarKind::Bool) => Some(Value::Bool(parse_bool(text))),
        FieldKind::Scalar(ScalarKind::Bytes) => Some(Value::bytes(text.as_bytes())),
        FieldKind::Scalar(s) if s.is_float() => text.trim().parse::<f64>().ok().map(Value::F64),
        FieldKind::Scalar(s) if s.is_unsigned() => text.trim().parse::<u64>().ok().map(Value::U64),
        FieldKind::Scalar(_) | FieldKind::Enum(_) => {
            text.trim().parse::<i64>().ok().map(Value::I64)
        }
        FieldKind::Message(_) => None,
    }
}

fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text))
}

fn coerce_list(field: &FieldDecl, text: &str) -> Option<Value> {
    if field.is_message() {
        return None;
    }
    let items = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(other) => {
            warn!(
                field = %field.name,
                default = text,
                "repeated nullable default is not an array literal (got {}), leaving field unset",
                json_kind(&other)
            );
            return None;
        }
        Err(e) => {
            warn!(
                field = %field.name,
                default = text,
                error = %e,
                "failed to parse repeated nullable default, leaving field unset"
            );
            return None;
        }
    };

    let mut values = Vec::with_capacity(items.len());
    for item in &items {
        match json_element(&field.kind, item) {
            Some(v) => values.push(v),
            None => {
                warn!(
                    field = %field.name,
                    default = text,
                    element = %item,
                    "repeated nullable default has an element of the wrong type, leaving field unset"
                );
                return None;
            }
        }
    }
    Some(Value::Array(values))
}

fn json_element(kind: &FieldKind, item: &serde_json::Value) -> Option<Value> {
    match (kind, item) {
        (FieldKind::Scalar(ScalarKind::Bool), serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
        (FieldKind::Scalar(ScalarKind::String), serde_json::Value::String(s)) => {
            Some(Value::string(s))
        }
        (FieldKind::Scalar(ScalarKind::Bytes), serde_json::Value::String(s)) => {
            Some(Value::bytes(s.as_bytes()))
        }
        (FieldKind::Scalar(s), serde_json::Value::Number(n)) if s.is_float() => {
            n.as_f64().map(Value::F64)
        }
        (FieldKind::Scalar(s), serde_json::Value::Number(n)) if s.is_unsigned() => {
            n.as_u64().map(Value::U64)
        }
        (FieldKind::Scalar(s), serde_json::Value::Number(n)) if s.is_integer() => {
            n.as_i64().map(Value::I64)
        }
        (FieldKind::Enum(_), serde_json::Value::Number(n)) => n.as_i64().map(Value::I64),
        // Scalar elements may also be spelled as strings, e.g. `["1", "2"]`.
        (FieldKind::Scalar(_) | FieldKind::Enum(_), serde_json::Value::String(s)) => {
            coerce_scalar(kind, s)
        }
        _ => None,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
