//! JSON text form of positional arrays.

use prost_reflect::{DynamicMessage, MessageDescriptor};
use protoarr_core::Value;
use protoarr_protobuf::ArrayCodec;

use crate::TextError;

/// Convert a positional array into a JSON array.
///
/// Bytes are written as UTF-8 strings. `F32` values go through their
/// shortest decimal form first, so `77.89f32` is written as `77.89` rather
/// than its exact `f64` widening.
pub fn to_json(array: &[Value]) -> Result<serde_json::Value, TextError> {
    let mut path = String::from("$");
    items_to_json(array, &mut path)
}

fn items_to_json(items: &[Value], path: &mut String) -> Result<serde_json::Value, TextError> {
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let len = path.len();
        path.push_str(&format!("[{idx}]"));
        out.push(value_to_json(item, path)?);
        path.truncate(len);
    }
    Ok(serde_json::Value::Array(out))
}

fn value_to_json(value: &Value, path: &mut String) -> Result<serde_json::Value, TextError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::I64(v) => serde_json::Value::from(*v),
        Value::U64(v) => serde_json::Value::from(*v),
        Value::F32(v) => {
            let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(*v));
            float_to_json(widened, path)?
        }
        Value::F64(v) => float_to_json(*v, path)?,
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => serde_json::Value::String(s.to_string()),
            Err(_) => return Err(TextError::NonUtf8Bytes { path: path.clone() }),
        },
        Value::Array(items) => items_to_json(items, path)?,
    })
}

fn float_to_json(v: f64, path: &str) -> Result<serde_json::Value, TextError> {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .ok_or_else(|| TextError::NonFiniteFloat {
            path: path.to_string(),
            value: v,
        })
}

/// Convert a JSON array into a positional array.
///
/// Integers become `I64`, or `U64` when they exceed `i64::MAX`; every other
/// number becomes `F64`.
pub fn from_json(json: serde_json::Value) -> Result<Vec<Value>, TextError> {
    match json {
        serde_json::Value::Array(items) => {
            let mut path = String::from("$");
            items_from_json(items, &mut path)
        }
        other => Err(TextError::NotAnArray {
            found: json_kind(&other),
        }),
    }
}

fn items_from_json(
    items: Vec<serde_json::Value>,
    path: &mut String,
) -> Result<Vec<Value>, TextError> {
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let len = path.len();
        path.push_str(&format!("[{idx}]"));
        out.push(value_from_json(item, path)?);
        path.truncate(len);
    }
    Ok(out)
}

fn value_from_json(json: serde_json::Value, path: &mut String) -> Result<Value, TextError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(v),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(v), _, _) => Value::I64(v),
            (None, Some(v), _) => Value::U64(v),
            (None, None, Some(v)) => Value::F64(v),
            (None, None, None) => Value::Null,
        },
        serde_json::Value::String(s) => Value::string(&s),
        serde_json::Value::Array(items) => Value::Array(items_from_json(items, path)?),
        serde_json::Value::Object(_) => {
            return Err(TextError::UnexpectedObject { path: path.clone() });
        }
    })
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Compact JSON text of a positional array.
pub fn to_text(array: &[Value]) -> Result<String, TextError> {
    Ok(serde_json::to_string(&to_json(array)?)?)
}

/// Parse JSON text into a positional array.
pub fn from_text(text: &str) -> Result<Vec<Value>, TextError> {
    from_json(serde_json::from_str(text)?)
}

/// Encode `message` straight to its compact JSON text.
pub fn encode_to_string(codec: &ArrayCodec, message: &DynamicMessage) -> Result<String, TextError> {
    to_text(&codec.encode(message)?)
}

/// Populate `message` from JSON text.
pub fn decode_from_str(
    codec: &ArrayCodec,
    text: &str,
    message: &mut DynamicMessage,
) -> Result<(), TextError> {
    let array = from_text(text)?;
    Ok(codec.decode(&array, message)?)
}

/// Decode JSON text into a fresh message of type `desc`.
pub fn decode_new_from_str(
    codec: &ArrayCodec,
    text: &str,
    desc: MessageDescriptor,
) -> Result<DynamicMessage, TextError> {
    let array = from_text(text)?;
    Ok(codec.decode_new(&array, desc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_uses_shortest_decimal() {
        let json = to_json(&[Value::F32(77.89)]).unwrap();
        assert_eq!(json.to_string(), "[77.89]");
    }

    #[test]
    fn whole_floats_keep_their_fraction() {
        assert_eq!(to_text(&[Value::F64(0.0)]).unwrap(), "[0.0]");
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let err = to_json(&[Value::Array(vec![Value::F64(f64::NAN)])]).unwrap_err();
        assert!(matches!(err, TextError::NonFiniteFloat { ref path, .. } if path == "$[0][0]"));
    }

    #[test]
    fn non_utf8_bytes_are_rejected() {
        let err = to_json(&[Value::Null, Value::bytes(b"\xff\xfe")]).unwrap_err();
        assert!(matches!(err, TextError::NonUtf8Bytes { ref path } if path == "$[1]"));
    }

    #[test]
    fn integers_prefer_i64() {
        let values = from_text("[1, -1, 18446744073709551615, 1.5]").unwrap();
        assert_eq!(
            values,
            vec![
                Value::I64(1),
                Value::I64(-1),
                Value::U64(u64::MAX),
                Value::F64(1.5)
            ]
        );
    }

    #[test]
    fn top_level_must_be_an_array() {
        let err = from_text(r#"{"a": 1}"#).unwrap_err();
        assert!(matches!(err, TextError::NotAnArray { found: "object" }));
    }

    #[test]
    fn nested_object_is_rejected() {
        let err = from_text(r#"[null, [{}]]"#).unwrap_err();
        assert!(matches!(err, TextError::UnexpectedObject { ref path } if path == "$[1][0]"));
    }

    #[test]
    fn malformed_text_is_a_json_error() {
        assert!(matches!(from_text("[1,"), Err(TextError::Json(_))));
    }
}
