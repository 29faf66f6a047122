//! [`MessageAccess`] implementation over `prost_reflect::DynamicMessage`.

use std::{borrow::Cow, collections::HashMap};

use bytes::Bytes;
use prost_reflect::{
    DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor, ReflectMessage,
    Value as ProtoValue,
};
use protoarr_core::{CodecError, FieldDecl, FieldValue, MessageAccess, Value, ValueTypeError};

/// A [`DynamicMessage`] as seen by the transcoder.
///
/// Encoding only reads, so it borrows the caller's message; nested messages
/// and decode targets are owned.
#[derive(Debug, Clone)]
pub struct ProtoMessage<'a>(Cow<'a, DynamicMessage>);

impl<'a> ProtoMessage<'a> {
    pub fn borrowed(message: &'a DynamicMessage) -> Self {
        Self(Cow::Borrowed(message))
    }

    pub fn as_message(&self) -> &DynamicMessage {
        &self.0
    }

    pub fn into_inner(self) -> DynamicMessage {
        self.0.into_owned()
    }

    fn owned(message: DynamicMessage) -> Self {
        Self(Cow::Owned(message))
    }
}

impl From<DynamicMessage> for ProtoMessage<'static> {
    fn from(message: DynamicMessage) -> Self {
        Self::owned(message)
    }
}

impl MessageAccess for ProtoMessage<'_> {
    fn get_field(&self, field: &FieldDecl) -> Result<FieldValue<Self>, CodecError> {
        let msg = self.as_message();
        let fd = field_descriptor(msg, field)?;
        // Unset fields with explicit presence read as null so that decoding
        // neither gives them presence nor lets them displace a oneof sibling.
        if !msg.has_field(&fd) && tracks_presence(&fd) {
            return Ok(FieldValue::Value(Value::Null));
        }
        let value = msg.get_field(&fd);
        match &*value {
            ProtoValue::Message(m) => Ok(FieldValue::Message(Self::owned(m.clone()))),
            ProtoValue::Map(map) => {
                let entries = map_to_entries(field, &fd, map)?;
                Ok(FieldValue::Messages(entries.into_iter().map(Self::owned).collect()))
            }
            ProtoValue::List(items) if matches!(fd.kind(), Kind::Message(_)) => {
                let items = items.iter().filter_map(|v| v.as_message().cloned());
                Ok(FieldValue::Messages(items.map(Self::owned).collect()))
            }
            other => from_proto(field, other).map(FieldValue::Value),
        }
    }

    fn set_field(&mut self, field: &FieldDecl, value: FieldValue<Self>) -> Result<(), CodecError> {
        let fd = field_descriptor(self.as_message(), field)?;
        let msg = self.0.to_mut();
        let proto = match value {
            FieldValue::Value(value) if fd.is_list() => {
                let items = value
                    .try_array()
                    .map_err(|e| CodecError::type_mismatch(&field.name, e))?
                    .unwrap_or_default();
                let items = items
                    .iter()
                    .map(|item| to_proto(field, &fd.kind(), item))
                    .collect::<Result<Vec<_>, _>>()?;
                ProtoValue::List(items)
            }
            FieldValue::Value(value) => to_proto(field, &fd.kind(), &value)?,
            FieldValue::Message(m) => ProtoValue::Message(m.into_inner()),
            FieldValue::Messages(items) if items.is_empty() => {
                msg.clear_field(&fd);
                return Ok(());
            }
            FieldValue::Messages(items) => {
                let items: Vec<_> = items.into_iter().map(ProtoMessage::into_inner).collect();
                if fd.is_map() {
                    entries_to_map(field, &fd, items)?
                } else {
                    ProtoValue::List(items.into_iter().map(ProtoValue::Message).collect())
                }
            }
        };
        set_or_fail(field, msg, &fd, proto)
    }

    fn has_field(&self, field: &FieldDecl) -> bool {
        let msg = self.as_message();
        msg.descriptor()
            .get_field(field.number)
            .is_some_and(|fd| msg.has_field(&fd))
    }

    fn new_nested(&self, field: &FieldDecl) -> Result<Self, CodecError> {
        let fd = field_descriptor(self.as_message(), field)?;
        match fd.kind() {
            Kind::Message(md) => Ok(Self::owned(DynamicMessage::new(md))),
            other => Err(CodecError::FieldAccess {
                field: field.name.clone(),
                detail: format!("expected a message field, found {other:?}"),
            }),
        }
    }

    fn is_empty(&self) -> bool {
        let msg = self.as_message();
        msg.descriptor().fields().all(|fd| !msg.has_field(&fd))
    }

    fn text_form(&self) -> String {
        self.as_message().to_string()
    }
}

// Message fields outside a oneof keep their recursive array form even when
// unset.
fn tracks_presence(fd: &FieldDescriptor) -> bool {
    fd.supports_presence()
        && (fd.containing_oneof().is_some() || !matches!(fd.kind(), Kind::Message(_)))
}

fn field_descriptor(
    msg: &DynamicMessage,
    field: &FieldDecl,
) -> Result<FieldDescriptor, CodecError> {
    msg.descriptor()
        .get_field(field.number)
        .ok_or_else(|| CodecError::FieldAccess {
            field: field.name.clone(),
            detail: format!(
                "message '{}' has no field number {}",
                msg.descriptor().full_name(),
                field.number
            ),
        })
}

fn from_proto(field: &FieldDecl, value: &ProtoValue) -> Result<Value, CodecError> {
    Ok(match value {
        ProtoValue::Bool(v) => Value::Bool(*v),
        ProtoValue::I32(v) => Value::I64(i64::from(*v)),
        ProtoValue::I64(v) => Value::I64(*v),
        ProtoValue::U32(v) => Value::U64(u64::from(*v)),
        ProtoValue::U64(v) => Value::U64(*v),
        ProtoValue::F32(v) => Value::F32(*v),
        ProtoValue::F64(v) => Value::F64(*v),
        ProtoValue::String(s) => Value::string(s),
        ProtoValue::Bytes(b) => Value::bytes(b),
        ProtoValue::EnumNumber(n) => Value::I64(i64::from(*n)),
        ProtoValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| from_proto(field, item))
                .collect::<Result<_, _>>()?,
        ),
        ProtoValue::Message(_) | ProtoValue::Map(_) => {
            return Err(CodecError::FieldAccess {
                field: field.name.clone(),
                detail: "message value in a scalar field".to_string(),
            });
        }
    })
}

fn to_proto(field: &FieldDecl, kind: &Kind, value: &Value) -> Result<ProtoValue, CodecError> {
    let proto = match kind {
        Kind::Double => ProtoValue::F64(required(field, value.try_f64(), value)?),
        Kind::Float => ProtoValue::F32(required(field, value.try_f64(), value)? as f32),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            ProtoValue::I32(narrow(field, required(field, value.try_i64(), value)?)?)
        }
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
            ProtoValue::I64(required(field, value.try_i64(), value)?)
        }
        Kind::Uint32 | Kind::Fixed32 => {
            ProtoValue::U32(narrow(field, required(field, value.try_u64(), value)?)?)
        }
        Kind::Uint64 | Kind::Fixed64 => ProtoValue::U64(required(field, value.try_u64(), value)?),
        Kind::Bool => ProtoValue::Bool(required(field, value.try_bool(), value)?),
        Kind::String => ProtoValue::String(required(field, value.try_str(), value)?.to_string()),
        Kind::Bytes => {
            ProtoValue::Bytes(Bytes::copy_from_slice(required(field, value.try_bytes(), value)?))
        }
        Kind::Enum(_) => {
            ProtoValue::EnumNumber(narrow(field, required(field, value.try_i64(), value)?)?)
        }
        Kind::Message(_) => {
            return Err(CodecError::type_mismatch(
                &field.name,
                value.type_mismatch("Array"),
            ));
        }
    };
    Ok(proto)
}

// `Null` is never a valid field value; the decoder handles it before this.
fn required<T>(
    field: &FieldDecl,
    result: Result<Option<T>, ValueTypeError>,
    value: &Value,
) -> Result<T, CodecError> {
    result
        .map_err(|e| CodecError::type_mismatch(&field.name, e))?
        .ok_or_else(|| CodecError::type_mismatch(&field.name, value.type_mismatch("a value")))
}

fn narrow<T, U>(field: &FieldDecl, v: T) -> Result<U, CodecError>
where
    T: Copy + std::fmt::Display,
    U: TryFrom<T>,
{
    U::try_from(v).map_err(|_| CodecError::ValueOutOfRange {
        field: field.name.clone(),
        value: v.to_string(),
    })
}

fn map_entry_fields(
    field: &FieldDecl,
    fd: &FieldDescriptor,
) -> Result<(MessageDescriptor, FieldDescriptor, FieldDescriptor), CodecError> {
    match fd.kind() {
        Kind::Message(entry) if entry.is_map_entry() => {
            let key = entry.map_entry_key_field();
            let value = entry.map_entry_value_field();
            Ok((entry, key, value))
        }
        other => Err(CodecError::FieldAccess {
            field: field.name.clone(),
            detail: format!("map field has non-entry kind {other:?}"),
        }),
    }
}

// Map fields are exposed as their entry messages, ordered by key so the
// array form is deterministic.
fn map_to_entries(
    field: &FieldDecl,
    fd: &FieldDescriptor,
    map: &HashMap<MapKey, ProtoValue>,
) -> Result<Vec<DynamicMessage>, CodecError> {
    let (entry_desc, key_fd, value_fd) = map_entry_fields(field, fd)?;

    let mut pairs: Vec<_> = map.iter().collect();
    pairs.sort_by(|(a, _), (b, _)| map_key_order(a).cmp(&map_key_order(b)));

    pairs
        .into_iter()
        .map(|(key, value)| {
            let mut entry = DynamicMessage::new(entry_desc.clone());
            set_or_fail(field, &mut entry, &key_fd, map_key_to_value(key))?;
            set_or_fail(field, &mut entry, &value_fd, value.clone())?;
            Ok(entry)
        })
        .collect()
}

fn entries_to_map(
    field: &FieldDecl,
    fd: &FieldDescriptor,
    entries: Vec<DynamicMessage>,
) -> Result<ProtoValue, CodecError> {
    let (_, key_fd, value_fd) = map_entry_fields(field, fd)?;
    let mut map = HashMap::with_capacity(entries.len());
    for entry in entries {
        let key = DynamicMessage::get_field(&entry, &key_fd);
        let key = value_to_map_key(&key).ok_or_else(|| CodecError::FieldAccess {
            field: field.name.clone(),
            detail: format!("invalid map key {key:?}"),
        })?;
        let value = DynamicMessage::get_field(&entry, &value_fd).into_owned();
        map.insert(key, value);
    }
    Ok(ProtoValue::Map(map))
}

fn set_or_fail(
    field: &FieldDecl,
    msg: &mut DynamicMessage,
    fd: &FieldDescriptor,
    value: ProtoValue,
) -> Result<(), CodecError> {
    msg.try_set_field(fd, value)
        .map_err(|e| CodecError::FieldAccess {
            field: field.name.clone(),
            detail: e.to_string(),
        })
}

fn map_key_order(key: &MapKey) -> (i128, &str) {
    match key {
        MapKey::Bool(v) => (i128::from(*v), ""),
        MapKey::I32(v) => (i128::from(*v), ""),
        MapKey::I64(v) => (i128::from(*v), ""),
        MapKey::U32(v) => (i128::from(*v), ""),
        MapKey::U64(v) => (i128::from(*v), ""),
        MapKey::String(s) => (0, s.as_str()),
    }
}

fn map_key_to_value(key: &MapKey) -> ProtoValue {
    match key {
        MapKey::Bool(v) => ProtoValue::Bool(*v),
        MapKey::I32(v) => ProtoValue::I32(*v),
        MapKey::I64(v) => ProtoValue::I64(*v),
        MapKey::U32(v) => ProtoValue::U32(*v),
        MapKey::U64(v) => ProtoValue::U64(*v),
        MapKey::String(s) => ProtoValue::String(s.clone()),
    }
}

fn value_to_map_key(value: &ProtoValue) -> Option<MapKey> {
    match value {
        ProtoValue::Bool(v) => Some(MapKey::Bool(*v)),
        ProtoValue::I32(v) => Some(MapKey::I32(*v)),
        ProtoValue::I64(v) => Some(MapKey::I64(*v)),
        ProtoValue::U32(v) => Some(MapKey::U32(*v)),
        ProtoValue::U64(v) => Some(MapKey::U64(*v)),
        ProtoValue::String(s) => Some(MapKey::String(s.clone())),
        _ => None,
    }
}
