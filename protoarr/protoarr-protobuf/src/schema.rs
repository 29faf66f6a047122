//! Derive [`SchemaView`]s from protobuf message descriptors.

use prost_reflect::{FieldDescriptor, Kind, MessageDescriptor, Value as ProtoValue};
use protoarr_core::{CodecError, FieldDecl, FieldKind, ScalarKind, SchemaView};

use crate::SchemaOptions;

/// Derive the schema view of a single message type.
///
/// Nested message and enum fields reference their types by fully qualified
/// name; map fields become repeated fields of their synthesized entry type.
pub fn message_descriptor_to_schema_view(
    desc: &MessageDescriptor,
    options: &SchemaOptions,
) -> Result<SchemaView, CodecError> {
    let fields = desc
        .fields()
        .map(|fd| field_descriptor_to_decl(&fd, options))
        .collect();
    SchemaView::new(desc.full_name(), fields)
}

fn field_descriptor_to_decl(fd: &FieldDescriptor, options: &SchemaOptions) -> FieldDecl {
    let kind = match fd.kind() {
        Kind::Double => FieldKind::Scalar(ScalarKind::Double),
        Kind::Float => FieldKind::Scalar(ScalarKind::Float),
        Kind::Int32 => FieldKind::Scalar(ScalarKind::Int32),
        Kind::Int64 => FieldKind::Scalar(ScalarKind::Int64),
        Kind::Uint32 => FieldKind::Scalar(ScalarKind::Uint32),
        Kind::Uint64 => FieldKind::Scalar(ScalarKind::Uint64),
        Kind::Sint32 => FieldKind::Scalar(ScalarKind::Sint32),
        Kind::Sint64 => FieldKind::Scalar(ScalarKind::Sint64),
        Kind::Fixed32 => FieldKind::Scalar(ScalarKind::Fixed32),
        Kind::Fixed64 => FieldKind::Scalar(ScalarKind::Fixed64),
        Kind::Sfixed32 => FieldKind::Scalar(ScalarKind::Sfixed32),
        Kind::Sfixed64 => FieldKind::Scalar(ScalarKind::Sfixed64),
        Kind::Bool => FieldKind::Scalar(ScalarKind::Bool),
        Kind::String => FieldKind::Scalar(ScalarKind::String),
        Kind::Bytes => FieldKind::Scalar(ScalarKind::Bytes),
        Kind::Enum(ed) => FieldKind::Enum(ed.full_name().to_string()),
        Kind::Message(md) => FieldKind::Message(md.full_name().to_string()),
    };

    let mut decl = FieldDecl::new(fd.name(), fd.number(), kind);
    if fd.is_list() || fd.is_map() {
        decl = decl.repeated();
    }
    decl.nullable_default = nullable_default(fd, options);
    decl.oneof = fd
        .containing_oneof()
        .filter(|oneof| !oneof.is_synthetic())
        .map(|oneof| oneof.name().to_string());
    decl
}

/// Read the nullable-default option of a field.
///
/// The option is an extension of `google.protobuf.FieldOptions`; the pool
/// resolves options written in their uninterpreted form when the descriptor
/// set is loaded, so resolved extensions are the only place to look.
pub fn nullable_default(fd: &FieldDescriptor, options: &SchemaOptions) -> Option<String> {
    let field_options = fd.options();
    field_options
        .extensions()
        .find(|(ext, _)| options.matches_option_name(ext.full_name()))
        .and_then(|(_, value)| option_value_text(value))
}

fn option_value_text(value: &ProtoValue) -> Option<String> {
    match value {
        ProtoValue::String(s) => Some(s.clone()),
        ProtoValue::Bool(v) => Some(v.to_string()),
        ProtoValue::I32(v) => Some(v.to_string()),
        ProtoValue::I64(v) => Some(v.to_string()),
        ProtoValue::U32(v) => Some(v.to_string()),
        ProtoValue::U64(v) => Some(v.to_string()),
        ProtoValue::F32(v) => Some(v.to_string()),
        ProtoValue::F64(v) => Some(v.to_string()),
        ProtoValue::EnumNumber(v) => Some(v.to_string()),
        ProtoValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        ProtoValue::Message(_) | ProtoValue::List(_) | ProtoValue::Map(_) => None,
    }
}
