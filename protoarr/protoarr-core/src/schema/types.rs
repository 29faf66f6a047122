use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
};

use crate::error::CodecError;

/// Protobuf scalar types a field can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::Double | ScalarKind::Float)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            ScalarKind::Uint32 | ScalarKind::Uint64 | ScalarKind::Fixed32 | ScalarKind::Fixed64
        )
    }

    pub fn is_integer(&self) -> bool {
        !matches!(
            self,
            ScalarKind::Double
                | ScalarKind::Float
                | ScalarKind::Bool
                | ScalarKind::String
                | ScalarKind::Bytes
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

/// What a field holds. Enum and message kinds carry the fully qualified
/// name of the referenced type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Enum(String),
    Message(String),
}

impl FieldKind {
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Scalar(s) => s.type_name(),
            FieldKind::Enum(name) | FieldKind::Message(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    #[default]
    Singular,
    Repeated,
}

/// One field declaration of a [`SchemaView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    /// Value that is written as `null` in the array form.
    pub nullable_default: Option<String>,
    /// Name of the oneof group this field belongs to, if any. At most one
    /// member of a group is restored from its default per message.
    pub oneof: Option<String>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
            cardinality: Cardinality::Singular,
            nullable_default: None,
            oneof: None,
        }
    }

    pub fn scalar(name: impl Into<String>, number: u32, kind: ScalarKind) -> Self {
        Self::new(name, number, FieldKind::Scalar(kind))
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    pub fn with_nullable_default(mut self, default: impl Into<String>) -> Self {
        self.nullable_default = Some(default.into());
        self
    }

    pub fn in_oneof(mut self, group: impl Into<String>) -> Self {
        self.oneof = Some(group.into());
        self
    }

    /// Zero-based array position of this field.
    ///
    /// Number 0 is rejected by [`SchemaView::new`]; a hand-built declaration
    /// carrying it maps to position 0.
    pub fn index(&self) -> usize {
        (self.number as usize).saturating_sub(1)
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    /// Fully qualified nested type name for message-typed fields.
    pub fn message_type(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Message(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_message(&self) -> bool {
        self.message_type().is_some()
    }

    pub fn is_bytes(&self) -> bool {
        self.kind == FieldKind::Scalar(ScalarKind::Bytes)
    }
}

/// Ordered field declarations of one message type.
///
/// Declarations are kept in ascending field-number order; numbers are
/// unique and start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaView {
    name: String,
    fields: Vec<FieldDecl>,
}

impl SchemaView {
    pub fn new(name: impl Into<String>, mut fields: Vec<FieldDecl>) -> Result<Self, CodecError> {
        let name = name.into();
        fields.sort_by_key(|f| f.number);

        if let Some(zero) = fields.iter().find(|f| f.number == 0) {
            return Err(CodecError::SchemaInvalid {
                schema_name: name,
                detail: format!("field `{}` has number 0", zero.name),
            });
        }
        if let Some(pair) = fields.windows(2).find(|w| w[0].number == w[1].number) {
            return Err(CodecError::SchemaInvalid {
                schema_name: name,
                detail: format!(
                    "fields `{}` and `{}` share number {}",
                    pair[0].name, pair[1].name, pair[0].number
                ),
            });
        }

        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn field_by_number(&self, number: u32) -> Option<&FieldDecl> {
        self.fields
            .binary_search_by_key(&number, |f| f.number)
            .ok()
            .map(|i| &self.fields[i])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Highest declared field number, i.e. the length of a fully padded array.
    pub fn max_number(&self) -> u32 {
        self.fields.last().map_or(0, |f| f.number)
    }
}

impl Deref for SchemaView {
    type Target = [FieldDecl];

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl Display for SchemaView {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let text = super::format_schema_view(self)?;
        f.write_str(&text)
    }
}
