//! Capability trait through which the codec reads and writes messages.

use crate::{error::CodecError, schema::FieldDecl, value::Value};

/// Content of one field slot as seen by the codec.
///
/// Scalar, enum and bytes fields travel as a [`Value`] (repeated ones as a
/// [`Value::Array`]); message-typed fields hand out the sub-messages
/// themselves so the codec can recurse into them.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<M> {
    Value(Value),
    Message(M),
    Messages(Vec<M>),
}

/// Reflective access to a message instance, implemented once per message
/// provider.
///
/// Nested messages are represented by the same type as their parent, which
/// keeps dynamic providers (one type for every schema) straightforward.
pub trait MessageAccess: Sized {
    /// Read the current value of `field`. Unset fields report their type's
    /// ordinary default.
    fn get_field(&self, field: &FieldDecl) -> Result<FieldValue<Self>, CodecError>;

    /// Replace the content of `field`, converting to its native type.
    fn set_field(&mut self, field: &FieldDecl, value: FieldValue<Self>) -> Result<(), CodecError>;

    /// Whether `field` is explicitly populated on this instance.
    fn has_field(&self, field: &FieldDecl) -> bool;

    /// Construct a zero-valued instance of the message type `field` refers to.
    fn new_nested(&self, field: &FieldDecl) -> Result<Self, CodecError>;

    /// `true` when no field is populated.
    fn is_empty(&self) -> bool;

    /// Human-readable text form, compared against message-level nullable
    /// defaults. Only needs to be stable for a given provider.
    fn text_form(&self) -> String;
}
