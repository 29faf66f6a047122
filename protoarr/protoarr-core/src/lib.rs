//! Message-agnostic core of `protoarr`.
//!
//! This crate provides the [`SchemaView`] description of a message type, the
//! positional array [`Value`], the [`MessageAccess`] / [`SchemaSource`]
//! traits a message provider implements, and the transcoding algorithms
//! themselves: [`encode`], [`decode`] and [`coerce_default`].

mod coerce;
mod decode;
mod encode;
mod error;
mod message;
mod schema;
mod source;
mod value;

pub use coerce::{coerce_default, coerce_scalar};
pub use decode::{decode, restore_defaults};
pub use encode::{encode, matches_default};
pub use error::{CodecError, ValueTypeError};
pub use message::{FieldValue, MessageAccess};
pub use schema::{Cardinality, FieldDecl, FieldKind, ScalarKind, SchemaView, format_schema_view};
pub use source::{SchemaSource, StaticSchemas};
pub use value::Value;
