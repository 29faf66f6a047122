//! Schema View: the ordered, immutable field declarations of a message type.

mod format;
mod types;

pub use format::format_schema_view;
pub use types::{Cardinality, FieldDecl, FieldKind, ScalarKind, SchemaView};
