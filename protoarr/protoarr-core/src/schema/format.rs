use std::fmt::{Error, Write as _};

use super::{FieldDecl, SchemaView};

/// Format a schema view one field per line, in array order:
///
/// ```text
/// message pkg.Queue
///     [0] 1 field_int: int32 (nullable = "0")
///     [6] 7 items: repeated pkg.Queue.Item
/// ```
pub fn format_schema_view(view: &SchemaView) -> Result<String, Error> {
    let mut out = String::new();
    writeln!(out, "message {}", view.name())?;
    for field in view.fields() {
        format_field(field, &mut out)?;
    }
    Ok(out)
}

fn format_field(field: &FieldDecl, out: &mut String) -> Result<(), Error> {
    let label = if field.is_repeated() { "repeated " } else { "" };
    write!(
        out,
        "    [{}] {} {}: {label}{}",
        field.index(),
        field.number,
        field.name,
        field.kind.type_name()
    )?;
    if let Some(group) = &field.oneof {
        write!(out, " (oneof {group})")?;
    }
    if let Some(default) = &field.nullable_default {
        write!(out, " (nullable = {default:?})")?;
    }
    writeln!(out)
}
