//! Resolution of message type names to their schema views.

use std::{collections::HashMap, sync::Arc};

use crate::{error::CodecError, schema::SchemaView};

/// Resolves fully qualified message type names to [`SchemaView`]s.
///
/// Nested message fields reference their type by name, so the encoder and
/// decoder go through a source to recurse. Implementations must return the
/// same view for the same name on every call.
pub trait SchemaSource {
    fn schema(&self, type_name: &str) -> Result<Arc<SchemaView>, CodecError>;
}

impl<S: SchemaSource + ?Sized> SchemaSource for &S {
    fn schema(&self, type_name: &str) -> Result<Arc<SchemaView>, CodecError> {
        (**self).schema(type_name)
    }
}

impl<S: SchemaSource + ?Sized> SchemaSource for Arc<S> {
    fn schema(&self, type_name: &str) -> Result<Arc<SchemaView>, CodecError> {
        (**self).schema(type_name)
    }
}

/// Fixed set of schema views, for providers that know all their types up front.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemas {
    views: HashMap<String, Arc<SchemaView>>,
}

impl StaticSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, view: SchemaView) -> Arc<SchemaView> {
        let view = Arc::new(view);
        self.views.insert(view.name().to_string(), Arc::clone(&view));
        view
    }
}

impl FromIterator<SchemaView> for StaticSchemas {
    fn from_iter<T: IntoIterator<Item = SchemaView>>(iter: T) -> Self {
        let mut schemas = Self::new();
        for view in iter {
            schemas.insert(view);
        }
        schemas
    }
}

impl SchemaSource for StaticSchemas {
    fn schema(&self, type_name: &str) -> Result<Arc<SchemaView>, CodecError> {
        self.views
            .get(type_name)
            .cloned()
            .ok_or_else(|| CodecError::SchemaNotFound {
                type_name: type_name.to_string(),
            })
    }
}
