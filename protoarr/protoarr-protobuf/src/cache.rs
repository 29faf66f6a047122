//! Memoized schema views over a descriptor pool.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use prost_reflect::DescriptorPool;
use protoarr_core::{CodecError, SchemaSource, SchemaView};
use tracing::debug;

use crate::{SchemaOptions, schema::message_descriptor_to_schema_view};

/// [`SchemaSource`] deriving views from a [`DescriptorPool`] on first use.
///
/// Views are immutable once derived. Two threads missing the same type may
/// both derive it; the first insert wins and both observe the same `Arc`
/// afterwards.
#[derive(Debug)]
pub struct SchemaCache {
    pool: DescriptorPool,
    options: SchemaOptions,
    views: RwLock<HashMap<String, Arc<SchemaView>>>,
}

impl SchemaCache {
    pub fn new(pool: DescriptorPool, options: SchemaOptions) -> Self {
        Self {
            pool,
            options,
            views: RwLock::new(HashMap::new()),
        }
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Number of views derived so far.
    pub fn len(&self) -> usize {
        self.views.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SchemaSource for SchemaCache {
    fn schema(&self, type_name: &str) -> Result<Arc<SchemaView>, CodecError> {
        let type_name = type_name.trim_start_matches('.');
        // A poisoned lock still holds complete entries; views are inserted whole.
        if let Some(view) = self
            .views
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(type_name)
        {
            return Ok(Arc::clone(view));
        }

        let desc = self
            .pool
            .get_message_by_name(type_name)
            .ok_or_else(|| CodecError::SchemaNotFound {
                type_name: type_name.to_string(),
            })?;
        let view = Arc::new(message_descriptor_to_schema_view(&desc, &self.options)?);
        debug!(
            schema = type_name,
            fields = view.len(),
            "derived schema view"
        );

        let mut views = self.views.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(
            views.entry(type_name.to_string()).or_insert(view),
        ))
    }
}
