//! `prost-reflect` message provider for protoarr.
//!
//! This crate wraps [`DynamicMessage`] in [`ProtoMessage`], which implements
//! [`MessageAccess`](protoarr_core::MessageAccess), derives [`SchemaView`]s
//! from protobuf descriptors (reading each field's `nullable` custom option)
//! and bundles both behind [`ArrayCodec`].

mod cache;
mod message;
mod options;
mod schema;

use std::sync::Arc;

use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor, ReflectMessage};
use protoarr_core::{CodecError, SchemaSource, SchemaView, Value};

pub use cache::SchemaCache;
pub use message::ProtoMessage;
pub use options::{DEFAULT_NULLABLE_OPTION, SchemaOptions};
pub use schema::{message_descriptor_to_schema_view, nullable_default};

/// Positional array codec for protobuf messages of one descriptor pool.
///
/// Schema views are derived lazily and cached, so a codec should be kept
/// around and shared (it is `Send + Sync`) rather than rebuilt per message.
#[derive(Debug)]
pub struct ArrayCodec {
    schemas: SchemaCache,
}

impl ArrayCodec {
    pub fn new(pool: DescriptorPool) -> Self {
        Self::with_options(pool, SchemaOptions::default())
    }

    pub fn with_options(pool: DescriptorPool, options: SchemaOptions) -> Self {
        Self {
            schemas: SchemaCache::new(pool, options),
        }
    }

    /// Build a codec for the pool `desc` belongs to.
    pub fn for_descriptor(desc: &MessageDescriptor) -> Self {
        Self::new(desc.parent_pool().clone())
    }

    /// Build a codec from serialized `google.protobuf.FileDescriptorSet` bytes.
    pub fn from_file_descriptor_set(schema_data: &[u8]) -> Result<Self, CodecError> {
        let pool = DescriptorPool::decode(schema_data).map_err(|e| CodecError::SchemaParse {
            source: Box::new(e),
        })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DescriptorPool {
        self.schemas.pool()
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    pub fn message_descriptor(&self, name: &str) -> Result<MessageDescriptor, CodecError> {
        self.pool()
            .get_message_by_name(name)
            .ok_or_else(|| CodecError::SchemaNotFound {
                type_name: name.to_string(),
            })
    }

    pub fn schema_view(&self, desc: &MessageDescriptor) -> Result<Arc<SchemaView>, CodecError> {
        self.schemas.schema(desc.full_name())
    }

    pub fn schema_view_by_name(&self, name: &str) -> Result<Arc<SchemaView>, CodecError> {
        self.schemas.schema(name)
    }

    /// Encode `message` into its positional array form.
    pub fn encode(&self, message: &DynamicMessage) -> Result<Vec<Value>, CodecError> {
        let view = self.schema_view(&message.descriptor())?;
        protoarr_core::encode(&ProtoMessage::borrowed(message), &view, &self.schemas)
    }

    /// Populate `message` from `array`, restoring nullable defaults.
    ///
    /// On error, fields assigned before the failing position keep their new
    /// values.
    pub fn decode(&self, array: &[Value], message: &mut DynamicMessage) -> Result<(), CodecError> {
        let desc = message.descriptor();
        let view = self.schema_view(&desc)?;
        let mut target =
            ProtoMessage::from(std::mem::replace(message, DynamicMessage::new(desc)));
        let result = protoarr_core::decode(array, &view, &self.schemas, &mut target);
        *message = target.into_inner();
        result
    }

    /// Decode `array` into a fresh message of type `desc`.
    pub fn decode_new(
        &self,
        array: &[Value],
        desc: MessageDescriptor,
    ) -> Result<DynamicMessage, CodecError> {
        let mut message = DynamicMessage::new(desc);
        self.decode(array, &mut message)?;
        Ok(message)
    }
}
