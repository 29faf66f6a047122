//! Positional array encoding for protobuf messages.
//!
//! A message becomes a JSON array where field number `n` sits at index
//! `n - 1`. Fields annotated with a `nullable` default are written as `null`
//! when they hold that default and restored from it when decoding.
//!
//! ```no_run
//! # use prost_reflect::ReflectMessage;
//! # fn run(fds: &[u8], msg: &prost_reflect::DynamicMessage) -> Result<(), protoarr::TextError> {
//! let codec = protoarr::ArrayCodec::from_file_descriptor_set(fds)?;
//! let text = protoarr::encode_to_string(&codec, msg)?;
//! let back = protoarr::decode_new_from_str(&codec, &text, msg.descriptor())?;
//! # let _ = back;
//! # Ok(())
//! # }
//! ```

mod error;
mod text;

pub use error::TextError;
pub use protoarr_core as core;
pub use protoarr_core::{CodecError, Value};
pub use protoarr_protobuf as protobuf;
pub use protoarr_protobuf::{ArrayCodec, SchemaOptions};
pub use text::{
    decode_from_str, decode_new_from_str, encode_to_string, from_json, from_text, to_json, to_text,
};
