//! Payload serializers selected per actor type at registration.

use crate::error::{ActorError, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Name of the serializer used when registration options do not pick one
pub const DEFAULT_SERIALIZER: &str = "json";

/// Converts method payload bytes to and from values
pub trait Serializer: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Value>;

    fn encode(&self, value: &Value) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &'static str {
        DEFAULT_SERIALIZER
    }

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn encode(&self, value: &Value) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }
}

/// Look up a serializer by name
pub fn serializer_for(name: &str) -> Result<Arc<dyn Serializer>> {
    match name {
        DEFAULT_SERIALIZER => Ok(Arc::new(JsonSerializer)),
        other => Err(ActorError::UnsupportedSerializer {
            name: other.to_string(),
        }),
    }
}
