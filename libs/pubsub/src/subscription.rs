//! Topic subscriptions: one route bound to a (pubsub, topic) pair.

use crate::error::{Result, SubscriptionError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key that switches a subscription to raw-payload delivery
pub const RAW_PAYLOAD_KEY: &str = "rawPayload";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Pub/sub component name
    #[serde(rename = "pubsubname")]
    pub pubsub_name: String,
    pub topic: String,
    /// Inbound path the sidecar POSTs events to
    pub route: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Subscription {
    pub fn new(
        pubsub_name: impl Into<String>,
        topic: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            pubsub_name: pubsub_name.into(),
            topic: topic.into(),
            route: route.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check required fields in registration order
    pub fn validate(&self) -> Result<()> {
        if self.topic.is_empty() {
            return Err(SubscriptionError::MissingTopic);
        }
        if self.pubsub_name.is_empty() {
            return Err(SubscriptionError::MissingPubsubName);
        }
        if self.route.is_empty() {
            return Err(SubscriptionError::MissingRoute);
        }
        Ok(())
    }

    /// Copy with the route rooted at `/`
    pub fn normalized(&self) -> Self {
        let mut sub = self.clone();
        if !sub.route.starts_with('/') {
            sub.route = format!("/{}", sub.route);
        }
        sub
    }

    /// True when metadata asks for raw-payload delivery
    pub fn is_raw_payload(&self) -> bool {
        self.metadata
            .get(RAW_PAYLOAD_KEY)
            .map(|value| parse_flag(value))
            .unwrap_or(false)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True")
}
