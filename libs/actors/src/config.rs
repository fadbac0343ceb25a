//! Runtime configuration exported to the sidecar and per-registration options.

use crate::serializer::DEFAULT_SERIALIZER;
use serde::{Deserialize, Serialize};

/// Body served on the config route.
///
/// `entities` is append-only and not deduplicated: registering a type twice
/// lists it twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRuntimeConfig {
    #[serde(rename = "entities")]
    pub registered_actor_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_idle_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_scan_interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drain_ongoing_call_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub drain_rebalanced_actors: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Process-wide actor settings advertised to the sidecar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorRuntimeSettings {
    pub actor_idle_timeout: Option<String>,
    pub actor_scan_interval: Option<String>,
    pub drain_ongoing_call_timeout: Option<String>,
    pub drain_rebalanced_actors: bool,
}

impl ActorRuntimeConfig {
    pub fn with_settings(settings: ActorRuntimeSettings) -> Self {
        Self {
            registered_actor_types: Vec::new(),
            actor_idle_timeout: settings.actor_idle_timeout,
            actor_scan_interval: settings.actor_scan_interval,
            drain_ongoing_call_timeout: settings.drain_ongoing_call_timeout,
            drain_rebalanced_actors: settings.drain_rebalanced_actors,
        }
    }
}

/// Options for one `register_actor_factory` call.
///
/// Only the first registration of a type decides its serializer; later
/// registrations reuse the existing manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRegistrationOptions {
    pub serializer: String,
}

impl Default for ActorRegistrationOptions {
    fn default() -> Self {
        Self {
            serializer: DEFAULT_SERIALIZER.to_string(),
        }
    }
}

impl ActorRegistrationOptions {
    pub fn with_serializer(mut self, serializer: impl Into<String>) -> Self {
        self.serializer = serializer.into();
        self
    }
}
