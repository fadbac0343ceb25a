//! Host Configuration Module
//!
//! Loads [`HostConfig`] from an optional TOML file, then applies
//! `APPHOST_`-prefixed environment overrides. Missing keys fall back to the
//! defaults in [`crate::defaults`].

use crate::defaults;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

/// Main host configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    pub server: ServerSettings,
    pub actors: ActorSettings,
    /// Subscriptions declared in configuration rather than code
    pub subscriptions: Vec<SubscriptionSettings>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Actor runtime settings advertised to the sidecar
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ActorSettings {
    pub actor_idle_timeout: Option<String>,
    pub actor_scan_interval: Option<String>,
    pub drain_ongoing_call_timeout: Option<String>,
    pub drain_rebalanced_actors: bool,
    /// Serializer used when registration does not choose one
    pub serializer: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SubscriptionSettings {
    pub pubsub_name: String,
    pub topic: String,
    pub route: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: defaults::server::BIND_ADDRESS.to_string(),
            port: defaults::server::PORT,
            log_level: defaults::server::LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            actor_idle_timeout: None,
            actor_scan_interval: None,
            drain_ongoing_call_timeout: None,
            drain_rebalanced_actors: false,
            serializer: defaults::actors::SERIALIZER.to_string(),
        }
    }
}

impl HostConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading host config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        } else {
            debug!("No config file given, using defaults and environment");
        }

        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator(defaults::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Address the callback server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.bind_address, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid bind address {}:{}",
                    self.server.bind_address, self.server.port
                )
            })
    }
}
