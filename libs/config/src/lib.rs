//! # Application Host Configuration
//!
//! Settings for the callback server and the actor runtime, loaded from an
//! optional TOML file with `APPHOST_` environment overrides on top.
//!
//! ## Usage
//!
//! ```rust
//! use apphost_config::HostConfig;
//!
//! let config = HostConfig::load(None).unwrap();
//! let addr = config.socket_addr().unwrap();
//! assert!(addr.port() > 0);
//! ```

pub mod defaults;
pub mod host_config;

pub use host_config::{
    ActorSettings, HostConfig, LogFormat, ServerSettings, SubscriptionSettings,
};
