//! Actor Dispatch Infrastructure
//!
//! In-process side of virtual actors: user code registers actor factories,
//! the sidecar calls methods, reminders and timers by (type, id), and the
//! [`ActorRuntime`] routes each call to the manager that owns that type.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────┐     ┌────────────────────┐
//! │ HTTP adapter │────▶│     ActorRuntime     │────▶│   ActorManager     │
//! │ (per request)│     │ type -> manager map  │     │ id -> actor slot   │
//! └──────────────┘     │ runtime config       │     │ turn per actor id  │
//!                      └──────────────────────┘     └────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use apphost_actors::{actor_factory, Actor, ActorRuntime, MethodError};
//! use async_trait::async_trait;
//! use serde_json::Value;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Actor for Echo {
//!     fn actor_type(&self) -> String {
//!         "echo".to_string()
//!     }
//!
//!     async fn invoke(&mut self, method: &str, request: Option<Value>)
//!         -> Result<Option<Value>, MethodError> {
//!         match method {
//!             "Echo" => Ok(request),
//!             other => Err(MethodError::NotFound(other.to_string())),
//!         }
//!     }
//! }
//!
//! let runtime = ActorRuntime::new();
//! runtime.register_actor_factory(actor_factory(|| Echo), Default::default()).unwrap();
//! assert_eq!(runtime.registered_actor_types(), vec!["echo"]);
//! ```

pub mod actor;
pub mod config;
pub mod error;
pub mod manager;
pub mod params;
pub mod registry;
pub mod serializer;

pub use actor::{
    actor_factory, decode_request, encode_response, Actor, ActorFactory, MethodError,
    ReminderCallee,
};
pub use config::{ActorRegistrationOptions, ActorRuntimeConfig, ActorRuntimeSettings};
pub use error::{ActorError, Result};
pub use manager::{ActorManager, DefaultActorManager};
pub use params::{ReminderParams, TimerParams};
pub use registry::{default_manager_builder, ActorRuntime, ManagerBuilder};
pub use serializer::{serializer_for, JsonSerializer, Serializer, DEFAULT_SERIALIZER};
