//! Actor Dispatch Registry
//!
//! Maps actor type names to their [`ActorManager`] and forwards every call
//! unchanged. Lookups are a single concurrent map read; the manager handle is
//! cloned out before awaiting so no map lock is held while actor code runs.
//! Dropping a returned future cancels the manager call with it.

use crate::actor::ActorFactory;
use crate::config::{ActorRegistrationOptions, ActorRuntimeConfig, ActorRuntimeSettings};
use crate::error::{ActorError, Result};
use crate::manager::{ActorManager, DefaultActorManager};
use crate::serializer::serializer_for;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds the manager for the first registration of an actor type
pub type ManagerBuilder =
    Arc<dyn Fn(&str, &ActorRegistrationOptions) -> Result<Arc<dyn ActorManager>> + Send + Sync>;

/// Routing table from actor type to manager.
///
/// One instance is meant to live for the whole process and be shared by
/// reference with everything that dispatches to actors.
pub struct ActorRuntime {
    config: RwLock<ActorRuntimeConfig>,
    managers: DashMap<String, Arc<dyn ActorManager>>,
    manager_builder: ManagerBuilder,
}

impl fmt::Debug for ActorRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRuntime")
            .field("config", &*self.config.read())
            .field("manager_count", &self.managers.len())
            .finish()
    }
}

impl Default for ActorRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder used unless a caller supplies its own
pub fn default_manager_builder() -> ManagerBuilder {
    Arc::new(|actor_type: &str, options: &ActorRegistrationOptions| {
        let serializer = serializer_for(&options.serializer)?;
        Ok(Arc::new(DefaultActorManager::new(actor_type, serializer)) as Arc<dyn ActorManager>)
    })
}

impl ActorRuntime {
    pub fn new() -> Self {
        Self::with_settings(ActorRuntimeSettings::default())
    }

    pub fn with_settings(settings: ActorRuntimeSettings) -> Self {
        Self {
            config: RwLock::new(ActorRuntimeConfig::with_settings(settings)),
            managers: DashMap::new(),
            manager_builder: default_manager_builder(),
        }
    }

    /// Replace how managers are created for newly registered types
    pub fn with_manager_builder(mut self, builder: ManagerBuilder) -> Self {
        self.manager_builder = builder;
        self
    }

    /// Register a factory under the type name its actors report.
    ///
    /// The first registration for a type creates the manager with the
    /// requested serializer; later ones add the factory to that manager and
    /// ignore `options`. A failed manager creation leaves the type
    /// unregistered and is returned to the caller.
    pub fn register_actor_factory(
        &self,
        factory: ActorFactory,
        options: ActorRegistrationOptions,
    ) -> Result<()> {
        let actor_type = factory().actor_type();

        match self.managers.entry(actor_type.clone()) {
            Entry::Occupied(entry) => {
                debug!("Adding factory to existing manager for {}", actor_type);
                entry.get().register_actor_impl_factory(factory);
            }
            Entry::Vacant(entry) => {
                let manager = (self.manager_builder)(&actor_type, &options).map_err(|e| {
                    warn!("Failed to create manager for actor type {}: {}", actor_type, e);
                    e
                })?;
                manager.register_actor_impl_factory(factory);
                entry.insert(manager);
                info!(
                    "Registered actor type {} (serializer: {})",
                    actor_type, options.serializer
                );
            }
        }

        self.config.write().registered_actor_types.push(actor_type);
        Ok(())
    }

    /// Snapshot of the runtime config as of this call
    pub fn config(&self) -> ActorRuntimeConfig {
        self.config.read().clone()
    }

    pub fn registered_actor_types(&self) -> Vec<String> {
        self.config.read().registered_actor_types.clone()
    }

    pub fn get_json_serialized_config(&self) -> Result<Vec<u8>> {
        let snapshot = self.config();
        serde_json::to_vec(&snapshot).map_err(ActorError::ConfigSerialization)
    }

    /// Manager for `actor_type`, if registered
    pub fn manager(&self, actor_type: &str) -> Result<Arc<dyn ActorManager>> {
        self.managers
            .get(actor_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ActorError::type_not_found(actor_type))
    }

    pub async fn invoke_actor_method(
        &self,
        actor_type: &str,
        actor_id: &str,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes> {
        let manager = self.manager(actor_type)?;
        manager.invoke_method(actor_id, method, payload).await
    }

    pub async fn deactivate(&self, actor_type: &str, actor_id: &str) -> Result<()> {
        let manager = self.manager(actor_type)?;
        manager.deactivate_actor(actor_id).await
    }

    pub async fn invoke_reminder(
        &self,
        actor_type: &str,
        actor_id: &str,
        reminder_name: &str,
        params: Bytes,
    ) -> Result<()> {
        let manager = self.manager(actor_type)?;
        manager.invoke_reminder(actor_id, reminder_name, params).await
    }

    pub async fn invoke_timer(
        &self,
        actor_type: &str,
        actor_id: &str,
        timer_name: &str,
        params: Bytes,
    ) -> Result<()> {
        let manager = self.manager(actor_type)?;
        manager.invoke_timer(actor_id, timer_name, params).await
    }
}
