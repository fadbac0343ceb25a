//! Process-scoped application context
//!
//! Built once at startup and cloned into every connection. Holds the only two
//! routing tables the server reads: actor types and topic routes.

use crate::error::Result;
use apphost_actors::{ActorFactory, ActorRegistrationOptions, ActorRuntime, ActorRuntimeSettings};
use apphost_config::HostConfig;
use apphost_pubsub::{Subscription, SubscriptionTable, TopicEventHandler};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub actors: Arc<ActorRuntime>,
    pub topics: Arc<SubscriptionTable>,
    registration: ActorRegistrationOptions,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose runtime settings and default serializer come from `config`
    pub fn from_config(config: &HostConfig) -> Self {
        let actors = &config.actors;
        let settings = ActorRuntimeSettings {
            actor_idle_timeout: actors.actor_idle_timeout.clone(),
            actor_scan_interval: actors.actor_scan_interval.clone(),
            drain_ongoing_call_timeout: actors.drain_ongoing_call_timeout.clone(),
            drain_rebalanced_actors: actors.drain_rebalanced_actors,
        };

        Self {
            actors: Arc::new(ActorRuntime::with_settings(settings)),
            topics: Arc::new(SubscriptionTable::new()),
            registration: ActorRegistrationOptions::default()
                .with_serializer(actors.serializer.clone()),
        }
    }

    /// Register an actor factory with the configured default options
    pub fn register_actor(&self, factory: ActorFactory) -> Result<()> {
        self.actors
            .register_actor_factory(factory, self.registration.clone())?;
        Ok(())
    }

    /// Bind `handler` to the subscription's route
    pub fn subscribe<H>(&self, subscription: &Subscription, handler: H) -> Result<()>
    where
        H: TopicEventHandler + 'static,
    {
        self.topics.add_handler(subscription, handler)?;
        Ok(())
    }
}
