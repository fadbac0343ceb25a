//! Actor Managers
//!
//! A manager owns every live instance of one actor type. The registry only
//! looks managers up and forwards calls; activation, per-id turn taking and
//! payload decoding all happen here.
//!
//! # Turn-based execution
//!
//! Each actor id maps to one [`ActorSlot`] behind an async mutex. A call holds
//! the slot's lock for its whole duration, so calls to one id run one at a
//! time while different ids run in parallel. Activation happens lazily inside
//! the first turn, which means racing first calls still activate only once.
//!
//! Deactivation takes the turn too, marks the slot retired and only then drops
//! it from the map. A call that was queued on a retired slot goes back to the
//! map for the live one instead of running against the evicted instance.

use crate::actor::{Actor, ActorFactory, MethodError};
use crate::error::{ActorError, Result};
use crate::params::{ReminderParams, TimerParams};
use crate::serializer::Serializer;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

/// Capability the registry dispatches to, one per actor type
#[async_trait]
pub trait ActorManager: Send + Sync {
    /// Add a factory for new activations of this type
    fn register_actor_impl_factory(&self, factory: ActorFactory);

    async fn invoke_method(&self, actor_id: &str, method: &str, payload: Bytes) -> Result<Bytes>;

    /// Evict an actor identity
    async fn deactivate_actor(&self, actor_id: &str) -> Result<()>;

    async fn invoke_reminder(&self, actor_id: &str, reminder_name: &str, params: Bytes)
        -> Result<()>;

    async fn invoke_timer(&self, actor_id: &str, timer_name: &str, params: Bytes) -> Result<()>;
}

/// One live actor identity
struct ActorSlot {
    actor: Box<dyn Actor>,
    activated: bool,
    /// Set by deactivation; the slot is no longer the live one for its id
    retired: bool,
}

impl ActorSlot {
    async fn ensure_active(&mut self, actor_id: &str) -> Result<()> {
        if !self.activated {
            self.actor
                .on_activate()
                .await
                .map_err(|e| ActorError::invoke_failed(&e))?;
            self.activated = true;
            debug!("Activated actor {}", actor_id);
        }
        Ok(())
    }
}

/// In-memory manager: lazy activation, per-id serialization, no persistence
pub struct DefaultActorManager {
    actor_type: String,
    serializer: Arc<dyn Serializer>,
    factory: RwLock<Option<ActorFactory>>,
    active: DashMap<String, Arc<Mutex<ActorSlot>>>,
}

impl DefaultActorManager {
    pub fn new(actor_type: impl Into<String>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            actor_type: actor_type.into(),
            serializer,
            factory: RwLock::new(None),
            active: DashMap::new(),
        }
    }

    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }

    /// Number of currently activated identities
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, actor_id: &str) -> bool {
        self.active.contains_key(actor_id)
    }

    /// Slot for `actor_id`, creating an unactivated one on first use
    fn slot(&self, actor_id: &str) -> Result<Arc<Mutex<ActorSlot>>> {
        if let Some(slot) = self.active.get(actor_id) {
            return Ok(Arc::clone(slot.value()));
        }

        let factory = self
            .factory
            .read()
            .clone()
            .ok_or_else(|| ActorError::FactoryMissing {
                actor_type: self.actor_type.clone(),
            })?;

        let slot = self
            .active
            .entry(actor_id.to_string())
            .or_insert_with(|| {
                let mut actor = factory();
                actor.set_id(actor_id);
                Arc::new(Mutex::new(ActorSlot {
                    actor,
                    activated: false,
                    retired: false,
                }))
            });
        Ok(Arc::clone(slot.value()))
    }

    /// Take the turn on the live slot for `actor_id`
    async fn turn(&self, actor_id: &str) -> Result<OwnedMutexGuard<ActorSlot>> {
        loop {
            let turn = self.slot(actor_id)?.lock_owned().await;
            if !turn.retired {
                return Ok(turn);
            }
            debug!(
                "Actor {}/{} was deactivated while waiting, retrying",
                self.actor_type, actor_id
            );
        }
    }

    fn decode_payload(&self, method: &str, payload: &[u8]) -> Result<Option<Value>> {
        if payload.is_empty() {
            return Ok(None);
        }
        self.serializer
            .decode(payload)
            .map(Some)
            .map_err(|e| ActorError::MethodSerializationFailed {
                method: method.to_string(),
                message: e.to_string(),
            })
    }

    async fn call_method(
        &self,
        actor_id: &str,
        method: &str,
        request: Option<Value>,
    ) -> Result<Bytes> {
        let mut turn = self.turn(actor_id).await?;
        turn.ensure_active(actor_id).await?;

        let response = turn
            .actor
            .invoke(method, request)
            .await
            .map_err(|e| method_error(method, e))?;

        match response {
            None => Ok(Bytes::new()),
            Some(value) => self
                .serializer
                .encode(&value)
                .map(Bytes::from)
                .map_err(|e| ActorError::MethodSerializationFailed {
                    method: method.to_string(),
                    message: e.to_string(),
                }),
        }
    }
}

fn method_error(method: &str, err: MethodError) -> ActorError {
    match err {
        MethodError::NotFound(_) => ActorError::ActorMethodNotFound {
            method: method.to_string(),
        },
        MethodError::BadRequest(message) => ActorError::MethodSerializationFailed {
            method: method.to_string(),
            message,
        },
        MethodError::Failed(e) => ActorError::invoke_failed(&e),
    }
}

#[async_trait]
impl ActorManager for DefaultActorManager {
    fn register_actor_impl_factory(&self, factory: ActorFactory) {
        debug!("Registering factory for actor type {}", self.actor_type);
        *self.factory.write() = Some(factory);
    }

    async fn invoke_method(&self, actor_id: &str, method: &str, payload: Bytes) -> Result<Bytes> {
        let request = self.decode_payload(method, &payload)?;
        self.call_method(actor_id, method, request).await
    }

    async fn deactivate_actor(&self, actor_id: &str) -> Result<()> {
        let Some(slot) = self.active.get(actor_id).map(|entry| Arc::clone(entry.value())) else {
            debug!(
                "Deactivate for inactive actor {}/{}, nothing to do",
                self.actor_type, actor_id
            );
            return Ok(());
        };

        let mut turn = Arc::clone(&slot).lock_owned().await;
        if turn.retired {
            return Ok(());
        }

        let result = if turn.activated {
            turn.activated = false;
            turn.actor.on_deactivate().await
        } else {
            Ok(())
        };

        // Evict under the turn so no caller can run on this instance again
        turn.retired = true;
        self.active
            .remove_if(actor_id, |_, live| Arc::ptr_eq(live, &slot));
        drop(turn);

        match result {
            Ok(()) => {
                debug!("Deactivated actor {}/{}", self.actor_type, actor_id);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Actor {}/{} failed during deactivation: {:#}",
                    self.actor_type, actor_id, e
                );
                Err(ActorError::invoke_failed(&e))
            }
        }
    }

    async fn invoke_reminder(
        &self,
        actor_id: &str,
        reminder_name: &str,
        params: Bytes,
    ) -> Result<()> {
        let params: ReminderParams =
            serde_json::from_slice(&params).map_err(ActorError::DecodeReminderParams)?;

        let mut turn = self.turn(actor_id).await?;
        if turn.actor.reminder_callee().is_none() {
            return Err(ActorError::ReminderCalleeNotImplemented {
                actor_type: self.actor_type.clone(),
            });
        }
        turn.ensure_active(actor_id).await?;

        let callee = turn.actor.reminder_callee().ok_or_else(|| {
            ActorError::ReminderCalleeNotImplemented {
                actor_type: self.actor_type.clone(),
            }
        })?;

        callee
            .reminder_call(reminder_name, params.data, &params.due_time, &params.period)
            .await
            .map_err(|e| ActorError::invoke_failed(&e))
    }

    async fn invoke_timer(&self, actor_id: &str, timer_name: &str, params: Bytes) -> Result<()> {
        let params: TimerParams =
            serde_json::from_slice(&params).map_err(ActorError::DecodeTimerParams)?;
        debug!(
            "Timer {} on {}/{} calls {}",
            timer_name, self.actor_type, actor_id, params.callback
        );

        let request = self.decode_payload(&params.callback, &params.data)?;
        self.call_method(actor_id, &params.callback, request)
            .await
            .map(|_| ())
    }
}
