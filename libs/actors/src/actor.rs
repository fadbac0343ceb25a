//! Actor Contract
//!
//! User code implements [`Actor`] once per actor type. A manager owns the
//! instances and guarantees at most one call in flight per actor id, so
//! methods take `&mut self` and never need their own locking.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// No-argument constructor for fresh actor instances of one type
pub type ActorFactory = Arc<dyn Fn() -> Box<dyn Actor> + Send + Sync>;

/// Wrap a constructor closure as an [`ActorFactory`]
pub fn actor_factory<A, F>(constructor: F) -> ActorFactory
where
    A: Actor,
    F: Fn() -> A + Send + Sync + 'static,
{
    Arc::new(move || Box::new(constructor()) as Box<dyn Actor>)
}

/// Failure reported by an actor method
#[derive(Error, Debug)]
pub enum MethodError {
    /// The actor has no method with this name
    #[error("no such method: {0}")]
    NotFound(String),

    /// The request value did not match what the method expects
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The method itself failed
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Stateful object addressed by (type, id)
#[async_trait]
pub trait Actor: Send + 'static {
    /// Actor type name this instance belongs to
    fn actor_type(&self) -> String;

    /// Called once with the identity before activation
    fn set_id(&mut self, _actor_id: &str) {}

    /// Dispatch a named method.
    ///
    /// `request` is `None` when the caller sent an empty body. Returning
    /// `Ok(None)` produces an empty response body.
    async fn invoke(
        &mut self,
        method: &str,
        request: Option<Value>,
    ) -> Result<Option<Value>, MethodError>;

    /// Reminder callback, if this actor type accepts reminders
    fn reminder_callee(&mut self) -> Option<&mut dyn ReminderCallee> {
        None
    }

    async fn on_activate(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_deactivate(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Receiver for reminders fired by the sidecar
#[async_trait]
pub trait ReminderCallee: Send {
    async fn reminder_call(
        &mut self,
        reminder_name: &str,
        state: Bytes,
        due_time: &str,
        period: &str,
    ) -> anyhow::Result<()>;
}

/// Decode an optional request value into a method's argument type
pub fn decode_request<T: DeserializeOwned>(request: Option<Value>) -> Result<T, MethodError> {
    let value = request.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| MethodError::BadRequest(e.to_string()))
}

/// Encode a method's return value
pub fn encode_response<T: Serialize>(response: &T) -> Result<Option<Value>, MethodError> {
    serde_json::to_value(response)
        .map(Some)
        .map_err(|e| MethodError::Failed(e.into()))
}
