//! Actor Error Types
//!
//! Every failure the registry or a manager can report. The HTTP boundary only
//! distinguishes [`ActorError::ActorTypeNotFound`] from everything else.

use thiserror::Error;

/// Errors raised while registering or dispatching to actors
#[derive(Error, Debug)]
pub enum ActorError {
    /// No manager is registered for the requested actor type
    #[error("Actor type not found: {actor_type}")]
    ActorTypeNotFound { actor_type: String },

    /// The actor does not expose the requested method
    #[error("Actor method not found: {method}")]
    ActorMethodNotFound { method: String },

    /// The actor method ran and returned an error
    #[error("Actor invocation failed: {message}")]
    ActorInvokeFailed { message: String },

    /// Request or response payload could not go through the serializer
    #[error("Serialization failed for method {method}: {message}")]
    MethodSerializationFailed { method: String, message: String },

    /// Registration asked for a serializer this build does not provide
    #[error("Unsupported serializer: {name}")]
    UnsupportedSerializer { name: String },

    /// Reminder fired on an actor type without a reminder callback
    #[error("Actor type {actor_type} does not implement a reminder callback")]
    ReminderCalleeNotImplemented { actor_type: String },

    #[error("Failed to decode reminder params: {0}")]
    DecodeReminderParams(#[source] serde_json::Error),

    #[error("Failed to decode timer params: {0}")]
    DecodeTimerParams(#[source] serde_json::Error),

    /// Runtime config could not be encoded for export
    #[error("Failed to serialize runtime config: {0}")]
    ConfigSerialization(#[source] serde_json::Error),

    /// A manager was asked to activate an actor before any factory was registered
    #[error("No factory registered for actor type {actor_type}")]
    FactoryMissing { actor_type: String },
}

/// Result type alias for actor operations
pub type Result<T> = std::result::Result<T, ActorError>;

impl ActorError {
    pub fn type_not_found(actor_type: impl Into<String>) -> Self {
        Self::ActorTypeNotFound {
            actor_type: actor_type.into(),
        }
    }

    pub fn invoke_failed(err: &anyhow::Error) -> Self {
        Self::ActorInvokeFailed {
            message: format!("{:#}", err),
        }
    }

    /// True when the failure means "unknown actor type" rather than a call failure
    pub fn is_type_not_found(&self) -> bool {
        matches!(self, Self::ActorTypeNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_not_found_classification() {
        let err = ActorError::type_not_found("counter");
        assert!(err.is_type_not_found());
        assert_eq!(err.to_string(), "Actor type not found: counter");

        let err = ActorError::ActorMethodNotFound {
            method: "Missing".to_string(),
        };
        assert!(!err.is_type_not_found());
    }

    #[test]
    fn test_invoke_failed_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("saving state");
        let mapped = ActorError::invoke_failed(&err);
        assert_eq!(
            mapped.to_string(),
            "Actor invocation failed: saving state: disk full"
        );
    }
}
