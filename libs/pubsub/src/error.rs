//! Error types for subscription registration and envelope decoding

use thiserror::Error;

/// Registration rejected before anything was stored
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("subscription required")]
    MissingSubscription,

    #[error("topic name required")]
    MissingTopic,

    #[error("pub/sub name required")]
    MissingPubsubName,

    #[error("handler route required")]
    MissingRoute,

    #[error("topic event handler required for route {route}")]
    MissingHandler { route: String },
}

/// Inbound body could not be turned into a topic event
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty event body")]
    EmptyBody,

    #[error("event body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("event envelope must be a JSON object")]
    NotAnObject,

    #[error("invalid base64 event data: {0}")]
    InvalidBase64(#[source] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, SubscriptionError>;
