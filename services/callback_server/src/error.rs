//! Error types for the callback server

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: hyper::Error,
    },

    #[error("HTTP server error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Actor registration failed: {0}")]
    Actor(#[from] apphost_actors::ActorError),

    #[error("Subscription registration failed: {0}")]
    Subscription(#[from] apphost_pubsub::SubscriptionError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
