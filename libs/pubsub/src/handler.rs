//! Topic event handlers and how their outcome is reported to the sender.

use crate::event::TopicEvent;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Result of one handler call: whether to redeliver, and what went wrong
#[derive(Debug, Default)]
pub struct HandlerOutcome {
    pub retry: bool,
    pub error: Option<anyhow::Error>,
}

impl HandlerOutcome {
    pub fn new(retry: bool, error: Option<anyhow::Error>) -> Self {
        Self { retry, error }
    }

    pub fn success() -> Self {
        Self::default()
    }

    /// Ask the sender to redeliver later
    pub fn retry() -> Self {
        Self::new(true, None)
    }

    pub fn retry_with(error: impl Into<anyhow::Error>) -> Self {
        Self::new(true, Some(error.into()))
    }

    /// Application error without redelivery
    pub fn failed(error: impl Into<anyhow::Error>) -> Self {
        Self::new(false, Some(error.into()))
    }

    /// Wire status for this outcome.
    ///
    /// `retry` wins over everything; an error without `retry` drops the
    /// event instead of acknowledging it as processed.
    pub fn status(&self) -> DeliveryStatus {
        match (self.retry, &self.error) {
            (true, _) => DeliveryStatus::Retry,
            (false, None) => DeliveryStatus::Success,
            (false, Some(_)) => DeliveryStatus::Drop,
        }
    }
}

/// Delivery verdict returned to the sidecar in the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Success,
    Retry,
    Drop,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Success => "SUCCESS",
            DeliveryStatus::Retry => "RETRY",
            DeliveryStatus::Drop => "DROP",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function bound to one subscription route
#[async_trait]
pub trait TopicEventHandler: Send + Sync {
    async fn handle(&self, event: TopicEvent) -> HandlerOutcome;
}

#[async_trait]
impl<F, Fut> TopicEventHandler for F
where
    F: Fn(TopicEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    async fn handle(&self, event: TopicEvent) -> HandlerOutcome {
        (self)(event).await
    }
}
