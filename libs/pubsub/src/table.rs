//! Topic Subscription Table
//!
//! Route -> (subscription, handler) map plus the decode-and-dispatch step run
//! for every POST to a subscribed route.
//!
//! ## Dispatch
//!
//! 1. Look up the route (exact match on the normalized route)
//! 2. Decode the body as raw payload or structured envelope, per the
//!    subscription's metadata
//! 3. Call the handler with the decoded event
//! 4. Turn the handler outcome into a [`DeliveryStatus`]
//!
//! An undecodable body never reaches the handler and is reported as
//! [`DispatchOutcome::Rejected`], which callers must keep distinct from both
//! success and internal failure.

use crate::error::{DecodeError, Result, SubscriptionError};
use crate::event::decode_event;
use crate::handler::{DeliveryStatus, TopicEventHandler};
use crate::subscription::Subscription;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Registration {
    subscription: Subscription,
    handler: Arc<dyn TopicEventHandler>,
}

/// What happened to one inbound delivery
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Handler ran; the status tells the sender what to do next
    Delivered(DeliveryStatus),
    /// Body could not be decoded; the handler was not called
    Rejected(DecodeError),
    /// No subscription is bound to the route
    UnknownRoute,
}

#[derive(Default)]
pub struct SubscriptionTable {
    routes: DashMap<String, Arc<Registration>>,
}

impl fmt::Debug for SubscriptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionTable")
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `subscription.route`.
    ///
    /// Nothing is stored unless every required field and the handler are
    /// present. A later registration for the same route replaces the earlier
    /// one.
    pub fn add_topic_event_handler(
        &self,
        subscription: Option<&Subscription>,
        handler: Option<Arc<dyn TopicEventHandler>>,
    ) -> Result<()> {
        let subscription = subscription.ok_or(SubscriptionError::MissingSubscription)?;
        subscription.validate()?;
        let handler = handler.ok_or_else(|| SubscriptionError::MissingHandler {
            route: subscription.route.clone(),
        })?;

        let subscription = subscription.normalized();
        let route = subscription.route.clone();
        let previous = self.routes.insert(
            route.clone(),
            Arc::new(Registration {
                subscription,
                handler,
            }),
        );

        if previous.is_some() {
            warn!("Replaced existing topic handler for route {}", route);
        } else {
            info!("Registered topic handler for route {}", route);
        }
        Ok(())
    }

    /// Convenience form of [`add_topic_event_handler`](Self::add_topic_event_handler)
    pub fn add_handler<H>(&self, subscription: &Subscription, handler: H) -> Result<()>
    where
        H: TopicEventHandler + 'static,
    {
        self.add_topic_event_handler(Some(subscription), Some(Arc::new(handler)))
    }

    pub fn contains_route(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }

    pub fn subscription(&self, route: &str) -> Option<Subscription> {
        self.routes
            .get(route)
            .map(|entry| entry.subscription.clone())
    }

    /// All subscriptions, ordered by route
    pub fn subscriptions(&self) -> Vec<Subscription> {
        let mut subs: Vec<Subscription> = self
            .routes
            .iter()
            .map(|entry| entry.subscription.clone())
            .collect();
        subs.sort_by(|a, b| a.route.cmp(&b.route));
        subs
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Decode `body` for the subscription bound to `route` and run its handler
    pub async fn dispatch(&self, route: &str, body: &[u8]) -> DispatchOutcome {
        let Some(registration) = self.routes.get(route).map(|entry| Arc::clone(entry.value()))
        else {
            return DispatchOutcome::UnknownRoute;
        };
        let subscription = &registration.subscription;

        let event = match decode_event(body, subscription) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    "Rejected event on route {} (topic {}): {}",
                    route, subscription.topic, e
                );
                return DispatchOutcome::Rejected(e);
            }
        };

        debug!(
            "Dispatching event {} on {}/{} to route {}",
            event.id, event.pubsub_name, event.topic, route
        );
        let outcome = registration.handler.handle(event).await;
        let status = outcome.status();

        match (status, &outcome.error) {
            (DeliveryStatus::Retry, Some(e)) => {
                warn!("Handler for route {} requested retry: {:#}", route, e)
            }
            (DeliveryStatus::Retry, None) => debug!("Handler for route {} requested retry", route),
            (DeliveryStatus::Drop, Some(e)) => {
                warn!("Handler for route {} failed, dropping event: {:#}", route, e)
            }
            _ => {}
        }

        DispatchOutcome::Delivered(status)
    }
}
