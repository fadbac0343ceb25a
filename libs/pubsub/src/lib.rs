//! # Topic Event Dispatch
//!
//! Pub/sub side of the application host. Handlers are registered against a
//! route, the sidecar POSTs deliveries to that route, and the
//! [`SubscriptionTable`] decodes the envelope, runs the handler and reports a
//! [`DeliveryStatus`].
//!
//! ## Usage
//!
//! ```rust
//! use apphost_pubsub::{HandlerOutcome, Subscription, SubscriptionTable, TopicEvent};
//!
//! let table = SubscriptionTable::new();
//! let sub = Subscription::new("messages", "orders", "/orders");
//! table
//!     .add_handler(&sub, |event: TopicEvent| async move {
//!         if event.data.is_some() {
//!             HandlerOutcome::success()
//!         } else {
//!             HandlerOutcome::retry()
//!         }
//!     })
//!     .unwrap();
//! assert!(table.contains_route("/orders"));
//! ```

pub mod error;
pub mod event;
pub mod handler;
pub mod subscription;
pub mod table;

pub use error::{DecodeError, Result, SubscriptionError};
pub use event::{decode_event, decode_structured, is_json_content_type, TopicEvent};
pub use handler::{DeliveryStatus, HandlerOutcome, TopicEventHandler};
pub use subscription::{Subscription, RAW_PAYLOAD_KEY};
pub use table::{DispatchOutcome, SubscriptionTable};
