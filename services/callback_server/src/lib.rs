//! # Application Callback Server
//!
//! HTTP surface the sidecar calls into. Every request is routed to either the
//! actor runtime or the subscription table held by a shared [`AppContext`].
//!
//! | Path | Method |
//! |---|---|
//! | `/healthz` | GET |
//! | `/dapr/config` | GET |
//! | `/dapr/subscribe` | GET |
//! | `/actors/{type}/{id}` | DELETE |
//! | `/actors/{type}/{id}/method/{method}` | PUT |
//! | `/actors/{type}/{id}/method/remind/{name}` | PUT |
//! | `/actors/{type}/{id}/method/timer/{name}` | PUT |
//! | subscription routes | POST |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use apphost_pubsub::{HandlerOutcome, Subscription, TopicEvent};
//! use apphost_server::{AppContext, AppServer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = AppContext::new();
//! ctx.subscribe(
//!     &Subscription::new("messages", "orders", "/orders"),
//!     |_event: TopicEvent| async { HandlerOutcome::success() },
//! )?;
//!
//! let addr = "127.0.0.1:8080".parse()?;
//! AppServer::new(ctx)
//!     .serve(addr, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod actor_handlers;
pub mod context;
pub mod error;
pub mod response;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod topic_handlers;

pub use context::AppContext;
pub use error::{Result, ServerError};
pub use router::handle_request;
pub use server::AppServer;
