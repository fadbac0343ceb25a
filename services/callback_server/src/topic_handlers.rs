//! Topic delivery and subscription listing routes

use crate::context::AppContext;
use crate::response;
use apphost_pubsub::{DispatchOutcome, HandlerOutcome, TopicEvent};
use hyper::{Body, Response, StatusCode};
use serde_json::json;
use tracing::{error, info};

/// `POST {route}` for a subscribed route.
///
/// The handler's verdict goes back as `{"status": ...}` with 200. An
/// envelope that cannot be decoded is answered with 303 so the sender can
/// tell it apart from both success and a server fault.
pub async fn deliver(ctx: &AppContext, route: &str, body: &[u8]) -> Response<Body> {
    match ctx.topics.dispatch(route, body).await {
        DispatchOutcome::Delivered(status) => response::json(
            StatusCode::OK,
            json!({ "status": status }).to_string().into_bytes(),
        ),
        DispatchOutcome::Rejected(e) => response::text(StatusCode::SEE_OTHER, e.to_string()),
        DispatchOutcome::UnknownRoute => response::not_found(),
    }
}

/// `GET /dapr/subscribe`
pub fn list_subscriptions(ctx: &AppContext) -> Response<Body> {
    match serde_json::to_vec(&ctx.topics.subscriptions()) {
        Ok(body) => response::json(StatusCode::OK, body),
        Err(e) => {
            error!("Failed to serialize subscriptions: {}", e);
            response::text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Handler bound to subscriptions declared in configuration: logs the event
/// and acknowledges it
pub async fn log_event(event: TopicEvent) -> HandlerOutcome {
    info!(
        id = %event.id,
        pubsub = %event.pubsub_name,
        topic = %event.topic,
        content_type = %event.data_content_type,
        bytes = event.raw_data.len(),
        "Received topic event"
    );
    HandlerOutcome::success()
}
