//! Actor routes
//!
//! Path parameters and the request body go to the [`ActorRuntime`] as-is.
//! Result bytes come back verbatim. An unregistered type is a 404 and every
//! other failure is a 500.
//!
//! [`ActorRuntime`]: apphost_actors::ActorRuntime

use crate::context::AppContext;
use crate::response;
use apphost_actors::ActorError;
use bytes::Bytes;
use hyper::{Body, Response, StatusCode};
use tracing::{debug, error, warn};

/// `PUT /actors/{type}/{id}/method/{method}`
pub async fn invoke_method(
    ctx: &AppContext,
    actor_type: &str,
    actor_id: &str,
    method: &str,
    body: Bytes,
) -> Response<Body> {
    debug!("Invoking {}/{}.{}", actor_type, actor_id, method);
    match ctx
        .actors
        .invoke_actor_method(actor_type, actor_id, method, body)
        .await
    {
        Ok(result) => response::bytes(StatusCode::OK, result),
        Err(e) => failure("method", actor_type, actor_id, e),
    }
}

/// `DELETE /actors/{type}/{id}`
pub async fn deactivate(ctx: &AppContext, actor_type: &str, actor_id: &str) -> Response<Body> {
    debug!("Deactivating {}/{}", actor_type, actor_id);
    match ctx.actors.deactivate(actor_type, actor_id).await {
        Ok(()) => response::empty(StatusCode::OK),
        Err(e) => failure("deactivate", actor_type, actor_id, e),
    }
}

/// `PUT /actors/{type}/{id}/method/remind/{name}`
pub async fn invoke_reminder(
    ctx: &AppContext,
    actor_type: &str,
    actor_id: &str,
    reminder_name: &str,
    body: Bytes,
) -> Response<Body> {
    debug!("Firing reminder {} on {}/{}", reminder_name, actor_type, actor_id);
    match ctx
        .actors
        .invoke_reminder(actor_type, actor_id, reminder_name, body)
        .await
    {
        Ok(()) => response::empty(StatusCode::OK),
        Err(e) => failure("reminder", actor_type, actor_id, e),
    }
}

/// `PUT /actors/{type}/{id}/method/timer/{name}`
pub async fn invoke_timer(
    ctx: &AppContext,
    actor_type: &str,
    actor_id: &str,
    timer_name: &str,
    body: Bytes,
) -> Response<Body> {
    debug!("Firing timer {} on {}/{}", timer_name, actor_type, actor_id);
    match ctx
        .actors
        .invoke_timer(actor_type, actor_id, timer_name, body)
        .await
    {
        Ok(()) => response::empty(StatusCode::OK),
        Err(e) => failure("timer", actor_type, actor_id, e),
    }
}

fn failure(call: &str, actor_type: &str, actor_id: &str, err: ActorError) -> Response<Body> {
    if err.is_type_not_found() {
        warn!("Actor {} call for unregistered type {}", call, actor_type);
        return response::text(StatusCode::NOT_FOUND, err.to_string());
    }

    error!("Actor {} call on {}/{} failed: {}", call, actor_type, actor_id, err);
    response::text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
