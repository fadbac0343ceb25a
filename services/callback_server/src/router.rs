//! Request routing
//!
//! A POST to a subscribed route always goes to its handler. Otherwise fixed
//! routes are matched first, then actor path templates, then the
//! subscription table. A known path hit with the wrong method is a 405;
//! anything else unmatched is a 404.
//!
//! Matching runs on percent-decoded text. Actor paths are split before
//! decoding so an encoded `/` stays inside its segment.

use crate::context::AppContext;
use crate::response;
use crate::{actor_handlers, topic_handlers};
use bytes::Bytes;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::borrow::Cow;
use std::convert::Infallible;
use tracing::{debug, error, warn};

pub const HEALTHZ_PATH: &str = "/healthz";
pub const CONFIG_PATH: &str = "/dapr/config";
pub const SUBSCRIBE_PATH: &str = "/dapr/subscribe";

/// Actor path templates under `/actors/`
#[derive(Debug, PartialEq, Eq)]
enum ActorRoute<'a> {
    /// `/actors/{type}/{id}`
    Instance { actor_type: Cow<'a, str>, actor_id: Cow<'a, str> },
    /// `/actors/{type}/{id}/method/{method}`
    Method {
        actor_type: Cow<'a, str>,
        actor_id: Cow<'a, str>,
        method: Cow<'a, str>,
    },
    /// `/actors/{type}/{id}/method/remind/{name}`
    Reminder {
        actor_type: Cow<'a, str>,
        actor_id: Cow<'a, str>,
        name: Cow<'a, str>,
    },
    /// `/actors/{type}/{id}/method/timer/{name}`
    Timer {
        actor_type: Cow<'a, str>,
        actor_id: Cow<'a, str>,
        name: Cow<'a, str>,
    },
}

impl<'a> ActorRoute<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let rest = path.strip_prefix("/actors/")?;
        let raw: Vec<&str> = rest.split('/').collect();
        if raw.iter().any(|s| s.is_empty()) {
            return None;
        }

        match *raw.as_slice() {
            [actor_type, actor_id] => Some(Self::Instance {
                actor_type: decode_segment(actor_type)?,
                actor_id: decode_segment(actor_id)?,
            }),
            [actor_type, actor_id, "method", method] => Some(Self::Method {
                actor_type: decode_segment(actor_type)?,
                actor_id: decode_segment(actor_id)?,
                method: decode_segment(method)?,
            }),
            [actor_type, actor_id, "method", "remind", name] => Some(Self::Reminder {
                actor_type: decode_segment(actor_type)?,
                actor_id: decode_segment(actor_id)?,
                name: decode_segment(name)?,
            }),
            [actor_type, actor_id, "method", "timer", name] => Some(Self::Timer {
                actor_type: decode_segment(actor_type)?,
                actor_id: decode_segment(actor_id)?,
                name: decode_segment(name)?,
            }),
            _ => None,
        }
    }

    fn allowed_method(&self) -> Method {
        match self {
            Self::Instance { .. } => Method::DELETE,
            _ => Method::PUT,
        }
    }
}

/// Percent-decode one path segment; invalid UTF-8 matches nothing
fn decode_segment(segment: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(segment).ok()
}

/// Decoded route if a subscription is bound to `path`
fn subscribed_route<'a>(ctx: &AppContext, path: &'a str) -> Option<Cow<'a, str>> {
    decode_segment(path).filter(|route| ctx.topics.contains_route(route))
}

/// Serve one request against the shared context
pub async fn handle_request(
    req: Request<Body>,
    ctx: AppContext,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Callback request: {} {}", method, path);

    if method == Method::POST {
        if let Some(route) = subscribed_route(&ctx, &path) {
            let body = match read_body(req).await {
                Ok(body) => body,
                Err(response) => return Ok(response),
            };
            return Ok(topic_handlers::deliver(&ctx, &route, &body).await);
        }
    }

    match path.as_str() {
        HEALTHZ_PATH => return Ok(only(&method, Method::GET, || response::empty(StatusCode::OK))),
        CONFIG_PATH => return Ok(only(&method, Method::GET, || runtime_config(&ctx))),
        SUBSCRIBE_PATH => {
            return Ok(only(&method, Method::GET, || {
                topic_handlers::list_subscriptions(&ctx)
            }))
        }
        _ => {}
    }

    if let Some(route) = ActorRoute::parse(&path) {
        if method != route.allowed_method() {
            return Ok(response::method_not_allowed());
        }
        let body = match read_body(req).await {
            Ok(body) => body,
            Err(response) => return Ok(response),
        };
        return Ok(dispatch_actor(&ctx, route, body).await);
    }

    if subscribed_route(&ctx, &path).is_some() {
        return Ok(response::method_not_allowed());
    }

    Ok(response::not_found())
}

async fn dispatch_actor(ctx: &AppContext, route: ActorRoute<'_>, body: Bytes) -> Response<Body> {
    match route {
        ActorRoute::Instance {
            actor_type,
            actor_id,
        } => actor_handlers::deactivate(ctx, &actor_type, &actor_id).await,
        ActorRoute::Method {
            actor_type,
            actor_id,
            method,
        } => actor_handlers::invoke_method(ctx, &actor_type, &actor_id, &method, body).await,
        ActorRoute::Reminder {
            actor_type,
            actor_id,
            name,
        } => actor_handlers::invoke_reminder(ctx, &actor_type, &actor_id, &name, body).await,
        ActorRoute::Timer {
            actor_type,
            actor_id,
            name,
        } => actor_handlers::invoke_timer(ctx, &actor_type, &actor_id, &name, body).await,
    }
}

fn only<F>(method: &Method, allowed: Method, handler: F) -> Response<Body>
where
    F: FnOnce() -> Response<Body>,
{
    if *method == allowed {
        handler()
    } else {
        response::method_not_allowed()
    }
}

fn runtime_config(ctx: &AppContext) -> Response<Body> {
    match ctx.actors.get_json_serialized_config() {
        Ok(body) => response::json(StatusCode::OK, body),
        Err(e) => {
            error!("Failed to export runtime config: {}", e);
            response::text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn read_body(req: Request<Body>) -> Result<Bytes, Response<Body>> {
    hyper::body::to_bytes(req.into_body()).await.map_err(|e| {
        warn!("Failed to read request body: {}", e);
        response::text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read request body")
    })
}
