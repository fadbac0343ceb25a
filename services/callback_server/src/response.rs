//! Response construction shared by every route

use bytes::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Response, StatusCode};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Status with no body
pub fn empty(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

/// Status with the given bytes passed through unchanged
pub fn bytes(status: StatusCode, body: Bytes) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}

pub fn json(status: StatusCode, body: Vec<u8>) -> Response<Body> {
    with_content_type(status, Body::from(body), JSON)
}

pub fn text(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    with_content_type(status, Body::from(message.into()), TEXT)
}

pub fn not_found() -> Response<Body> {
    text(StatusCode::NOT_FOUND, "Not found")
}

pub fn method_not_allowed() -> Response<Body> {
    text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn with_content_type(status: StatusCode, body: Body, content_type: &'static str) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
