//! Inbound Topic Events
//!
//! Two wire shapes reach a subscription route:
//!
//! - **Structured**: a CloudEvents-style JSON object. Known attributes are
//!   lifted into fields, everything else lands in `extensions`, and `data`
//!   is unwrapped (see [`decode_structured`]).
//! - **Raw payload**: only `datacontenttype` and `data_base64` are read;
//!   `data_base64` is kept verbatim.

use crate::error::DecodeError;
use crate::subscription::Subscription;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

/// One decoded delivery, consumed by exactly one handler call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopicEvent {
    pub id: String,
    pub spec_version: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub subject: String,
    pub time: String,
    pub data_content_type: String,
    /// Application payload as a value, when it could be interpreted as one
    pub data: Option<Value>,
    /// Application payload bytes
    #[serde(skip)]
    pub raw_data: Bytes,
    /// Base64 payload, only filled in raw-payload mode
    pub data_base64: String,
    pub topic: String,
    pub pubsub_name: String,
    /// Envelope attributes that are not part of the fixed set
    pub extensions: Map<String, Value>,
}

impl TopicEvent {
    /// Payload bytes, decoding `data_base64` when the event came in raw mode
    pub fn raw_bytes(&self) -> Result<Bytes, DecodeError> {
        if self.data_base64.is_empty() {
            return Ok(self.raw_data.clone());
        }
        STANDARD
            .decode(self.data_base64.as_bytes())
            .map(Bytes::from)
            .map_err(DecodeError::InvalidBase64)
    }

    /// Deserialize the payload value into an application type
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.data
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

const KNOWN_ATTRIBUTES: &[&str] = &[
    "specversion",
    "type",
    "source",
    "subject",
    "id",
    "time",
    "datacontenttype",
    "data",
    "data_base64",
    "topic",
    "pubsubname",
];

/// Decode a body for `subscription`, choosing the shape from its metadata
pub fn decode_event(body: &[u8], subscription: &Subscription) -> Result<TopicEvent, DecodeError> {
    if subscription.is_raw_payload() {
        decode_raw(body, subscription)
    } else {
        decode_structured(body, subscription)
    }
}

fn parse_envelope(body: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::EmptyBody);
    }
    match serde_json::from_slice(body).map_err(DecodeError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// String attribute; non-string values keep their JSON text
fn take_string(envelope: &mut Map<String, Value>, key: &str) -> String {
    match envelope.remove(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// `application/json`, `text/json`, anything `+json`, or unset (the
/// CloudEvents default)
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type.is_empty()
        || media_type == "application/json"
        || media_type == "text/json"
        || media_type.ends_with("+json")
}

fn decode_raw(body: &[u8], subscription: &Subscription) -> Result<TopicEvent, DecodeError> {
    let mut envelope = parse_envelope(body)?;
    Ok(TopicEvent {
        data_content_type: take_string(&mut envelope, "datacontenttype"),
        data_base64: take_string(&mut envelope, "data_base64"),
        topic: subscription.topic.clone(),
        pubsub_name: subscription.pubsub_name.clone(),
        ..Default::default()
    })
}

/// Decode a structured envelope.
///
/// Payload rules:
/// - `data_base64` is decoded to bytes; for JSON content types the bytes are
///   also parsed into `data` when they hold JSON.
/// - A `data` string that is valid base64 is decoded to bytes, and parsed
///   into `data` for JSON content types; otherwise the string stays as is.
/// - Any other `data` value is kept, with its JSON text as the bytes.
pub fn decode_structured(
    body: &[u8],
    subscription: &Subscription,
) -> Result<TopicEvent, DecodeError> {
    let mut envelope = parse_envelope(body)?;

    let data_content_type = take_string(&mut envelope, "datacontenttype");
    let json_payload = is_json_content_type(&data_content_type);
    let data_base64 = take_string(&mut envelope, "data_base64");

    let (data, raw_data) = if !data_base64.is_empty() {
        let bytes = STANDARD
            .decode(data_base64.as_bytes())
            .map_err(DecodeError::InvalidBase64)?;
        let data = if json_payload {
            serde_json::from_slice(&bytes).ok()
        } else {
            None
        };
        (data, Bytes::from(bytes))
    } else {
        match envelope.remove("data") {
            None | Some(Value::Null) => (None, Bytes::new()),
            Some(Value::String(s)) => match STANDARD.decode(s.as_bytes()) {
                Ok(bytes) => {
                    let parsed = if json_payload {
                        serde_json::from_slice(&bytes).ok()
                    } else {
                        None
                    };
                    (parsed.or(Some(Value::String(s))), Bytes::from(bytes))
                }
                Err(_) => {
                    let raw = Bytes::from(s.clone().into_bytes());
                    (Some(Value::String(s)), raw)
                }
            },
            Some(other) => {
                let raw = Bytes::from(other.to_string().into_bytes());
                (Some(other), raw)
            }
        }
    };

    let topic = or_default(take_string(&mut envelope, "topic"), &subscription.topic);
    let pubsub_name = or_default(
        take_string(&mut envelope, "pubsubname"),
        &subscription.pubsub_name,
    );

    let mut event = TopicEvent {
        id: take_string(&mut envelope, "id"),
        spec_version: take_string(&mut envelope, "specversion"),
        source: take_string(&mut envelope, "source"),
        event_type: take_string(&mut envelope, "type"),
        subject: take_string(&mut envelope, "subject"),
        time: take_string(&mut envelope, "time"),
        data_content_type,
        data,
        raw_data,
        data_base64: String::new(),
        topic,
        pubsub_name,
        extensions: Map::new(),
    };

    envelope.retain(|key, _| !KNOWN_ATTRIBUTES.contains(&key.as_str()));
    event.extensions = envelope;
    Ok(event)
}
