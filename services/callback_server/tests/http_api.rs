//! End-to-end tests for the callback HTTP surface.
//!
//! Requests are built with `hyper::Request` and handed straight to the router,
//! except for the server lifecycle test which goes over a real socket.

use apphost_actors::{actor_factory, Actor, MethodError, ReminderCallee};
use apphost_pubsub::{HandlerOutcome, Subscription, TopicEvent};
use apphost_server::{handle_request, AppContext, AppServer};
use async_trait::async_trait;
use bytes::Bytes;
use hyper::{Body, Method, Request, Response, StatusCode};
use serde_json::Value;
use std::sync::{Arc, Mutex};

const TEST_ACTOR_TYPE: &str = "testActorType";
const PLAIN_ACTOR_TYPE: &str = "notReminderCalleeActor";

const CLOUD_EVENT: &str = r#"{
    "specversion" : "1.0",
    "type" : "com.github.pull.create",
    "source" : "https://github.com/cloudevents/spec/pull",
    "subject" : "123",
    "id" : "A234-1234-1234",
    "time" : "2018-04-05T17:31:00Z",
    "comexampleextension1" : "value",
    "comexampleothervalue" : 5,
    "datacontenttype" : "application/json",
    "data" : "eyJtZXNzYWdlIjoiaGVsbG8ifQ=="
}"#;

#[derive(Default)]
struct Calls {
    reminders: Vec<String>,
    methods: Vec<String>,
}

struct TestActor {
    calls: Arc<Mutex<Calls>>,
}

#[async_trait]
impl Actor for TestActor {
    fn actor_type(&self) -> String {
        TEST_ACTOR_TYPE.to_string()
    }

    async fn invoke(
        &mut self,
        method: &str,
        request: Option<Value>,
    ) -> Result<Option<Value>, MethodError> {
        self.calls.lock().unwrap().methods.push(method.to_string());
        match method {
            "Invoke" => Ok(request),
            "Nothing" => Ok(None),
            other => Err(MethodError::NotFound(other.to_string())),
        }
    }

    fn reminder_callee(&mut self) -> Option<&mut dyn ReminderCallee> {
        Some(self)
    }
}

#[async_trait]
impl ReminderCallee for TestActor {
    async fn reminder_call(
        &mut self,
        reminder_name: &str,
        _state: Bytes,
        _due_time: &str,
        _period: &str,
    ) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .reminders
            .push(reminder_name.to_string());
        Ok(())
    }
}

struct PlainActor;

#[async_trait]
impl Actor for PlainActor {
    fn actor_type(&self) -> String {
        PLAIN_ACTOR_TYPE.to_string()
    }

    async fn invoke(
        &mut self,
        method: &str,
        _request: Option<Value>,
    ) -> Result<Option<Value>, MethodError> {
        Err(MethodError::NotFound(method.to_string()))
    }
}

/// Actor whose type name needs escaping in a URL
#[derive(Default)]
struct SpacedActor {
    id: String,
}

#[async_trait]
impl Actor for SpacedActor {
    fn actor_type(&self) -> String {
        "user type".to_string()
    }

    fn set_id(&mut self, actor_id: &str) {
        self.id = actor_id.to_string();
    }

    async fn invoke(
        &mut self,
        method: &str,
        _request: Option<Value>,
    ) -> Result<Option<Value>, MethodError> {
        match method {
            "Get" => Ok(Some(Value::String(self.id.clone()))),
            other => Err(MethodError::NotFound(other.to_string())),
        }
    }
}

fn context_with_actors() -> (AppContext, Arc<Mutex<Calls>>) {
    let ctx = AppContext::new();
    let calls = Arc::new(Mutex::new(Calls::default()));
    let shared = Arc::clone(&calls);
    ctx.register_actor(actor_factory(move || TestActor {
        calls: Arc::clone(&shared),
    }))
    .unwrap();
    ctx.register_actor(actor_factory(|| PlainActor)).unwrap();
    (ctx, calls)
}

async fn send(ctx: &AppContext, method: Method, path: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::from(body.to_string()))
        .unwrap();
    handle_request(request, ctx.clone()).await.unwrap()
}

async fn body_bytes(response: Response<Body>) -> Bytes {
    hyper::body::to_bytes(response.into_body()).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let ctx = AppContext::new();
    let response = send(&ctx, Method::GET, "/healthz", "").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_and_wrong_method() {
    let ctx = AppContext::new();
    assert_eq!(
        send(&ctx, Method::GET, "/nope", "").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&ctx, Method::POST, "/healthz", "").await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
        send(&ctx, Method::GET, "/actors/t/i/method/m", "").await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_config_lists_registered_types() {
    let (ctx, _) = context_with_actors();
    let response = send(&ctx, Method::GET, "/dapr/config", "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let config = body_json(response).await;
    assert_eq!(
        config["entities"],
        serde_json::json!([TEST_ACTOR_TYPE, PLAIN_ACTOR_TYPE])
    );
}

#[tokio::test]
async fn test_invoke_method_before_and_after_registration() {
    let ctx = AppContext::new();
    let path = format!("/actors/{}/testID/method/Invoke", TEST_ACTOR_TYPE);

    let response = send(&ctx, Method::PUT, &path, r#""hello""#).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let calls = Arc::new(Mutex::new(Calls::default()));
    let shared = Arc::clone(&calls);
    ctx.register_actor(actor_factory(move || TestActor {
        calls: Arc::clone(&shared),
    }))
    .unwrap();

    let response = send(&ctx, Method::PUT, &path, r#""hello""#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from_static(br#""hello""#));
    assert_eq!(calls.lock().unwrap().methods, vec!["Invoke"]);
}

#[tokio::test]
async fn test_invoke_method_failures_are_internal_errors() {
    let (ctx, _) = context_with_actors();

    let unknown = format!("/actors/{}/testID/method/Missing", TEST_ACTOR_TYPE);
    assert_eq!(
        send(&ctx, Method::PUT, &unknown, "").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let bad_body = format!("/actors/{}/testID/method/Invoke", TEST_ACTOR_TYPE);
    assert_eq!(
        send(&ctx, Method::PUT, &bad_body, "not json").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_method_without_result_has_empty_body() {
    let (ctx, _) = context_with_actors();
    let path = format!("/actors/{}/testID/method/Nothing", TEST_ACTOR_TYPE);
    let response = send(&ctx, Method::PUT, &path, "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_deactivate() {
    let (ctx, _) = context_with_actors();

    let unregistered = "/actors/unknownType/testID";
    assert_eq!(
        send(&ctx, Method::DELETE, unregistered, "").await.status(),
        StatusCode::NOT_FOUND
    );

    let path = format!("/actors/{}/testID", TEST_ACTOR_TYPE);
    let activate = format!("/actors/{}/testID/method/Nothing", TEST_ACTOR_TYPE);
    send(&ctx, Method::PUT, &activate, "").await;

    assert_eq!(
        send(&ctx, Method::DELETE, &path, "").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&ctx, Method::DELETE, &path, "").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_reminder() {
    let (ctx, calls) = context_with_actors();
    let params = r#"{"data":"ImhlbGxvIg==","dueTime":"5s","period":"10s"}"#;

    let unregistered = "/actors/unknownType/testID/method/remind/testReminder";
    assert_eq!(
        send(&ctx, Method::PUT, unregistered, params).await.status(),
        StatusCode::NOT_FOUND
    );

    let path = format!("/actors/{}/testID/method/remind/testReminder", TEST_ACTOR_TYPE);
    assert_eq!(
        send(&ctx, Method::PUT, &path, "{").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        send(&ctx, Method::PUT, &path, params).await.status(),
        StatusCode::OK
    );
    assert_eq!(calls.lock().unwrap().reminders, vec!["testReminder"]);

    let plain = format!("/actors/{}/testID/method/remind/testReminder", PLAIN_ACTOR_TYPE);
    assert_eq!(
        send(&ctx, Method::PUT, &plain, params).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_timer() {
    let (ctx, calls) = context_with_actors();

    let unregistered = "/actors/unknownType/testID/method/timer/testTimer";
    let params = r#"{"callback":"Invoke","data":"ImhlbGxvIg==","dueTime":"5s","period":"6s"}"#;
    assert_eq!(
        send(&ctx, Method::PUT, unregistered, params).await.status(),
        StatusCode::NOT_FOUND
    );

    let path = format!("/actors/{}/testID/method/timer/testTimer", TEST_ACTOR_TYPE);
    assert_eq!(
        send(&ctx, Method::PUT, &path, "{").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        send(&ctx, Method::PUT, &path, params).await.status(),
        StatusCode::OK
    );
    assert_eq!(calls.lock().unwrap().methods, vec!["Invoke"]);

    let unknown_callback = r#"{"callback":"Missing","data":"","dueTime":"5s","period":"6s"}"#;
    assert_eq!(
        send(&ctx, Method::PUT, &path, unknown_callback).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

async fn expect_json_content(event: TopicEvent) -> HandlerOutcome {
    if event.data_content_type != "application/json" {
        return HandlerOutcome::failed(anyhow::anyhow!(
            "invalid content type: {}",
            event.data_content_type
        ));
    }
    HandlerOutcome::success()
}

#[tokio::test]
async fn test_event_delivery_success() {
    let ctx = AppContext::new();
    ctx.subscribe(
        &Subscription::new("messages", "test", "/"),
        expect_json_content,
    )
    .unwrap();

    let response = send(&ctx, Method::POST, "/", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "SUCCESS");
}

#[tokio::test]
async fn test_event_delivery_retry_and_drop() {
    let ctx = AppContext::new();
    ctx.subscribe(
        &Subscription::new("messages", "retry", "/retry"),
        |_event: TopicEvent| async {
            HandlerOutcome::retry_with(anyhow::anyhow!("error to cause a retry"))
        },
    )
    .unwrap();
    ctx.subscribe(
        &Subscription::new("messages", "drop", "/drop"),
        |_event: TopicEvent| async { HandlerOutcome::failed(anyhow::anyhow!("bad order")) },
    )
    .unwrap();

    let response = send(&ctx, Method::POST, "/retry", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "RETRY");

    let response = send(&ctx, Method::POST, "/drop", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "DROP");
}

#[tokio::test]
async fn test_undecodable_event_is_rejected() {
    let ctx = AppContext::new();
    ctx.subscribe(
        &Subscription::new("messages", "test", "/"),
        expect_json_content,
    )
    .unwrap();

    assert_eq!(
        send(&ctx, Method::POST, "/", "").await.status(),
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        send(&ctx, Method::POST, "/", "not JSON").await.status(),
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        send(&ctx, Method::GET, "/", CLOUD_EVENT).await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_raw_payload_event() {
    let ctx = AppContext::new();
    let seen = Arc::new(Mutex::new(None));
    let capture = Arc::clone(&seen);
    ctx.subscribe(
        &Subscription::new("messages", "raw", "/raw").with_metadata("rawPayload", "true"),
        move |event: TopicEvent| {
            let capture = Arc::clone(&capture);
            async move {
                *capture.lock().unwrap() = Some(event.data_base64.clone());
                HandlerOutcome::success()
            }
        },
    )
    .unwrap();

    let body = r#"{
        "datacontenttype" : "application/octet-stream",
        "data_base64" : "cGluZw=="
    }"#;
    let response = send(&ctx, Method::POST, "/raw", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(seen.lock().unwrap().as_deref(), Some("cGluZw=="));
}

#[tokio::test]
async fn test_subscribe_lists_routes() {
    let ctx = AppContext::new();
    ctx.subscribe(
        &Subscription::new("messages", "orders", "orders"),
        expect_json_content,
    )
    .unwrap();

    let response = send(&ctx, Method::GET, "/dapr/subscribe", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!([{ "pubsubname": "messages", "topic": "orders", "route": "/orders" }])
    );

    let response = send(&ctx, Method::POST, "/orders", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_server_serves_and_shuts_down() {
    let (ctx, _) = context_with_actors();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

    let (addr, serving) = AppServer::new(ctx)
        .bind("127.0.0.1:0".parse().unwrap(), async {
            let _ = stopped.await;
        })
        .unwrap();
    let handle = tokio::spawn(serving);

    let client = hyper::Client::new();
    let uri: hyper::Uri = format!("http://{}/healthz", addr).parse().unwrap();
    let response = client.get(uri).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_encoded_actor_path_segments() {
    let ctx = AppContext::new();
    ctx.register_actor(actor_factory(SpacedActor::default)).unwrap();

    let response = send(&ctx, Method::PUT, "/actors/user%20type/a%20b/method/Get", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from_static(br#""a b""#));

    let response = send(
        &ctx,
        Method::PUT,
        "/actors/user%20type/tenant%2Fuser%40mail/method/Get",
        "",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from_static(br#""tenant/user@mail""#)
    );

    assert_eq!(
        send(&ctx, Method::DELETE, "/actors/user%20type/a%20b", "").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_encoded_subscription_route() {
    let ctx = AppContext::new();
    ctx.subscribe(
        &Subscription::new("messages", "orders", "/orders v2"),
        expect_json_content,
    )
    .unwrap();

    let response = send(&ctx, Method::POST, "/orders%20v2", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "SUCCESS");

    assert_eq!(
        send(&ctx, Method::GET, "/orders%20v2", "").await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_subscription_on_reserved_path_still_receives_events() {
    let (ctx, _) = context_with_actors();
    ctx.subscribe(
        &Subscription::new("messages", "health", "/healthz"),
        expect_json_content,
    )
    .unwrap();
    ctx.subscribe(
        &Subscription::new("messages", "shadow", "/actors/testActorType/testID"),
        expect_json_content,
    )
    .unwrap();

    let response = send(&ctx, Method::POST, "/healthz", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "SUCCESS");

    let response = send(&ctx, Method::POST, "/actors/testActorType/testID", CLOUD_EVENT).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "SUCCESS");

    assert_eq!(
        send(&ctx, Method::GET, "/healthz", "").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&ctx, Method::DELETE, "/actors/testActorType/testID", "").await.status(),
        StatusCode::OK
    );
}
