use std::{collections::VecDeque, future::IntoFuture, sync::Mutex, time::Duration};

use preq::{
    Client, ErrorKind, Method, Payload, RawResponse, RequestBody, RequestDescriptor,
    RequestOptions, ResponseEnvelope, Transport, TransportError, TransportResult,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::json;
use tokio::time::Instant;

enum Scripted {
    Fail(&'static str),
    Empty,
    NoBody(u16),
    Respond(RawResponse),
}

#[derive(Clone, Debug)]
struct Attempt {
    method: Method,
    retries: u32,
    timeout: Duration,
    body: RequestBody,
    at: Instant,
}

struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    attempts: Mutex<Vec<Attempt>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    fn attempts(&self) -> Vec<Attempt> {
        self.attempts
            .lock()
            .expect("attempt log mutex must not be poisoned")
            .clone()
    }
}

impl Transport for ScriptedTransport {
    async fn perform(&self, request: &RequestDescriptor) -> TransportResult {
        self.attempts
            .lock()
            .expect("attempt log mutex must not be poisoned")
            .push(Attempt {
                method: request.method,
                retries: request.retries,
                timeout: request.timeout,
                body: request.body.clone(),
                at: Instant::now(),
            });

        let next = self
            .script
            .lock()
            .expect("script mutex must not be poisoned")
            .pop_front()
            .unwrap_or(Scripted::Fail("script exhausted"));

        match next {
            Scripted::Fail(message) => Err(TransportError::Other(message.to_owned())),
            Scripted::Empty => Ok(None),
            Scripted::NoBody(status) => Ok(Some(RawResponse {
                status,
                headers: HeaderMap::new(),
                body: None,
            })),
            Scripted::Respond(response) => Ok(Some(response)),
        }
    }
}

fn text(status: u16, body: &str) -> Scripted {
    Scripted::Respond(RawResponse::new(status, HeaderMap::new(), body))
}

fn json_response(status: u16, body: &str) -> Scripted {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    Scripted::Respond(RawResponse::new(status, headers, body))
}

fn client(script: Vec<Scripted>) -> Client<ScriptedTransport> {
    Client::with_transport(ScriptedTransport::new(script))
}

fn millis(attempts: &[Attempt], start: Instant) -> Vec<u128> {
    attempts
        .iter()
        .map(|attempt| attempt.at.duration_since(start).as_millis())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn get_resolves_with_envelope() {
    let client = client(vec![text(200, "hi")]);

    let response = client
        .get("http://x/ok", None)
        .expect("options are valid")
        .await
        .expect("request must succeed");

    assert_eq!(
        response,
        ResponseEnvelope {
            status: 200,
            headers: HeaderMap::new(),
            body: Payload::text("hi"),
        }
    );
    assert_eq!(client.transport().attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn error_status_settles_without_consuming_budget() {
    let client = client(vec![text(404, "nf"), text(200, "unused")]);

    let err = client
        .get("http://x/err", None)
        .expect("options are valid")
        .await
        .expect_err("404 must reject");

    assert_eq!(err.kind, ErrorKind::Status);
    assert_eq!(err.status, 404);
    assert_eq!(err.body, Payload::text("nf"));

    let attempts = client.transport().attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].retries, 5);
}

#[tokio::test(start_paused = true)]
async fn server_errors_are_not_retried() {
    let client = client(vec![json_response(503, r#"{"busy":true}"#), text(200, "unused")]);

    let err = client
        .put("http://x/busy", None)
        .expect("options are valid")
        .await
        .expect_err("503 must reject");

    assert_eq!(err.status, 503);
    assert_eq!(err.body, Payload::Json(json!({"busy": true})));
    assert_eq!(client.transport().attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_errors_retry_with_doubling_backoff() {
    let client = client(vec![
        Scripted::Fail("refused"),
        Scripted::Fail("refused"),
        Scripted::Fail("refused"),
        Scripted::Fail("refused"),
    ]);
    let start = Instant::now();

    let err = client
        .get(
            "http://x/down",
            RequestOptions::new()
                .retries(3)
                .timeout(Duration::from_millis(1_000)),
        )
        .expect("options are valid")
        .await
        .expect_err("persistent failure must reject");

    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.status, 500);
    let body = err.body.as_json().expect("synthetic body is json");
    assert_eq!(body["type"], "internal_error");
    assert_eq!(body["description"], "transport error: refused");
    assert!(err.cause.is_some());

    let attempts = client.transport().attempts();
    assert_eq!(attempts.len(), 4);
    assert_eq!(
        attempts.iter().map(|a| a.retries).collect::<Vec<_>>(),
        vec![3, 2, 1, 0]
    );
    assert_eq!(
        attempts
            .iter()
            .map(|a| a.timeout.as_millis())
            .collect::<Vec<_>>(),
        vec![1_000, 1_100, 1_200, 1_400]
    );

    let offsets = millis(&attempts, start);
    let gaps: Vec<u128> = offsets.windows(2).map(|pair| pair[1] - pair[0]).collect();
    assert_eq!(offsets[0], 0);
    for (gap, expected) in gaps.iter().zip([50u128, 100, 200]) {
        assert!(
            *gap >= expected && *gap < expected + 5,
            "gap {gap} ms, expected {expected} ms"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn empty_responses_exhaust_default_budget() {
    let client = client((0..6).map(|_| Scripted::Empty).collect());

    let err = client
        .get("http://x/empty", None)
        .expect("options are valid")
        .await
        .expect_err("empty responses must reject");

    assert_eq!(err.kind, ErrorKind::EmptyResponse);
    assert_eq!(err.status, 500);
    assert_eq!(err.body, Payload::Json(json!({"type": "empty_response"})));
    assert!(err.cause.is_none());
    assert_eq!(client.transport().attempts().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn response_without_body_is_retried() {
    let client = client(vec![Scripted::NoBody(200), text(200, "second")]);

    let response = client
        .get("http://x/flaky", None)
        .expect("options are valid")
        .await
        .expect("second attempt must succeed");

    assert_eq!(response.body, Payload::text("second"));
    assert_eq!(client.transport().attempts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn recovers_after_transient_failure() {
    let client = client(vec![Scripted::Fail("reset"), Scripted::Empty, text(201, "made")]);

    let response = client
        .put("http://x/item", None)
        .expect("options are valid")
        .await
        .expect("third attempt must succeed");

    assert_eq!(response.status, 201);
    let attempts = client.transport().attempts();
    assert_eq!(attempts.len(), 3);
    assert!(attempts.iter().all(|attempt| attempt.method == Method::Put));
}

#[tokio::test(start_paused = true)]
async fn non_idempotent_methods_do_not_retry_by_default() {
    for method in [Method::Post, Method::Delete, Method::Patch, Method::Head] {
        let client = client(vec![Scripted::Fail("down"), text(200, "unused")]);

        let err = client
            .call(method, "http://x", None)
            .expect("options are valid")
            .await
            .expect_err("single failure must reject");

        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(client.transport().attempts().len(), 1, "method {method}");
    }
}

#[tokio::test(start_paused = true)]
async fn explicit_budget_enables_retries_for_post() {
    let client = client(vec![Scripted::Fail("down"), text(200, "ok")]);

    let response = client
        .post("http://x", RequestOptions::new().retries(1))
        .expect("options are valid")
        .await
        .expect("retry must succeed");

    assert_eq!(response.status, 200);
    assert_eq!(client.transport().attempts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn json_responses_are_decoded() {
    let client = client(vec![json_response(200, r#"{"items":[1,2]}"#)]);

    let response = client
        .get("http://x/list", None)
        .expect("options are valid")
        .await
        .expect("request must succeed");

    assert_eq!(response.body, Payload::Json(json!({"items": [1, 2]})));
    assert_eq!(
        response.headers[CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_json_settles_as_decode_error() {
    let client = client(vec![json_response(200, "{broken"), text(200, "unused")]);

    let err = client
        .get("http://x/bad", None)
        .expect("options are valid")
        .await
        .expect_err("invalid json must reject");

    assert_eq!(err.kind, ErrorKind::Decode);
    assert_eq!(err.status, 500);
    let body = err.body.as_json().expect("synthetic body is json");
    assert_eq!(body["type"], "decode_error");
    assert_eq!(body["body"], "{broken");
    assert_eq!(client.transport().attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn error_status_with_invalid_json_keeps_its_status() {
    let client = client(vec![
        json_response(502, "<html>Bad Gateway</html>"),
        text(200, "unused"),
    ]);

    let err = client
        .get("http://x/proxied", None)
        .expect("options are valid")
        .await
        .expect_err("502 must reject");

    assert_eq!(err.kind, ErrorKind::Status);
    assert_eq!(err.status, 502);
    assert_eq!(err.body, Payload::text("<html>Bad Gateway</html>"));
    assert_eq!(
        err.headers[CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
    assert_eq!(client.transport().attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn post_structured_body_is_sent_as_form() {
    let client = client(vec![text(200, "ok")]);

    client
        .post("http://x", RequestOptions::new().body(json!({"a": 1})))
        .expect("options are valid")
        .await
        .expect("request must succeed");

    let attempts = client.transport().attempts();
    assert_eq!(attempts[0].body, RequestBody::Form(json!({"a": 1})));
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_settle_independently() {
    let client = client(vec![
        Scripted::Fail("first"),
        text(200, "a"),
        text(200, "b"),
    ]);

    let first = client.get("http://x/a", None).expect("options are valid");
    let second = client.get("http://x/b", None).expect("options are valid");
    let (first, second) = tokio::join!(
        tokio::spawn(first.into_future()),
        tokio::spawn(second.into_future())
    );

    let first = first.expect("task must not panic").expect("must succeed");
    let second = second.expect("task must not panic").expect("must succeed");
    let mut bodies = vec![first.body, second.body];
    bodies.sort_by_key(|body| body.as_text().map(str::to_owned));
    assert_eq!(bodies, vec![Payload::text("a"), Payload::text("b")]);
    assert_eq!(client.transport().attempts().len(), 3);
}
