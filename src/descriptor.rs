use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::{Method, PoolOptions};

/// Outgoing body after encoding has been resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Bytes(Vec<u8>),
    Text(String),
    /// Serialized JSON text; the caller's `content-type` declared JSON.
    Json(String),
    /// Structured `post` body to send URL-encoded.
    Form(Value),
    /// Structured body the normalizer left alone.
    Value(Value),
}

/// Canonical request handed to the [`Transport`](crate::Transport).
///
/// Built once per call. Only the dispatcher mutates it afterwards: `retries`
/// counts down and `timeout` grows with the backoff delay.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub retries: u32,
    pub timeout: Duration,
    pub pool: PoolOptions,
    pub extra: Map<String, Value>,
}
