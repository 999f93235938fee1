use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use serde_json::{Map, Value};

use crate::Method;

/// Request body as supplied by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Raw bytes, sent unchanged.
    Bytes(Vec<u8>),
    /// Text, sent unchanged.
    Text(String),
    /// Structured value. Objects and arrays are encoded during
    /// normalization depending on the content type and method.
    Value(Value),
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Connection pool settings handed to the transport untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolOptions {
    /// Maximum concurrent sockets; `None` means no limit.
    pub max_sockets: Option<usize>,
}

impl PoolOptions {
    pub fn unbounded() -> Self {
        Self { max_sockets: None }
    }

    pub fn max_sockets(limit: usize) -> Self {
        Self {
            max_sockets: Some(limit),
        }
    }
}

/// Per-call options. Every field is optional and defaulted during
/// normalization.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub uri: Option<String>,
    /// Only consulted by [`Client::request`](crate::Client::request) to pick
    /// an entry point; the invoked entry point always wins.
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    /// Retry budget for transport failures and empty responses.
    pub retries: Option<u32>,
    pub timeout: Option<Duration>,
    pub pool: Option<PoolOptions>,
    /// Transport-specific fields, passed through without interpretation.
    pub extra: Map<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets a header, replacing any previous value for the same name.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn pool(mut self, pool: PoolOptions) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// First argument of every entry point.
#[derive(Clone, Debug, Default)]
pub enum Target {
    #[default]
    None,
    Uri(String),
    Options(RequestOptions),
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::Uri(value.to_owned())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self::Uri(value)
    }
}

impl From<&String> for Target {
    fn from(value: &String) -> Self {
        Self::Uri(value.clone())
    }
}

impl From<RequestOptions> for Target {
    fn from(value: RequestOptions) -> Self {
        Self::Options(value)
    }
}
