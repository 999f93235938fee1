use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::{Map, Value};

use crate::{Body, Method, Payload, RequestBody};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Whether the `content-type` header starts with `application/json`.
///
/// The prefix match is case-sensitive, so parameters such as
/// `; charset=utf-8` are accepted.
pub(crate) fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(JSON_CONTENT_TYPE))
}

/// Resolves the outgoing body encoding once, before dispatch.
pub(crate) fn encode_body(body: Option<Body>, headers: &HeaderMap, method: Method) -> RequestBody {
    match body {
        None => RequestBody::Empty,
        Some(Body::Bytes(bytes)) => RequestBody::Bytes(bytes),
        Some(Body::Text(text)) => RequestBody::Text(text),
        Some(Body::Value(value)) if value.is_object() || value.is_array() => {
            if declares_json(headers) {
                RequestBody::Json(value.to_string())
            } else if method == Method::Post {
                RequestBody::Form(value)
            } else {
                RequestBody::Value(value)
            }
        }
        Some(Body::Value(Value::Null)) => RequestBody::Empty,
        Some(Body::Value(Value::String(text))) => RequestBody::Text(text),
        Some(Body::Value(primitive)) => RequestBody::Text(primitive.to_string()),
    }
}

/// Flattens a structured form body into pairs with bracketed keys.
///
/// `{"a":{"b":1},"c":[1,2]}` becomes `a[b]=1`, `c[0]=1`, `c[1]=2`; a
/// top-level array uses its indices as keys and `null` encodes as an empty
/// value.
pub(crate) fn form_pairs(value: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                flatten_form(name.clone(), child, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_form(index.to_string(), child, &mut pairs);
            }
        }
        scalar => flatten_form(String::new(), scalar, &mut pairs),
    }
    pairs
}

fn flatten_form(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                flatten_form(format!("{key}[{name}]"), child, pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_form(format!("{key}[{index}]"), child, pairs);
            }
        }
        Value::Null => pairs.push((key, String::new())),
        Value::String(text) => pairs.push((key, text.clone())),
        other => pairs.push((key, other.to_string())),
    }
}

/// JSON response body that failed to parse.
#[derive(Debug)]
pub(crate) struct DecodeFailure {
    pub error: serde_json::Error,
    pub raw: Payload,
}

/// Parses JSON responses; every other body passes through unchanged.
pub(crate) fn decode_body(headers: &HeaderMap, raw: Vec<u8>) -> Result<Payload, DecodeFailure> {
    if raw.is_empty() || !declares_json(headers) {
        return Ok(Payload::from_bytes(raw));
    }

    serde_json::from_slice(&raw)
        .map(Payload::Json)
        .map_err(|error| DecodeFailure {
            error,
            raw: Payload::from_bytes(raw),
        })
}

/// Renders headers as a JSON object; repeated names are joined with `, `.
pub(crate) fn headers_to_json(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        map.insert(name.as_str().to_owned(), Value::String(joined));
    }
    map
}
