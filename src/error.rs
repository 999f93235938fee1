use std::fmt;

use reqwest::header::HeaderMap;
use serde_json::json;

use crate::{decode::headers_to_json, Payload};

/// Synchronous failure while normalizing call options.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Neither a target nor an options structure was given.
    #[error("options missing")]
    MissingOptions,
    /// Options were given but no URI could be resolved from them.
    #[error("request uri missing")]
    MissingUri,
}

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Which path produced an [`HttpError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with status 400 or above.
    Status,
    /// The transport kept returning no response or no body.
    EmptyResponse,
    /// The transport kept failing.
    Internal,
    /// A JSON response body could not be parsed.
    Decode,
}

impl ErrorKind {
    /// `type` discriminator placed in synthetic error bodies.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            ErrorKind::Status => None,
            ErrorKind::EmptyResponse => Some("empty_response"),
            ErrorKind::Internal => Some("internal_error"),
            ErrorKind::Decode => Some("decode_error"),
        }
    }
}

/// The single asynchronous failure type of a call.
///
/// Its message is the JSON serialization of status, headers, body and
/// description.
#[derive(Debug)]
pub struct HttpError {
    pub kind: ErrorKind,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Payload,
    /// Rendering of the transport error, when one caused this failure.
    pub description: Option<String>,
    pub cause: Option<TransportError>,
}

impl HttpError {
    /// Builds an error from a response whose status is 400 or above.
    pub fn from_response(status: u16, headers: HeaderMap, body: Payload) -> Self {
        Self {
            kind: ErrorKind::Status,
            status,
            headers,
            body,
            description: None,
            cause: None,
        }
    }

    pub(crate) fn empty_response() -> Self {
        Self {
            kind: ErrorKind::EmptyResponse,
            status: 500,
            headers: HeaderMap::new(),
            body: Payload::Json(json!({ "type": "empty_response" })),
            description: None,
            cause: None,
        }
    }

    pub(crate) fn internal(cause: TransportError) -> Self {
        let description = cause.to_string();
        Self {
            kind: ErrorKind::Internal,
            status: 500,
            headers: HeaderMap::new(),
            body: Payload::Json(json!({
                "type": "internal_error",
                "description": description,
                "error": format!("{cause:?}"),
            })),
            description: Some(description),
            cause: Some(cause),
        }
    }

    pub(crate) fn decode(headers: HeaderMap, raw: Payload, err: &serde_json::Error) -> Self {
        let description = format!("invalid json response body: {err}");
        Self {
            kind: ErrorKind::Decode,
            status: 500,
            headers,
            body: Payload::Json(json!({
                "type": "decode_error",
                "description": description,
                "body": raw,
            })),
            description: Some(description),
            cause: None,
        }
    }

    fn message(&self) -> String {
        let mut fields = json!({
            "status": self.status,
            "headers": headers_to_json(&self.headers),
            "body": self.body,
        });
        if let Some(description) = &self.description {
            fields["description"] = json!(description);
        }
        fields.to_string()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Either stage of a call: synchronous normalization or the settled result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Http(#[from] HttpError),
}
