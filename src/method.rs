use std::{fmt, str::FromStr};

use crate::TransportError;

/// HTTP methods supported by the client entry points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Head,
    Put,
    Post,
    Delete,
    Trace,
    Options,
    Mkcol,
    Patch,
}

impl Method {
    /// Every supported method, in entry point order.
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Head,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Trace,
        Method::Options,
        Method::Mkcol,
        Method::Patch,
    ];

    /// Lowercase method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Head => "head",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Trace => "trace",
            Method::Options => "options",
            Method::Mkcol => "mkcol",
            Method::Patch => "patch",
        }
    }

    /// Whether requests with this method are retried when the caller does
    /// not set a retry budget.
    ///
    /// Only read and replace semantics are assumed safe to repeat.
    pub fn retries_by_default(self) -> bool {
        matches!(self, Method::Get | Method::Put)
    }

    pub(crate) fn to_reqwest(self) -> Result<reqwest::Method, TransportError> {
        let method = match self {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
            Method::Trace => reqwest::Method::TRACE,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Patch => reqwest::Method::PATCH,
            Method::Mkcol => reqwest::Method::from_bytes(b"MKCOL")
                .map_err(|err| TransportError::Other(format!("invalid method MKCOL: {err}")))?,
        };
        Ok(method)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported method.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported http method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownMethod(value.to_owned()))
    }
}
