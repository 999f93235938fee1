use std::{future::Future, time::Duration};

use reqwest::header::HeaderMap;

use crate::{decode::form_pairs, RequestBody, RequestDescriptor, TransportError};

/// What the transport received for one attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// `None` when the response carried no body at all.
    pub body: Option<Vec<u8>>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: Some(body.into()),
        }
    }
}

/// Outcome of one attempt. `Ok(None)` is an empty response, which is
/// distinct from a transport error.
pub type TransportResult = Result<Option<RawResponse>, TransportError>;

/// Executes a single attempt of a request.
///
/// Implementations own connection management. The dispatcher may call
/// `perform` many times for the same descriptor.
pub trait Transport: Send + Sync {
    fn perform(&self, request: &RequestDescriptor)
        -> impl Future<Output = TransportResult> + Send;
}

/// Settings for the `reqwest` client behind [`ReqwestTransport`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Idle keep-alive connections kept per host.
    pub max_idle_per_host: usize,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            max_idle_per_host: usize::MAX,
            user_agent: None,
        }
    }
}

/// Default transport backed by a shared `reqwest::Client`.
///
/// The per-call pool options are not applied here: `reqwest` pools
/// connections per client, so pool sizing comes from [`TransportConfig`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        Ok(Self::from_client(builder.build()?))
    }

    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        match Self::new(&TransportConfig::default()) {
            Ok(transport) => transport,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("falling back to reqwest's default client: {err}");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                Self::from_client(reqwest::Client::new())
            }
        }
    }
}

impl Transport for ReqwestTransport {
    async fn perform(&self, request: &RequestDescriptor) -> TransportResult {
        let builder = self
            .http
            .request(request.method.to_reqwest()?, &request.uri)
            .headers(request.headers.clone())
            .timeout(request.timeout);

        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes.clone()),
            RequestBody::Text(text) | RequestBody::Json(text) => builder.body(text.clone()),
            RequestBody::Form(value) => builder.form(&form_pairs(value)),
            RequestBody::Value(value) => builder.body(value.to_string()),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Some(RawResponse {
            status,
            headers,
            body: Some(body.to_vec()),
        }))
    }
}
