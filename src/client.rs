use std::{
    fmt,
    future::{Future, IntoFuture},
    pin::Pin,
    sync::Arc,
};

use crate::{
    dispatch::dispatch, normalize::normalize, ClientOptions, ConfigurationError, HttpError,
    Method, ReqwestTransport, RequestDescriptor, RequestOptions, ResponseEnvelope, Target,
    Transport, TransportConfig, TransportError,
};

/// Resilient HTTP client.
///
/// Each entry point normalizes its arguments synchronously and returns a
/// [`PendingRequest`]; awaiting it runs the retry loop against the transport.
///
/// ```no_run
/// # async fn demo() -> preq::Result<()> {
/// let client = preq::Client::new();
/// let response = client.get("https://example.com/status", None)?.await?;
/// println!("{} {:?}", response.status, response.body);
/// # Ok(())
/// # }
/// ```
pub struct Client<T = ReqwestTransport> {
    transport: Arc<T>,
    options: ClientOptions,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            options: self.options.clone(),
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &std::any::type_name::<T>())
            .field("options", &self.options)
            .finish()
    }
}

impl Client<ReqwestTransport> {
    /// Creates a client over a default `reqwest` transport.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::default())
    }

    /// Creates a client over a `reqwest` transport built from `config`.
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        Ok(Self::with_transport(ReqwestTransport::new(config)?))
    }
}

impl Default for Client<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_entry_points {
    ($($name:ident => $method:expr),* $(,)?) => {
        $(
            #[doc = concat!("Issues a `", stringify!($name), "` request.")]
            pub fn $name(
                &self,
                target: impl Into<Target>,
                options: impl Into<Option<RequestOptions>>,
            ) -> Result<PendingRequest<T>, ConfigurationError> {
                self.call($method, target, options)
            }
        )*
    };
}

impl<T: Transport + 'static> Client<T> {
    /// Creates a client over any [`Transport`].
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            options: ClientOptions::default(),
        }
    }

    /// Applies client-wide defaults such as timeout and retry budget.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client_options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Generic entry point.
    ///
    /// The method comes from `options.method`, then from an options target,
    /// and falls back to `get`.
    pub fn request(
        &self,
        target: impl Into<Target>,
        options: impl Into<Option<RequestOptions>>,
    ) -> Result<PendingRequest<T>, ConfigurationError> {
        let target = target.into();
        let options = options.into();
        let method = options
            .as_ref()
            .and_then(|options| options.method)
            .or(match &target {
                Target::Options(options) => options.method,
                _ => None,
            })
            .unwrap_or_default();
        self.call(method, target, options)
    }

    /// Normalizes the arguments for `method`.
    pub fn call(
        &self,
        method: Method,
        target: impl Into<Target>,
        options: impl Into<Option<RequestOptions>>,
    ) -> Result<PendingRequest<T>, ConfigurationError> {
        let descriptor = normalize(target.into(), options.into(), method, &self.options)?;
        Ok(PendingRequest {
            client: self.clone(),
            descriptor,
        })
    }

    method_entry_points! {
        get => Method::Get,
        head => Method::Head,
        put => Method::Put,
        post => Method::Post,
        delete => Method::Delete,
        trace => Method::Trace,
        options => Method::Options,
        mkcol => Method::Mkcol,
        patch => Method::Patch,
    }
}

/// A normalized call that has not been sent yet.
///
/// Await it (or call [`send`](Self::send)) to run it.
pub struct PendingRequest<T = ReqwestTransport> {
    client: Client<T>,
    descriptor: RequestDescriptor,
}

impl<T> fmt::Debug for PendingRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl<T: Transport + 'static> PendingRequest<T> {
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Runs the call to settlement.
    pub async fn send(self) -> Result<ResponseEnvelope, HttpError> {
        let backoff = self.client.options.initial_backoff();
        dispatch(self.client.transport.as_ref(), self.descriptor, backoff).await
    }
}

impl<T: Transport + 'static> IntoFuture for PendingRequest<T> {
    type Output = Result<ResponseEnvelope, HttpError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
