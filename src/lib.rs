//! `preq` is a resilient async HTTP request wrapper.
//!
//! Every call goes through two stages:
//! - normalization ([`normalize()`]) turns the caller's target and options into
//!   a [`RequestDescriptor`], failing synchronously with a
//!   [`ConfigurationError`] only when there is nothing to build from;
//! - dispatch ([`dispatch()`]) runs the descriptor against a [`Transport`],
//!   retries transport failures and empty responses with exponential backoff,
//!   and settles with a [`ResponseEnvelope`] or an [`HttpError`].
//!
//! [`Client`] exposes [`Client::request`] plus one entry point per
//! [`Method`].

mod client;
mod decode;
mod descriptor;
mod dispatch;
mod error;
mod method;
mod normalize;
mod options;
mod request;
mod transport;
mod types;
mod value;

pub use client::{Client, PendingRequest};
pub use descriptor::{RequestBody, RequestDescriptor};
pub use dispatch::dispatch;
pub use error::{ConfigurationError, Error, ErrorKind, HttpError, TransportError};
pub use method::{Method, UnknownMethod};
pub use normalize::normalize;
pub use options::ClientOptions;
pub use request::{Body, PoolOptions, RequestOptions, Target};
pub use transport::{
    RawResponse, ReqwestTransport, Transport, TransportConfig, TransportResult,
};
pub use types::ResponseEnvelope;
pub use value::Payload;

pub type Result<T> = std::result::Result<T, Error>;
