use reqwest::header::HeaderMap;

use crate::Payload;

/// Successful outcome of a call.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Payload,
}
