use std::time::Duration;

use reqwest::header::HeaderMap;
use tokio::time::sleep;

use crate::{
    decode::decode_body, HttpError, RawResponse, RequestDescriptor, ResponseEnvelope, Transport,
};

/// Executes `descriptor` and settles exactly once.
///
/// Transport errors and empty responses are retried while
/// `descriptor.retries` is above zero. Before each retry the call waits
/// `delay` (starting at `initial_backoff`), then the budget is decremented,
/// the delay doubles and the timeout becomes the original timeout plus the
/// new delay. Responses with status 400 or above settle immediately with
/// their own status and never consume budget, even when a JSON body fails to
/// parse.
pub async fn dispatch<T: Transport>(
    transport: &T,
    mut descriptor: RequestDescriptor,
    initial_backoff: Duration,
) -> Result<ResponseEnvelope, HttpError> {
    let base_timeout = descriptor.timeout;
    let mut delay = initial_backoff;

    loop {
        let failure = match transport.perform(&descriptor).await {
            Ok(Some(RawResponse {
                status,
                headers,
                body: Some(body),
            })) => return settle(status, headers, body),
            Ok(_) => None,
            Err(err) => Some(err),
        };

        if descriptor.retries == 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %descriptor.method,
                uri = %descriptor.uri,
                "request failed with no retries left"
            );

            return Err(match failure {
                Some(err) => HttpError::internal(err),
                None => HttpError::empty_response(),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %descriptor.method,
            uri = %descriptor.uri,
            retries_left = descriptor.retries,
            "retrying request after {} ms",
            delay.as_millis()
        );

        sleep(delay).await;
        descriptor.retries -= 1;
        delay = delay.saturating_mul(2);
        descriptor.timeout = base_timeout.saturating_add(delay);
    }
}

fn settle(status: u16, headers: HeaderMap, raw: Vec<u8>) -> Result<ResponseEnvelope, HttpError> {
    let body = match decode_body(&headers, raw) {
        Ok(body) => body,
        // Error statuses keep their code; the undecodable body is kept raw.
        Err(failure) if status >= 400 => {
            return Err(HttpError::from_response(status, headers, failure.raw))
        }
        Err(failure) => return Err(HttpError::decode(headers, failure.raw, &failure.error)),
    };

    if status >= 400 {
        return Err(HttpError::from_response(status, headers, body));
    }

    Ok(ResponseEnvelope {
        status,
        headers,
        body,
    })
}
