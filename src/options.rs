use std::time::Duration;

/// Client-wide defaults applied while normalizing each call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds when the call sets none.
    pub timeout_ms: u64,
    /// Retry budget for `get` and `put` when the call sets none.
    pub idempotent_retries: u32,
    /// Delay before the first retry in milliseconds. Doubles after every
    /// retry without an upper bound.
    pub initial_backoff_ms: u64,
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            idempotent_retries: 5,
            initial_backoff_ms: 50,
        }
    }
}
