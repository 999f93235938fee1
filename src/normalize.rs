use crate::{
    decode::encode_body, ClientOptions, ConfigurationError, Method, PoolOptions,
    RequestDescriptor, RequestOptions, Target,
};

/// Builds the canonical descriptor for one call of `method`.
///
/// - A URI target without options becomes `{ uri }`; an options target is
///   used as the options structure.
/// - When both are given, the target's URI overwrites `options.uri`.
/// - `method` always overwrites the caller's method.
/// - Structured bodies are encoded here, once.
/// - `retries`, `timeout` and `pool` are defaulted from `defaults`.
///
/// Fails only when there is nothing to build from.
pub fn normalize(
    target: Target,
    options: Option<RequestOptions>,
    method: Method,
    defaults: &ClientOptions,
) -> Result<RequestDescriptor, ConfigurationError> {
    let target = match target {
        Target::Uri(uri) if uri.is_empty() => Target::None,
        other => other,
    };

    let options = match (target, options) {
        (Target::None, None) => return Err(ConfigurationError::MissingOptions),
        (Target::Uri(uri), None) => RequestOptions::new().uri(uri),
        (Target::Options(options), None) | (Target::None, Some(options)) => options,
        (Target::Uri(uri), Some(options)) => options.uri(uri),
        (Target::Options(explicit), Some(mut options)) => {
            if explicit.uri.is_some() {
                options.uri = explicit.uri;
            }
            options
        }
    };

    let uri = options
        .uri
        .filter(|uri| !uri.is_empty())
        .ok_or(ConfigurationError::MissingUri)?;
    let body = encode_body(options.body, &options.headers, method);

    let retries = options.retries.unwrap_or(if method.retries_by_default() {
        defaults.idempotent_retries
    } else {
        0
    });

    Ok(RequestDescriptor {
        method,
        uri,
        headers: options.headers,
        body,
        retries,
        timeout: options.timeout.unwrap_or_else(|| defaults.timeout()),
        pool: options.pool.unwrap_or_else(PoolOptions::unbounded),
        extra: options.extra,
    })
}
