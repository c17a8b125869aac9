//! Request and response interceptors applied to every call.
//!
//! # Design
//! Outbound, a `RequestInterceptor` may rewrite the request before it reaches
//! the transport; the default passes it through untouched. Inbound, a 2xx
//! response is reduced to its decoded payload and every failure is folded
//! into one `ApiError` whose message is picked in this order: the server's
//! `detail` string, the transport's own message, `FALLBACK_MESSAGE`.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ApiError, FALLBACK_MESSAGE};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::TransportFailure;
use crate::types::ErrorEnvelope;

/// Hook run on every outbound request.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: HttpRequest) -> HttpRequest;
}

/// Returns the request unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn intercept(&self, request: HttpRequest) -> HttpRequest {
        request
    }
}

impl<F> RequestInterceptor for F
where
    F: Fn(HttpRequest) -> HttpRequest + Send + Sync,
{
    fn intercept(&self, request: HttpRequest) -> HttpRequest {
        self(request)
    }
}

fn or_fallback(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

/// Strip the envelope from a response: decode the body on 2xx, normalize otherwise.
pub fn unwrap_payload<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(normalize_status(&response));
    }
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Decode(format!("deserialization failed: {e}")))
}

/// Map a non-2xx response to `Server` (string detail present) or `Unknown`.
pub fn normalize_status(response: &HttpResponse) -> ApiError {
    let detail = serde_json::from_str::<ErrorEnvelope>(&response.body)
        .ok()
        .and_then(|env| env.detail_message().map(str::to_owned))
        .filter(|d| !d.is_empty());

    let err = match detail {
        Some(detail) => ApiError::Server(detail),
        None => ApiError::Unknown(or_fallback(format!(
            "Request failed with status code {}",
            response.status
        ))),
    };
    warn!(status = response.status, error = %err, "request rejected by server");
    err
}

/// Map a failure that produced no response.
pub fn normalize_failure(failure: TransportFailure) -> ApiError {
    let err = match failure {
        TransportFailure::Timeout(message) => ApiError::Timeout(or_fallback(message)),
        TransportFailure::Network(message) => ApiError::Network(or_fallback(message)),
    };
    warn!(error = %err, kind = ?err.kind(), "request failed before a response arrived");
    err
}
