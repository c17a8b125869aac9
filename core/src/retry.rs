//! Opt-in retry policy, layered around any `Transport`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportFailure};

/// Retries failed attempts with a fixed delay.
///
/// An attempt is retried on a network failure or a 5xx status. Timeouts and
/// 4xx responses are returned immediately: `RemoteClient` bounds the whole
/// call, retries included, by its configured timeout. After `max_attempts`
/// the last outcome is returned as-is.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    max_attempts: u32,
    delay: Duration,
}

impl<T> RetryingTransport<T> {
    pub fn new(inner: T, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn should_retry(outcome: &Result<HttpResponse, TransportFailure>) -> bool {
    match outcome {
        Ok(response) => response.status >= 500,
        Err(TransportFailure::Network(_)) => true,
        Err(TransportFailure::Timeout(_)) => false,
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut attempt = 1;
        loop {
            let outcome = self.inner.execute(request.clone()).await;
            if attempt >= self.max_attempts || !should_retry(&outcome) {
                return outcome;
            }
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                path = %request.path,
                "attempt failed, will retry"
            );
            attempt += 1;
            tokio::time::sleep(self.delay).await;
        }
    }
}
