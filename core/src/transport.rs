//! The network seam.
//!
//! A `Transport` executes one `HttpRequest` and returns the raw response as
//! data. Non-2xx statuses are not errors at this layer; only failures where
//! no response arrived are. `ReqwestTransport` is the production
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// A call that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout(String),
    Network(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).execute(request).await
    }
}

/// `reqwest`-backed transport.
///
/// Relative request paths (production mode) are resolved against `origin`;
/// without one they fail as network errors.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    origin: Option<Url>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::with_timeout(config.timeout)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("order-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, origin: None })
    }

    /// Set the origin used to resolve relative paths, e.g. `http://host:8000`.
    pub fn with_origin(mut self, origin: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(origin).map_err(|source| ConfigError::InvalidUrl {
            url: origin.to_string(),
            source,
        })?;
        self.origin = Some(url);
        Ok(self)
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportFailure> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.origin {
                Some(origin) => origin
                    .join(path)
                    .map_err(|e| TransportFailure::Network(format!("invalid URL {path}: {e}"))),
                None => Err(TransportFailure::Network(format!(
                    "cannot resolve relative URL {path} without an origin"
                ))),
            },
            Err(e) => Err(TransportFailure::Network(format!("invalid URL {path}: {e}"))),
        }
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout(err.to_string())
    } else {
        TransportFailure::Network(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let url = self.resolve(&request.path)?;
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        debug!(method = request.method.as_str(), url = %url, "sending request");

        let mut builder = self.client.request(method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        let is_multipart = matches!(request.body, Some(RequestBody::Multipart(_)));
        for (name, value) in &request.headers {
            // reqwest writes its own multipart content type including the boundary.
            if is_multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(body),
            Some(RequestBody::Multipart(part)) => {
                let file = Part::bytes(part.bytes).file_name(part.file_name);
                builder.multipart(Form::new().part(part.field, file))
            }
            None => builder,
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(classify)?;

        debug!(status, "received response");
        Ok(HttpResponse { status, headers, body })
    }
}
