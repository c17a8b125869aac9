//! Client for the order-processing backend.
//!
//! # Overview
//! `RemoteClient` binds a base URL, a fixed request timeout and uniform
//! response/error handling to a `Transport`, and exposes the backend's
//! operations: upload, process, task status, download, config and task
//! listing.
//!
//! # Design
//! - `OrderApiClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. No I/O happens there.
//! - `RemoteClient` runs the round-trip through a `Transport`, applying the
//!   request interceptor and the timeout on every call.
//! - Every failure surfaces as one `ApiError` carrying a display-ready message.
//! - Downloads are a `Navigation` effect, not a fetch.
//! - Retries are opt-in via `RetryingTransport`.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod remote;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{Navigation, Navigator, OrderApiClient};
pub use config::{ClientConfig, Mode};
pub use endpoint::Endpoint;
pub use error::{ApiError, ConfigError, ErrorKind, FALLBACK_MESSAGE};
pub use http::{FilePart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use interceptor::{PassThrough, RequestInterceptor};
pub use remote::RemoteClient;
pub use retry::RetryingTransport;
pub use transport::{ReqwestTransport, Transport, TransportFailure};
pub use types::{
    ConfigMap, ConfigUpdate, ConfigValue, FileUpload, HealthStatus, ProcessParams, ProcessRequest,
    TaskDeleted, TaskHandle, TaskList, TaskLogEntry, TaskPhase, TaskStatus, TaskSummary,
    UploadedFile,
};
