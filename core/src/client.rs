//! Stateless HTTP request builder and response parser for the order API.
//!
//! # Design
//! `OrderApiClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`; `RemoteClient` runs the round-trip in between.
//! Parsing goes through the response interceptor, so every `parse_*` either
//! returns the bare payload or a normalized `ApiError`.

use crate::endpoint::{self, Endpoint};
use crate::error::ApiError;
use crate::http::{FilePart, HttpRequest, HttpResponse, RequestBody};
use crate::interceptor::unwrap_payload;
use crate::types::{
    ConfigMap, ConfigUpdate, FileUpload, HealthStatus, ProcessParams, ProcessRequest, TaskDeleted,
    TaskHandle, TaskList, TaskStatus, UploadedFile,
};

/// Browser-style navigation target for downloads.
pub const NAVIGATION_TARGET: &str = "_blank";

/// A side effect rather than a call: open `url` in a new navigation context.
///
/// Downloads are served as a file stream the user agent saves on its own, so
/// the client hands back this value instead of fetching the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    pub target: &'static str,
}

/// Performs a `Navigation`. Supplied by the host environment.
pub trait Navigator {
    fn navigate(&self, url: &str, target: &str);
}

impl Navigation {
    pub fn open(&self, navigator: &dyn Navigator) {
        navigator.navigate(&self.url, self.target);
    }
}

/// Synchronous, stateless client for the order API.
#[derive(Debug, Clone)]
pub struct OrderApiClient {
    base_url: String,
}

impl OrderApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, endpoint: Endpoint, task_id: Option<&str>) -> HttpRequest {
        HttpRequest::new(
            endpoint.method,
            format!("{}{}", self.base_url, endpoint.render(task_id)),
        )
    }

    /// Body and query must agree with the endpoint descriptor.
    fn checked(endpoint: Endpoint, req: HttpRequest) -> HttpRequest {
        debug_assert_eq!(
            req.body.is_some(),
            endpoint.expects_body,
            "{} {}: body presence does not match endpoint",
            endpoint.method.as_str(),
            endpoint.path
        );
        debug_assert!(
            endpoint.expects_query || req.query.is_empty(),
            "{} {}: endpoint takes no query parameters",
            endpoint.method.as_str(),
            endpoint.path
        );
        req
    }

    pub fn build_upload_file(&self, file: &FileUpload) -> HttpRequest {
        let mut req = self.request(endpoint::UPLOAD, None);
        req.headers
            .push(("content-type".to_string(), "multipart/form-data".to_string()));
        req.body = Some(RequestBody::Multipart(FilePart {
            field: "file".to_string(),
            file_name: file.file_name.clone(),
            bytes: file.bytes.clone(),
        }));
        Self::checked(endpoint::UPLOAD, req)
    }

    /// The request is serialized as given; both or neither order source is forwarded too.
    pub fn build_start_process(&self, input: &ProcessRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        let mut req = self.request(endpoint::PROCESS, None);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(RequestBody::Json(body));
        Ok(Self::checked(endpoint::PROCESS, req))
    }

    /// Older convention: parameters in the query string, no body.
    pub fn build_start_process_query(&self, params: &ProcessParams) -> HttpRequest {
        let mut req = self.request(endpoint::PROCESS_QUERY, None);
        req.query = params.to_query();
        Self::checked(endpoint::PROCESS_QUERY, req)
    }

    pub fn build_get_task_status(&self, task_id: &str) -> HttpRequest {
        Self::checked(endpoint::TASK_STATUS, self.request(endpoint::TASK_STATUS, Some(task_id)))
    }

    pub fn build_delete_task(&self, task_id: &str) -> HttpRequest {
        Self::checked(endpoint::DELETE_TASK, self.request(endpoint::DELETE_TASK, Some(task_id)))
    }

    pub fn build_get_config(&self) -> HttpRequest {
        Self::checked(endpoint::GET_CONFIG, self.request(endpoint::GET_CONFIG, None))
    }

    pub fn build_update_config(&self, update: &ConfigUpdate) -> HttpRequest {
        let mut req = self.request(endpoint::UPDATE_CONFIG, None);
        req.query = update.to_query();
        Self::checked(endpoint::UPDATE_CONFIG, req)
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        Self::checked(endpoint::LIST_TASKS, self.request(endpoint::LIST_TASKS, None))
    }

    pub fn build_health(&self) -> HttpRequest {
        Self::checked(endpoint::HEALTH, self.request(endpoint::HEALTH, None))
    }

    pub fn download_navigation(&self, task_id: &str) -> Navigation {
        Navigation {
            url: format!("{}{}", self.base_url, endpoint::DOWNLOAD.render(Some(task_id))),
            target: NAVIGATION_TARGET,
        }
    }

    pub fn parse_upload_file(&self, response: HttpResponse) -> Result<UploadedFile, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_start_process(&self, response: HttpResponse) -> Result<TaskHandle, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_get_task_status(&self, response: HttpResponse) -> Result<TaskStatus, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<TaskDeleted, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_get_config(&self, response: HttpResponse) -> Result<ConfigMap, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_update_config(&self, response: HttpResponse) -> Result<ConfigMap, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<TaskList, ApiError> {
        unwrap_payload(response)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        unwrap_payload(response)
    }
}
