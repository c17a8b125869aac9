//! Async façade: one configured transport binding plus the named operations.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::client::{Navigation, OrderApiClient};
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpRequest, HttpResponse};
use crate::interceptor::{normalize_failure, PassThrough, RequestInterceptor};
use crate::transport::{ReqwestTransport, Transport, TransportFailure};
use crate::types::{
    ConfigMap, ConfigUpdate, FileUpload, HealthStatus, ProcessParams, ProcessRequest, TaskDeleted,
    TaskHandle, TaskList, TaskStatus, UploadedFile,
};

/// Client for the order-processing backend.
///
/// Every call passes the request interceptor, runs under `config.timeout`
/// and resolves to the payload alone or to a normalized `ApiError`. There is
/// no retry here; wrap the transport in `RetryingTransport` for that.
pub struct RemoteClient<T = ReqwestTransport> {
    config: ClientConfig,
    api: OrderApiClient,
    transport: T,
    interceptor: Arc<dyn RequestInterceptor>,
}

impl<T> std::fmt::Debug for RemoteClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl RemoteClient<ReqwestTransport> {
    /// Build a client with the default `reqwest` transport.
    pub fn connect(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> RemoteClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let api = OrderApiClient::new(&config.base_url);
        Self {
            config,
            api,
            transport,
            interceptor: Arc::new(PassThrough),
        }
    }

    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptor = Arc::new(interceptor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = self.interceptor.intercept(request);
        debug!(method = request.method.as_str(), path = %request.path, "dispatching");
        match tokio::time::timeout(self.config.timeout, self.transport.execute(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(failure)) => Err(normalize_failure(failure)),
            Err(_) => Err(normalize_failure(TransportFailure::Timeout(format!(
                "timeout of {}ms exceeded",
                self.config.timeout.as_millis()
            )))),
        }
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    pub async fn upload_file(&self, file: &FileUpload) -> Result<UploadedFile, ApiError> {
        let response = self.send(self.api.build_upload_file(file)).await?;
        self.api.parse_upload_file(response)
    }

    /// `input` must carry exactly one of `order_file_id` / `order_content`;
    /// the server rejects anything else.
    #[instrument(skip(self, input), fields(excel_file_id = %input.excel_file_id))]
    pub async fn start_process(&self, input: &ProcessRequest) -> Result<TaskHandle, ApiError> {
        let response = self.send(self.api.build_start_process(input)?).await?;
        self.api.parse_start_process(response)
    }

    #[deprecated(note = "query-string convention; use `start_process` with a `ProcessRequest` body")]
    #[instrument(skip(self, params), fields(order_file_id = %params.order_file_id))]
    pub async fn start_process_with_params(&self, params: &ProcessParams) -> Result<TaskHandle, ApiError> {
        let response = self.send(self.api.build_start_process_query(params)).await?;
        self.api.parse_start_process(response)
    }

    #[instrument(skip(self))]
    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let response = self.send(self.api.build_get_task_status(task_id)).await?;
        self.api.parse_get_task_status(response)
    }

    /// No request is made; the returned value describes the navigation to perform.
    pub fn download_file(&self, task_id: &str) -> Navigation {
        self.api.download_navigation(task_id)
    }

    #[instrument(skip(self))]
    pub async fn get_config(&self) -> Result<ConfigMap, ApiError> {
        let response = self.send(self.api.build_get_config()).await?;
        self.api.parse_get_config(response)
    }

    #[instrument(skip(self, update))]
    pub async fn update_config(&self, update: &ConfigUpdate) -> Result<ConfigMap, ApiError> {
        let response = self.send(self.api.build_update_config(update)).await?;
        self.api.parse_update_config(response)
    }

    #[instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<TaskList, ApiError> {
        let response = self.send(self.api.build_list_tasks()).await?;
        self.api.parse_list_tasks(response)
    }

    #[instrument(skip(self))]
    pub async fn delete_task(&self, task_id: &str) -> Result<TaskDeleted, ApiError> {
        let response = self.send(self.api.build_delete_task(task_id)).await?;
        self.api.parse_delete_task(response)
    }

    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.send(self.api.build_health()).await?;
        self.api.parse_health(response)
    }
}
