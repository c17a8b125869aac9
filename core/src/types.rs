//! Request and response payloads for the order-processing API.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently of the
//! mock-server crate; the integration tests catch schema drift. Response types
//! are lenient (`#[serde(default)]` on optional fields) since the backend
//! omits or nulls several of them depending on task state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A file to be sent to `/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Server acknowledgement of an upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    #[serde(rename = "fileId", alias = "file_id")]
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// JSON body for `POST /process`.
///
/// Exactly one of `order_file_id` and `order_content` must be set. The client
/// does not enforce this: the request is forwarded as given and the server
/// rejects illegal combinations. Use [`ProcessRequest::from_order_file`] or
/// [`ProcessRequest::from_order_content`] to build a legal one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProcessRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_content: Option<String>,
    pub excel_file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ProcessRequest {
    pub fn from_order_file(order_file_id: impl Into<String>, excel_file_id: impl Into<String>) -> Self {
        Self {
            order_file_id: Some(order_file_id.into()),
            excel_file_id: excel_file_id.into(),
            ..Self::default()
        }
    }

    pub fn from_order_content(order_content: impl Into<String>, excel_file_id: impl Into<String>) -> Self {
        Self {
            order_content: Some(order_content.into()),
            excel_file_id: excel_file_id.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Query parameters for the older `POST /process` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessParams {
    pub order_file_id: String,
    pub excel_file_id: String,
    pub api_key: Option<String>,
}

impl ProcessParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("order_file_id".to_string(), self.order_file_id.clone()),
            ("excel_file_id".to_string(), self.excel_file_id.clone()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("api_key".to_string(), key.clone()));
        }
        query
    }
}

/// Handle to a server-side processing task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskHandle {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Lifecycle phase reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskPhase {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskPhase::Completed | TaskPhase::Failed)
    }
}

/// One progress line recorded while a task runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskLogEntry {
    pub time: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Response of `GET /task/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: String,
    pub status: TaskPhase,
    pub progress: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub logs: Vec<TaskLogEntry>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

/// One entry of `GET /tasks`. The backend returns its internal task record
/// here, so the id field is `id` rather than `taskId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSummary {
    pub id: String,
    pub status: TaskPhase,
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

/// Response of `GET /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskList {
    pub tasks: Vec<TaskSummary>,
    pub count: usize,
}

/// Response of `DELETE /task/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDeleted {
    pub message: String,
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// A single configuration value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Query-string rendering. Lists expand to one value per element.
    fn query_values(&self) -> Vec<String> {
        match self {
            ConfigValue::Bool(b) => vec![b.to_string()],
            ConfigValue::Number(n) => vec![n.to_string()],
            ConfigValue::Text(s) => vec![s.clone()],
            ConfigValue::List(items) => items.iter().flat_map(ConfigValue::query_values).collect(),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value.into())
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        ConfigValue::Number(value.into())
    }
}

/// Server-owned configuration snapshot.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// Partial configuration change. Only the keys present are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|(key, value)| {
                value
                    .query_values()
                    .into_iter()
                    .map(move |v| (key.clone(), v))
            })
            .collect()
    }
}

impl From<ConfigMap> for ConfigUpdate {
    fn from(entries: ConfigMap) -> Self {
        Self { entries }
    }
}

/// Server error body. Only a string `detail` is recognised.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    pub(crate) fn detail_message(&self) -> Option<&str> {
        self.detail.as_ref().and_then(serde_json::Value::as_str)
    }
}
