use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
pub const TASK_TIMEOUT_SECS: u64 = 600;
const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Clone, Debug)]
pub struct Settings {
    pub api_key: Option<String>,
    pub max_file_size: usize,
    pub standard_products: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_file_size: MAX_FILE_SIZE,
            standard_products: vec![
                "170g fish roe ball".to_string(),
                "250g beef ball".to_string(),
                "250g cuttlefish cake".to_string(),
            ],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub filename: String,
    pub size: usize,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<i32>,
}

/// Internal task record; also the element type of `GET /tasks`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: String,
    pub progress: i32,
    pub message: String,
    pub logs: Vec<LogEntry>,
    pub created_at: String,
    pub order_file: Option<String>,
    pub excel_file: String,
    pub output_file: String,
    pub result: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessInput {
    pub order_file_id: Option<String>,
    pub order_content: Option<String>,
    pub excel_file_id: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    pub api_key: Option<String>,
}

struct StoredFile {
    name: String,
    bytes: Bytes,
}

#[derive(Default)]
pub struct Store {
    settings: Settings,
    files: HashMap<String, StoredFile>,
    tasks: HashMap<String, Task>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error response in the backend's `{"detail": ...}` shape.
#[derive(Debug)]
pub struct Failure(StatusCode, String);

impl Failure {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, detail.into())
    }

    fn not_found(detail: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, detail.into())
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "detail": self.1 }))).into_response()
    }
}

pub fn app() -> Router {
    app_with(Settings::default())
}

pub fn app_with(settings: Settings) -> Router {
    let limit = settings.max_file_size + 1024 * 1024;
    let db: Db = Arc::new(RwLock::new(Store {
        settings,
        ..Store::default()
    }));
    let api = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload_file))
        .route("/process", post(start_process))
        .route("/task/{task_id}", get(get_task).delete(delete_task))
        .route("/tasks", get(list_tasks))
        .route("/download/{task_id}", get(download))
        .route("/config", get(get_config).post(update_config))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener, settings: Settings) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(settings)).await
}

/// An empty key counts as no key.
fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.is_empty())
}

fn now_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "order processing service is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn upload_file(
    State(db): State<Db>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>, Failure> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Failure::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !(filename.ends_with(".txt") || filename.ends_with(".xlsx")) {
            return Err(Failure::bad_request("only .txt or .xlsx files are supported"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Failure::bad_request(e.to_string()))?;

        let mut store = db.write().await;
        if bytes.len() > store.settings.max_file_size {
            return Err(Failure::bad_request(format!(
                "file exceeds the size limit ({}MB)",
                store.settings.max_file_size / 1024 / 1024
            )));
        }
        let file_id = Uuid::new_v4().to_string();
        let ext = if filename.ends_with(".txt") { "txt" } else { "xlsx" };
        let uploaded = UploadedFile {
            file_id: file_id.clone(),
            filename: filename.clone(),
            size: bytes.len(),
            path: format!("uploads/{file_id}.{ext}"),
        };
        store.files.insert(file_id, StoredFile { name: filename, bytes });
        info!(file = %uploaded.filename, path = %uploaded.path, "file uploaded");
        return Ok(Json(uploaded));
    }
    Err(Failure(StatusCode::UNPROCESSABLE_ENTITY, "field `file` is required".to_string()))
}

/// Accepts either a JSON body or query parameters.
async fn start_process(
    State(db): State<Db>,
    Query(query): Query<ProcessInput>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, Failure> {
    let input = if body.is_empty() {
        query
    } else {
        serde_json::from_slice::<ProcessInput>(&body)
            .map_err(|e| Failure(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?
    };

    let mut store = db.write().await;
    let order_file = match (&input.order_file_id, &input.order_content) {
        (Some(id), None) => match store.files.get(id) {
            Some(file) if file.name.ends_with(".txt") => Some(format!("uploads/{id}.txt")),
            _ => return Err(Failure::not_found("order file not found")),
        },
        (None, Some(_)) => None,
        _ => {
            return Err(Failure::bad_request(
                "provide exactly one of order_file_id or order_content",
            ))
        }
    };
    let excel_id = input.excel_file_id.unwrap_or_default();
    let excel = match store.files.get(&excel_id) {
        Some(file) if file.name.ends_with(".xlsx") => file.bytes.clone(),
        _ => return Err(Failure::not_found("excel template not found")),
    };
    if !has_key(&input.api_key) && !has_key(&store.settings.api_key) {
        return Err(Failure::bad_request(
            "api key is not configured (set it on the server or pass api_key)",
        ));
    }

    let task_id = Uuid::new_v4().to_string();
    let output_file = format!("outputs/{task_id}.xlsx");
    let task = Task {
        id: task_id.clone(),
        status: "completed".to_string(),
        progress: 100,
        message: "processing finished".to_string(),
        logs: vec![
            LogEntry {
                time: now_time(),
                message: "waiting to start".to_string(),
                percent: Some(0),
            },
            LogEntry {
                time: now_time(),
                message: "processing finished".to_string(),
                percent: Some(100),
            },
        ],
        created_at: Local::now().to_rfc3339(),
        order_file,
        excel_file: format!("uploads/{excel_id}.xlsx"),
        output_file: output_file.clone(),
        result: Some(output_file.clone()),
    };
    store.tasks.insert(task_id.clone(), task);
    store.files.insert(
        format!("result-{task_id}"),
        StoredFile {
            name: output_file,
            bytes: excel,
        },
    );
    info!(task_id = %task_id, "task created");

    Ok(Json(json!({ "taskId": task_id, "message": "task started" })))
}

async fn get_task(
    State(db): State<Db>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, Failure> {
    let store = db.read().await;
    let task = store
        .tasks
        .get(&task_id)
        .ok_or_else(|| Failure::not_found("task not found"))?;
    Ok(Json(json!({
        "taskId": task.id,
        "status": task.status,
        "progress": task.progress,
        "message": task.message,
        "logs": task.logs,
        "createdAt": task.created_at,
        "result": task.result,
    })))
}

async fn list_tasks(State(db): State<Db>) -> Json<serde_json::Value> {
    let store = db.read().await;
    let tasks: Vec<&Task> = store.tasks.values().collect();
    let count = tasks.len();
    Json(json!({ "tasks": tasks, "count": count }))
}

async fn delete_task(
    State(db): State<Db>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, Failure> {
    let mut store = db.write().await;
    store
        .tasks
        .remove(&task_id)
        .ok_or_else(|| Failure::not_found("task not found"))?;
    store.files.remove(&format!("result-{task_id}"));
    info!(task_id = %task_id, "task deleted");
    Ok(Json(json!({ "message": "task deleted", "taskId": task_id })))
}

async fn download(
    State(db): State<Db>,
    Path(task_id): Path<String>,
) -> Result<Response, Failure> {
    let store = db.read().await;
    let task = store
        .tasks
        .get(&task_id)
        .ok_or_else(|| Failure::not_found("task not found"))?;
    if task.status != "completed" {
        return Err(Failure::bad_request("task is not completed"));
    }
    let file = store
        .files
        .get(&format!("result-{task_id}"))
        .ok_or_else(|| Failure::not_found("result file not found"))?;
    let short_id: String = task_id.chars().take(8).collect();
    let disposition = format!("attachment; filename=\"result_{short_id}.xlsx\"");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes.clone(),
    )
        .into_response())
}

async fn get_config(State(db): State<Db>) -> Json<serde_json::Value> {
    let store = db.read().await;
    Json(json!({
        "hasApiKey": has_key(&store.settings.api_key),
        "standardProducts": store.settings.standard_products,
        "maxFileSize": store.settings.max_file_size,
        "taskTimeout": TASK_TIMEOUT_SECS,
    }))
}

async fn update_config(
    State(db): State<Db>,
    Query(query): Query<ConfigQuery>,
) -> Json<serde_json::Value> {
    if let Some(key) = query.api_key.filter(|k| !k.is_empty()) {
        db.write().await.settings.api_key = Some(key);
        info!("api key updated");
    }
    Json(json!({ "success": true, "message": "config updated" }))
}
