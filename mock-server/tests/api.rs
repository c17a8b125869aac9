use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Settings, Task, UploadedFile};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "X-ORDER-TEST-BOUNDARY";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn upload_request(file_name: &str, contents: &str) -> Request<String> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

fn keyed_app() -> axum::Router {
    app_with(Settings {
        api_key: Some("server-key".to_string()),
        ..Settings::default()
    })
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

// --- upload ---

#[tokio::test]
async fn upload_returns_file_id() {
    let resp = app()
        .oneshot(upload_request("order.txt", "2 boxes of beef balls"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let file: UploadedFile = body_json(resp).await;
    assert_eq!(file.filename, "order.txt");
    assert_eq!(file.size, "2 boxes of beef balls".len());
    assert!(file.path.ends_with(".txt"));
}

#[tokio::test]
async fn upload_rejects_other_extensions() {
    let resp = app().oneshot(upload_request("order.pdf", "x")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "only .txt or .xlsx files are supported");
}

#[tokio::test]
async fn upload_enforces_size_limit() {
    let app = app_with(Settings {
        max_file_size: 4,
        ..Settings::default()
    });
    let resp = app.oneshot(upload_request("order.txt", "too large")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- process ---

#[tokio::test]
async fn process_requires_exactly_one_order_source() {
    let resp = keyed_app()
        .oneshot(json_request("POST", "/api/process", r#"{"excel_file_id":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = keyed_app()
        .oneshot(json_request(
            "POST",
            "/api/process",
            r#"{"order_file_id":"o","order_content":"c","excel_file_id":"x"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn process_unknown_order_file_is_404() {
    let resp = keyed_app()
        .oneshot(json_request(
            "POST",
            "/api/process",
            r#"{"order_file_id":"missing","excel_file_id":"x"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "order file not found");
}

#[tokio::test]
async fn process_treats_empty_api_key_as_missing() {
    use tower::Service;

    let mut app = app().into_service();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload_request("template.xlsx", "PK-sheet"))
        .await
        .unwrap();
    let excel: UploadedFile = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/process",
            &format!(
                r#"{{"order_content":"1 box","excel_file_id":"{}","api_key":""}}"#,
                excel.file_id
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("api key is not configured"));
}

// --- tasks ---

#[tokio::test]
async fn task_not_found() {
    let resp = app().oneshot(get("/api/task/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "task not found");
}

#[tokio::test]
async fn list_tasks_empty() {
    let resp = app().oneshot(get("/api/tasks")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["count"], 0);
    assert!(body["tasks"].as_array().unwrap().is_empty());
}

// --- config ---

#[tokio::test]
async fn config_update_sets_api_key() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app).await.unwrap().call(get("/api/config")).await.unwrap();
    let config: Value = body_json(resp).await;
    assert_eq!(config["hasApiKey"], false);
    assert_eq!(config["maxFileSize"], 50 * 1024 * 1024);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/config?api_key=abc")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: Value = body_json(resp).await;
    assert_eq!(ack["success"], true);

    let resp = ServiceExt::ready(&mut app).await.unwrap().call(get("/api/config")).await.unwrap();
    let config: Value = body_json(resp).await;
    assert_eq!(config["hasApiKey"], true);
}

// --- full lifecycle ---

#[tokio::test]
async fn process_lifecycle() {
    use tower::Service;

    let mut app = keyed_app().into_service();

    // upload order and template
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload_request("order.txt", "3 boxes"))
        .await
        .unwrap();
    let order: UploadedFile = body_json(resp).await;
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload_request("template.xlsx", "PK-sheet"))
        .await
        .unwrap();
    let excel: UploadedFile = body_json(resp).await;

    // start via query convention
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/process?order_file_id={}&excel_file_id={}",
                    order.file_id, excel.file_id
                ))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let started: Value = body_json(resp).await;
    let task_id = started["taskId"].as_str().unwrap().to_string();

    // start via JSON body with inline content
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/process",
            &format!(r#"{{"order_content":"1 box","excel_file_id":"{}"}}"#, excel.file_id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/task/{task_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = body_json(resp).await;
    assert_eq!(status["taskId"], task_id.as_str());
    assert_eq!(status["status"], "completed");
    assert_eq!(status["progress"], 100);

    // list
    let resp = ServiceExt::ready(&mut app).await.unwrap().call(get("/api/tasks")).await.unwrap();
    let list: Value = body_json(resp).await;
    assert_eq!(list["count"], 2);
    let tasks: Vec<Task> = serde_json::from_value(list["tasks"].clone()).unwrap();
    assert!(tasks.iter().any(|t| t.id == task_id));

    // download
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/download/{task_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get(http::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment;"));
    assert_eq!(&body_bytes(resp).await[..], b"PK-sheet");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/task/{task_id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // status after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/task/{task_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
