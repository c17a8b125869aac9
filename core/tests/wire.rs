//! Wire format of `ReqwestTransport`, checked against a wiremock server.

use std::time::Duration;

use order_client::{
    ClientConfig, ConfigUpdate, ErrorKind, FileUpload, ProcessRequest, RemoteClient,
    RetryingTransport, ReqwestTransport,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RemoteClient {
    RemoteClient::connect(ClientConfig::new(&format!("{}/api", server.uri()))).unwrap()
}

#[tokio::test]
async fn upload_is_multipart_with_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header_regex("content-type", "^multipart/form-data; boundary=.+"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"file_id": "f1"})))
        .expect(1)
        .mount(&server)
        .await;

    let uploaded = client_for(&server)
        .upload_file(&FileUpload::new("order.txt", vec![b'x'; 10 * 1024]))
        .await
        .unwrap();
    assert_eq!(uploaded.file_id, "f1");
}

#[tokio::test]
async fn start_process_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .and(body_json(json!({"order_content": "2 boxes", "excel_file_id": "x1", "api_key": "k"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"taskId": "t1", "message": "task started"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handle = client_for(&server)
        .start_process(&ProcessRequest::from_order_content("2 boxes", "x1").with_api_key("k"))
        .await
        .unwrap();
    assert_eq!(handle.task_id, "t1");
    assert_eq!(handle.message.as_deref(), Some("task started"));
}

#[tokio::test]
async fn update_config_is_query_with_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(query_param("apiKey", "x"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apiKey": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client_for(&server)
        .update_config(&ConfigUpdate::new().set("apiKey", "x"))
        .await
        .unwrap();
    assert_eq!(updated["apiKey"].as_str(), Some("x"));
}

#[tokio::test]
async fn not_found_detail_reaches_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/task/t1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "task not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server).get_task_status("t1").await.unwrap_err();
    assert_eq!(err.to_string(), "task not found");
}

#[tokio::test]
async fn slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(&format!("{}/api", server.uri()))
        .with_timeout(Duration::from_millis(200));
    let client = RemoteClient::connect(config).unwrap();
    let err = client.get_config().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn retrying_transport_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": [], "count": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(&format!("{}/api", server.uri()));
    let transport = RetryingTransport::new(
        ReqwestTransport::new(&config).unwrap(),
        3,
        Duration::from_millis(10),
    );
    let client = RemoteClient::with_transport(config, transport);
    let list = client.get_all_tasks().await.unwrap();
    assert_eq!(list.count, 0);
}
