//! Integration tests for the non-download Drive operations.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use syno_drive_core::{
    ClientConfig, ConflictAction, CreateParams, Credential, DeleteParams, DriveClient,
    DriveError, HttpTransport, ListParams, Operation, OperationOutput, SearchParams, SortBy,
    SortDirection, UploadFile, UploadParams,
};
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const FILES_PREFIX: &str = "/api/SynologyDrive/default/v1/files";

async fn logged_in() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webapi/auth.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": { "sid": "sid-op", "did": "d" }
        })))
        .mount(&server)
        .await;

    let transport =
        HttpTransport::new(&ClientConfig::default(), true).expect("transport should build");
    let mut client = DriveClient::with_transport(
        Credential::new(server.uri(), "alice", "pw"),
        Arc::new(transport),
    );
    client.login().await.expect("login should succeed");
    (server, client)
}

fn ok_json(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(value)
}

async fn request_to(server: &MockServer, request_path: &str) -> Request {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .find(|r| r.url.path() == request_path)
        .expect("request should have been sent")
}

#[tokio::test]
async fn test_recent_is_a_get_returning_json_unmodified() {
    let (server, client) = logged_in().await;
    let body = serde_json::json!({ "success": true, "data": { "items": [{ "name": "a.txt" }] } });
    Mock::given(method("GET"))
        .and(path(format!("{FILES_PREFIX}/recent")))
        .and(header("cookie", "id=sid-op"))
        .respond_with(ok_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let output = client.execute(&Operation::Recent).await.expect("recent");
    assert_eq!(output, OperationOutput::Json(body));
}

#[tokio::test]
async fn test_list_sends_paging_query_and_filter_body() {
    let (server, client) = logged_in().await;
    Mock::given(method("POST"))
        .and(path(format!("{FILES_PREFIX}/list")))
        .and(query_param("path", "/mydrive/reports"))
        .and(query_param("sort_direction", "desc"))
        .and(query_param("sort_by", "name"))
        .and(query_param("offset", "10"))
        .and(query_param("limit", "5"))
        .and(body_json(serde_json::json!({ "filter": { "extensions": ["pdf"] } })))
        .respond_with(ok_json(serde_json::json!({ "success": true, "data": { "items": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = ListParams::new("/mydrive/reports");
    params.paging.sort_direction = SortDirection::Descending;
    params.paging.sort_by = SortBy::Name;
    params.paging.offset = 10;
    params.paging.limit = 5;
    params.filter = serde_json::json!({ "extensions": ["pdf"] });

    client.execute(&Operation::List(params)).await.expect("list");
}

#[tokio::test]
async fn test_search_sends_keyword_body_with_default_paging() {
    let (server, client) = logged_in().await;
    Mock::given(method("POST"))
        .and(path(format!("{FILES_PREFIX}/search")))
        .and(query_param("sort_direction", "asc"))
        .and(query_param("sort_by", "modified_time"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .and(body_json(serde_json::json!({ "keyword": "invoice" })))
        .respond_with(ok_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .execute(&Operation::Search(SearchParams::new("invoice")))
        .await
        .expect("search");
}

#[tokio::test]
async fn test_create_file_sends_base64_content() {
    let (server, client) = logged_in().await;
    Mock::given(method("POST"))
        .and(path(FILES_PREFIX))
        .and(query_param("type", "file"))
        .and(query_param("path", "/mydrive/hello.txt"))
        .respond_with(ok_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .execute(&Operation::Create(CreateParams::file("/mydrive/hello.txt", "hello world")))
        .await
        .expect("create");

    let request = request_to(&server, FILES_PREFIX).await;
    let body: serde_json::Value = serde_json::from_slice(&request.body).expect("json body");
    assert_eq!(body, serde_json::json!({ "file_content": BASE64.encode("hello world") }));
}

#[tokio::test]
async fn test_create_folder_sends_no_content() {
    let (server, client) = logged_in().await;
    Mock::given(method("POST"))
        .and(path(FILES_PREFIX))
        .and(query_param("type", "folder"))
        .respond_with(ok_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .execute(&Operation::Create(CreateParams::folder("/mydrive/new")))
        .await
        .expect("create");

    let request = request_to(&server, FILES_PREFIX).await;
    let body: serde_json::Value = serde_json::from_slice(&request.body).expect("json body");
    assert!(body.get("file_content").is_none());
    assert!(body["modified_time"].as_u64().is_some_and(|t| t > 0));
}

#[tokio::test]
async fn test_upload_sends_ordered_multipart_fields() {
    let (server, client) = logged_in().await;
    Mock::given(method("PUT"))
        .and(path(format!("{FILES_PREFIX}/upload")))
        .and(header("cookie", "id=sid-op"))
        .respond_with(ok_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = UploadParams::new(
        "/mydrive/docs/",
        UploadFile {
            bytes: b"\x00binary\xffpayload".to_vec(),
            filename: "data.bin".to_string(),
            mime_type: None,
        },
    );
    params.conflict_action = ConflictAction::Autorename;
    client.execute(&Operation::Upload(params)).await.expect("upload");

    let request = request_to(&server, &format!("{FILES_PREFIX}/upload")).await;
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .expect("content type")
        .to_string();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");

    let body = String::from_utf8_lossy(&request.body).into_owned();
    let needles = [
        "name=\"conflict_action\"\r\n\r\nautorename\r\n".to_string(),
        "name=\"path\"\r\n\r\n/mydrive/docs/data.bin\r\n".to_string(),
        "name=\"type\"\r\n\r\nfile\r\n".to_string(),
        "name=\"file\"; filename=\"data.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            .to_string(),
    ];
    let positions: Vec<usize> = needles
        .iter()
        .map(|needle| body.find(needle.as_str()).expect("field present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));

    let payload = b"\x00binary\xffpayload";
    assert!(
        request.body.windows(payload.len()).any(|w| w == payload),
        "file bytes must be sent unchanged"
    );
}

#[tokio::test]
async fn test_delete_sends_single_path_body() {
    let (server, client) = logged_in().await;
    Mock::given(method("POST"))
        .and(path(format!("{FILES_PREFIX}/delete")))
        .and(body_json(serde_json::json!({
            "permanent": true,
            "files": ["/mydrive/old.txt"]
        })))
        .respond_with(ok_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = DeleteParams::new("/mydrive/old.txt");
    params.permanent = true;
    client.execute(&Operation::Delete(params)).await.expect("delete");
}

#[tokio::test]
async fn test_json_operation_error_status_is_http_error() {
    let (server, client) = logged_in().await;
    Mock::given(method("POST"))
        .and(path(format!("{FILES_PREFIX}/delete")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = client
        .execute(&Operation::Delete(DeleteParams::new("/mydrive/x")))
        .await
        .expect_err("http error");
    assert!(matches!(error, DriveError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_remote_failure_json_is_passed_through() {
    let (server, client) = logged_in().await;
    let body = serde_json::json!({ "success": false, "error": { "code": 1002 } });
    Mock::given(method("POST"))
        .and(path(format!("{FILES_PREFIX}/delete")))
        .respond_with(ok_json(body.clone()))
        .mount(&server)
        .await;

    let output = client
        .execute(&Operation::Delete(DeleteParams::new("/mydrive/x")))
        .await
        .expect("json passed through");
    assert_eq!(output, OperationOutput::Json(body));
}

#[tokio::test]
async fn test_validation_failures_make_no_request() {
    let (server, client) = logged_in().await;
    Mock::given(path_regex("^/api/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut list = ListParams::new("/mydrive");
    list.paging.limit = 0;
    let cases = [
        (Operation::List(list), "limit"),
        (Operation::List(ListParams::new(" ")), "path"),
        (Operation::Create(CreateParams::folder("")), "path"),
        (Operation::Delete(DeleteParams::new("")), "path"),
        (
            Operation::Upload(UploadParams::new(
                "/mydrive/",
                UploadFile {
                    bytes: b"x".to_vec(),
                    filename: String::new(),
                    mime_type: None,
                },
            )),
            "filename",
        ),
    ];
    for (operation, expected_field) in cases {
        let error = client.execute(&operation).await.expect_err("validation error");
        match error {
            DriveError::Validation { field, .. } => assert_eq!(field, expected_field),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
