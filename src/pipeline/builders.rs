//! Per-operation request construction.
//!
//! Each builder turns one [`Operation`] variant into query parameters,
//! headers, and an optional body. Builders run after validation, so they only
//! shape data.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tracing::debug;

use super::params::{CreateKind, Operation, Paging};
use crate::constants::OCTET_STREAM;
use crate::error::DriveError;
use crate::multipart::{self, MultipartField};

/// Builds the request parts for one operation.
pub type BodyBuilder = fn(&Operation) -> Result<RequestParts, DriveError>;

/// Query, headers, and body for one request, before URL and session are attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

impl RequestParts {
    fn json(value: &Value) -> Self {
        Self {
            query: Vec::new(),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("Accept", "application/json".to_string()),
            ],
            body: Some(value.to_string().into_bytes()),
        }
    }

    fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }
}

fn mismatch(builder: &'static str, operation: &Operation) -> DriveError {
    DriveError::validation(
        "operation",
        format!("{builder} builder cannot build a {} request", operation.kind()),
    )
}

fn paging_query(paging: &Paging) -> Vec<(&'static str, String)> {
    vec![
        ("sort_direction", paging.sort_direction.as_str().to_string()),
        ("sort_by", paging.sort_by.as_str().to_string()),
        ("offset", paging.offset.to_string()),
        ("limit", paging.limit.to_string()),
    ]
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Destination path for an upload.
///
/// A path ending in `/` names a folder and gets the source filename appended;
/// any other path is the full destination.
#[must_use]
pub fn compose_upload_path(path: &str, filename: &str) -> String {
    if path.ends_with('/') {
        format!("{path}{filename}")
    } else {
        path.to_string()
    }
}

/// No query, no body. Used by `recent`.
pub(crate) fn none(_operation: &Operation) -> Result<RequestParts, DriveError> {
    Ok(RequestParts {
        headers: vec![("Accept", "application/json".to_string())],
        ..RequestParts::default()
    })
}

pub(crate) fn list(operation: &Operation) -> Result<RequestParts, DriveError> {
    let Operation::List(params) = operation else {
        return Err(mismatch("list", operation));
    };
    let mut query = paging_query(&params.paging);
    query.push(("path", params.path.clone()));
    Ok(RequestParts::json(&json!({ "filter": params.filter })).with_query(query))
}

pub(crate) fn search(operation: &Operation) -> Result<RequestParts, DriveError> {
    let Operation::Search(params) = operation else {
        return Err(mismatch("search", operation));
    };
    Ok(RequestParts::json(&json!({ "keyword": params.keyword }))
        .with_query(paging_query(&params.paging)))
}

/// Files send only their base64 content; folders send only a modification time.
pub(crate) fn create(operation: &Operation) -> Result<RequestParts, DriveError> {
    let Operation::Create(params) = operation else {
        return Err(mismatch("create", operation));
    };
    let body = match &params.kind {
        CreateKind::File { content } => json!({ "file_content": BASE64.encode(content.as_bytes()) }),
        CreateKind::Folder => json!({ "modified_time": now_millis() }),
    };
    let query = vec![
        ("type", params.kind.as_str().to_string()),
        ("path", params.path.clone()),
    ];
    Ok(RequestParts::json(&body).with_query(query))
}

/// Multipart body with `conflict_action`, `path`, `type`, `file`, in that order.
///
/// The file part is labelled `application/octet-stream` unless a type was given.
pub(crate) fn upload(operation: &Operation) -> Result<RequestParts, DriveError> {
    let Operation::Upload(params) = operation else {
        return Err(mismatch("upload", operation));
    };
    let path = compose_upload_path(&params.path, &params.file.filename);
    debug!(%path, bytes = params.file.bytes.len(), "building upload body");

    let encoded = multipart::encode(&[
        MultipartField::text("conflict_action", params.conflict_action.as_str()),
        MultipartField::text("path", path),
        MultipartField::text("type", "file"),
        MultipartField::file(
            "file",
            params.file.bytes.clone(),
            params.file.filename.clone(),
            Some(params.file.mime_type.as_deref().unwrap_or(OCTET_STREAM)),
        ),
    ]);

    Ok(RequestParts {
        query: Vec::new(),
        headers: vec![
            ("Content-Type", encoded.content_type),
            ("Accept", "application/json".to_string()),
        ],
        body: Some(encoded.bytes),
    })
}

pub(crate) fn delete(operation: &Operation) -> Result<RequestParts, DriveError> {
    let Operation::Delete(params) = operation else {
        return Err(mismatch("delete", operation));
    };
    Ok(RequestParts::json(&json!({
        "permanent": params.permanent,
        "files": [params.path],
    })))
}

/// Single path, raw bytes back, real MIME type in the response headers.
pub(crate) fn download(operation: &Operation) -> Result<RequestParts, DriveError> {
    let Operation::Download(params) = operation else {
        return Err(mismatch("download", operation));
    };
    let body = json!({
        "force_download": false,
        "files": [params.path],
    });
    Ok(RequestParts {
        query: Vec::new(),
        headers: vec![
            ("Content-Type", "application/json".to_string()),
            ("Accept", "*/*".to_string()),
        ],
        body: Some(body.to_string().into_bytes()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::params::{
        ConflictAction, CreateParams, DeleteParams, DownloadParams, ListParams, SearchParams,
        SortBy, UploadFile, UploadParams,
    };

    fn body_json(parts: &RequestParts) -> Value {
        serde_json::from_slice(parts.body.as_ref().unwrap()).unwrap()
    }

    fn header<'a>(parts: &'a RequestParts, name: &str) -> Option<&'a str> {
        parts
            .headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_compose_upload_path_folder_appends_filename() {
        assert_eq!(
            compose_upload_path("/mydrive/docs/", "a.txt"),
            "/mydrive/docs/a.txt"
        );
    }

    #[test]
    fn test_compose_upload_path_full_path_unchanged() {
        assert_eq!(
            compose_upload_path("/mydrive/docs/a.txt", "b.txt"),
            "/mydrive/docs/a.txt"
        );
    }

    #[test]
    fn test_create_file_inlines_base64_content() {
        let parts = create(&Operation::Create(CreateParams::file("/mydrive/n.txt", "hello"))).unwrap();
        let body = body_json(&parts);
        assert_eq!(body, json!({"file_content": "aGVsbG8="}));
        assert_eq!(
            parts.query,
            vec![("type", "file".to_string()), ("path", "/mydrive/n.txt".to_string())]
        );
    }

    #[test]
    fn test_create_folder_omits_content() {
        let parts = create(&Operation::Create(CreateParams::folder("/mydrive/new"))).unwrap();
        let body = body_json(&parts);
        assert!(body.get("file_content").is_none());
        assert!(body["modified_time"].as_u64().unwrap() > 0);
        assert_eq!(parts.query[0], ("type", "folder".to_string()));
    }

    #[test]
    fn test_upload_field_order_and_path() {
        let mut params = UploadParams::new(
            "/mydrive/docs/",
            UploadFile {
                bytes: b"payload".to_vec(),
                filename: "a.txt".to_string(),
                mime_type: Some("text/plain".to_string()),
            },
        );
        params.conflict_action = ConflictAction::Overwrite;
        let parts = upload(&Operation::Upload(params)).unwrap();

        let content_type = header(&parts, "Content-Type").unwrap().to_string();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = String::from_utf8(parts.body.unwrap()).unwrap();

        let positions: Vec<usize> = [
            "name=\"conflict_action\"\r\n\r\noverwrite\r\n",
            "name=\"path\"\r\n\r\n/mydrive/docs/a.txt\r\n",
            "name=\"type\"\r\n\r\nfile\r\n",
            "name=\"file\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\npayload\r\n",
        ]
        .iter()
        .map(|needle| body.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_download_requests_single_path_raw() {
        let parts = download(&Operation::Download(DownloadParams::new("/mydrive/a.pdf"))).unwrap();
        assert_eq!(header(&parts, "Accept"), Some("*/*"));
        assert_eq!(
            body_json(&parts),
            json!({"force_download": false, "files": ["/mydrive/a.pdf"]})
        );
    }

    #[test]
    fn test_list_query_and_filter_body() {
        let mut params = ListParams::new("/mydrive");
        params.paging.sort_by = SortBy::Name;
        params.filter = json!({"starred": true});
        let parts = list(&Operation::List(params)).unwrap();
        assert_eq!(
            parts.query,
            vec![
                ("sort_direction", "asc".to_string()),
                ("sort_by", "name".to_string()),
                ("offset", "0".to_string()),
                ("limit", "50".to_string()),
                ("path", "/mydrive".to_string()),
            ]
        );
        assert_eq!(body_json(&parts), json!({"filter": {"starred": true}}));
    }

    #[test]
    fn test_search_keyword_body() {
        let parts = search(&Operation::Search(SearchParams::new("invoice"))).unwrap();
        assert_eq!(body_json(&parts), json!({"keyword": "invoice"}));
        assert_eq!(parts.query.len(), 4);
    }

    #[test]
    fn test_delete_body() {
        let mut params = DeleteParams::new("/mydrive/old");
        params.permanent = true;
        let parts = delete(&Operation::Delete(params)).unwrap();
        assert_eq!(
            body_json(&parts),
            json!({"permanent": true, "files": ["/mydrive/old"]})
        );
        assert!(parts.query.is_empty());
    }

    #[test]
    fn test_recent_has_no_body() {
        let parts = none(&Operation::Recent).unwrap();
        assert!(parts.body.is_none());
        assert!(parts.query.is_empty());
    }

    #[test]
    fn test_builder_rejects_wrong_variant() {
        let error = download(&Operation::Recent).unwrap_err();
        assert!(matches!(error, DriveError::Validation { field: "operation", .. }));
    }
}
