//! Endpoint paths and client defaults.

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (5 minutes, downloads can be large).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Auth CGI endpoint shared by login and logout.
pub const AUTH_CGI_PATH: &str = "/webapi/auth.cgi";

/// API name sent with every auth request.
pub const AUTH_API_NAME: &str = "SYNO.API.Auth";

/// Auth API version.
pub const AUTH_API_VERSION: &str = "3";

/// Drive file endpoints (Office Suite API v1).
pub const LIST_PATH: &str = "/api/SynologyDrive/default/v1/files/list";
pub const SEARCH_PATH: &str = "/api/SynologyDrive/default/v1/files/search";
pub const RECENT_PATH: &str = "/api/SynologyDrive/default/v1/files/recent";
pub const CREATE_PATH: &str = "/api/SynologyDrive/default/v1/files";
pub const UPLOAD_PATH: &str = "/api/SynologyDrive/default/v1/files/upload";
pub const DELETE_PATH: &str = "/api/SynologyDrive/default/v1/files/delete";
pub const DOWNLOAD_PATH: &str = "/api/SynologyDrive/default/v1/files/download";

/// Filename used when a download response carries no usable Content-Disposition.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "download.zip";

/// MIME type assumed when a response has no Content-Type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// DSM sends multi-file bundles as octet-stream; this is what they really are.
pub const ZIP_MIME: &str = "application/zip";
