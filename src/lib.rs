//! Synology Drive API core library
//!
//! Client-side core for the Synology Drive file API on a DSM NAS: session
//! login, request construction for each file operation, and interpretation of
//! the responses.
//!
//! # Architecture
//!
//! - [`error_codes`] - DSM numeric error code translation
//! - [`auth`] - login/logout handshake and session state
//! - [`multipart`] - byte-exact `multipart/form-data` encoder for uploads
//! - [`download`] - file-or-JSON-error classification of download responses
//! - [`pipeline`] - typed operations, route table, request/response steps
//! - [`transport`] - the HTTP seam and its `reqwest` implementation
//! - [`client`] - [`DriveClient`], tying the above together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod constants;
pub mod download;
pub mod error;
pub mod error_codes;
pub mod multipart;
pub mod pipeline;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use auth::{AuthError, Credential, ServiceType, Session, authenticate, logout};
pub use client::DriveClient;
pub use download::{BinaryFile, ResponsePayload, classify, save_to_dir};
pub use error::DriveError;
pub use error_codes::{SynologyErrorCode, is_known_error_code, translate};
pub use multipart::{EncodedBody, FieldValue, MultipartField, encode};
pub use pipeline::{
    ConflictAction, CreateKind, CreateParams, DEFAULT_LIMIT, DeleteParams, DownloadParams,
    ListParams, Operation, OperationKind, OperationOutput, Paging, RequestPipeline, SearchParams,
    SortBy, SortDirection, UploadFile, UploadParams,
};
pub use transport::{ClientConfig, HttpTransport, PreparedRequest, RawResponse, Transport};
