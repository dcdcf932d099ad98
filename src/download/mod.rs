//! Download response handling.
//!
//! A download response is either the requested file or a JSON error object,
//! both with a 200 status. [`classify`] tells them apart from the headers.
//!
//! # Example
//!
//! ```
//! use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
//! use syno_drive_core::download::{ResponsePayload, classify};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
//! let payload = classify(&headers, b"PK..".to_vec()).unwrap();
//! let ResponsePayload::BinaryFile(file) = payload else { panic!() };
//! assert_eq!(file.filename, "download.zip");
//! assert_eq!(file.mime_type, "application/zip");
//! ```

mod classify;
mod filename;
mod save;

pub use classify::{BinaryFile, ResponsePayload, classify};
pub use save::{resolve_unique_path, sanitize_filename, save_to_dir};
