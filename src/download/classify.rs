//! Classification of download responses.
//!
//! The download endpoint answers 200 both for files and for failures; a
//! failure is a JSON body labelled `application/json`. The declared content
//! type is therefore the only failure signal, and the request that produced
//! the response is never consulted.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use tracing::debug;

use super::filename::{effective_binary_mime, filename_or_default, mime_essence};
use crate::error::DriveError;

/// A downloaded file held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl std::fmt::Debug for BinaryFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryFile")
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// What a download response turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    BinaryFile(BinaryFile),
    /// JSON error object, exactly as received.
    ErrorPayload(serde_json::Value),
}

impl ResponsePayload {
    /// Converts an error payload into [`DriveError::Remote`].
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Remote`] for [`ResponsePayload::ErrorPayload`].
    pub fn into_result(self) -> Result<BinaryFile, DriveError> {
        match self {
            Self::BinaryFile(file) => Ok(file),
            Self::ErrorPayload(payload) => Err(DriveError::remote("download", payload)),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: reqwest::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Content-Disposition as text. DSM sends raw UTF-8 filenames, which
/// `HeaderValue::to_str` rejects.
fn disposition_text(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_DISPOSITION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

/// Classifies a completed download response.
///
/// - `application/json` → body parsed as JSON, returned as
///   [`ResponsePayload::ErrorPayload`]
/// - anything else → [`ResponsePayload::BinaryFile`] with the quoted
///   Content-Disposition filename (default `download.zip`) and the declared
///   type, `application/octet-stream` remapped to `application/zip`
///
/// # Errors
///
/// Returns the `serde_json` error when a body labelled JSON does not parse.
/// A malformed Content-Disposition never errors.
pub fn classify(headers: &HeaderMap, body: Vec<u8>) -> Result<ResponsePayload, serde_json::Error> {
    let declared = mime_essence(header_str(headers, CONTENT_TYPE));

    if declared == "application/json" {
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        debug!("download returned JSON error payload");
        return Ok(ResponsePayload::ErrorPayload(payload));
    }

    let filename = filename_or_default(disposition_text(headers).as_deref());
    let mime_type = effective_binary_mime(&declared);
    debug!(%filename, %mime_type, bytes = body.len(), "download returned file");

    Ok(ResponsePayload::BinaryFile(BinaryFile {
        bytes: body,
        filename,
        mime_type,
    }))
}
