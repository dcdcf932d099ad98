//! Filename and MIME extraction from download response headers.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{DEFAULT_DOWNLOAD_FILENAME, OCTET_STREAM, ZIP_MIME};

#[allow(clippy::expect_used)]
static QUOTED_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename="([^"]+)""#).expect("static regex is valid"));

/// Extracts the quoted `filename="..."` parameter from a Content-Disposition value.
///
/// Only the quoted form is recognized; DSM always quotes. `filename*=` and
/// unquoted values yield `None`.
#[must_use]
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    QUOTED_FILENAME
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Filename for a download, falling back to `download.zip`.
#[must_use]
pub(crate) fn filename_or_default(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(parse_content_disposition)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_string())
}

/// Strips parameters from a Content-Type value (`text/plain; charset=x` → `text/plain`).
///
/// Missing or blank values become `application/octet-stream`.
#[must_use]
pub(crate) fn mime_essence(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|essence| !essence.is_empty())
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

/// Maps the MIME type DSM declares for binary downloads to the real one.
///
/// DSM labels zip bundles `application/octet-stream`; every other type is kept.
#[must_use]
pub(crate) fn effective_binary_mime(declared: &str) -> String {
    if declared == OCTET_STREAM {
        ZIP_MIME.to_string()
    } else {
        declared.to_string()
    }
}
