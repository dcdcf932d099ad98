//! Error types for Drive file operations.
//!
//! Validation failures are raised before any request is built. Remote and
//! authentication failures carry the vendor code alongside the translated
//! text and are never retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;
use crate::transport::TransportError;

/// Errors from preparing, sending, or interpreting a Drive operation.
#[derive(Debug, Error)]
pub enum DriveError {
    /// A required parameter is missing or out of range. No request was sent.
    #[error("invalid parameter `{field}`: {reason}")]
    Validation {
        /// Parameter name.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// Login failed or an operation was attempted without a session.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// Operation attempted before a successful login.
    #[error("not authenticated: log in before calling {operation}")]
    NotAuthenticated {
        /// Operation name.
        operation: &'static str,
    },

    /// DSM returned a JSON error payload on an otherwise successful response.
    #[error("remote error during {operation}: {message}")]
    Remote {
        /// Operation name.
        operation: &'static str,
        /// Vendor code, when the payload had one.
        code: Option<i64>,
        /// Translated message.
        message: String,
        /// The payload as received.
        payload: serde_json::Value,
    },

    /// A body that should have been JSON was not.
    #[error("malformed JSON in {operation} response: {source}")]
    Parse {
        /// Operation name.
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Non-2xx status on a JSON endpoint.
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus {
        /// Endpoint without query string.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// Credential base URL cannot be combined with the endpoint path.
    #[error("invalid NAS URL: {url}")]
    InvalidUrl {
        /// The offending base URL.
        url: String,
    },

    /// Local file system error while saving a download or reading an upload.
    #[error("IO error at {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DriveError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn parse(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { operation, source }
    }

    /// Builds a remote error from a DSM JSON payload, translating `error.code`.
    pub fn remote(operation: &'static str, payload: serde_json::Value) -> Self {
        let code = payload
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(serde_json::Value::as_i64);
        Self::Remote {
            operation,
            code,
            message: crate::error_codes::translate(code.unwrap_or(0)),
            payload,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Vendor error code, when one was received.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Remote { code, .. } => *code,
            Self::Authentication(auth) => auth.code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_validation_display_names_field() {
        let msg = DriveError::validation("path", "must not be empty").to_string();
        assert_eq!(msg, "invalid parameter `path`: must not be empty");
    }

    #[test]
    fn test_remote_translates_known_code() {
        let payload = json!({"success": false, "error": {"code": 407}});
        let error = DriveError::remote("download", payload.clone());
        assert_eq!(error.code(), Some(407));
        assert!(error.to_string().contains("407 - Blocked IP source."));
        match error {
            DriveError::Remote { payload: kept, .. } => assert_eq!(kept, payload),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_remote_without_code_degrades() {
        let error = DriveError::remote("download", json!({"success": false}));
        assert_eq!(error.code(), None);
        assert!(error.to_string().ends_with("Unknown error."));
    }

    #[test]
    fn test_authentication_error_exposes_code() {
        let error = DriveError::from(AuthError::rejected(409));
        assert_eq!(error.code(), Some(409));
        assert!(error.to_string().contains("409 - Expired password."));
    }
}
